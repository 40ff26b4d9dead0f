use std::sync::Arc;

use crate::context::ClientContext;
use crate::error::HandlerError;
use crate::events::EventArgs;
use crate::handler::{EventHandler, HandlerClass};

/// Logs connection level errors reported by the platform client.
#[derive(Debug, Default)]
pub struct ErrorEvent;

impl EventHandler for ErrorEvent {
    fn handler_name(&self) -> &str {
        "ErrorEvent"
    }

    fn execute(&self, ctx: &ClientContext, args: &EventArgs) -> Result<(), HandlerError> {
        let message = args.str_arg(0)?;
        ctx.logger().error(&format!("CLIENT_ERROR: {message}"));
        Ok(())
    }
}

impl HandlerClass for ErrorEvent {
    fn create(_ctx: &Arc<ClientContext>) -> Self {
        ErrorEvent
    }
}
