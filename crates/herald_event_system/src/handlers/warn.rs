use std::sync::Arc;

use crate::context::ClientContext;
use crate::error::HandlerError;
use crate::events::EventArgs;
use crate::handler::{EventHandler, HandlerClass};

/// Surfaces client warnings with a `CLIENT_WARN:` prefix.
#[derive(Debug, Default)]
pub struct WarnEvent;

impl EventHandler for WarnEvent {
    fn handler_name(&self) -> &str {
        "WarnEvent"
    }

    fn execute(&self, ctx: &ClientContext, args: &EventArgs) -> Result<(), HandlerError> {
        let message = args.str_arg(0)?;
        ctx.logger().warn(&format!("CLIENT_WARN: {message}"));
        Ok(())
    }
}

impl HandlerClass for WarnEvent {
    fn create(_ctx: &Arc<ClientContext>) -> Self {
        WarnEvent
    }
}
