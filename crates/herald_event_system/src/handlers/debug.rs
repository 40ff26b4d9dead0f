use std::sync::Arc;

use crate::context::ClientContext;
use crate::error::HandlerError;
use crate::events::EventArgs;
use crate::handler::{EventHandler, HandlerClass};

/// Forwards the client's internal debug output to the debug log.
#[derive(Debug, Default)]
pub struct DebugEvent;

impl EventHandler for DebugEvent {
    fn handler_name(&self) -> &str {
        "DebugEvent"
    }

    fn execute(&self, ctx: &ClientContext, args: &EventArgs) -> Result<(), HandlerError> {
        let message = args.str_arg(0)?;
        ctx.logger().debug(message);
        Ok(())
    }
}

impl HandlerClass for DebugEvent {
    fn create(_ctx: &Arc<ClientContext>) -> Self {
        DebugEvent
    }
}
