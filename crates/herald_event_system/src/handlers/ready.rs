use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use crate::context::{ClientContext, OutboundCommand};
use crate::error::HandlerError;
use crate::events::EventArgs;
use crate::handler::{EventHandler, HandlerClass};

/// Marks the session ready once the platform confirms the login.
#[derive(Debug)]
pub struct ReadyEvent {
    session_id: Uuid,
}

impl EventHandler for ReadyEvent {
    fn handler_name(&self) -> &str {
        "ReadyEvent"
    }

    fn execute(&self, ctx: &ClientContext, args: &EventArgs) -> Result<(), HandlerError> {
        let tag = args.str_arg(0)?;
        if !ctx.state().mark_ready(tag) {
            return Err(HandlerError::diagnostic(format!(
                "session {} is already ready, ignoring login as {tag}",
                self.session_id
            )));
        }
        ctx.logger().info(&format!("Logged in as {tag}"));

        // A lost presence update leaves the session usable.
        if let Err(e) = ctx
            .connection()
            .send(OutboundCommand::new("presence", json!({ "status": "online" })))
        {
            ctx.report(self.handler_name(), &HandlerError::Failure(e));
        }
        Ok(())
    }
}

impl HandlerClass for ReadyEvent {
    fn create(ctx: &Arc<ClientContext>) -> Self {
        Self {
            session_id: ctx.connection().session_id(),
        }
    }
}
