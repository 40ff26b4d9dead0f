//! Built-in handler units.
//!
//! Each unit responds to one client event. [`builtin_handlers`] attaches
//! their event names and returns them in load order.

mod debug;
mod error;
mod ready;
mod warn;

pub use debug::DebugEvent;
pub use error::ErrorEvent;
pub use ready::ReadyEvent;
pub use warn::WarnEvent;

use crate::events::EventName;
use crate::handler::HandlerClassRef;
use crate::registry::EventMetadata;

/// Static discovery list of the built-in handlers.
pub fn builtin_handlers(metadata: &mut EventMetadata) -> Vec<HandlerClassRef> {
    crate::declare_handlers!(metadata;
        DebugEvent => EventName::DEBUG,
        WarnEvent => EventName::WARN,
        ErrorEvent => EventName::ERROR,
        ReadyEvent => EventName::READY,
    )
}
