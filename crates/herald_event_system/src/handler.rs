//! Handler base contract and type-erased handler class references.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use crate::context::ClientContext;
use crate::error::HandlerError;
use crate::events::EventArgs;

/// Contract every event handler satisfies.
///
/// `execute` runs synchronously on the dispatcher's turn and must return
/// promptly. Long work is handed off with `tokio::spawn` and finishes on a
/// later turn.
pub trait EventHandler: Send + Sync {
    /// Name used in logs and failure reports.
    fn handler_name(&self) -> &str;

    fn execute(&self, ctx: &ClientContext, args: &EventArgs) -> Result<(), HandlerError>;
}

/// A handler type the loader can construct.
pub trait HandlerClass: EventHandler + Sized + 'static {
    fn create(ctx: &Arc<ClientContext>) -> Self;
}

/// Reference to a handler class, as supplied to the loader.
#[derive(Clone, Copy)]
pub struct HandlerClassRef {
    type_id: TypeId,
    type_name: &'static str,
    construct: fn(&Arc<ClientContext>) -> Arc<dyn EventHandler>,
}

impl HandlerClassRef {
    pub fn of<T: HandlerClass>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: short_type_name(std::any::type_name::<T>()),
            construct: construct_handler::<T>,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Unqualified type name, e.g. `WarnEvent`.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn instantiate(&self, ctx: &Arc<ClientContext>) -> Arc<dyn EventHandler> {
        (self.construct)(ctx)
    }
}

impl fmt::Debug for HandlerClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HandlerClassRef").field(&self.type_name).finish()
    }
}

impl PartialEq for HandlerClassRef {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for HandlerClassRef {}

fn construct_handler<T: HandlerClass>(ctx: &Arc<ClientContext>) -> Arc<dyn EventHandler> {
    Arc::new(T::create(ctx))
}

fn short_type_name(full: &'static str) -> &'static str {
    // Generic parameters keep their paths; only the outer path is stripped.
    let outer = full.split('<').next().unwrap_or(full);
    match outer.rfind("::") {
        Some(idx) => &full[idx + 2..],
        None => full,
    }
}
