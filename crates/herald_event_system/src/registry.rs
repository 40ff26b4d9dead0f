//! Event-name metadata for handler classes.
//!
//! Every handler class declares the single event it responds to by an entry
//! in an [`EventMetadata`] table built at startup. Handlers themselves never
//! see the table, the loader or the dispatcher.
//!
//! ```rust,ignore
//! let mut metadata = EventMetadata::new();
//! let classes = declare_handlers!(metadata;
//!     DebugEvent => "debug",
//!     WarnEvent => "warn",
//! );
//! ```

use std::any::TypeId;
use std::collections::HashMap;

use tracing::debug;

use crate::events::EventName;
use crate::handler::{HandlerClass, HandlerClassRef};

/// Table mapping each handler class to its declared event name.
#[derive(Debug, Default, Clone)]
pub struct EventMetadata {
    names: HashMap<TypeId, EventName>,
}

impl EventMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches `name` to class `T`.
    ///
    /// A class maps to exactly one name: attaching again replaces the
    /// previous name, which is returned.
    pub fn attach<T: HandlerClass>(&mut self, name: impl Into<EventName>) -> Option<EventName> {
        let name = name.into();
        let previous = self.names.insert(TypeId::of::<T>(), name.clone());
        if let Some(prev) = &previous {
            debug!(
                "Event name for {} changed from '{}' to '{}'",
                std::any::type_name::<T>(),
                prev,
                name
            );
        }
        previous
    }

    /// Event name attached to a class reference, if any.
    pub fn event_for(&self, class: &HandlerClassRef) -> Option<&EventName> {
        self.names.get(&class.type_id())
    }

    pub fn event_of<T: HandlerClass>(&self) -> Option<&EventName> {
        self.names.get(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Attaches event names to handler classes and returns the classes in
/// declaration order, ready for the loader.
#[macro_export]
macro_rules! declare_handlers {
    ($metadata:expr; $($class:ty => $event:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut classes: ::std::vec::Vec<$crate::HandlerClassRef> = ::std::vec::Vec::new();
        $(
            $metadata.attach::<$class>($event);
            classes.push($crate::HandlerClassRef::of::<$class>());
        )*
        classes
    }};
}
