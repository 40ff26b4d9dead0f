//! # Handler Loader
//!
//! Wires handler classes into a [`Dispatcher`] at startup.
//!
//! Loading is all-or-nothing and runs in three phases:
//!
//! 1. **Validation** - every class must carry an event name and appear only
//!    once. The first violation aborts loading before anything is bound.
//! 2. **Instantiation** - each class is constructed exactly once with the
//!    shared [`ClientContext`], in discovery order.
//! 3. **Registration** - each instance is bound under its event name, again
//!    in discovery order, which is also the invocation order for handlers
//!    sharing a name.
//!
//! Event names are not required to be unique across classes.

use std::any::TypeId;
use std::collections::HashSet;
use std::sync::Arc;

use tracing::{error, info};

use crate::context::ClientContext;
use crate::dispatcher::Dispatcher;
use crate::error::LoaderError;
use crate::events::EventName;
use crate::handler::{EventHandler, HandlerClassRef};
use crate::registry::EventMetadata;

/// One binding created by the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub event: EventName,
    pub handler: String,
}

/// Result of a successful load, in registration order.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub bindings: Vec<Binding>,
}

impl LoadReport {
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Wires handler classes into a dispatcher using one shared context.
pub struct HandlerLoader {
    ctx: Arc<ClientContext>,
}

impl HandlerLoader {
    /// Creates a loader that hands `ctx` to every handler it constructs.
    pub fn new(ctx: Arc<ClientContext>) -> Self {
        Self { ctx }
    }

    /// Validates, instantiates and binds `classes` on `dispatcher`.
    ///
    /// # Arguments
    ///
    /// * `classes` - Handler classes in discovery order
    /// * `metadata` - Event names attached to those classes
    /// * `dispatcher` - Bus that receives the bindings
    ///
    /// # Returns
    ///
    /// The bindings in registration order, or the first configuration
    /// error. On error `dispatcher` is left exactly as it was.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use herald_event_system::{
    ///     builtin_handlers, ClientContext, ClientLogger, ConnectionHandle, Dispatcher,
    ///     EventMetadata, HandlerLoader,
    /// };
    ///
    /// let (connection, _outbound) = ConnectionHandle::channel();
    /// let ctx = Arc::new(ClientContext::new(ClientLogger::default(), connection));
    ///
    /// let mut metadata = EventMetadata::new();
    /// let classes = builtin_handlers(&mut metadata);
    /// let mut dispatcher = Dispatcher::new();
    ///
    /// let report = HandlerLoader::new(ctx)
    ///     .load(classes, &metadata, &mut dispatcher)
    ///     .unwrap();
    /// assert_eq!(report.len(), 4);
    /// assert_eq!(dispatcher.handler_count("warn"), 1);
    /// ```
    pub fn load<I>(
        &self,
        classes: I,
        metadata: &EventMetadata,
        dispatcher: &mut Dispatcher,
    ) -> Result<LoadReport, LoaderError>
    where
        I: IntoIterator<Item = HandlerClassRef>,
    {
        let classes: Vec<HandlerClassRef> = classes.into_iter().collect();
        info!("Loading {} handler classes", classes.len());

        // Phase 1: validate everything before touching the dispatcher
        let mut seen: HashSet<TypeId> = HashSet::with_capacity(classes.len());
        let mut planned: Vec<(EventName, HandlerClassRef)> = Vec::with_capacity(classes.len());
        for class in classes {
            if !seen.insert(class.type_id()) {
                error!("Handler {} supplied more than once", class.type_name());
                return Err(LoaderError::DuplicateHandler {
                    handler: class.type_name(),
                });
            }
            let Some(event) = metadata.event_for(&class) else {
                error!("Handler {} has no event name attached", class.type_name());
                return Err(LoaderError::MissingEventName {
                    handler: class.type_name(),
                });
            };
            planned.push((event.clone(), class));
        }

        // Phase 2: one instance per class
        let instances: Vec<(EventName, Arc<dyn EventHandler>)> = planned
            .into_iter()
            .map(|(event, class)| (event, class.instantiate(&self.ctx)))
            .collect();

        // Phase 3: bind in discovery order
        let mut report = LoadReport::default();
        for (event, handler) in instances {
            report.bindings.push(Binding {
                event: event.clone(),
                handler: handler.handler_name().to_string(),
            });
            dispatcher.on(event, handler);
        }

        info!("Loaded {} handlers", report.len());
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ClientLogger, ConnectionHandle};
    use crate::error::HandlerError;
    use crate::events::EventArgs;
    use crate::handler::HandlerClass;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static CREATED: AtomicUsize = AtomicUsize::new(0);

    struct Counted;

    impl EventHandler for Counted {
        fn handler_name(&self) -> &str {
            "Counted"
        }
        fn execute(&self, _ctx: &ClientContext, _args: &EventArgs) -> Result<(), HandlerError> {
            Ok(())
        }
    }

    impl HandlerClass for Counted {
        fn create(_ctx: &Arc<ClientContext>) -> Self {
            CREATED.fetch_add(1, Ordering::SeqCst);
            Counted
        }
    }

    struct Unnamed;

    impl EventHandler for Unnamed {
        fn handler_name(&self) -> &str {
            "Unnamed"
        }
        fn execute(&self, _ctx: &ClientContext, _args: &EventArgs) -> Result<(), HandlerError> {
            Ok(())
        }
    }

    impl HandlerClass for Unnamed {
        fn create(_ctx: &Arc<ClientContext>) -> Self {
            Unnamed
        }
    }

    fn loader() -> HandlerLoader {
        let (connection, _rx) = ConnectionHandle::channel();
        HandlerLoader::new(Arc::new(ClientContext::new(ClientLogger::default(), connection)))
    }

    #[test]
    fn test_load_instantiates_once_and_binds() {
        let mut metadata = EventMetadata::new();
        metadata.attach::<Counted>("tick");
        let mut dispatcher = Dispatcher::new();

        let before = CREATED.load(Ordering::SeqCst);
        let report = loader()
            .load([HandlerClassRef::of::<Counted>()], &metadata, &mut dispatcher)
            .unwrap();

        assert_eq!(CREATED.load(Ordering::SeqCst) - before, 1);
        assert_eq!(
            report.bindings,
            vec![Binding {
                event: EventName::from("tick"),
                handler: "Counted".to_string()
            }]
        );
        assert_eq!(dispatcher.handler_count("tick"), 1);
    }

    #[test]
    fn test_missing_metadata_registers_nothing() {
        let mut metadata = EventMetadata::new();
        metadata.attach::<Counted>("tick");
        let mut dispatcher = Dispatcher::new();

        let err = loader()
            .load(
                [HandlerClassRef::of::<Counted>(), HandlerClassRef::of::<Unnamed>()],
                &metadata,
                &mut dispatcher,
            )
            .unwrap_err();

        assert!(matches!(err, LoaderError::MissingEventName { handler: "Unnamed" }));
        assert_eq!(dispatcher.stats().total_handlers, 0);
        assert!(dispatcher.event_names().is_empty());
    }

    #[test]
    fn test_duplicate_class_rejected() {
        let mut metadata = EventMetadata::new();
        metadata.attach::<Counted>("tick");
        let mut dispatcher = Dispatcher::new();

        let err = loader()
            .load(
                [HandlerClassRef::of::<Counted>(), HandlerClassRef::of::<Counted>()],
                &metadata,
                &mut dispatcher,
            )
            .unwrap_err();

        assert!(matches!(err, LoaderError::DuplicateHandler { handler: "Counted" }));
        assert_eq!(dispatcher.stats().total_handlers, 0);
    }
}
