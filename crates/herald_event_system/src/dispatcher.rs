//! # Client Event Bus
//!
//! Publish/subscribe bus keyed by event name.
//!
//! Handlers are bound with [`Dispatcher::on`] while the dispatcher is still
//! exclusively owned during startup. Once wired it is shared behind an
//! [`Arc`](std::sync::Arc) and only [`Dispatcher::emit`] remains callable,
//! so bindings are read-only for the rest of the process.
//!
//! `emit` runs every handler bound to the name, synchronously and in
//! registration order. A failing handler does not stop delivery to the
//! handlers after it; failures are collected and handed back to the caller.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use crate::context::ClientContext;
use crate::error::{DispatchError, HandlerFailure};
use crate::events::{EventArgs, EventName};
use crate::handler::EventHandler;

/// Counters exposed for monitoring.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatcherStats {
    pub total_handlers: usize,
    pub events_emitted: u64,
    pub handler_failures: u64,
}

/// Event bus mapping each event name to its handlers in binding order.
///
/// Statistics use atomics so `emit` only needs `&self`.
#[derive(Default)]
pub struct Dispatcher {
    handlers: HashMap<EventName, Vec<Arc<dyn EventHandler>>>,
    total_handlers: usize,
    events_emitted: AtomicU64,
    handler_failures: AtomicU64,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("handlers", &"[handlers]")
            .field("events", &self.handlers.len())
            .field("total_handlers", &self.total_handlers)
            .finish()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `handler` to `name`. Bindings accumulate; nothing is replaced.
    pub fn on(&mut self, name: impl Into<EventName>, handler: Arc<dyn EventHandler>) {
        let name = name.into();
        info!("📝 Registered handler {} for '{}'", handler.handler_name(), name);
        self.handlers.entry(name).or_default().push(handler);
        self.total_handlers += 1;
    }

    /// Invokes every handler bound to `name` with `args`, in registration
    /// order. Returns how many handlers ran.
    pub fn emit(
        &self,
        name: &str,
        args: &EventArgs,
        ctx: &ClientContext,
    ) -> Result<usize, DispatchError> {
        self.events_emitted.fetch_add(1, Ordering::Relaxed);

        let Some(handlers) = self.handlers.get(name) else {
            debug!("No handlers for event '{}'", name);
            return Ok(0);
        };

        debug!("📤 Emitting '{}' to {} handlers", name, handlers.len());

        let mut failures = Vec::new();
        for handler in handlers {
            if let Err(error) = handler.execute(ctx, args) {
                debug!("Handler {} failed on '{}'", handler.handler_name(), name);
                failures.push(HandlerFailure {
                    handler: handler.handler_name().to_string(),
                    error,
                });
            }
        }

        if failures.is_empty() {
            Ok(handlers.len())
        } else {
            self.handler_failures
                .fetch_add(failures.len() as u64, Ordering::Relaxed);
            Err(DispatchError::HandlerFailures {
                event: EventName::new(name.to_string()),
                failures,
            })
        }
    }

    pub fn handler_count(&self, name: &str) -> usize {
        self.handlers.get(name).map(Vec::len).unwrap_or(0)
    }

    /// Names with at least one binding, sorted.
    pub fn event_names(&self) -> Vec<EventName> {
        let mut names: Vec<EventName> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn stats(&self) -> DispatcherStats {
        DispatcherStats {
            total_handlers: self.total_handlers,
            events_emitted: self.events_emitted.load(Ordering::Relaxed),
            handler_failures: self.handler_failures.load(Ordering::Relaxed),
        }
    }
}
