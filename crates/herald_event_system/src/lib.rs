//! # Herald Event System
//!
//! Event registration and dispatch core for the Herald chat bot client.
//!
//! Independently written handler units declare the one runtime event they
//! respond to, a loader discovers and wires them into the client event bus,
//! and the bus invokes them with the shared client context whenever the
//! platform connection delivers that event.
//!
//! ## Pieces
//!
//! - [`EventHandler`] / [`HandlerClass`] - the handler contract
//! - [`EventMetadata`] and [`declare_handlers!`] - event names attached to
//!   handler classes at startup
//! - [`HandlerLoader`] - all-or-nothing wiring of classes into a dispatcher
//! - [`Dispatcher`] - the name-keyed publish/subscribe bus
//! - [`DiagnosticError`] / [`HandlerError`] - message-only versus traced
//!   failures
//! - [`ClientContext`] - logger, connection handle and caches shared by all
//!   handlers
//! - [`BotClient`] - startup plus the event pump
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use herald_event_system::{
//!     builtin_handlers, BotClient, ClientContext, ClientLogger, ConnectionHandle,
//!     EventMetadata, GatewayEvent,
//! };
//!
//! let (connection, _outbound) = ConnectionHandle::channel();
//! let ctx = Arc::new(ClientContext::new(ClientLogger::tracing(), connection));
//!
//! let mut metadata = EventMetadata::new();
//! let classes = builtin_handlers(&mut metadata);
//! let client = BotClient::start(ctx, classes, &metadata).expect("handlers are configured");
//!
//! client.dispatch(&GatewayEvent::new("warn", ["low memory"]));
//! ```

pub mod client;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod handler;
pub mod handlers;
pub mod loader;
pub mod registry;

pub use client::{BotClient, ChannelSource, Dispatched, EventSource, PumpSummary};
pub use context::{
    ClientContext, ClientLogger, ClientState, ConnectionHandle, LogLevel, LogSink, MemorySink,
    OutboundCommand, TracingSink,
};
pub use dispatcher::{Dispatcher, DispatcherStats};
pub use error::{DiagnosticError, DispatchError, ErrorKind, HandlerError, HandlerFailure, LoaderError};
pub use events::{EventArgs, EventName, GatewayEvent};
pub use handler::{EventHandler, HandlerClass, HandlerClassRef};
pub use handlers::{builtin_handlers, DebugEvent, ErrorEvent, ReadyEvent, WarnEvent};
pub use loader::{Binding, HandlerLoader, LoadReport};
pub use registry::EventMetadata;
