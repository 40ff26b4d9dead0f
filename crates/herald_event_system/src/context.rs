//! # Client Context
//!
//! Process-wide state shared by every handler: the leveled logger, the
//! handle to the live platform connection and the client's caches.
//!
//! The context is created once at startup, wrapped in an [`Arc`] and handed
//! to the loader. Handlers receive it at construction and again on every
//! execution; none of them owns it.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::HandlerError;
use crate::events::EventName;

// ============================================================================
// Logging
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Destination for client log lines.
pub trait LogSink: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);
}

/// Forwards client log lines to `tracing` under the `herald::client` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Error => tracing::error!(target: "herald::client", "{}", message),
            LogLevel::Warn => tracing::warn!(target: "herald::client", "{}", message),
            LogLevel::Info => tracing::info!(target: "herald::client", "{}", message),
            LogLevel::Debug => tracing::debug!(target: "herald::client", "{}", message),
            LogLevel::Trace => tracing::trace!(target: "herald::client", "{}", message),
        }
    }
}

/// Keeps every log line in memory.
///
/// Useful for embedding the client in tests or in tools that inspect what
/// handlers logged.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<(LogLevel, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Messages logged at exactly `level`, oldest first.
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message)
            .collect()
    }
}

impl LogSink for MemorySink {
    fn log(&self, level: LogLevel, message: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((level, message.to_string()));
        }
    }
}

/// Leveled logger handed to handlers through the context.
#[derive(Clone)]
pub struct ClientLogger {
    sink: Arc<dyn LogSink>,
}

impl fmt::Debug for ClientLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientLogger").field("sink", &"[sink]").finish()
    }
}

impl ClientLogger {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }

    /// Logger backed by [`TracingSink`].
    pub fn tracing() -> Self {
        Self::new(Arc::new(TracingSink))
    }

    pub fn log(&self, level: LogLevel, message: &str) {
        self.sink.log(level, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }
}

impl Default for ClientLogger {
    fn default() -> Self {
        Self::tracing()
    }
}

// ============================================================================
// Platform Connection
// ============================================================================

/// A command queued for the platform connection.
///
/// The payload is opaque to the dispatch core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundCommand {
    pub op: String,
    pub payload: serde_json::Value,
}

impl OutboundCommand {
    pub fn new(op: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            op: op.into(),
            payload,
        }
    }
}

/// Handle to the live platform connection.
///
/// Cloning the handle shares the same session and outbound queue.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    session_id: Uuid,
    connected: Arc<AtomicBool>,
    outbound: mpsc::UnboundedSender<OutboundCommand>,
}

impl ConnectionHandle {
    /// Creates a handle together with the receiving end of its outbound queue.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<OutboundCommand>) {
        let (outbound, rx) = mpsc::unbounded_channel();
        let handle = Self {
            session_id: Uuid::new_v4(),
            connected: Arc::new(AtomicBool::new(true)),
            outbound,
        };
        (handle, rx)
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire) && !self.outbound.is_closed()
    }

    pub fn close(&self) {
        self.connected.store(false, Ordering::Release);
    }

    /// Queues a command without waiting for it to be written.
    pub fn send(&self, command: OutboundCommand) -> anyhow::Result<()> {
        if !self.connected.load(Ordering::Acquire) {
            anyhow::bail!("connection {} is closed", self.session_id);
        }
        self.outbound
            .send(command)
            .map_err(|e| anyhow::anyhow!("connection {} dropped {}", self.session_id, e.0.op))
    }
}

// ============================================================================
// Shared State
// ============================================================================

/// Caches and counters mutated by handlers.
///
/// Every operation is a single short critical section, so no handler can
/// observe a half-applied update.
#[derive(Debug, Default)]
pub struct ClientState {
    ready: AtomicBool,
    user_tag: RwLock<Option<String>>,
    event_counts: DashMap<EventName, u64>,
    cache: DashMap<String, String>,
}

impl ClientState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Marks the session ready. Returns `false` if it already was.
    pub fn mark_ready(&self, user_tag: &str) -> bool {
        if self.ready.swap(true, Ordering::AcqRel) {
            return false;
        }
        if let Ok(mut tag) = self.user_tag.write() {
            *tag = Some(user_tag.to_string());
        }
        true
    }

    pub fn user_tag(&self) -> Option<String> {
        self.user_tag.read().ok().and_then(|tag| tag.clone())
    }

    pub fn record_event(&self, name: &EventName) -> u64 {
        let mut count = self.event_counts.entry(name.clone()).or_insert(0);
        *count += 1;
        *count
    }

    pub fn event_count(&self, name: &str) -> u64 {
        self.event_counts.get(name).map(|c| *c).unwrap_or(0)
    }

    pub fn cache_insert(&self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.cache.insert(key.into(), value.into())
    }

    pub fn cache_get(&self, key: &str) -> Option<String> {
        self.cache.get(key).map(|v| v.clone())
    }
}

// ============================================================================
// Context
// ============================================================================

/// Shared state every handler executes against.
#[derive(Debug)]
pub struct ClientContext {
    logger: ClientLogger,
    connection: ConnectionHandle,
    state: ClientState,
}

impl ClientContext {
    /// Builds the context for one session with empty state.
    pub fn new(logger: ClientLogger, connection: ConnectionHandle) -> Self {
        Self {
            logger,
            connection,
            state: ClientState::new(),
        }
    }

    pub fn logger(&self) -> &ClientLogger {
        &self.logger
    }

    pub fn connection(&self) -> &ConnectionHandle {
        &self.connection
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    /// Logs a handler error at `error` level.
    ///
    /// Diagnostic errors appear as their message only.
    pub fn report(&self, source: &str, error: &HandlerError) {
        self.logger.error(&format!("{source}: {}", error.render()));
    }
}
