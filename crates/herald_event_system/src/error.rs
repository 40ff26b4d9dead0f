//! # Error Types
//!
//! Failure values produced by handler execution, handler loading and event
//! dispatch.
//!
//! Handler failures come in two kinds. A [`DiagnosticError`] describes an
//! expected condition whose message already says everything: its trace is
//! the message itself and rendering it never prints stack frames. Every
//! other failure is wrapped in an [`anyhow::Error`] so the cause chain and
//! the captured backtrace stay available to the operator.

use std::fmt;

use crate::events::EventName;

/// A message-only failure.
///
/// Used for expected, self-describing conditions such as a missing event
/// argument. Both `Display` and `Debug` print only the message.
#[derive(Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct DiagnosticError {
    message: String,
}

impl DiagnosticError {
    /// Creates a diagnostic error. Never fails.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The diagnostic trace, which is the message text rather than a
    /// call-site trace.
    pub fn trace(&self) -> &str {
        &self.message
    }
}

impl fmt::Debug for DiagnosticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Which rendering rule applies to a [`HandlerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Message only, no trace.
    Diagnostic,
    /// Message, cause chain and backtrace.
    Failure,
}

/// Error returned from [`crate::EventHandler::execute`].
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("{0}")]
    Diagnostic(#[from] DiagnosticError),
    #[error(transparent)]
    Failure(#[from] anyhow::Error),
}

impl HandlerError {
    /// Shorthand for a [`DiagnosticError`] wrapped as a handler error.
    pub fn diagnostic(message: impl Into<String>) -> Self {
        Self::Diagnostic(DiagnosticError::new(message))
    }

    /// Shorthand for an ordinary failure carrying a backtrace.
    pub fn failure(message: impl fmt::Display + fmt::Debug + Send + Sync + 'static) -> Self {
        Self::Failure(anyhow::Error::msg(message))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Diagnostic(_) => ErrorKind::Diagnostic,
            Self::Failure(_) => ErrorKind::Failure,
        }
    }

    pub fn is_diagnostic(&self) -> bool {
        self.kind() == ErrorKind::Diagnostic
    }

    /// Renders the error for an operator log.
    ///
    /// Diagnostics render as their message alone. Failures render with
    /// their cause chain and, when `RUST_BACKTRACE` enables capture, the
    /// stack backtrace.
    pub fn render(&self) -> String {
        match self {
            Self::Diagnostic(diag) => diag.trace().to_string(),
            Self::Failure(err) => format!("{err:?}"),
        }
    }
}

/// Configuration errors detected while wiring handlers at startup.
///
/// Any of these aborts startup; the dispatcher is never left partially
/// wired.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("handler {handler} has no event name attached")]
    MissingEventName { handler: &'static str },
    #[error("handler {handler} was supplied more than once")]
    DuplicateHandler { handler: &'static str },
}

/// A single handler failure collected during an emit.
#[derive(Debug)]
pub struct HandlerFailure {
    pub handler: String,
    pub error: HandlerError,
}

/// Errors surfaced by [`crate::Dispatcher::emit`].
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("{} handler(s) failed for event '{event}'", failures.len())]
    HandlerFailures {
        event: EventName,
        failures: Vec<HandlerFailure>,
    },
}

impl DispatchError {
    pub fn failures(&self) -> &[HandlerFailure] {
        match self {
            Self::HandlerFailures { failures, .. } => failures,
        }
    }
}
