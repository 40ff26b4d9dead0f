//! Event names, positional event arguments and gateway events.

use std::borrow::{Borrow, Cow};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DiagnosticError;

/// Name of a runtime event such as `"debug"` or `"warn"`.
///
/// The vocabulary is open: the constants cover the events the client itself
/// reacts to, and any platform-defined name can be built with
/// [`EventName::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventName(Cow<'static, str>);

impl EventName {
    /// Internal client diagnostics, one string argument.
    pub const DEBUG: EventName = EventName(Cow::Borrowed("debug"));
    /// Client warnings, one string argument.
    pub const WARN: EventName = EventName(Cow::Borrowed("warn"));
    /// Connection level errors, one string argument.
    pub const ERROR: EventName = EventName(Cow::Borrowed("error"));
    /// Session established, one string argument (the bot user tag).
    pub const READY: EventName = EventName(Cow::Borrowed("ready"));

    /// Builds a name for any platform-defined event.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for EventName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for EventName {
    fn from(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }
}

impl From<String> for EventName {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

/// Positional arguments passed along with an emitted event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventArgs(Vec<Value>);

impl EventArgs {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends an argument, builder style.
    pub fn with(mut self, arg: impl Into<Value>) -> Self {
        self.0.push(arg.into());
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.0.iter()
    }

    /// Reads argument `index` as a string.
    ///
    /// A missing or non-string argument is an expected, self-describing
    /// condition and is reported as a [`DiagnosticError`].
    pub fn str_arg(&self, index: usize) -> Result<&str, DiagnosticError> {
        match self.0.get(index) {
            Some(Value::String(s)) => Ok(s.as_str()),
            Some(other) => Err(DiagnosticError::new(format!(
                "argument {index} should be a string, got {other}"
            ))),
            None => Err(DiagnosticError::new(format!(
                "argument {index} is missing ({} supplied)",
                self.0.len()
            ))),
        }
    }
}

impl From<Vec<Value>> for EventArgs {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for EventArgs {
    fn from(values: [T; N]) -> Self {
        Self(values.into_iter().map(Into::into).collect())
    }
}

/// One named event as delivered by the platform connection.
///
/// Serialized as `{"event": "warn", "args": ["low memory"]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayEvent {
    #[serde(rename = "event")]
    pub name: EventName,
    #[serde(default)]
    pub args: EventArgs,
}

impl GatewayEvent {
    pub fn new(name: impl Into<EventName>, args: impl Into<EventArgs>) -> Self {
        Self {
            name: name.into(),
            args: args.into(),
        }
    }
}
