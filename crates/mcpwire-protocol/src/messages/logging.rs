//! Log forwarding between server and client.

use std::convert::Infallible;
use std::fmt;

use mcpwire_core::{ConstructionError, Validated, build, check_non_empty};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::envelope::impl_envelope;

/// Syslog-style severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingLevel {
    /// Detailed debugging information.
    Debug,
    /// General information.
    Info,
    /// Normal but significant events.
    Notice,
    /// Warning conditions.
    Warning,
    /// Error conditions.
    Error,
    /// Critical conditions.
    Critical,
    /// Action must be taken immediately.
    Alert,
    /// System is unusable.
    Emergency,
}

impl LoggingLevel {
    /// Wire name of the level.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LoggingLevel::Debug => "debug",
            LoggingLevel::Info => "info",
            LoggingLevel::Notice => "notice",
            LoggingLevel::Warning => "warning",
            LoggingLevel::Error => "error",
            LoggingLevel::Critical => "critical",
            LoggingLevel::Alert => "alert",
            LoggingLevel::Emergency => "emergency",
        }
    }
}

impl fmt::Display for LoggingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<LoggingLevel> for log::Level {
    fn from(level: LoggingLevel) -> Self {
        match level {
            LoggingLevel::Debug => log::Level::Debug,
            LoggingLevel::Info | LoggingLevel::Notice => log::Level::Info,
            LoggingLevel::Warning => log::Level::Warn,
            LoggingLevel::Error
            | LoggingLevel::Critical
            | LoggingLevel::Alert
            | LoggingLevel::Emergency => log::Level::Error,
        }
    }
}

impl From<log::Level> for LoggingLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Trace | log::Level::Debug => LoggingLevel::Debug,
            log::Level::Info => LoggingLevel::Info,
            log::Level::Warn => LoggingLevel::Warning,
            log::Level::Error => LoggingLevel::Error,
        }
    }
}

/// Parameters of [`SetLevelRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetLevelParams {
    level: LoggingLevel,
}

impl SetLevelParams {
    /// Minimum level the client wants to receive.
    #[must_use]
    pub fn level(&self) -> LoggingLevel {
        self.level
    }
}

/// `logging/setLevel`: sets the minimum forwarded level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetLevelRequest {
    params: SetLevelParams,
}

impl SetLevelRequest {
    /// Requests messages at `level` and above.
    #[must_use]
    pub fn new(level: LoggingLevel) -> Self {
        Self {
            params: SetLevelParams { level },
        }
    }
}

impl Validated for SetLevelRequest {
    type Step = Infallible;

    fn apply(&mut self, step: Infallible) -> Result<(), ConstructionError> {
        match step {}
    }
}

impl_envelope!(SetLevelRequest, SetLevelParams, "logging/setLevel");

/// Parameters of [`LoggingMessageNotification`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingMessageParams {
    level: LoggingLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    logger: Option<String>,
    #[serde(default)]
    data: Value,
}

impl LoggingMessageParams {
    /// Severity.
    #[must_use]
    pub fn level(&self) -> LoggingLevel {
        self.level
    }

    /// Name of the emitting logger.
    #[must_use]
    pub fn logger(&self) -> Option<&str> {
        self.logger.as_deref()
    }

    /// Opaque payload.
    #[must_use]
    pub fn data(&self) -> &Value {
        &self.data
    }
}

/// `notifications/message`: one forwarded log entry.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingMessageNotification {
    params: LoggingMessageParams,
}

/// Configuration steps for [`LoggingMessageNotification`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggingStep {
    /// Name of the emitting logger.
    Logger(String),
}

impl LoggingMessageNotification {
    /// `data` may be any JSON value except `null`.
    pub fn new(
        level: LoggingLevel,
        data: Value,
        steps: impl IntoIterator<Item = LoggingStep>,
    ) -> Result<Self, ConstructionError> {
        build(
            Self {
                params: LoggingMessageParams {
                    level,
                    logger: None,
                    data,
                },
            },
            steps,
        )
    }

    /// A `debug` entry.
    pub fn debug(
        data: Value,
        steps: impl IntoIterator<Item = LoggingStep>,
    ) -> Result<Self, ConstructionError> {
        Self::new(LoggingLevel::Debug, data, steps)
    }

    /// An `info` entry.
    pub fn info(
        data: Value,
        steps: impl IntoIterator<Item = LoggingStep>,
    ) -> Result<Self, ConstructionError> {
        Self::new(LoggingLevel::Info, data, steps)
    }

    /// A `warning` entry.
    pub fn warning(
        data: Value,
        steps: impl IntoIterator<Item = LoggingStep>,
    ) -> Result<Self, ConstructionError> {
        Self::new(LoggingLevel::Warning, data, steps)
    }

    /// An `error` entry.
    pub fn error(
        data: Value,
        steps: impl IntoIterator<Item = LoggingStep>,
    ) -> Result<Self, ConstructionError> {
        Self::new(LoggingLevel::Error, data, steps)
    }

    /// A `critical` entry.
    pub fn critical(
        data: Value,
        steps: impl IntoIterator<Item = LoggingStep>,
    ) -> Result<Self, ConstructionError> {
        Self::new(LoggingLevel::Critical, data, steps)
    }

    /// Whether a client that asked for `minimum` should receive this entry.
    #[must_use]
    pub fn passes(&self, minimum: LoggingLevel) -> bool {
        self.params.level >= minimum
    }
}

impl Validated for LoggingMessageNotification {
    type Step = LoggingStep;

    fn apply(&mut self, step: LoggingStep) -> Result<(), ConstructionError> {
        match step {
            LoggingStep::Logger(name) => {
                check_non_empty("logger", &name)?;
                self.params.logger = Some(name);
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        if self.params.data.is_null() {
            return Err(ConstructionError::new("data", "must not be null"));
        }
        if let Some(logger) = &self.params.logger {
            check_non_empty("logger", logger)?;
        }
        Ok(())
    }
}

impl_envelope!(
    LoggingMessageNotification,
    LoggingMessageParams,
    "notifications/message"
);
