//! Structured logging for mcpwire.
//!
//! Built on the standard [`log`] facade. The library never installs a logger;
//! applications pick their own backend (`env_logger`, `simple_logger`, ...).
//!
//! # Log Levels
//!
//! - **warn**: ignored configuration values
//! - **debug**: rejected constructions, decode dispatch decisions, discarded data
//! - **trace**: encoded/decoded sizes and tags
//!
//! # Log Targets
//!
//! - `mcpwire`: root target
//! - `mcpwire::codec`: tagged payload encoding and decoding
//! - `mcpwire::build`: validated construction
//! - `mcpwire::wire`: byte-level encode/decode entry points
//! - `mcpwire::config`: configuration loading
//!
//! Example filter: `RUST_LOG=mcpwire::codec=trace,mcpwire::build=debug`

pub use log::{debug, error, info, trace, warn};

pub use log::{Level, LevelFilter};

/// Log targets used by mcpwire components.
pub mod targets {
    /// Root target for all mcpwire logs.
    pub const MCPWIRE: &str = "mcpwire";

    /// Tagged payload codec.
    pub const CODEC: &str = "mcpwire::codec";

    /// Validated construction.
    pub const BUILD: &str = "mcpwire::build";

    /// Byte-level wire entry points.
    pub const WIRE: &str = "mcpwire::wire";

    /// Configuration loading.
    pub const CONFIG: &str = "mcpwire::config";
}

/// Returns whether logging is enabled at the given level for the given target.
#[inline]
#[must_use]
pub fn is_enabled(level: Level, target: &str) -> bool {
    log::log_enabled!(target: target, level)
}

/// Logs a codec event at DEBUG level.
#[macro_export]
macro_rules! log_codec {
    ($($arg:tt)*) => {
        log::debug!(target: "mcpwire::codec", $($arg)*)
    };
}

/// Logs a wire-level event at TRACE level.
#[macro_export]
macro_rules! log_wire {
    ($($arg:tt)*) => {
        log::trace!(target: "mcpwire::wire", $($arg)*)
    };
}
