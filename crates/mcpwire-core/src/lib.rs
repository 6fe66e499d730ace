//! Core building blocks for mcpwire.
//!
//! This crate provides:
//! - The error taxonomy ([`ConstructionError`], [`DecodeError`], [`EncodeError`])
//!   and the JSON-RPC error code reservations
//! - The validated construction contract ([`Validated`], [`build`])
//! - Logging targets on top of the `log` facade
//! - [`WireConfig`] for codec limits
//!
//! # Design Principles
//!
//! - No value is observable before it passes validation
//! - Every failure is a returned value, never a panic
//! - All types are `Send + Sync` with no shared mutable state

#![forbid(unsafe_code)]

pub mod config;
mod error;
pub mod logging;
mod validated;

pub use config::{ConfigError, WireConfig};
pub use error::{
    ConstructionError, DecodeError, EncodeError, ErrorCode, INTERNAL_ERROR, INVALID_PARAMS,
    INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR,
};
pub use validated::{Validated, build, check_non_empty, check_range};
