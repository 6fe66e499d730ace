//! MCP message vocabulary and the tagged payload codec.
//!
//! This crate provides:
//! - [`Content`] and [`ErrorData`], flat tagged JSON objects on the wire and
//!   closed enums in memory
//! - [`ErrorInfo`] with `(code, errorType)` dispatch through an
//!   [`ErrorDataRegistry`]
//! - [`schema::JsonSchema`] descriptors for tool inputs
//! - Request, result and notification types for every MCP method, each
//!   built through a validating constructor
//! - JSON-RPC 2.0 frame types
//!
//! # Wire Format
//!
//! A tagged payload carries its discriminator beside its own fields:
//!
//! ```json
//! {"type": "text", "text": "Hello, world!"}
//! {"errorType": "validation", "validation": [{"field": "uri", "error": "required"}]}
//! ```
//!
//! Method envelopes serialize as `{"method": ..., "params": {...}}`; wrap
//! them with [`Envelope::into_request`] or [`Envelope::into_notification`]
//! to get a JSON-RPC frame.
//!
//! # Example
//!
//! ```
//! use mcpwire_protocol::Content;
//!
//! let bytes = Content::text("Hello, world!").encode().unwrap();
//! assert_eq!(bytes, br#"{"type":"text","text":"Hello, world!"}"#);
//! assert_eq!(Content::decode(&bytes).unwrap().as_text(), Some("Hello, world!"));
//! ```

#![forbid(unsafe_code)]

mod codec;
mod content;
mod envelope;
mod error_data;
mod jsonrpc;
mod messages;
pub mod schema;
pub mod wire;

pub use content::{
    Annotations, AnnotationsStep, Content, ContentType, ImageContent, ResourceContent,
    ResourceContentStep, Role, TextContent,
};
pub use envelope::Envelope;
pub use error_data::{
    ErrorData, ErrorDataDecoder, ErrorDataRegistry, ErrorInfo, ErrorInfoStep, ExtensionDetails,
    TOOL_EXECUTION_ERROR_TYPE, ToolExecutionDetails, VALIDATION_ERROR_TYPE, ValidationDetails,
    ValidationFailure,
};
pub use jsonrpc::{JSONRPC_VERSION, JsonRpcMessage, JsonRpcRequest, JsonRpcResponse, RequestId};
pub use messages::*;
pub use schema::{JsonSchema, SchemaType, StringConstraint};

pub use mcpwire_core::{
    ConstructionError, DecodeError, EncodeError, ErrorCode, INTERNAL_ERROR, INVALID_PARAMS,
    INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR, Validated, WireConfig,
};
