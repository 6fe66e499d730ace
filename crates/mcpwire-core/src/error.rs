//! Error types shared by every mcpwire crate.
//!
//! Three failure families exist and each is all-or-nothing:
//!
//! - [`ConstructionError`]: a constructor argument or configuration step was
//!   rejected. No partially built value is ever returned alongside it.
//! - [`DecodeError`]: inbound bytes did not describe a known, well-formed value.
//! - [`EncodeError`]: a value could not be turned into wire bytes.

use std::fmt;

/// JSON-RPC 2.0 parse error.
pub const PARSE_ERROR: i32 = -32700;
/// JSON-RPC 2.0 invalid request.
pub const INVALID_REQUEST: i32 = -32600;
/// JSON-RPC 2.0 method not found.
pub const METHOD_NOT_FOUND: i32 = -32601;
/// JSON-RPC 2.0 invalid params.
pub const INVALID_PARAMS: i32 = -32602;
/// JSON-RPC 2.0 internal error.
pub const INTERNAL_ERROR: i32 = -32603;

/// The error codes reserved by JSON-RPC 2.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Invalid JSON was received.
    ParseError,
    /// The JSON sent is not a valid request object.
    InvalidRequest,
    /// The method does not exist or is not available.
    MethodNotFound,
    /// Invalid method parameters.
    InvalidParams,
    /// Internal error.
    InternalError,
}

impl ErrorCode {
    /// Returns the numeric wire value.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            ErrorCode::ParseError => PARSE_ERROR,
            ErrorCode::InvalidRequest => INVALID_REQUEST,
            ErrorCode::MethodNotFound => METHOD_NOT_FOUND,
            ErrorCode::InvalidParams => INVALID_PARAMS,
            ErrorCode::InternalError => INTERNAL_ERROR,
        }
    }

    /// Maps a numeric code back to a reserved code, if it is one.
    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            PARSE_ERROR => Some(ErrorCode::ParseError),
            INVALID_REQUEST => Some(ErrorCode::InvalidRequest),
            METHOD_NOT_FOUND => Some(ErrorCode::MethodNotFound),
            INVALID_PARAMS => Some(ErrorCode::InvalidParams),
            INTERNAL_ERROR => Some(ErrorCode::InternalError),
            _ => None,
        }
    }

    /// Standard message for the code.
    #[must_use]
    pub fn default_message(self) -> &'static str {
        match self {
            ErrorCode::ParseError => "Parse error",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::MethodNotFound => "Method not found",
            ErrorCode::InvalidParams => "Invalid parameters",
            ErrorCode::InternalError => "Internal error",
        }
    }
}

impl From<ErrorCode> for i32 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.default_message(), self.code())
    }
}

/// A constructor argument or configuration step failed its own check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructionError {
    field: String,
    reason: String,
}

impl ConstructionError {
    /// Creates an error for `field` with a free-form reason.
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// A required field was empty.
    pub fn empty(field: impl Into<String>) -> Self {
        Self::new(field, "must not be empty")
    }

    /// A numeric field fell outside its accepted range.
    pub fn out_of_range(field: impl Into<String>, value: impl fmt::Display, range: &str) -> Self {
        Self::new(field, format!("must be {range}, got {value}"))
    }

    /// Prefixes the field path with the enclosing field name.
    #[must_use]
    pub fn within(mut self, parent: &str) -> Self {
        self.field = if self.field.is_empty() {
            parent.to_owned()
        } else {
            format!("{parent}.{}", self.field)
        };
        self
    }

    /// Path of the offending field (e.g. `annotations.priority`).
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Why the field was rejected.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for ConstructionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: {}", self.field, self.reason)
    }
}

impl std::error::Error for ConstructionError {}

/// Failure while turning wire bytes into a typed value.
#[derive(Debug)]
pub enum DecodeError {
    /// The bytes were not valid JSON, or did not match a plain struct.
    Json(serde_json::Error),
    /// The discriminator field was absent or not a string.
    MissingDiscriminator {
        /// Name of the discriminator field.
        field: &'static str,
    },
    /// The discriminator named no known variant.
    UnknownDiscriminator {
        /// Name of the discriminator field.
        field: &'static str,
        /// The value that was found.
        value: String,
    },
    /// The discriminator was recognized but the remaining fields did not fit.
    MalformedVariant {
        /// The recognized discriminator value.
        discriminator: String,
        /// Underlying shape error.
        source: serde_json::Error,
    },
    /// The variant parsed but violated one of its construction rules.
    InvalidVariant {
        /// The recognized discriminator value.
        discriminator: String,
        /// The rule that failed.
        source: ConstructionError,
    },
    /// A plain (untagged) value parsed but violated a construction rule.
    Invalid(ConstructionError),
    /// The error code is known but its `errorType` is not.
    UnknownErrorType {
        /// Outer JSON-RPC error code.
        code: i32,
        /// The unrecognized secondary type.
        error_type: String,
    },
    /// An envelope carried a different `method` than the one expected.
    UnexpectedMethod {
        /// Method the target type carries.
        expected: &'static str,
        /// Method found on the wire.
        found: String,
    },
    /// Input exceeded the configured size limit.
    MessageTooLarge(usize),
}

impl DecodeError {
    /// Returns true for failures caused by an unrecognized discriminator.
    #[must_use]
    pub fn is_unknown_discriminator(&self) -> bool {
        matches!(
            self,
            DecodeError::UnknownDiscriminator { .. } | DecodeError::UnknownErrorType { .. }
        )
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Json(e) => write!(f, "JSON error: {e}"),
            DecodeError::MissingDiscriminator { field } => {
                write!(f, "missing discriminator field `{field}`")
            }
            DecodeError::UnknownDiscriminator { field, value } => {
                write!(f, "unknown type: {field} = {value:?}")
            }
            DecodeError::MalformedVariant {
                discriminator,
                source,
            } => write!(f, "malformed {discriminator:?} payload: {source}"),
            DecodeError::InvalidVariant {
                discriminator,
                source,
            } => write!(f, "invalid {discriminator:?} payload: {source}"),
            DecodeError::Invalid(source) => write!(f, "invalid payload: {source}"),
            DecodeError::UnknownErrorType { code, error_type } => {
                write!(f, "unknown error type: {error_type:?} for code {code}")
            }
            DecodeError::UnexpectedMethod { expected, found } => {
                write!(f, "unexpected method {found:?}, expected {expected:?}")
            }
            DecodeError::MessageTooLarge(size) => write!(f, "Message too large: {size} bytes"),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::Json(e) | DecodeError::MalformedVariant { source: e, .. } => Some(e),
            DecodeError::InvalidVariant { source, .. } | DecodeError::Invalid(source) => {
                Some(source)
            }
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError::Json(err)
    }
}

/// Failure while turning a value into wire bytes.
#[derive(Debug)]
pub enum EncodeError {
    /// Serialization itself failed.
    Json(serde_json::Error),
    /// A tagged value had no variant tag to emit.
    UnpopulatedVariant {
        /// Name of the discriminator field.
        field: &'static str,
    },
    /// The variant's own fields would overwrite its discriminator.
    DiscriminatorMismatch {
        /// Name of the discriminator field.
        field: &'static str,
        /// Tag the variant was supposed to carry.
        tag: String,
    },
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::Json(e) => write!(f, "JSON error: {e}"),
            EncodeError::UnpopulatedVariant { field } => {
                write!(f, "cannot encode payload without a `{field}` tag")
            }
            EncodeError::DiscriminatorMismatch { field, tag } => {
                write!(f, "payload fields redefine `{field}` for variant {tag:?}")
            }
        }
    }
}

impl std::error::Error for EncodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EncodeError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for EncodeError {
    fn from(err: serde_json::Error) -> Self {
        EncodeError::Json(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn error_code_roundtrip() {
        for code in [
            ErrorCode::ParseError,
            ErrorCode::InvalidRequest,
            ErrorCode::MethodNotFound,
            ErrorCode::InvalidParams,
            ErrorCode::InternalError,
        ] {
            assert_eq!(ErrorCode::from_code(code.code()), Some(code));
        }
        assert_eq!(ErrorCode::from_code(-1), None);
        assert_eq!(i32::from(ErrorCode::InvalidParams), -32602);
    }

    #[test]
    fn construction_error_paths() {
        let err = ConstructionError::out_of_range("priority", 1.5, "between 0 and 1")
            .within("annotations");
        assert_eq!(err.field(), "annotations.priority");
        assert_eq!(
            err.to_string(),
            "invalid annotations.priority: must be between 0 and 1, got 1.5"
        );
    }

    #[test]
    fn decode_error_display_names_discriminator() {
        let err = DecodeError::UnknownDiscriminator {
            field: "type",
            value: "video".to_string(),
        };
        assert!(err.to_string().contains("unknown type"));
        assert!(err.to_string().contains("video"));
        assert!(err.is_unknown_discriminator());

        let err = DecodeError::InvalidVariant {
            discriminator: "resource".to_string(),
            source: ConstructionError::empty("uri"),
        };
        assert!(err.to_string().contains("resource"));
        assert!(err.source().is_some());
    }

    #[test]
    fn decode_error_source() {
        let json_err = DecodeError::Json(serde_json::from_str::<()>("invalid").unwrap_err());
        let size_err = DecodeError::MessageTooLarge(1000);

        assert!(json_err.source().is_some());
        assert!(size_err.source().is_none());
        assert!(size_err.to_string().contains("1000"));
    }

    #[test]
    fn encode_error_display() {
        let err = EncodeError::DiscriminatorMismatch {
            field: "errorType",
            tag: "quota".to_string(),
        };
        assert!(err.to_string().contains("errorType"));
        assert!(err.source().is_none());
    }
}
