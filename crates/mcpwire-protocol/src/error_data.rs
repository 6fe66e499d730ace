//! Structured error payloads.
//!
//! An [`ErrorInfo`] is the `error` member of a JSON-RPC response. Its
//! optional `data` is an [`ErrorData`], a flat object discriminated by
//! `errorType`. Which variant a payload decodes to depends on the pair
//! `(code, errorType)` and is looked up in an [`ErrorDataRegistry`].
//!
//! Built-in kinds:
//!
//! | code     | `errorType`     | variant                      |
//! |----------|-----------------|------------------------------|
//! | `-32602` | `validation`    | [`ErrorData::Validation`]    |
//! | `-32602` | absent          | [`ErrorData::Validation`]    |
//! | `-32603` | `toolExecution` | [`ErrorData::ToolExecution`] |
//!
//! Codes with no registered kinds decode with `data` set to `None`.

use std::collections::{BTreeMap, BTreeSet};
use std::convert::Infallible;
use std::fmt;
use std::sync::LazyLock;

use mcpwire_core::{
    ConstructionError, DecodeError, EncodeError, ErrorCode, INTERNAL_ERROR, INVALID_PARAMS,
    Validated, build, check_non_empty, log_codec,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::codec::{self, ERROR_TYPE_FIELD};

/// `errorType` of [`ErrorData::Validation`].
pub const VALIDATION_ERROR_TYPE: &str = "validation";

/// `errorType` of [`ErrorData::ToolExecution`].
pub const TOOL_EXECUTION_ERROR_TYPE: &str = "toolExecution";

/// One rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    /// Name or path of the field.
    pub field: String,
    /// What was wrong with it.
    pub error: String,
}

impl ValidationFailure {
    /// Creates a failure entry.
    pub fn new(field: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            error: error.into(),
        }
    }
}

impl From<&ConstructionError> for ValidationFailure {
    fn from(err: &ConstructionError) -> Self {
        Self::new(err.field(), err.reason())
    }
}

/// Payload of [`ErrorData::Validation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationDetails {
    validation: Vec<ValidationFailure>,
}

impl ValidationDetails {
    /// Wraps a list of failures; at least one is required.
    pub fn new(failures: Vec<ValidationFailure>) -> Result<Self, ConstructionError> {
        build(
            Self {
                validation: failures,
            },
            [],
        )
    }

    /// The individual failures.
    #[must_use]
    pub fn failures(&self) -> &[ValidationFailure] {
        &self.validation
    }
}

impl Validated for ValidationDetails {
    type Step = Infallible;

    fn apply(&mut self, step: Infallible) -> Result<(), ConstructionError> {
        match step {}
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        if self.validation.is_empty() {
            return Err(ConstructionError::empty(VALIDATION_ERROR_TYPE));
        }
        Ok(())
    }
}

/// Payload of [`ErrorData::ToolExecution`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolExecutionDetails {
    tool_name: String,
    error_kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    details: String,
}

impl ToolExecutionDetails {
    /// Describes a failed tool call.
    pub fn new(
        tool_name: impl Into<String>,
        error_kind: impl Into<String>,
        details: impl Into<String>,
    ) -> Result<Self, ConstructionError> {
        build(
            Self {
                tool_name: tool_name.into(),
                error_kind: error_kind.into(),
                details: details.into(),
            },
            [],
        )
    }

    /// Tool that failed.
    #[must_use]
    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    /// Short classification of the failure.
    #[must_use]
    pub fn error_kind(&self) -> &str {
        &self.error_kind
    }

    /// Human-readable description of the failure.
    #[must_use]
    pub fn details(&self) -> &str {
        &self.details
    }
}

impl Validated for ToolExecutionDetails {
    type Step = Infallible;

    fn apply(&mut self, step: Infallible) -> Result<(), ConstructionError> {
        match step {}
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        check_non_empty("toolName", &self.tool_name)?;
        check_non_empty("errorKind", &self.error_kind)
    }
}

/// An error kind registered outside this crate.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionDetails {
    error_type: String,
    fields: Map<String, Value>,
}

impl ExtensionDetails {
    /// Creates an extension payload tagged `error_type`.
    ///
    /// `fields` must not contain the `errorType` discriminator itself.
    pub fn new(
        error_type: impl Into<String>,
        fields: Map<String, Value>,
    ) -> Result<Self, ConstructionError> {
        let error_type = error_type.into();
        check_non_empty(ERROR_TYPE_FIELD, &error_type)?;
        if fields.contains_key(ERROR_TYPE_FIELD) {
            return Err(ConstructionError::new(
                ERROR_TYPE_FIELD,
                "must not appear among the extension fields",
            ));
        }
        Ok(Self { error_type, fields })
    }

    /// The `errorType` tag.
    #[must_use]
    pub fn error_type(&self) -> &str {
        &self.error_type
    }

    /// Fields other than the tag.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

/// Structured error detail; exactly one kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorData {
    /// Per-field input failures (`-32602`).
    Validation(ValidationDetails),
    /// A tool call failed while running (`-32603`).
    ToolExecution(ToolExecutionDetails),
    /// A kind added through [`ErrorDataRegistry::register`].
    Extension(ExtensionDetails),
}

impl ErrorData {
    /// Validation data from a list of failures.
    pub fn validation(failures: Vec<ValidationFailure>) -> Result<Self, ConstructionError> {
        ValidationDetails::new(failures).map(ErrorData::Validation)
    }

    /// The `errorType` this payload carries on the wire.
    #[must_use]
    pub fn error_type(&self) -> &str {
        match self {
            ErrorData::Validation(_) => VALIDATION_ERROR_TYPE,
            ErrorData::ToolExecution(_) => TOOL_EXECUTION_ERROR_TYPE,
            ErrorData::Extension(ext) => &ext.error_type,
        }
    }

    /// The error code a built-in kind belongs to.
    #[must_use]
    pub fn expected_code(&self) -> Option<i32> {
        match self {
            ErrorData::Validation(_) => Some(INVALID_PARAMS),
            ErrorData::ToolExecution(_) => Some(INTERNAL_ERROR),
            ErrorData::Extension(_) => None,
        }
    }

    /// Encodes to a flat JSON object tagged with `errorType`.
    pub fn to_value(&self) -> Result<Value, EncodeError> {
        let tag = self.error_type();
        let object = match self {
            ErrorData::Validation(body) => codec::tagged_object(ERROR_TYPE_FIELD, tag, body)?,
            ErrorData::ToolExecution(body) => codec::tagged_object(ERROR_TYPE_FIELD, tag, body)?,
            ErrorData::Extension(body) => {
                codec::tagged_object(ERROR_TYPE_FIELD, tag, &body.fields)?
            }
        };
        Ok(Value::Object(object))
    }

    /// Ready-made decoder for [`ErrorData::Validation`].
    pub fn decode_validation(tag: &str, object: Map<String, Value>) -> Result<Self, DecodeError> {
        codec::decode_variant(tag, object).map(ErrorData::Validation)
    }

    /// Ready-made decoder for [`ErrorData::ToolExecution`].
    pub fn decode_tool_execution(
        tag: &str,
        object: Map<String, Value>,
    ) -> Result<Self, DecodeError> {
        codec::decode_variant(tag, object).map(ErrorData::ToolExecution)
    }

    /// Ready-made decoder that keeps the fields as an [`ErrorData::Extension`].
    pub fn decode_extension(
        tag: &str,
        mut object: Map<String, Value>,
    ) -> Result<Self, DecodeError> {
        object.remove(ERROR_TYPE_FIELD);
        ExtensionDetails::new(tag, object)
            .map(ErrorData::Extension)
            .map_err(|source| DecodeError::InvalidVariant {
                discriminator: tag.to_owned(),
                source,
            })
    }
}

impl Validated for ErrorData {
    type Step = Infallible;

    fn apply(&mut self, step: Infallible) -> Result<(), ConstructionError> {
        match step {}
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        match self {
            ErrorData::Validation(details) => details.validate(),
            ErrorData::ToolExecution(details) => details.validate(),
            ErrorData::Extension(_) => Ok(()),
        }
    }
}

impl Serialize for ErrorData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let tag = self.error_type();
        match self {
            ErrorData::Validation(body) => {
                codec::encode_tagged(serializer, ERROR_TYPE_FIELD, tag, body)
            }
            ErrorData::ToolExecution(body) => {
                codec::encode_tagged(serializer, ERROR_TYPE_FIELD, tag, body)
            }
            ErrorData::Extension(body) => {
                codec::encode_tagged(serializer, ERROR_TYPE_FIELD, tag, &body.fields)
            }
        }
    }
}

/// Decodes the `data` object of one error kind.
///
/// Receives the `errorType` the payload was dispatched on and the full
/// object, discriminator included.
pub type ErrorDataDecoder = fn(&str, Map<String, Value>) -> Result<ErrorData, DecodeError>;

static BUILTIN: LazyLock<ErrorDataRegistry> = LazyLock::new(ErrorDataRegistry::new);

/// Dispatch table from `(code, errorType)` to a decoder.
///
/// A registry is an ordinary value: clone the built-in one, register more
/// kinds, and pass it to [`ErrorInfo::decode_with`].
///
/// ```
/// use mcpwire_protocol::{ErrorData, ErrorDataRegistry, ErrorInfo};
///
/// let registry = ErrorDataRegistry::new().register(-32001, "quota", ErrorData::decode_extension);
/// let info = ErrorInfo::decode_with(
///     br#"{"code":-32001,"message":"slow down","data":{"errorType":"quota","limit":10}}"#,
///     &registry,
/// )
/// .unwrap();
/// assert_eq!(info.data().map(ErrorData::error_type), Some("quota"));
/// ```
#[derive(Clone)]
pub struct ErrorDataRegistry {
    routes: BTreeMap<(i32, String), ErrorDataDecoder>,
    defaults: BTreeMap<i32, String>,
}

impl fmt::Debug for ErrorDataRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorDataRegistry")
            .field("routes", &self.routes.keys().collect::<Vec<_>>())
            .field("defaults", &self.defaults)
            .finish()
    }
}

impl Default for ErrorDataRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorDataRegistry {
    /// A registry holding the built-in kinds.
    #[must_use]
    pub fn new() -> Self {
        let empty = Self {
            routes: BTreeMap::new(),
            defaults: BTreeMap::new(),
        };
        empty
            .register(
                INVALID_PARAMS,
                VALIDATION_ERROR_TYPE,
                ErrorData::decode_validation,
            )
            .with_default(INVALID_PARAMS, VALIDATION_ERROR_TYPE)
            .register(
                INTERNAL_ERROR,
                TOOL_EXECUTION_ERROR_TYPE,
                ErrorData::decode_tool_execution,
            )
    }

    /// The shared built-in table.
    #[must_use]
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    /// Routes `(code, error_type)` to `decoder`, replacing any previous route.
    #[must_use]
    pub fn register(
        mut self,
        code: i32,
        error_type: impl Into<String>,
        decoder: ErrorDataDecoder,
    ) -> Self {
        self.routes.insert((code, error_type.into()), decoder);
        self
    }

    /// Decodes `data` with no `errorType` under `code` as `error_type`.
    ///
    /// Has no effect unless `(code, error_type)` is registered.
    #[must_use]
    pub fn with_default(mut self, code: i32, error_type: impl Into<String>) -> Self {
        let error_type = error_type.into();
        if self.routes.contains_key(&(code, error_type.clone())) {
            self.defaults.insert(code, error_type);
        }
        self
    }

    /// Whether any kind is registered for `code`.
    #[must_use]
    pub fn knows_code(&self, code: i32) -> bool {
        self.routes.keys().any(|(c, _)| *c == code)
    }

    /// `errorType` values registered for `code`.
    #[must_use]
    pub fn error_types(&self, code: i32) -> BTreeSet<&str> {
        self.routes
            .keys()
            .filter(|(c, _)| *c == code)
            .map(|(_, t)| t.as_str())
            .collect()
    }

    /// Decodes the `data` member of an error with `code`.
    pub fn decode(&self, code: i32, data: Value) -> Result<Option<ErrorData>, DecodeError> {
        if !self.knows_code(code) {
            log_codec!("no error kinds registered for code {code}; discarding data");
            return Ok(None);
        }

        let (tag, object) = codec::split_tag(data, ERROR_TYPE_FIELD)?;
        let tag = match tag {
            Some(tag) => tag,
            None => match self.defaults.get(&code) {
                Some(default) => default.clone(),
                None => {
                    log_codec!("code {code} has several kinds and no errorType; discarding data");
                    return Ok(None);
                }
            },
        };

        let Some(decoder) = self.routes.get(&(code, tag.clone())) else {
            log_codec!("unknown errorType {tag:?} for code {code}");
            return Err(DecodeError::UnknownErrorType {
                code,
                error_type: tag,
            });
        };
        decoder(&tag, object).map(Some)
    }
}

/// The `error` member of a JSON-RPC response.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorInfo {
    code: i32,
    message: String,
    data: Option<ErrorData>,
}

/// Configuration steps for [`ErrorInfo`].
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorInfoStep {
    /// Attaches structured data.
    Data(ErrorData),
}

impl ErrorInfo {
    /// Builds an error; built-in data kinds must match `code`.
    pub fn new(
        code: i32,
        message: impl Into<String>,
        steps: impl IntoIterator<Item = ErrorInfoStep>,
    ) -> Result<Self, ConstructionError> {
        let message = message.into();
        check_non_empty("message", &message)?;
        build(
            Self {
                code,
                message,
                data: None,
            },
            steps,
        )
    }

    /// A reserved JSON-RPC error with its standard message and no data.
    #[must_use]
    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            code: code.code(),
            message: code.default_message().to_owned(),
            data: None,
        }
    }

    /// `-32700`.
    #[must_use]
    pub fn parse_error() -> Self {
        Self::from_code(ErrorCode::ParseError)
    }

    /// `-32600`.
    #[must_use]
    pub fn invalid_request() -> Self {
        Self::from_code(ErrorCode::InvalidRequest)
    }

    /// `-32601`, naming the method.
    pub fn method_not_found(method: impl fmt::Display) -> Self {
        Self {
            code: ErrorCode::MethodNotFound.code(),
            message: format!("Method not found: {method}"),
            data: None,
        }
    }

    /// `-32602` with a plain message.
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self {
            code: INVALID_PARAMS,
            message: message.into(),
            data: None,
        }
    }

    /// `-32603` with a plain message.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self {
            code: INTERNAL_ERROR,
            message: message.into(),
            data: None,
        }
    }

    /// `-32602` carrying per-field failures.
    pub fn validation(failures: Vec<ValidationFailure>) -> Result<Self, ConstructionError> {
        Ok(Self {
            code: INVALID_PARAMS,
            message: ErrorCode::InvalidParams.default_message().to_owned(),
            data: Some(ErrorData::validation(failures)?),
        })
    }

    /// `-32603` describing a failed tool call.
    pub fn tool_execution(
        tool_name: impl Into<String>,
        error_kind: impl Into<String>,
        details: impl Into<String>,
    ) -> Result<Self, ConstructionError> {
        let details = ToolExecutionDetails::new(tool_name, error_kind, details)?;
        Ok(Self {
            code: INTERNAL_ERROR,
            message: "Tool execution failed".to_owned(),
            data: Some(ErrorData::ToolExecution(details)),
        })
    }

    /// Numeric code.
    #[must_use]
    pub fn code(&self) -> i32 {
        self.code
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Structured data, if any.
    #[must_use]
    pub fn data(&self) -> Option<&ErrorData> {
        self.data.as_ref()
    }

    /// Encodes to a JSON value, reporting typed payload errors.
    pub fn to_value(&self) -> Result<Value, EncodeError> {
        let mut object = Map::new();
        object.insert("code".to_owned(), Value::from(self.code));
        object.insert("message".to_owned(), Value::String(self.message.clone()));
        if let Some(data) = &self.data {
            object.insert("data".to_owned(), data.to_value()?);
        }
        Ok(Value::Object(object))
    }

    /// Encodes to wire bytes, with `errorType` leading the `data` object.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        if let Some(data) = &self.data {
            data.to_value()?;
        }
        Ok(serde_json::to_vec(self)?)
    }

    /// Decodes a JSON value with the built-in kinds.
    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        Self::from_value_with(value, ErrorDataRegistry::builtin())
    }

    /// Decodes a JSON value with an explicit registry.
    pub fn from_value_with(value: Value, registry: &ErrorDataRegistry) -> Result<Self, DecodeError> {
        let raw: RawErrorInfo = serde_json::from_value(value)?;
        let data = match raw.data {
            Some(data) => registry.decode(raw.code, data)?,
            None => None,
        };
        let info = Self {
            code: raw.code,
            message: raw.message,
            data,
        };
        info.validate().map_err(DecodeError::Invalid)?;
        Ok(info)
    }

    /// Decodes wire bytes with the built-in kinds.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        Self::decode_with(bytes, ErrorDataRegistry::builtin())
    }

    /// Decodes wire bytes with an explicit registry.
    pub fn decode_with(bytes: &[u8], registry: &ErrorDataRegistry) -> Result<Self, DecodeError> {
        Self::from_value_with(serde_json::from_slice(bytes)?, registry)
    }
}

impl Validated for ErrorInfo {
    type Step = ErrorInfoStep;

    fn apply(&mut self, step: ErrorInfoStep) -> Result<(), ConstructionError> {
        match step {
            ErrorInfoStep::Data(data) => self.data = Some(data),
        }
        Ok(())
    }

    /// Checks the data against the code. An empty `message` from a peer
    /// is accepted; [`ErrorInfo::new`] rejects one.
    fn validate(&self) -> Result<(), ConstructionError> {
        if let Some(data) = &self.data {
            if let Some(expected) = data.expected_code() {
                if expected != self.code {
                    return Err(ConstructionError::new(
                        "data",
                        format!(
                            "{:?} data requires code {expected}, got {}",
                            data.error_type(),
                            self.code
                        ),
                    ));
                }
            }
            data.validate().map_err(|e| e.within("data"))?;
        }
        Ok(())
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ErrorInfo {}

impl From<ErrorCode> for ErrorInfo {
    fn from(code: ErrorCode) -> Self {
        Self::from_code(code)
    }
}

#[derive(Deserialize)]
struct RawErrorInfo {
    code: i32,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

impl Serialize for ErrorInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let len = if self.data.is_some() { 3 } else { 2 };
        let mut state = serializer.serialize_struct("ErrorInfo", len)?;
        state.serialize_field("code", &self.code)?;
        state.serialize_field("message", &self.message)?;
        if let Some(data) = &self.data {
            state.serialize_field("data", data)?;
        }
        state.end()
    }
}

impl<'de> Deserialize<'de> for ErrorInfo {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        ErrorInfo::from_value(value).map_err(serde::de::Error::custom)
    }
}
