//! Method envelopes.
//!
//! Requests and notifications share one wire shape:
//!
//! ```json
//! {"method": "notifications/progress", "params": {"progressToken": "t", "progress": 5}}
//! ```
//!
//! Each envelope type fixes its `method` literal. Decoding rejects any other
//! method and re-runs the type's validation on the parsed params. Params are
//! held as raw JSON text until the method is checked, so byte input reaches
//! the params type unchanged.

use mcpwire_core::{DecodeError, EncodeError, Validated, log_codec};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::value::RawValue;
use serde_json::{Map, Value};

use crate::jsonrpc::{JsonRpcRequest, RequestId};

/// A request or notification with a fixed method name.
pub trait Envelope: Validated + Serialize {
    /// The `method` literal.
    const METHOD: &'static str;

    /// Parameter record.
    type Params: Serialize;

    /// The parameters.
    fn params(&self) -> &Self::Params;

    /// Decodes `{"method", "params"}`, checking the method and validating.
    fn from_value(value: Value) -> Result<Self, DecodeError>;

    /// Decodes wire bytes.
    fn decode(bytes: &[u8]) -> Result<Self, DecodeError>;

    /// Encodes to wire bytes.
    fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Wraps the envelope in a JSON-RPC request.
    fn into_request(self, id: impl Into<RequestId>) -> Result<JsonRpcRequest, EncodeError> {
        let params = serde_json::to_value(self.params())?;
        Ok(JsonRpcRequest::new(Self::METHOD, Some(params), id))
    }

    /// Wraps the envelope in a JSON-RPC notification.
    fn into_notification(self) -> Result<JsonRpcRequest, EncodeError> {
        let params = serde_json::to_value(self.params())?;
        Ok(JsonRpcRequest::notification(Self::METHOD, Some(params)))
    }

    /// Extracts the envelope from a JSON-RPC request.
    fn from_request(request: &JsonRpcRequest) -> Result<Self, DecodeError> {
        let mut object = Map::new();
        object.insert("method".to_owned(), Value::String(request.method.clone()));
        if let Some(params) = &request.params {
            object.insert("params".to_owned(), params.clone());
        }
        Self::from_value(Value::Object(object))
    }
}

#[derive(Serialize)]
struct WireEnvelope<'a, P> {
    method: &'a str,
    params: &'a P,
}

#[derive(Deserialize)]
pub(crate) struct RawEnvelope {
    method: String,
    #[serde(default)]
    params: Option<Box<RawValue>>,
}

pub(crate) fn serialize_envelope<S, P>(
    serializer: S,
    method: &str,
    params: &P,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    P: Serialize,
{
    WireEnvelope { method, params }.serialize(serializer)
}

pub(crate) fn envelope_from_value<E, P>(
    value: Value,
    method: &'static str,
    wrap: impl FnOnce(P) -> E,
) -> Result<E, DecodeError>
where
    E: Validated,
    P: DeserializeOwned,
{
    envelope_from_raw(serde_json::from_value(value)?, method, wrap)
}

pub(crate) fn envelope_from_slice<E, P>(
    bytes: &[u8],
    method: &'static str,
    wrap: impl FnOnce(P) -> E,
) -> Result<E, DecodeError>
where
    E: Validated,
    P: DeserializeOwned,
{
    envelope_from_raw(serde_json::from_slice(bytes)?, method, wrap)
}

/// Missing or `null` params are read as `{}`.
pub(crate) fn envelope_from_raw<E, P>(
    raw: RawEnvelope,
    method: &'static str,
    wrap: impl FnOnce(P) -> E,
) -> Result<E, DecodeError>
where
    E: Validated,
    P: DeserializeOwned,
{
    if raw.method != method {
        log_codec!("expected method {method:?}, found {:?}", raw.method);
        return Err(DecodeError::UnexpectedMethod {
            expected: method,
            found: raw.method,
        });
    }
    let text = raw.params.as_deref().map_or("{}", RawValue::get);
    let params: P =
        serde_json::from_str(text).map_err(|source| DecodeError::MalformedVariant {
            discriminator: method.to_owned(),
            source,
        })?;
    let envelope = wrap(params);
    envelope
        .validate()
        .map_err(|source| DecodeError::InvalidVariant {
            discriminator: method.to_owned(),
            source,
        })?;
    Ok(envelope)
}

/// Implements [`Envelope`], `Serialize` and `Deserialize` for a struct with
/// a single `params` field.
macro_rules! impl_envelope {
    ($ty:ident, $params:ty, $method:literal) => {
        impl $crate::envelope::Envelope for $ty {
            const METHOD: &'static str = $method;
            type Params = $params;

            fn params(&self) -> &$params {
                &self.params
            }

            fn from_value(value: serde_json::Value) -> Result<Self, mcpwire_core::DecodeError> {
                $crate::envelope::envelope_from_value(value, $method, |params| Self { params })
            }

            fn decode(bytes: &[u8]) -> Result<Self, mcpwire_core::DecodeError> {
                $crate::envelope::envelope_from_slice(bytes, $method, |params| Self { params })
            }
        }

        impl serde::Serialize for $ty {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                $crate::envelope::serialize_envelope(serializer, $method, &self.params)
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw =
                    <$crate::envelope::RawEnvelope as serde::Deserialize>::deserialize(deserializer)?;
                $crate::envelope::envelope_from_raw(raw, $method, |params| Self { params })
                    .map_err(serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use impl_envelope;
