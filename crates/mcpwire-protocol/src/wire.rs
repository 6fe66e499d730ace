//! Byte-level entry points.
//!
//! [`decode`] and [`decode_with`] run the target's validation on the parsed
//! value, so bytes off the wire obey the same rules as constructed values.
//! Tagged types ([`Content`](crate::Content), [`ErrorInfo`](crate::ErrorInfo))
//! and envelopes also have their own `decode` that keeps the typed
//! discriminator errors.

use mcpwire_core::{DecodeError, EncodeError, Validated, WireConfig, log_wire};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::jsonrpc::JsonRpcMessage;

/// Serializes `value` to JSON bytes.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, EncodeError> {
    let bytes = serde_json::to_vec(value)?;
    log_wire!("encoded {} bytes", bytes.len());
    Ok(bytes)
}

/// Parses and validates `bytes` with the default limits.
pub fn decode<T>(bytes: &[u8]) -> Result<T, DecodeError>
where
    T: DeserializeOwned + Validated,
{
    let value: T = serde_json::from_slice(bytes)?;
    value.validate().map_err(DecodeError::Invalid)?;
    Ok(value)
}

/// Like [`decode`], rejecting input above `config.max_message_size`.
pub fn decode_with<T>(config: &WireConfig, bytes: &[u8]) -> Result<T, DecodeError>
where
    T: DeserializeOwned + Validated,
{
    check_size(config, bytes)?;
    decode(bytes)
}

/// Parses one JSON-RPC frame, rejecting input above `config.max_message_size`.
pub fn decode_message(config: &WireConfig, bytes: &[u8]) -> Result<JsonRpcMessage, DecodeError> {
    check_size(config, bytes)?;
    Ok(serde_json::from_slice(bytes)?)
}

fn check_size(config: &WireConfig, bytes: &[u8]) -> Result<(), DecodeError> {
    if bytes.len() > config.max_message_size {
        log_wire!(
            "rejecting {} bytes (limit {})",
            bytes.len(),
            config.max_message_size
        );
        return Err(DecodeError::MessageTooLarge(bytes.len()));
    }
    log_wire!("decoding {} bytes", bytes.len());
    Ok(())
}
