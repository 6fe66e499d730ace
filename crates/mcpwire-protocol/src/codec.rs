//! Flat tagged-object codec.
//!
//! A tagged payload travels as a single JSON object whose discriminator
//! field sits next to the variant's own fields:
//!
//! ```json
//! {"type": "text", "text": "hello"}
//! ```
//!
//! Encoding emits the discriminator first, followed by the body fields in a
//! stable order. Decoding runs in two phases: [`split_tag`] reads only the
//! discriminator, then [`decode_variant`] re-parses the whole object into
//! the selected variant and validates it.

use mcpwire_core::{DecodeError, EncodeError, Validated, log_codec};
use serde::de::DeserializeOwned;
use serde::ser::{Error as _, SerializeMap};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Discriminator of [`Content`](crate::Content).
pub(crate) const TYPE_FIELD: &str = "type";

/// Discriminator of [`ErrorData`](crate::ErrorData).
pub(crate) const ERROR_TYPE_FIELD: &str = "errorType";

/// Builds `{ field: tag, ...body }` as an object map.
///
/// Fails if the tag is empty, if the body is not an object, or if the body
/// already has a member named `field`.
pub(crate) fn tagged_object<T>(
    field: &'static str,
    tag: &str,
    body: &T,
) -> Result<Map<String, Value>, EncodeError>
where
    T: Serialize + ?Sized,
{
    if tag.is_empty() {
        return Err(EncodeError::UnpopulatedVariant { field });
    }
    let Value::Object(fields) = serde_json::to_value(body)? else {
        return Err(EncodeError::Json(serde_json::Error::custom(format!(
            "{tag:?} payload body must be a JSON object"
        ))));
    };
    if fields.contains_key(field) {
        return Err(EncodeError::DiscriminatorMismatch {
            field,
            tag: tag.to_owned(),
        });
    }

    let mut object = Map::with_capacity(fields.len() + 1);
    object.insert(field.to_owned(), Value::String(tag.to_owned()));
    object.extend(fields);
    Ok(object)
}

/// Serializes `{ field: tag, ...body }` with the discriminator first.
pub(crate) fn encode_tagged<S, T>(
    serializer: S,
    field: &'static str,
    tag: &str,
    body: &T,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize + ?Sized,
{
    let mut object = tagged_object(field, tag, body).map_err(S::Error::custom)?;
    // The map may reorder keys; emit the tag explicitly before the rest.
    object.remove(field);
    let mut map = serializer.serialize_map(Some(object.len() + 1))?;
    map.serialize_entry(field, tag)?;
    for (key, value) in &object {
        map.serialize_entry(key, value)?;
    }
    map.end()
}

/// Phase one of decoding: reads the discriminator and nothing else.
///
/// Returns `None` for the tag when the field is absent. A present but
/// non-string discriminator is reported as missing.
pub(crate) fn split_tag(
    value: Value,
    field: &'static str,
) -> Result<(Option<String>, Map<String, Value>), DecodeError> {
    let object: Map<String, Value> = serde_json::from_value(value)?;
    let tag = match object.get(field) {
        None => None,
        Some(Value::String(tag)) => Some(tag.clone()),
        Some(_) => return Err(DecodeError::MissingDiscriminator { field }),
    };
    Ok((tag, object))
}

/// Like [`split_tag`], for discriminators that must be present.
pub(crate) fn require_tag(
    value: Value,
    field: &'static str,
) -> Result<(String, Map<String, Value>), DecodeError> {
    match split_tag(value, field)? {
        (Some(tag), object) => Ok((tag, object)),
        (None, _) => Err(DecodeError::MissingDiscriminator { field }),
    }
}

/// Phase two of decoding: parses the full object as `T` and validates it.
///
/// The discriminator member is left in place; variant records ignore it.
pub(crate) fn decode_variant<T>(tag: &str, object: Map<String, Value>) -> Result<T, DecodeError>
where
    T: DeserializeOwned + Validated,
{
    let variant: T = serde_json::from_value(Value::Object(object)).map_err(|source| {
        log_codec!("{tag:?} payload did not match its variant: {source}");
        DecodeError::MalformedVariant {
            discriminator: tag.to_owned(),
            source,
        }
    })?;
    variant
        .validate()
        .map_err(|source| DecodeError::InvalidVariant {
            discriminator: tag.to_owned(),
            source,
        })?;
    Ok(variant)
}

/// Unknown discriminator error for `field`.
pub(crate) fn unknown_tag(field: &'static str, tag: String) -> DecodeError {
    log_codec!("rejecting unknown {field} {tag:?}");
    DecodeError::UnknownDiscriminator { field, value: tag }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcpwire_core::ConstructionError;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize)]
    struct Body {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        size: Option<u32>,
    }

    impl Validated for Body {
        type Step = std::convert::Infallible;

        fn apply(&mut self, step: Self::Step) -> Result<(), ConstructionError> {
            match step {}
        }

        fn validate(&self) -> Result<(), ConstructionError> {
            mcpwire_core::check_non_empty("name", &self.name)
        }
    }

    struct Wrapper(Body);

    impl Serialize for Wrapper {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            encode_tagged(serializer, TYPE_FIELD, "body", &self.0)
        }
    }

    #[test]
    fn tag_is_emitted_first() {
        let wrapped = Wrapper(Body {
            name: "a".into(),
            size: Some(3),
        });
        let text = serde_json::to_string(&wrapped).unwrap();
        assert!(text.starts_with(r#"{"type":"body""#), "{text}");
        assert_eq!(
            serde_json::from_str::<Value>(&text).unwrap(),
            json!({"type": "body", "name": "a", "size": 3})
        );
    }

    #[test]
    fn encoding_is_deterministic() {
        let wrapped = Wrapper(Body {
            name: "a".into(),
            size: None,
        });
        assert_eq!(
            serde_json::to_vec(&wrapped).unwrap(),
            serde_json::to_vec(&wrapped).unwrap()
        );
    }

    #[test]
    fn empty_tag_is_unpopulated() {
        let body = json!({"x": 1});
        assert!(matches!(
            tagged_object(TYPE_FIELD, "", &body),
            Err(EncodeError::UnpopulatedVariant { field: "type" })
        ));
    }

    #[test]
    fn colliding_body_field_is_rejected() {
        let body = json!({"type": "other"});
        assert!(matches!(
            tagged_object(TYPE_FIELD, "body", &body),
            Err(EncodeError::DiscriminatorMismatch { .. })
        ));
    }

    #[test]
    fn non_object_body_is_rejected() {
        assert!(matches!(
            tagged_object(TYPE_FIELD, "body", &json!([1, 2])),
            Err(EncodeError::Json(_))
        ));
    }

    #[test]
    fn split_reads_only_the_tag() {
        let (tag, object) = split_tag(json!({"type": "body", "name": 5}), TYPE_FIELD).unwrap();
        assert_eq!(tag.as_deref(), Some("body"));
        assert_eq!(object.len(), 2);

        let (tag, _) = split_tag(json!({"name": "a"}), TYPE_FIELD).unwrap();
        assert!(tag.is_none());
    }

    #[test]
    fn non_string_tag_is_missing() {
        assert!(matches!(
            split_tag(json!({"type": 7}), TYPE_FIELD),
            Err(DecodeError::MissingDiscriminator { field: "type" })
        ));
        assert!(matches!(
            require_tag(json!({}), TYPE_FIELD),
            Err(DecodeError::MissingDiscriminator { .. })
        ));
    }

    #[test]
    fn non_object_input_is_json_error() {
        assert!(matches!(
            split_tag(json!("text"), TYPE_FIELD),
            Err(DecodeError::Json(_))
        ));
    }

    #[test]
    fn variant_errors_name_the_discriminator() {
        let (tag, object) = require_tag(json!({"type": "body", "size": 1}), TYPE_FIELD).unwrap();
        let err = decode_variant::<Body>(&tag, object).unwrap_err();
        assert!(matches!(
            &err,
            DecodeError::MalformedVariant { discriminator, .. } if discriminator == "body"
        ));

        let (tag, object) = require_tag(json!({"type": "body", "name": ""}), TYPE_FIELD).unwrap();
        let err = decode_variant::<Body>(&tag, object).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidVariant { .. }));
    }
}
