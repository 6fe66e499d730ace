//! Content payloads.
//!
//! [`Content`] is the tagged union carried by tool results, prompt messages
//! and sampling messages. On the wire it is a flat object discriminated by
//! `type`:
//!
//! ```json
//! {"type":"text","text":"Hello, world!","annotations":{"audience":["assistant"],"priority":0.8}}
//! {"type":"image","data":"aGk=","mimeType":"image/png"}
//! {"type":"resource","uri":"file:///a.txt","mimeType":"text/plain","text":"hi"}
//! ```

use std::convert::Infallible;
use std::fmt;

use mcpwire_core::{
    ConstructionError, DecodeError, EncodeError, Validated, build, check_non_empty, check_range,
    log_codec,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::codec::{self, TYPE_FIELD};

/// Role in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The human side.
    User,
    /// The model side.
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        })
    }
}

/// Hints about who a payload is meant for and how much it matters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotations {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    audience: Vec<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    priority: Option<f64>,
}

/// Configuration steps for [`Annotations`].
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationsStep {
    /// Adds one intended reader.
    Audience(Role),
    /// Importance in `[0, 1]`.
    Priority(f64),
}

impl Annotations {
    /// Builds annotations from `steps`.
    pub fn new(steps: impl IntoIterator<Item = AnnotationsStep>) -> Result<Self, ConstructionError> {
        build(Self::default(), steps)
    }

    /// Intended readers, in insertion order.
    #[must_use]
    pub fn audience(&self) -> &[Role] {
        &self.audience
    }

    /// Importance, if set.
    #[must_use]
    pub fn priority(&self) -> Option<f64> {
        self.priority
    }
}

impl Validated for Annotations {
    type Step = AnnotationsStep;

    fn apply(&mut self, step: AnnotationsStep) -> Result<(), ConstructionError> {
        match step {
            AnnotationsStep::Audience(role) => {
                if !self.audience.contains(&role) {
                    self.audience.push(role);
                }
            }
            AnnotationsStep::Priority(priority) => {
                check_range("priority", priority, 0.0, 1.0)?;
                self.priority = Some(priority);
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        for (i, role) in self.audience.iter().enumerate() {
            if self.audience[..i].contains(role) {
                return Err(ConstructionError::new(
                    "audience",
                    format!("lists {role} more than once"),
                ));
            }
        }
        if let Some(priority) = self.priority {
            check_range("priority", priority, 0.0, 1.0)?;
        }
        Ok(())
    }
}

fn validate_annotations(annotations: Option<&Annotations>) -> Result<(), ConstructionError> {
    match annotations {
        Some(annotations) => annotations
            .validate()
            .map_err(|e| e.within("annotations")),
        None => Ok(()),
    }
}

/// Plain text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    annotations: Option<Annotations>,
}

impl TextContent {
    /// The text itself.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Attached annotations.
    #[must_use]
    pub fn annotations(&self) -> Option<&Annotations> {
        self.annotations.as_ref()
    }
}

impl Validated for TextContent {
    type Step = Infallible;

    fn apply(&mut self, step: Infallible) -> Result<(), ConstructionError> {
        match step {}
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        validate_annotations(self.annotations.as_ref())
    }
}

/// Base64 image data.
///
/// Neither the encoding nor the MIME type syntax is checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageContent {
    data: String,
    mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    annotations: Option<Annotations>,
}

impl ImageContent {
    /// Base64-encoded bytes.
    #[must_use]
    pub fn data(&self) -> &str {
        &self.data
    }

    /// MIME type of the decoded bytes.
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Attached annotations.
    #[must_use]
    pub fn annotations(&self) -> Option<&Annotations> {
        self.annotations.as_ref()
    }
}

impl Validated for ImageContent {
    type Step = Infallible;

    fn apply(&mut self, step: Infallible) -> Result<(), ConstructionError> {
        match step {}
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        validate_annotations(self.annotations.as_ref())
    }
}

/// The body of a resource: exactly one of text or base64 blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContent {
    uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    blob: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    annotations: Option<Annotations>,
}

/// Configuration steps for [`ResourceContent`].
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceContentStep {
    /// Text body. Fails if a blob is already set.
    Text(String),
    /// Base64 body. Fails if text is already set.
    Blob(String),
    /// MIME type of the body.
    MimeType(String),
    /// Attached annotations.
    Annotations(Annotations),
}

impl ResourceContent {
    /// Builds resource content for `uri`; one body step is required.
    pub fn new(
        uri: impl Into<String>,
        steps: impl IntoIterator<Item = ResourceContentStep>,
    ) -> Result<Self, ConstructionError> {
        build(
            Self {
                uri: uri.into(),
                mime_type: None,
                text: None,
                blob: None,
                annotations: None,
            },
            steps,
        )
    }

    /// Shorthand for text content with a MIME type.
    pub fn text_body(
        uri: impl Into<String>,
        mime_type: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<Self, ConstructionError> {
        Self::new(
            uri,
            [
                ResourceContentStep::MimeType(mime_type.into()),
                ResourceContentStep::Text(text.into()),
            ],
        )
    }

    /// Resource URI.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// MIME type, if declared.
    #[must_use]
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    /// Text body, if this is text content.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Base64 body, if this is binary content.
    #[must_use]
    pub fn blob(&self) -> Option<&str> {
        self.blob.as_deref()
    }

    /// Attached annotations.
    #[must_use]
    pub fn annotations(&self) -> Option<&Annotations> {
        self.annotations.as_ref()
    }
}

impl Validated for ResourceContent {
    type Step = ResourceContentStep;

    fn apply(&mut self, step: ResourceContentStep) -> Result<(), ConstructionError> {
        match step {
            ResourceContentStep::Text(text) => {
                if self.blob.is_some() {
                    return Err(ConstructionError::new("text", "blob is already set"));
                }
                self.text = Some(text);
            }
            ResourceContentStep::Blob(blob) => {
                if self.text.is_some() {
                    return Err(ConstructionError::new("blob", "text is already set"));
                }
                self.blob = Some(blob);
            }
            ResourceContentStep::MimeType(mime_type) => {
                check_non_empty("mimeType", &mime_type)?;
                self.mime_type = Some(mime_type);
            }
            ResourceContentStep::Annotations(annotations) => {
                self.annotations = Some(annotations);
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        check_non_empty("uri", &self.uri)?;
        match (&self.text, &self.blob) {
            (Some(_), None) | (None, Some(_)) => {}
            (Some(_), Some(_)) => {
                return Err(ConstructionError::new(
                    "text",
                    "exactly one of text or blob may be set",
                ));
            }
            (None, None) => {
                return Err(ConstructionError::new(
                    "text",
                    "one of text or blob is required",
                ));
            }
        }
        validate_annotations(self.annotations.as_ref())
    }
}

/// Discriminator values of [`Content`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// `"text"`
    Text,
    /// `"image"`
    Image,
    /// `"resource"`
    Resource,
}

impl ContentType {
    /// Wire value of the discriminator.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Text => "text",
            ContentType::Image => "image",
            ContentType::Resource => "resource",
        }
    }

    /// Looks up a wire value.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "text" => Some(ContentType::Text),
            "image" => Some(ContentType::Image),
            "resource" => Some(ContentType::Resource),
            _ => None,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A content payload: exactly one of text, image or resource.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// Plain text.
    Text(TextContent),
    /// Base64 image.
    Image(ImageContent),
    /// Embedded resource, flattened into the content object.
    Resource(ResourceContent),
}

impl Content {
    /// Text content.
    pub fn text(text: impl Into<String>) -> Self {
        Content::Text(TextContent {
            text: text.into(),
            annotations: None,
        })
    }

    /// Text content with annotations.
    pub fn text_annotated(text: impl Into<String>, annotations: Annotations) -> Self {
        Content::Text(TextContent {
            text: text.into(),
            annotations: Some(annotations),
        })
    }

    /// Image content from base64 data.
    pub fn image(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Content::Image(ImageContent {
            data: data.into(),
            mime_type: mime_type.into(),
            annotations: None,
        })
    }

    /// Image content with annotations.
    pub fn image_annotated(
        data: impl Into<String>,
        mime_type: impl Into<String>,
        annotations: Annotations,
    ) -> Self {
        Content::Image(ImageContent {
            data: data.into(),
            mime_type: mime_type.into(),
            annotations: Some(annotations),
        })
    }

    /// Embedded resource content.
    #[must_use]
    pub fn resource(resource: ResourceContent) -> Self {
        Content::Resource(resource)
    }

    /// Which variant this is.
    #[must_use]
    pub fn content_type(&self) -> ContentType {
        match self {
            Content::Text(_) => ContentType::Text,
            Content::Image(_) => ContentType::Image,
            Content::Resource(_) => ContentType::Resource,
        }
    }

    /// Text of a text payload.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(text) => Some(text.text()),
            _ => None,
        }
    }

    /// Annotations of whichever variant is populated.
    #[must_use]
    pub fn annotations(&self) -> Option<&Annotations> {
        match self {
            Content::Text(c) => c.annotations(),
            Content::Image(c) => c.annotations(),
            Content::Resource(c) => c.annotations(),
        }
    }

    /// Decodes a JSON value, reporting typed discriminator errors.
    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        let (tag, object) = codec::require_tag(value, TYPE_FIELD)?;
        let Some(kind) = ContentType::from_tag(&tag) else {
            return Err(codec::unknown_tag(TYPE_FIELD, tag));
        };
        log_codec!("decoding {kind} content");
        match kind {
            ContentType::Text => codec::decode_variant(&tag, object).map(Content::Text),
            ContentType::Image => codec::decode_variant(&tag, object).map(Content::Image),
            ContentType::Resource => codec::decode_variant(&tag, object).map(Content::Resource),
        }
    }

    /// Decodes wire bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        Self::from_value(serde_json::from_slice(bytes)?)
    }

    /// Encodes to wire bytes.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        Ok(serde_json::to_vec(self)?)
    }
}

impl Validated for Content {
    type Step = Infallible;

    fn apply(&mut self, step: Infallible) -> Result<(), ConstructionError> {
        match step {}
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        match self {
            Content::Text(c) => c.validate(),
            Content::Image(c) => c.validate(),
            Content::Resource(c) => c.validate(),
        }
    }
}

impl Serialize for Content {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let tag = self.content_type().as_str();
        match self {
            Content::Text(body) => codec::encode_tagged(serializer, TYPE_FIELD, tag, body),
            Content::Image(body) => codec::encode_tagged(serializer, TYPE_FIELD, tag, body),
            Content::Resource(body) => codec::encode_tagged(serializer, TYPE_FIELD, tag, body),
        }
    }
}

impl<'de> Deserialize<'de> for Content {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Content::from_value(value).map_err(serde::de::Error::custom)
    }
}

impl From<ResourceContent> for Content {
    fn from(resource: ResourceContent) -> Self {
        Content::Resource(resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn assistant_note() -> Annotations {
        Annotations::new([
            AnnotationsStep::Audience(Role::Assistant),
            AnnotationsStep::Priority(0.8),
        ])
        .unwrap()
    }

    #[test]
    fn text_with_annotations_matches_wire_shape() {
        let content = Content::text_annotated("Hello, world!", assistant_note());
        let value = serde_json::to_value(&content).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "text",
                "text": "Hello, world!",
                "annotations": {"audience": ["assistant"], "priority": 0.8}
            })
        );

        let bytes = content.encode().unwrap();
        assert!(bytes.starts_with(br#"{"type":"text""#));
        assert_eq!(Content::decode(&bytes).unwrap(), content);
    }

    #[test]
    fn plain_text_omits_annotations() {
        let value = serde_json::to_value(Content::text("hi")).unwrap();
        assert_eq!(value, json!({"type": "text", "text": "hi"}));
    }

    #[test]
    fn image_uses_camel_case() {
        let value = serde_json::to_value(Content::image("aGk=", "image/png")).unwrap();
        assert_eq!(
            value,
            json!({"type": "image", "data": "aGk=", "mimeType": "image/png"})
        );
    }

    #[test]
    fn resource_is_flattened() {
        let resource = ResourceContent::text_body("file:///a.txt", "text/plain", "hi").unwrap();
        let content = Content::resource(resource.clone());
        let value = serde_json::to_value(&content).unwrap();
        assert_eq!(
            value,
            json!({"type": "resource", "uri": "file:///a.txt", "mimeType": "text/plain", "text": "hi"})
        );
        assert_eq!(Content::from_value(value).unwrap(), Content::Resource(resource));
    }

    #[test]
    fn duplicate_audience_is_rejected_on_decode() {
        let built = Annotations::new([
            AnnotationsStep::Audience(Role::User),
            AnnotationsStep::Audience(Role::User),
        ])
        .unwrap();
        assert_eq!(built.audience(), [Role::User]);

        match Content::decode(br#"{"type":"text","text":"x","annotations":{"audience":["user","user"]}}"#) {
            Err(DecodeError::InvalidVariant { source, .. }) => {
                assert_eq!(source.field(), "annotations.audience");
            }
            other => panic!("expected invalid variant, got {other:?}"),
        }
    }

    #[test]
    fn priority_bounds_are_inclusive() {
        assert!(Annotations::new([AnnotationsStep::Priority(0.0)]).is_ok());
        assert!(Annotations::new([AnnotationsStep::Priority(1.0)]).is_ok());
        let err = Annotations::new([AnnotationsStep::Priority(1.5)]).unwrap_err();
        assert_eq!(err.field(), "priority");
        assert!(Annotations::new([AnnotationsStep::Priority(f64::NAN)]).is_err());
    }

    #[test]
    fn audience_is_deduplicated() {
        let annotations = Annotations::new([
            AnnotationsStep::Audience(Role::User),
            AnnotationsStep::Audience(Role::User),
        ])
        .unwrap();
        assert_eq!(annotations.audience(), &[Role::User]);
    }

    #[test]
    fn resource_body_is_exclusive() {
        let err = ResourceContent::new(
            "file:///a",
            [
                ResourceContentStep::Text("t".into()),
                ResourceContentStep::Blob("Yg==".into()),
            ],
        )
        .unwrap_err();
        assert_eq!(err.field(), "blob");

        let err = ResourceContent::new(
            "file:///a",
            [
                ResourceContentStep::Blob("Yg==".into()),
                ResourceContentStep::Text("t".into()),
            ],
        )
        .unwrap_err();
        assert_eq!(err.field(), "text");

        assert!(ResourceContent::new("file:///a", []).is_err());
        assert!(ResourceContent::new("", [ResourceContentStep::Text("t".into())]).is_err());
    }

    #[test]
    fn unknown_type_is_rejected() {
        let err = Content::decode(br#"{"type":"video","url":"x"}"#).unwrap_err();
        assert!(matches!(
            &err,
            DecodeError::UnknownDiscriminator { field: "type", value } if value == "video"
        ));
        assert!(err.to_string().contains("unknown type"));
    }

    #[test]
    fn missing_type_is_rejected() {
        assert!(matches!(
            Content::decode(br#"{"text":"hi"}"#),
            Err(DecodeError::MissingDiscriminator { field: "type" })
        ));
    }

    #[test]
    fn wrong_shape_names_the_variant() {
        let err = Content::decode(br#"{"type":"text","text":5}"#).unwrap_err();
        assert!(matches!(
            &err,
            DecodeError::MalformedVariant { discriminator, .. } if discriminator == "text"
        ));

        assert!(matches!(
            Content::decode(br#"{"type":"image","data":"aGk="}"#),
            Err(DecodeError::MalformedVariant { .. })
        ));
    }

    #[test]
    fn decoded_values_are_validated() {
        let err = Content::decode(
            br#"{"type":"text","text":"x","annotations":{"priority":2.0}}"#,
        )
        .unwrap_err();
        match err {
            DecodeError::InvalidVariant { source, .. } => {
                assert_eq!(source.field(), "annotations.priority");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(matches!(
            Content::decode(br#"{"type":"resource","uri":"a","text":"t","blob":"b"}"#),
            Err(DecodeError::InvalidVariant { .. })
        ));
    }

    #[test]
    fn unknown_role_is_malformed() {
        assert!(matches!(
            Content::decode(br#"{"type":"text","text":"x","annotations":{"audience":["robot"]}}"#),
            Err(DecodeError::MalformedVariant { .. })
        ));
    }

    #[test]
    fn serde_deserialize_goes_through_the_codec() {
        let list: Vec<Content> =
            serde_json::from_str(r#"[{"type":"text","text":"a"},{"type":"image","data":"b","mimeType":"c"}]"#)
                .unwrap();
        assert_eq!(list[0].as_text(), Some("a"));
        assert_eq!(list[1].content_type(), ContentType::Image);

        let err = serde_json::from_str::<Content>(r#"{"type":"video"}"#).unwrap_err();
        assert!(err.to_string().contains("unknown type"));
    }
}
