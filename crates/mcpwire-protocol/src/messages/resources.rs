//! Resources and resource templates.

use std::convert::Infallible;

use mcpwire_core::{ConstructionError, Validated, build, check_non_empty};
use serde::{Deserialize, Serialize};

use crate::content::{Annotations, ResourceContent};
use crate::envelope::impl_envelope;

/// A resource a server can read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    uri: String,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    annotations: Option<Annotations>,
}

/// Configuration steps for [`Resource`] and [`ResourceTemplate`].
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceStep {
    /// Human-readable description.
    Description(String),
    /// MIME type of the contents.
    MimeType(String),
    /// Attached annotations.
    Annotations(Annotations),
}

impl Resource {
    /// `uri` and `name` must be non-empty.
    pub fn new(
        uri: impl Into<String>,
        name: impl Into<String>,
        steps: impl IntoIterator<Item = ResourceStep>,
    ) -> Result<Self, ConstructionError> {
        build(
            Self {
                uri: uri.into(),
                name: name.into(),
                description: None,
                mime_type: None,
                annotations: None,
            },
            steps,
        )
    }

    /// Resource URI.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// MIME type.
    #[must_use]
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    /// Attached annotations.
    #[must_use]
    pub fn annotations(&self) -> Option<&Annotations> {
        self.annotations.as_ref()
    }
}

fn apply_resource_step(
    step: ResourceStep,
    description: &mut Option<String>,
    mime_type: &mut Option<String>,
    annotations: &mut Option<Annotations>,
) -> Result<(), ConstructionError> {
    match step {
        ResourceStep::Description(text) => {
            check_non_empty("description", &text)?;
            *description = Some(text);
        }
        ResourceStep::MimeType(mime) => {
            check_non_empty("mimeType", &mime)?;
            *mime_type = Some(mime);
        }
        ResourceStep::Annotations(a) => {
            a.validate().map_err(|e| e.within("annotations"))?;
            *annotations = Some(a);
        }
    }
    Ok(())
}

impl Validated for Resource {
    type Step = ResourceStep;

    fn apply(&mut self, step: ResourceStep) -> Result<(), ConstructionError> {
        apply_resource_step(
            step,
            &mut self.description,
            &mut self.mime_type,
            &mut self.annotations,
        )
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        check_non_empty("uri", &self.uri)?;
        check_non_empty("name", &self.name)?;
        if let Some(a) = &self.annotations {
            a.validate().map_err(|e| e.within("annotations"))?;
        }
        Ok(())
    }
}

/// A parameterised family of resources (RFC 6570 URI template).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTemplate {
    uri_template: String,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    annotations: Option<Annotations>,
}

impl ResourceTemplate {
    /// `name` and `uri_template` must be non-empty.
    pub fn new(
        name: impl Into<String>,
        uri_template: impl Into<String>,
        steps: impl IntoIterator<Item = ResourceStep>,
    ) -> Result<Self, ConstructionError> {
        build(
            Self {
                uri_template: uri_template.into(),
                name: name.into(),
                description: None,
                mime_type: None,
                annotations: None,
            },
            steps,
        )
    }

    /// The URI template.
    #[must_use]
    pub fn uri_template(&self) -> &str {
        &self.uri_template
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// MIME type of matching resources.
    #[must_use]
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }
}

impl Validated for ResourceTemplate {
    type Step = ResourceStep;

    fn apply(&mut self, step: ResourceStep) -> Result<(), ConstructionError> {
        apply_resource_step(
            step,
            &mut self.description,
            &mut self.mime_type,
            &mut self.annotations,
        )
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        check_non_empty("name", &self.name)?;
        check_non_empty("uriTemplate", &self.uri_template)?;
        if let Some(a) = &self.annotations {
            a.validate().map_err(|e| e.within("annotations"))?;
        }
        Ok(())
    }
}

/// Parameters of [`ReadResourceRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadResourceParams {
    #[serde(default)]
    uri: String,
}

impl ReadResourceParams {
    /// URI to read.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }
}

/// `resources/read`: fetches a resource's contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadResourceRequest {
    params: ReadResourceParams,
}

impl ReadResourceRequest {
    /// `uri` must be non-empty.
    pub fn new(uri: impl Into<String>) -> Result<Self, ConstructionError> {
        build(
            Self {
                params: ReadResourceParams { uri: uri.into() },
            },
            [],
        )
    }
}

impl Validated for ReadResourceRequest {
    type Step = Infallible;

    fn apply(&mut self, step: Infallible) -> Result<(), ConstructionError> {
        match step {}
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        check_non_empty("uri", &self.params.uri)
    }
}

impl_envelope!(ReadResourceRequest, ReadResourceParams, "resources/read");

/// Reply to [`ReadResourceRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadResourceResult {
    contents: Vec<ResourceContent>,
}

impl ReadResourceResult {
    /// Each entry is validated again here.
    pub fn new(contents: Vec<ResourceContent>) -> Result<Self, ConstructionError> {
        build(Self { contents }, [])
    }

    /// The contents read.
    #[must_use]
    pub fn contents(&self) -> &[ResourceContent] {
        &self.contents
    }
}

impl Validated for ReadResourceResult {
    type Step = Infallible;

    fn apply(&mut self, step: Infallible) -> Result<(), ConstructionError> {
        match step {}
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        for (i, content) in self.contents.iter().enumerate() {
            content
                .validate()
                .map_err(|e| e.within(&format!("contents[{i}]")))?;
        }
        Ok(())
    }
}

/// Reply to `resources/list`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResourcesResult {
    /// Available resources.
    pub resources: Vec<Resource>,
    /// Opaque pagination cursor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl Validated for ListResourcesResult {
    type Step = Infallible;

    fn apply(&mut self, step: Infallible) -> Result<(), ConstructionError> {
        match step {}
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        for (i, resource) in self.resources.iter().enumerate() {
            resource
                .validate()
                .map_err(|e| e.within(&format!("resources[{i}]")))?;
        }
        Ok(())
    }
}

/// Reply to `resources/templates/list`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResourceTemplatesResult {
    /// Available templates.
    pub resource_templates: Vec<ResourceTemplate>,
    /// Opaque pagination cursor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl Validated for ListResourceTemplatesResult {
    type Step = Infallible;

    fn apply(&mut self, step: Infallible) -> Result<(), ConstructionError> {
        match step {}
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        for (i, template) in self.resource_templates.iter().enumerate() {
            template
                .validate()
                .map_err(|e| e.within(&format!("resourceTemplates[{i}]")))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ResourceContentStep;
    use crate::envelope::Envelope;
    use mcpwire_core::DecodeError;
    use serde_json::json;

    #[test]
    fn resource_wire_shape() {
        let resource = Resource::new(
            "file:///readme.md",
            "README",
            [ResourceStep::MimeType("text/markdown".into())],
        )
        .unwrap();
        assert_eq!(
            serde_json::to_value(&resource).unwrap(),
            json!({"uri": "file:///readme.md", "name": "README", "mimeType": "text/markdown"})
        );
        assert_eq!(Resource::new("", "x", []).unwrap_err().field(), "uri");
        assert_eq!(Resource::new("file:///x", "", []).unwrap_err().field(), "name");
    }

    #[test]
    fn template_wire_shape() {
        let template = ResourceTemplate::new(
            "User file",
            "file:///users/{id}",
            [ResourceStep::Description("Per-user file".into())],
        )
        .unwrap();
        assert_eq!(
            serde_json::to_value(&template).unwrap(),
            json!({"uriTemplate": "file:///users/{id}", "name": "User file", "description": "Per-user file"})
        );
        assert_eq!(
            ResourceTemplate::new("x", "", []).unwrap_err().field(),
            "uriTemplate"
        );
    }

    #[test]
    fn read_request_round_trip() {
        let request = ReadResourceRequest::new("file:///a").unwrap();
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"method": "resources/read", "params": {"uri": "file:///a"}})
        );
        assert_eq!(ReadResourceRequest::decode(&request.encode().unwrap()).unwrap(), request);
        assert!(matches!(
            ReadResourceRequest::decode(br#"{"method":"resources/read","params":{}}"#),
            Err(DecodeError::InvalidVariant { .. })
        ));
    }

    #[test]
    fn read_result_validates_contents() {
        let body = ResourceContent::new("file:///a", [ResourceContentStep::Blob("AAEC".into())])
            .unwrap();
        let result = ReadResourceResult::new(vec![body]).unwrap();
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"contents": [{"uri": "file:///a", "blob": "AAEC"}]})
        );

        let bad: ReadResourceResult =
            serde_json::from_value(json!({"contents": [{"uri": "file:///a"}]})).unwrap();
        assert_eq!(bad.validate().unwrap_err().field(), "contents[0].text");
    }

    #[test]
    fn list_results() {
        let list = ListResourceTemplatesResult {
            resource_templates: vec![ResourceTemplate::new("t", "x://{y}", []).unwrap()],
            next_cursor: None,
        };
        let value = serde_json::to_value(&list).unwrap();
        assert!(value.get("resourceTemplates").is_some());
        assert!(value.get("nextCursor").is_none());

        let empty = ListResourcesResult::default();
        assert_eq!(serde_json::to_value(&empty).unwrap(), json!({"resources": []}));
    }
}
