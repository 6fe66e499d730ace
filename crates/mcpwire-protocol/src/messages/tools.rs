//! Tool definitions and invocation.

use std::convert::Infallible;

use mcpwire_core::{ConstructionError, Validated, build, check_non_empty};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::content::Content;
use crate::envelope::impl_envelope;
use crate::messages::progress::{ProgressToken, RequestMeta};
use crate::schema::{JsonSchema, SchemaType};

/// A tool a server exposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    input_schema: JsonSchema,
}

/// Configuration steps for [`Tool`].
#[derive(Debug, Clone, PartialEq)]
pub enum ToolStep {
    /// Human-readable description.
    Description(String),
    /// Adds or replaces one input property.
    Property(String, JsonSchema),
    /// Marks input properties as required.
    Required(Vec<String>),
}

impl Tool {
    /// A tool whose input schema starts as an empty object.
    pub fn new(
        name: impl Into<String>,
        steps: impl IntoIterator<Item = ToolStep>,
    ) -> Result<Self, ConstructionError> {
        build(
            Self {
                name: name.into(),
                description: None,
                input_schema: JsonSchema::of(SchemaType::Object),
            },
            steps,
        )
    }

    /// Tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Schema of the `arguments` object.
    #[must_use]
    pub fn input_schema(&self) -> &JsonSchema {
        &self.input_schema
    }
}

impl Validated for Tool {
    type Step = ToolStep;

    fn apply(&mut self, step: ToolStep) -> Result<(), ConstructionError> {
        match step {
            ToolStep::Description(text) => {
                check_non_empty("description", &text)?;
                self.description = Some(text);
            }
            ToolStep::Property(name, schema) => {
                check_non_empty("inputSchema.properties", &name)?;
                self.input_schema.properties.insert(name, schema);
            }
            ToolStep::Required(names) => {
                let schema = std::mem::replace(
                    &mut self.input_schema,
                    JsonSchema::of(SchemaType::Object),
                );
                self.input_schema = schema.with_required(names);
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        check_non_empty("name", &self.name)?;
        if self.input_schema.schema_type != SchemaType::Object {
            return Err(ConstructionError::new(
                "inputSchema.type",
                format!("must be object, got {}", self.input_schema.schema_type),
            ));
        }
        match self.input_schema.check_shape() {
            Ok(()) => Ok(()),
            Err(errors) => match errors.into_iter().next() {
                Some(first) => Err(first.within("inputSchema")),
                None => Ok(()),
            },
        }
    }
}

/// Parameters of [`CallToolRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallToolParams {
    #[serde(default)]
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    arguments: Option<Map<String, Value>>,
    #[serde(rename = "_meta", default, skip_serializing_if = "Option::is_none")]
    meta: Option<RequestMeta>,
}

impl CallToolParams {
    /// Tool to invoke.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Arguments object.
    #[must_use]
    pub fn arguments(&self) -> Option<&Map<String, Value>> {
        self.arguments.as_ref()
    }

    /// Progress token the caller asked to be notified on.
    #[must_use]
    pub fn progress_token(&self) -> Option<&ProgressToken> {
        self.meta.as_ref().and_then(|m| m.progress_token.as_ref())
    }
}

/// `tools/call`: invokes a tool.
#[derive(Debug, Clone, PartialEq)]
pub struct CallToolRequest {
    params: CallToolParams,
}

/// Configuration steps for [`CallToolRequest`].
#[derive(Debug, Clone, PartialEq)]
pub enum CallToolStep {
    /// Arguments object.
    Arguments(Map<String, Value>),
    /// Requests progress notifications under this token.
    ProgressToken(ProgressToken),
}

impl CallToolRequest {
    /// `name` must be non-empty.
    pub fn new(
        name: impl Into<String>,
        steps: impl IntoIterator<Item = CallToolStep>,
    ) -> Result<Self, ConstructionError> {
        build(
            Self {
                params: CallToolParams {
                    name: name.into(),
                    arguments: None,
                    meta: None,
                },
            },
            steps,
        )
    }
}

impl Validated for CallToolRequest {
    type Step = CallToolStep;

    fn apply(&mut self, step: CallToolStep) -> Result<(), ConstructionError> {
        match step {
            CallToolStep::Arguments(arguments) => self.params.arguments = Some(arguments),
            CallToolStep::ProgressToken(token) => {
                self.params.meta = Some(RequestMeta {
                    progress_token: Some(token),
                });
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        check_non_empty("name", &self.params.name)
    }
}

impl_envelope!(CallToolRequest, CallToolParams, "tools/call");

/// Reply to [`CallToolRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallToolResult {
    content: Vec<Content>,
    #[serde(rename = "isError", default, skip_serializing_if = "std::ops::Not::not")]
    is_error: bool,
}

impl CallToolResult {
    /// A successful result.
    pub fn success(content: Vec<Content>) -> Result<Self, ConstructionError> {
        build(
            Self {
                content,
                is_error: false,
            },
            [],
        )
    }

    /// A tool-level failure reported to the model rather than as a protocol error.
    pub fn error(content: Vec<Content>) -> Result<Self, ConstructionError> {
        build(
            Self {
                content,
                is_error: true,
            },
            [],
        )
    }

    /// Output payloads.
    #[must_use]
    pub fn content(&self) -> &[Content] {
        &self.content
    }

    /// Whether the tool reported failure.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.is_error
    }
}

impl Validated for CallToolResult {
    type Step = Infallible;

    fn apply(&mut self, step: Infallible) -> Result<(), ConstructionError> {
        match step {}
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        for (i, content) in self.content.iter().enumerate() {
            content
                .validate()
                .map_err(|e| e.within(&format!("content[{i}]")))?;
        }
        Ok(())
    }
}

/// Reply to `tools/list`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListToolsResult {
    /// Available tools.
    pub tools: Vec<Tool>,
    /// Opaque pagination cursor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl Validated for ListToolsResult {
    type Step = Infallible;

    fn apply(&mut self, step: Infallible) -> Result<(), ConstructionError> {
        match step {}
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        for (i, tool) in self.tools.iter().enumerate() {
            tool.validate().map_err(|e| e.within(&format!("tools[{i}]")))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::Envelope;
    use crate::schema::StringConstraint;
    use serde_json::json;

    fn search_tool() -> Tool {
        Tool::new(
            "search",
            [
                ToolStep::Description("Full-text search".into()),
                ToolStep::Property(
                    "query".into(),
                    JsonSchema::string_with([StringConstraint::MinLength(1)]),
                ),
                ToolStep::Property(
                    "limit".into(),
                    JsonSchema::integer().with_range(Some(1.0), Some(50.0)),
                ),
                ToolStep::Required(vec!["query".into()]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn tool_wire_shape() {
        assert_eq!(
            serde_json::to_value(search_tool()).unwrap(),
            json!({
                "name": "search",
                "description": "Full-text search",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "limit": {"type": "integer", "minimum": 1.0, "maximum": 50.0},
                        "query": {"type": "string", "minLength": 1}
                    },
                    "required": ["query"]
                }
            })
        );
    }

    #[test]
    fn tool_rules() {
        assert_eq!(Tool::new("", []).unwrap_err().field(), "name");
        assert_eq!(
            Tool::new("t", [ToolStep::Description(String::new())])
                .unwrap_err()
                .field(),
            "description"
        );
        let err = Tool::new("t", [ToolStep::Required(vec!["missing".into()])]).unwrap_err();
        assert_eq!(err.field(), "inputSchema.root.required");
        let err = Tool::new(
            "t",
            [ToolStep::Property(
                "n".into(),
                JsonSchema::number().with_range(Some(5.0), Some(1.0)),
            )],
        )
        .unwrap_err();
        assert_eq!(err.field(), "inputSchema.root.n.minimum");
    }

    #[test]
    fn decoded_tool_schema_must_be_object() {
        let tool: Tool = serde_json::from_value(json!({
            "name": "t",
            "inputSchema": {"type": "string"}
        }))
        .unwrap();
        assert_eq!(tool.validate().unwrap_err().field(), "inputSchema.type");
    }

    #[test]
    fn call_tool_round_trip() {
        let mut args = Map::new();
        args.insert("query".into(), json!("rust"));
        let request = CallToolRequest::new(
            "search",
            [
                CallToolStep::Arguments(args),
                CallToolStep::ProgressToken("p1".into()),
            ],
        )
        .unwrap();
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "method": "tools/call",
                "params": {"name": "search", "arguments": {"query": "rust"}, "_meta": {"progressToken": "p1"}}
            })
        );
        let back = CallToolRequest::decode(&request.encode().unwrap()).unwrap();
        assert_eq!(back.params().progress_token(), Some(&ProgressToken::from("p1")));
        assert_eq!(back, request);
        assert!(CallToolRequest::new("", []).is_err());
    }

    #[test]
    fn call_tool_result_flag() {
        let ok = CallToolResult::success(vec![Content::text("3 hits")]).unwrap();
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"content": [{"type": "text", "text": "3 hits"}]})
        );
        let failed = CallToolResult::error(vec![Content::text("index offline")]).unwrap();
        assert_eq!(serde_json::to_value(&failed).unwrap()["isError"], json!(true));
    }

    #[test]
    fn list_tools_validates_entries() {
        let list = ListToolsResult {
            tools: vec![search_tool()],
            next_cursor: None,
        };
        assert!(list.validate().is_ok());
        assert_eq!(serde_json::to_value(&list).unwrap()["tools"][0]["name"], json!("search"));
    }
}
