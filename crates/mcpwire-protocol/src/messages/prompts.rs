//! Prompt templates.

use std::collections::{BTreeMap, BTreeSet};
use std::convert::Infallible;

use mcpwire_core::{ConstructionError, Validated, build, check_non_empty};
use serde::{Deserialize, Serialize};

use crate::content::{Content, Role};
use crate::envelope::impl_envelope;

/// One argument a prompt template accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptArgument {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    required: Option<bool>,
}

/// Configuration steps for [`PromptArgument`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptArgumentStep {
    /// Human-readable description.
    Description(String),
    /// Whether the argument must be supplied.
    Required(bool),
}

impl PromptArgument {
    /// `name` must be non-empty.
    pub fn new(
        name: impl Into<String>,
        steps: impl IntoIterator<Item = PromptArgumentStep>,
    ) -> Result<Self, ConstructionError> {
        build(
            Self {
                name: name.into(),
                description: None,
                required: None,
            },
            steps,
        )
    }

    /// Argument name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether the argument is mandatory; absent means optional.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }
}

impl Validated for PromptArgument {
    type Step = PromptArgumentStep;

    fn apply(&mut self, step: PromptArgumentStep) -> Result<(), ConstructionError> {
        match step {
            PromptArgumentStep::Description(text) => {
                check_non_empty("description", &text)?;
                self.description = Some(text);
            }
            PromptArgumentStep::Required(required) => self.required = Some(required),
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        check_non_empty("name", &self.name)
    }
}

/// A prompt template offered by a server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    arguments: Vec<PromptArgument>,
}

/// Configuration steps for [`Prompt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptStep {
    /// Human-readable description.
    Description(String),
    /// Appends an argument; names must be unique.
    Argument(PromptArgument),
}

impl Prompt {
    /// `name` must be non-empty.
    pub fn new(
        name: impl Into<String>,
        steps: impl IntoIterator<Item = PromptStep>,
    ) -> Result<Self, ConstructionError> {
        build(
            Self {
                name: name.into(),
                description: None,
                arguments: Vec::new(),
            },
            steps,
        )
    }

    /// Prompt name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Declared arguments.
    #[must_use]
    pub fn arguments(&self) -> &[PromptArgument] {
        &self.arguments
    }

    /// Names of the required arguments missing from `supplied`.
    #[must_use]
    pub fn missing_arguments<'a>(&'a self, supplied: &BTreeMap<String, String>) -> Vec<&'a str> {
        self.arguments
            .iter()
            .filter(|arg| arg.is_required() && !supplied.contains_key(&arg.name))
            .map(PromptArgument::name)
            .collect()
    }
}

impl Validated for Prompt {
    type Step = PromptStep;

    fn apply(&mut self, step: PromptStep) -> Result<(), ConstructionError> {
        match step {
            PromptStep::Description(text) => {
                check_non_empty("description", &text)?;
                self.description = Some(text);
            }
            PromptStep::Argument(arg) => {
                if self.arguments.iter().any(|a| a.name == arg.name) {
                    return Err(ConstructionError::new(
                        "arguments",
                        format!("duplicate argument {:?}", arg.name),
                    ));
                }
                self.arguments.push(arg);
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        check_non_empty("name", &self.name)?;
        let mut seen = BTreeSet::new();
        for (i, arg) in self.arguments.iter().enumerate() {
            arg.validate()
                .map_err(|e| e.within(&format!("arguments[{i}]")))?;
            if !seen.insert(arg.name.as_str()) {
                return Err(ConstructionError::new(
                    "arguments",
                    format!("duplicate argument {:?}", arg.name),
                ));
            }
        }
        Ok(())
    }
}

/// One message of a rendered prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    /// Speaker.
    pub role: Role,
    /// Payload.
    pub content: Content,
}

impl PromptMessage {
    /// A user message.
    #[must_use]
    pub fn user(content: Content) -> Self {
        Self {
            role: Role::User,
            content,
        }
    }

    /// An assistant message.
    #[must_use]
    pub fn assistant(content: Content) -> Self {
        Self {
            role: Role::Assistant,
            content,
        }
    }
}

/// Parameters of [`GetPromptRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetPromptParams {
    #[serde(default)]
    name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    arguments: BTreeMap<String, String>,
}

impl GetPromptParams {
    /// Prompt name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Argument values.
    #[must_use]
    pub fn arguments(&self) -> &BTreeMap<String, String> {
        &self.arguments
    }
}

/// `prompts/get`: renders a prompt with arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetPromptRequest {
    params: GetPromptParams,
}

impl GetPromptRequest {
    /// `name` must be non-empty.
    pub fn new(
        name: impl Into<String>,
        arguments: BTreeMap<String, String>,
    ) -> Result<Self, ConstructionError> {
        build(
            Self {
                params: GetPromptParams {
                    name: name.into(),
                    arguments,
                },
            },
            [],
        )
    }
}

impl Validated for GetPromptRequest {
    type Step = Infallible;

    fn apply(&mut self, step: Infallible) -> Result<(), ConstructionError> {
        match step {}
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        check_non_empty("name", &self.params.name)
    }
}

impl_envelope!(GetPromptRequest, GetPromptParams, "prompts/get");

/// Reply to [`GetPromptRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetPromptResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    messages: Vec<PromptMessage>,
}

impl GetPromptResult {
    /// Rendered messages; must be non-empty.
    pub fn new(
        description: Option<String>,
        messages: Vec<PromptMessage>,
    ) -> Result<Self, ConstructionError> {
        build(
            Self {
                description,
                messages,
            },
            [],
        )
    }

    /// Description of the rendered prompt.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Rendered messages.
    #[must_use]
    pub fn messages(&self) -> &[PromptMessage] {
        &self.messages
    }
}

impl Validated for GetPromptResult {
    type Step = Infallible;

    fn apply(&mut self, step: Infallible) -> Result<(), ConstructionError> {
        match step {}
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        if self.messages.is_empty() {
            return Err(ConstructionError::empty("messages"));
        }
        for (i, message) in self.messages.iter().enumerate() {
            message
                .content
                .validate()
                .map_err(|e| e.within(&format!("messages[{i}].content")))?;
        }
        Ok(())
    }
}

/// Reply to `prompts/list`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPromptsResult {
    /// Available prompts.
    pub prompts: Vec<Prompt>,
    /// Opaque pagination cursor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl Validated for ListPromptsResult {
    type Step = Infallible;

    fn apply(&mut self, step: Infallible) -> Result<(), ConstructionError> {
        match step {}
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        for (i, prompt) in self.prompts.iter().enumerate() {
            prompt
                .validate()
                .map_err(|e| e.within(&format!("prompts[{i}]")))?;
        }
        Ok(())
    }
}
