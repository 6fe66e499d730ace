//! Server-initiated LLM sampling.

use std::convert::Infallible;

use mcpwire_core::{ConstructionError, Validated, build, check_non_empty, check_range};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::content::{Content, Role};
use crate::envelope::impl_envelope;

/// A model name hint, matched by substring on the client side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelHint {
    /// Partial or full model name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ModelHint {
    /// Hint naming `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

/// How the client should trade off when choosing a model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelPreferences {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    hints: Vec<ModelHint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cost_priority: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    speed_priority: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    intelligence_priority: Option<f64>,
}

/// Configuration steps for [`ModelPreferences`].
#[derive(Debug, Clone, PartialEq)]
pub enum ModelPreferencesStep {
    /// Appends a model hint.
    Hint(ModelHint),
    /// Weight of low cost, in `[0, 1]`.
    CostPriority(f64),
    /// Weight of low latency, in `[0, 1]`.
    SpeedPriority(f64),
    /// Weight of capability, in `[0, 1]`.
    IntelligencePriority(f64),
}

impl ModelPreferences {
    /// Builds preferences from steps.
    pub fn new(
        steps: impl IntoIterator<Item = ModelPreferencesStep>,
    ) -> Result<Self, ConstructionError> {
        build(Self::default(), steps)
    }

    /// Hints in preference order.
    #[must_use]
    pub fn hints(&self) -> &[ModelHint] {
        &self.hints
    }

    /// Weight of low cost.
    #[must_use]
    pub fn cost_priority(&self) -> Option<f64> {
        self.cost_priority
    }

    /// Weight of low latency.
    #[must_use]
    pub fn speed_priority(&self) -> Option<f64> {
        self.speed_priority
    }

    /// Weight of capability.
    #[must_use]
    pub fn intelligence_priority(&self) -> Option<f64> {
        self.intelligence_priority
    }
}

impl Validated for ModelPreferences {
    type Step = ModelPreferencesStep;

    fn apply(&mut self, step: ModelPreferencesStep) -> Result<(), ConstructionError> {
        match step {
            ModelPreferencesStep::Hint(hint) => self.hints.push(hint),
            ModelPreferencesStep::CostPriority(p) => {
                check_range("costPriority", p, 0.0, 1.0)?;
                self.cost_priority = Some(p);
            }
            ModelPreferencesStep::SpeedPriority(p) => {
                check_range("speedPriority", p, 0.0, 1.0)?;
                self.speed_priority = Some(p);
            }
            ModelPreferencesStep::IntelligencePriority(p) => {
                check_range("intelligencePriority", p, 0.0, 1.0)?;
                self.intelligence_priority = Some(p);
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        for (field, value) in [
            ("costPriority", self.cost_priority),
            ("speedPriority", self.speed_priority),
            ("intelligencePriority", self.intelligence_priority),
        ] {
            if let Some(value) = value {
                check_range(field, value, 0.0, 1.0)?;
            }
        }
        Ok(())
    }
}

/// One turn of the conversation sent for sampling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingMessage {
    /// Speaker.
    pub role: Role,
    /// Payload of the turn.
    pub content: Content,
}

impl SamplingMessage {
    /// A user turn.
    #[must_use]
    pub fn user(content: Content) -> Self {
        Self {
            role: Role::User,
            content,
        }
    }

    /// An assistant turn.
    #[must_use]
    pub fn assistant(content: Content) -> Self {
        Self {
            role: Role::Assistant,
            content,
        }
    }
}

/// Which server context the client should attach to the prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IncludeContext {
    /// No extra context.
    #[default]
    None,
    /// Context from the requesting server only.
    ThisServer,
    /// Context from every connected server.
    AllServers,
}

/// Parameters of [`CreateMessageRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageParams {
    #[serde(default)]
    messages: Vec<SamplingMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    model_preferences: Option<ModelPreferences>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    system_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    include_context: Option<IncludeContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(default)]
    max_tokens: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    stop_sequences: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<Map<String, Value>>,
}

impl CreateMessageParams {
    /// Conversation so far.
    #[must_use]
    pub fn messages(&self) -> &[SamplingMessage] {
        &self.messages
    }

    /// Model selection preferences.
    #[must_use]
    pub fn model_preferences(&self) -> Option<&ModelPreferences> {
        self.model_preferences.as_ref()
    }

    /// System prompt.
    #[must_use]
    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    /// Context inclusion mode.
    #[must_use]
    pub fn include_context(&self) -> Option<IncludeContext> {
        self.include_context
    }

    /// Sampling temperature.
    #[must_use]
    pub fn temperature(&self) -> Option<f64> {
        self.temperature
    }

    /// Token budget for the reply.
    #[must_use]
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// Sequences that end generation.
    #[must_use]
    pub fn stop_sequences(&self) -> &[String] {
        &self.stop_sequences
    }

    /// Provider-specific metadata.
    #[must_use]
    pub fn metadata(&self) -> Option<&Map<String, Value>> {
        self.metadata.as_ref()
    }
}

/// `sampling/createMessage`: asks the client to run its model.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateMessageRequest {
    params: CreateMessageParams,
}

/// Configuration steps for [`CreateMessageRequest`].
#[derive(Debug, Clone, PartialEq)]
pub enum CreateMessageStep {
    /// System prompt.
    SystemPrompt(String),
    /// Sampling temperature; checked against `[0, 1]` after all steps.
    Temperature(f64),
    /// Sequences that end generation.
    StopSequences(Vec<String>),
    /// Model selection preferences.
    ModelPreferences(ModelPreferences),
    /// Context inclusion mode.
    IncludeContext(IncludeContext),
    /// Provider-specific metadata.
    Metadata(Map<String, Value>),
}

impl CreateMessageRequest {
    /// `messages` must be non-empty and `max_tokens` positive.
    pub fn new(
        messages: Vec<SamplingMessage>,
        max_tokens: u32,
        steps: impl IntoIterator<Item = CreateMessageStep>,
    ) -> Result<Self, ConstructionError> {
        build(
            Self {
                params: CreateMessageParams {
                    messages,
                    model_preferences: None,
                    system_prompt: None,
                    include_context: None,
                    temperature: None,
                    max_tokens,
                    stop_sequences: Vec::new(),
                    metadata: None,
                },
            },
            steps,
        )
    }
}

impl Validated for CreateMessageRequest {
    type Step = CreateMessageStep;

    fn apply(&mut self, step: CreateMessageStep) -> Result<(), ConstructionError> {
        let params = &mut self.params;
        match step {
            CreateMessageStep::SystemPrompt(prompt) => params.system_prompt = Some(prompt),
            CreateMessageStep::Temperature(t) => params.temperature = Some(t),
            CreateMessageStep::StopSequences(stops) => params.stop_sequences = stops,
            CreateMessageStep::ModelPreferences(prefs) => params.model_preferences = Some(prefs),
            CreateMessageStep::IncludeContext(mode) => params.include_context = Some(mode),
            CreateMessageStep::Metadata(metadata) => params.metadata = Some(metadata),
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        let params = &self.params;
        if params.messages.is_empty() {
            return Err(ConstructionError::empty("messages"));
        }
        for (i, message) in params.messages.iter().enumerate() {
            message
                .content
                .validate()
                .map_err(|e| e.within(&format!("messages[{i}].content")))?;
        }
        if params.max_tokens == 0 {
            return Err(ConstructionError::new("maxTokens", "must be positive"));
        }
        if let Some(t) = params.temperature {
            check_range("temperature", t, 0.0, 1.0)?;
        }
        if let Some(prefs) = &params.model_preferences {
            prefs.validate().map_err(|e| e.within("modelPreferences"))?;
        }
        Ok(())
    }
}

impl_envelope!(CreateMessageRequest, CreateMessageParams, "sampling/createMessage");

/// Why generation ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StopReason {
    /// The model finished its turn.
    EndTurn,
    /// A stop sequence was produced.
    StopSequence,
    /// The token budget ran out.
    MaxTokens,
}

/// Reply to [`CreateMessageRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageResult {
    role: Role,
    content: Content,
    model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    stop_reason: Option<StopReason>,
}

impl CreateMessageResult {
    /// An assistant reply produced by `model`.
    pub fn new(
        content: Content,
        model: impl Into<String>,
        stop_reason: Option<StopReason>,
    ) -> Result<Self, ConstructionError> {
        build(
            Self {
                role: Role::Assistant,
                content,
                model: model.into(),
                stop_reason,
            },
            [],
        )
    }

    /// A plain-text assistant reply that ended its turn.
    pub fn text(
        text: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, ConstructionError> {
        Self::new(Content::text(text), model, Some(StopReason::EndTurn))
    }

    /// Speaker of the reply.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Generated payload.
    #[must_use]
    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Model that produced the reply.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Why generation ended.
    #[must_use]
    pub fn stop_reason(&self) -> Option<&StopReason> {
        self.stop_reason.as_ref()
    }
}

impl Validated for CreateMessageResult {
    type Step = Infallible;

    fn apply(&mut self, step: Infallible) -> Result<(), ConstructionError> {
        match step {}
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        check_non_empty("model", &self.model)?;
        self.content.validate().map_err(|e| e.within("content"))
    }
}
