//! Capability declarations exchanged during initialization.

use std::collections::BTreeMap;
use std::fmt;

use mcpwire_core::{ConstructionError, DecodeError, EncodeError, Validated, build, check_non_empty};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use serde_json::value::RawValue;

/// Opaque, already-serialized JSON.
///
/// Held as text and interpreted only on request.
#[derive(Clone)]
pub struct RawPayload(Box<RawValue>);

impl RawPayload {
    /// Serializes `value` into a payload.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, EncodeError> {
        Ok(Self(serde_json::value::to_raw_value(value)?))
    }

    /// Checks that `json` is well-formed and keeps it verbatim.
    pub fn from_json(json: impl Into<String>) -> Result<Self, DecodeError> {
        Ok(Self(RawValue::from_string(json.into())?))
    }

    /// The JSON text.
    #[must_use]
    pub fn get(&self) -> &str {
        self.0.get()
    }

    /// Interprets the payload as `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, DecodeError> {
        Ok(serde_json::from_str(self.0.get())?)
    }
}

impl PartialEq for RawPayload {
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}

impl fmt::Debug for RawPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPayload").field(&self.get()).finish()
    }
}

impl Serialize for RawPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

/// Only the JSON text of the payload is captured, so keys and numbers keep
/// their original form when read from bytes.
impl<'de> Deserialize<'de> for RawPayload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Box::<RawValue>::deserialize(deserializer).map(Self)
    }
}

/// Experimental capability entries keyed by name.
pub type ExperimentalCapabilities = BTreeMap<String, RawPayload>;

fn insert_experimental(
    map: &mut ExperimentalCapabilities,
    name: String,
    data: &Value,
) -> Result<(), ConstructionError> {
    check_non_empty("experimental", &name)?;
    let payload = RawPayload::from_serialize(data)
        .map_err(|e| ConstructionError::new(format!("experimental.{name}"), e.to_string()))?;
    map.insert(name, payload);
    Ok(())
}

fn validate_experimental(map: &ExperimentalCapabilities) -> Result<(), ConstructionError> {
    if map.keys().any(String::is_empty) {
        return Err(ConstructionError::empty("experimental"));
    }
    Ok(())
}

fn read_experimental<T: DeserializeOwned>(
    map: &ExperimentalCapabilities,
    name: &str,
) -> Option<Result<T, DecodeError>> {
    map.get(name).map(RawPayload::decode)
}

/// Logging capability.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingCapability {}

/// Prompt capabilities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptsCapability {
    /// Whether the server emits prompt list change notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}

/// Resource capabilities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcesCapability {
    /// Whether the server supports resource subscriptions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscribe: Option<bool>,
    /// Whether the server emits resource list change notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}

/// Tool capabilities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsCapability {
    /// Whether the server emits tool list change notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}

/// Capabilities a server advertises.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerCapabilities {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    experimental: ExperimentalCapabilities,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    logging: Option<LoggingCapability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    prompts: Option<PromptsCapability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    resources: Option<ResourcesCapability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tools: Option<ToolsCapability>,
}

/// Configuration steps for [`ServerCapabilities`].
#[derive(Debug, Clone, PartialEq)]
pub enum ServerCapabilityStep {
    /// Declares logging support.
    Logging,
    /// Declares prompt support.
    Prompts(PromptsCapability),
    /// Declares resource support.
    Resources(ResourcesCapability),
    /// Declares tool support.
    Tools(ToolsCapability),
    /// Adds a named experimental entry.
    Experimental(String, Value),
}

impl ServerCapabilities {
    /// Builds capabilities from `steps`.
    pub fn new(
        steps: impl IntoIterator<Item = ServerCapabilityStep>,
    ) -> Result<Self, ConstructionError> {
        build(Self::default(), steps)
    }

    /// Logging support.
    #[must_use]
    pub fn logging(&self) -> Option<&LoggingCapability> {
        self.logging.as_ref()
    }

    /// Prompt support.
    #[must_use]
    pub fn prompts(&self) -> Option<&PromptsCapability> {
        self.prompts.as_ref()
    }

    /// Resource support.
    #[must_use]
    pub fn resources(&self) -> Option<&ResourcesCapability> {
        self.resources.as_ref()
    }

    /// Tool support.
    #[must_use]
    pub fn tools(&self) -> Option<&ToolsCapability> {
        self.tools.as_ref()
    }

    /// All experimental entries, undecoded.
    #[must_use]
    pub fn experimental_entries(&self) -> &ExperimentalCapabilities {
        &self.experimental
    }

    /// Decodes the experimental entry `name` as `T`.
    #[must_use]
    pub fn experimental<T: DeserializeOwned>(&self, name: &str) -> Option<Result<T, DecodeError>> {
        read_experimental(&self.experimental, name)
    }
}

impl Validated for ServerCapabilities {
    type Step = ServerCapabilityStep;

    fn apply(&mut self, step: ServerCapabilityStep) -> Result<(), ConstructionError> {
        match step {
            ServerCapabilityStep::Logging => self.logging = Some(LoggingCapability {}),
            ServerCapabilityStep::Prompts(c) => self.prompts = Some(c),
            ServerCapabilityStep::Resources(c) => self.resources = Some(c),
            ServerCapabilityStep::Tools(c) => self.tools = Some(c),
            ServerCapabilityStep::Experimental(name, data) => {
                insert_experimental(&mut self.experimental, name, &data)?;
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        validate_experimental(&self.experimental)
    }
}

/// Roots capability.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootsCapability {
    /// Whether the client emits root list change notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}

/// Sampling capability.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SamplingCapability {}

/// Capabilities a client advertises.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientCapabilities {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    experimental: ExperimentalCapabilities,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    roots: Option<RootsCapability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sampling: Option<SamplingCapability>,
}

/// Configuration steps for [`ClientCapabilities`].
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCapabilityStep {
    /// Declares filesystem roots support.
    Roots(RootsCapability),
    /// Declares sampling support.
    Sampling,
    /// Adds a named experimental entry.
    Experimental(String, Value),
}

impl ClientCapabilities {
    /// Builds capabilities from `steps`.
    pub fn new(
        steps: impl IntoIterator<Item = ClientCapabilityStep>,
    ) -> Result<Self, ConstructionError> {
        build(Self::default(), steps)
    }

    /// Roots support.
    #[must_use]
    pub fn roots(&self) -> Option<&RootsCapability> {
        self.roots.as_ref()
    }

    /// Sampling support.
    #[must_use]
    pub fn sampling(&self) -> Option<&SamplingCapability> {
        self.sampling.as_ref()
    }

    /// All experimental entries, undecoded.
    #[must_use]
    pub fn experimental_entries(&self) -> &ExperimentalCapabilities {
        &self.experimental
    }

    /// Decodes the experimental entry `name` as `T`.
    #[must_use]
    pub fn experimental<T: DeserializeOwned>(&self, name: &str) -> Option<Result<T, DecodeError>> {
        read_experimental(&self.experimental, name)
    }
}

impl Validated for ClientCapabilities {
    type Step = ClientCapabilityStep;

    fn apply(&mut self, step: ClientCapabilityStep) -> Result<(), ConstructionError> {
        match step {
            ClientCapabilityStep::Roots(c) => self.roots = Some(c),
            ClientCapabilityStep::Sampling => self.sampling = Some(SamplingCapability {}),
            ClientCapabilityStep::Experimental(name, data) => {
                insert_experimental(&mut self.experimental, name, &data)?;
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        validate_experimental(&self.experimental)
    }
}
