//! Initialization handshake messages.

use std::convert::Infallible;

use mcpwire_core::config::DEFAULT_PROTOCOL_VERSION;
use mcpwire_core::{ConstructionError, Validated, WireConfig, build, check_non_empty};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::capabilities::{ClientCapabilities, ServerCapabilities};
use crate::envelope::impl_envelope;

/// Latest protocol revision this crate speaks.
pub const LATEST_PROTOCOL_VERSION: &str = DEFAULT_PROTOCOL_VERSION;

/// Name and version of a client or server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Implementation {
    name: String,
    version: String,
}

impl Implementation {
    /// Both parts must be non-empty.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self, ConstructionError> {
        build(
            Self {
                name: name.into(),
                version: version.into(),
            },
            [],
        )
    }

    /// Implementation name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Implementation version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }
}

impl Validated for Implementation {
    type Step = Infallible;

    fn apply(&mut self, step: Infallible) -> Result<(), ConstructionError> {
        match step {}
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        check_non_empty("name", &self.name)?;
        check_non_empty("version", &self.version)
    }
}

/// Parameters of [`InitializeRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    protocol_version: String,
    capabilities: ClientCapabilities,
    client_info: Implementation,
}

impl InitializeParams {
    /// Requested protocol revision.
    #[must_use]
    pub fn protocol_version(&self) -> &str {
        &self.protocol_version
    }

    /// Client capabilities.
    #[must_use]
    pub fn capabilities(&self) -> &ClientCapabilities {
        &self.capabilities
    }

    /// Client identity.
    #[must_use]
    pub fn client_info(&self) -> &Implementation {
        &self.client_info
    }
}

/// `initialize`: the first request a client sends.
#[derive(Debug, Clone, PartialEq)]
pub struct InitializeRequest {
    params: InitializeParams,
}

/// Configuration steps for [`InitializeRequest`].
#[derive(Debug, Clone, PartialEq)]
pub enum InitializeStep {
    /// Overrides [`LATEST_PROTOCOL_VERSION`].
    ProtocolVersion(String),
    /// Declares client capabilities.
    Capabilities(ClientCapabilities),
}

impl InitializeStep {
    /// Protocol version taken from configuration.
    #[must_use]
    pub fn from_config(config: &WireConfig) -> Self {
        InitializeStep::ProtocolVersion(config.protocol_version.clone())
    }
}

impl InitializeRequest {
    /// Builds the request for `client_info`.
    pub fn new(
        client_info: Implementation,
        steps: impl IntoIterator<Item = InitializeStep>,
    ) -> Result<Self, ConstructionError> {
        build(
            Self {
                params: InitializeParams {
                    protocol_version: LATEST_PROTOCOL_VERSION.to_owned(),
                    capabilities: ClientCapabilities::default(),
                    client_info,
                },
            },
            steps,
        )
    }
}

impl Validated for InitializeRequest {
    type Step = InitializeStep;

    fn apply(&mut self, step: InitializeStep) -> Result<(), ConstructionError> {
        match step {
            InitializeStep::ProtocolVersion(version) => {
                check_non_empty("protocolVersion", &version)?;
                self.params.protocol_version = version;
            }
            InitializeStep::Capabilities(capabilities) => {
                self.params.capabilities = capabilities;
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        check_non_empty("protocolVersion", &self.params.protocol_version)?;
        self.params
            .capabilities
            .validate()
            .map_err(|e| e.within("capabilities"))?;
        self.params
            .client_info
            .validate()
            .map_err(|e| e.within("clientInfo"))
    }
}

impl_envelope!(InitializeRequest, InitializeParams, "initialize");

/// Server reply to [`InitializeRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    protocol_version: String,
    capabilities: ServerCapabilities,
    server_info: Implementation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    instructions: Option<String>,
}

/// Configuration steps for [`InitializeResult`].
#[derive(Debug, Clone, PartialEq)]
pub enum InitializeResultStep {
    /// Overrides [`LATEST_PROTOCOL_VERSION`].
    ProtocolVersion(String),
    /// Declares server capabilities.
    Capabilities(ServerCapabilities),
    /// Usage hints for the client.
    Instructions(String),
}

impl InitializeResult {
    /// Builds the result for `server_info`.
    pub fn new(
        server_info: Implementation,
        steps: impl IntoIterator<Item = InitializeResultStep>,
    ) -> Result<Self, ConstructionError> {
        build(
            Self {
                protocol_version: LATEST_PROTOCOL_VERSION.to_owned(),
                capabilities: ServerCapabilities::default(),
                server_info,
                instructions: None,
            },
            steps,
        )
    }

    /// Agreed protocol revision.
    #[must_use]
    pub fn protocol_version(&self) -> &str {
        &self.protocol_version
    }

    /// Server capabilities.
    #[must_use]
    pub fn capabilities(&self) -> &ServerCapabilities {
        &self.capabilities
    }

    /// Server identity.
    #[must_use]
    pub fn server_info(&self) -> &Implementation {
        &self.server_info
    }

    /// Usage hints, if any.
    #[must_use]
    pub fn instructions(&self) -> Option<&str> {
        self.instructions.as_deref()
    }
}

impl Validated for InitializeResult {
    type Step = InitializeResultStep;

    fn apply(&mut self, step: InitializeResultStep) -> Result<(), ConstructionError> {
        match step {
            InitializeResultStep::ProtocolVersion(version) => {
                check_non_empty("protocolVersion", &version)?;
                self.protocol_version = version;
            }
            InitializeResultStep::Capabilities(capabilities) => self.capabilities = capabilities,
            InitializeResultStep::Instructions(text) => {
                check_non_empty("instructions", &text)?;
                self.instructions = Some(text);
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        check_non_empty("protocolVersion", &self.protocol_version)?;
        self.capabilities
            .validate()
            .map_err(|e| e.within("capabilities"))?;
        self.server_info
            .validate()
            .map_err(|e| e.within("serverInfo"))
    }
}

/// Parameters of [`InitializedNotification`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InitializedParams {
    #[serde(rename = "_meta", default, skip_serializing_if = "Map::is_empty")]
    meta: Map<String, Value>,
}

impl InitializedParams {
    /// Free-form metadata.
    #[must_use]
    pub fn meta(&self) -> &Map<String, Value> {
        &self.meta
    }
}

/// `notifications/initialized`: the client finished initializing.
#[derive(Debug, Clone, PartialEq)]
pub struct InitializedNotification {
    params: InitializedParams,
}

impl InitializedNotification {
    /// Notification with no metadata.
    #[must_use]
    pub fn new() -> Self {
        Self::with_meta(Map::new())
    }

    /// Notification carrying `_meta`.
    #[must_use]
    pub fn with_meta(meta: Map<String, Value>) -> Self {
        Self {
            params: InitializedParams { meta },
        }
    }
}

impl Default for InitializedNotification {
    fn default() -> Self {
        Self::new()
    }
}

impl Validated for InitializedNotification {
    type Step = Infallible;

    fn apply(&mut self, step: Infallible) -> Result<(), ConstructionError> {
        match step {}
    }
}

impl_envelope!(
    InitializedNotification,
    InitializedParams,
    "notifications/initialized"
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::Envelope;
    use crate::messages::capabilities::{ClientCapabilityStep, ServerCapabilityStep};
    use mcpwire_core::DecodeError;
    use serde_json::json;

    fn client() -> Implementation {
        Implementation::new("probe", "0.1.0").unwrap()
    }

    #[test]
    fn implementation_requires_both_parts() {
        assert_eq!(Implementation::new("", "1").unwrap_err().field(), "name");
        assert_eq!(Implementation::new("a", "").unwrap_err().field(), "version");
    }

    #[test]
    fn initialize_request_wire_shape() {
        let request = InitializeRequest::new(
            client(),
            [InitializeStep::Capabilities(
                ClientCapabilities::new([ClientCapabilityStep::Sampling]).unwrap(),
            )],
        )
        .unwrap();
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "method": "initialize",
                "params": {
                    "protocolVersion": "2024-11-05",
                    "capabilities": {"sampling": {}},
                    "clientInfo": {"name": "probe", "version": "0.1.0"}
                }
            })
        );
        let bytes = request.encode().unwrap();
        assert_eq!(InitializeRequest::decode(&bytes).unwrap(), request);
    }

    #[test]
    fn protocol_version_from_config() {
        let config = WireConfig::new().with_protocol_version("2025-03-26");
        let request =
            InitializeRequest::new(client(), [InitializeStep::from_config(&config)]).unwrap();
        assert_eq!(request.params().protocol_version(), "2025-03-26");

        assert!(
            InitializeRequest::new(client(), [InitializeStep::ProtocolVersion(String::new())])
                .is_err()
        );
    }

    #[test]
    fn decoded_client_info_is_validated() {
        let err = InitializeRequest::decode(
            br#"{"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"","version":"1"}}}"#,
        )
        .unwrap_err();
        match err {
            DecodeError::InvalidVariant { source, .. } => {
                assert_eq!(source.field(), "clientInfo.name");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn initialize_result() {
        let server = Implementation::new("server", "2.0").unwrap();
        let result = InitializeResult::new(
            server,
            [
                InitializeResultStep::Capabilities(
                    ServerCapabilities::new([ServerCapabilityStep::Logging]).unwrap(),
                ),
                InitializeResultStep::Instructions("call tools/list first".into()),
            ],
        )
        .unwrap();
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["serverInfo"]["name"], "server");
        assert_eq!(value["instructions"], "call tools/list first");
        assert_eq!(value["capabilities"], json!({"logging": {}}));

        let err = InitializeResult::new(
            Implementation::new("s", "1").unwrap(),
            [InitializeResultStep::Instructions(String::new())],
        )
        .unwrap_err();
        assert_eq!(err.field(), "instructions");
    }

    #[test]
    fn initialized_notification() {
        let plain = InitializedNotification::new();
        assert_eq!(
            serde_json::to_value(&plain).unwrap(),
            json!({"method": "notifications/initialized", "params": {}})
        );

        let decoded =
            InitializedNotification::decode(br#"{"method":"notifications/initialized"}"#).unwrap();
        assert_eq!(decoded, plain);

        let mut meta = Map::new();
        meta.insert("trace".into(), json!("abc"));
        let with_meta = InitializedNotification::with_meta(meta);
        let value = serde_json::to_value(&with_meta).unwrap();
        assert_eq!(value["params"]["_meta"]["trace"], "abc");
        assert!(with_meta.into_notification().unwrap().is_notification());
    }
}
