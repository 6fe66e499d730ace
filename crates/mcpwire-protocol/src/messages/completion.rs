//! Argument autocompletion.

use std::convert::Infallible;

use mcpwire_core::{ConstructionError, Validated, build, check_non_empty};
use serde::{Deserialize, Serialize};

use crate::envelope::impl_envelope;

/// Largest number of values a single completion result may carry.
pub const MAX_COMPLETION_VALUES: usize = 100;

/// What a [`Reference`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceKind {
    /// `ref/prompt`, identified by name.
    #[serde(rename = "ref/prompt")]
    Prompt,
    /// `ref/resource`, identified by URI.
    #[serde(rename = "ref/resource")]
    Resource,
}

/// The prompt or resource whose argument is being completed.
///
/// A prompt reference carries only a name; a resource reference carries
/// only a URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "type")]
    kind: ReferenceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    uri: Option<String>,
}

impl Reference {
    /// Reference to a prompt.
    pub fn prompt(name: impl Into<String>) -> Result<Self, ConstructionError> {
        Self::new(ReferenceKind::Prompt, Some(name.into()), None)
    }

    /// Reference to a resource.
    pub fn resource(uri: impl Into<String>) -> Result<Self, ConstructionError> {
        Self::new(ReferenceKind::Resource, None, Some(uri.into()))
    }

    /// General form; checks the identifier matches the kind.
    pub fn new(
        kind: ReferenceKind,
        name: Option<String>,
        uri: Option<String>,
    ) -> Result<Self, ConstructionError> {
        build(Self { kind, name, uri }, [])
    }

    /// Kind of target.
    #[must_use]
    pub fn kind(&self) -> ReferenceKind {
        self.kind
    }

    /// Prompt name, for prompt references.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Resource URI, for resource references.
    #[must_use]
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }
}

impl Validated for Reference {
    type Step = Infallible;

    fn apply(&mut self, step: Infallible) -> Result<(), ConstructionError> {
        match step {}
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        match self.kind {
            ReferenceKind::Prompt => {
                check_non_empty("name", self.name.as_deref().unwrap_or_default())?;
                if self.uri.is_some() {
                    return Err(ConstructionError::new(
                        "uri",
                        "not allowed on a prompt reference",
                    ));
                }
            }
            ReferenceKind::Resource => {
                check_non_empty("uri", self.uri.as_deref().unwrap_or_default())?;
                if self.name.is_some() {
                    return Err(ConstructionError::new(
                        "name",
                        "not allowed on a resource reference",
                    ));
                }
            }
        }
        Ok(())
    }
}

/// The argument being completed and its partial value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionArgument {
    name: String,
    value: String,
}

impl CompletionArgument {
    /// Argument name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// What the user has typed so far.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Parameters of [`CompleteRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteParams {
    #[serde(rename = "ref")]
    reference: Reference,
    argument: CompletionArgument,
}

impl CompleteParams {
    /// Target of the completion.
    #[must_use]
    pub fn reference(&self) -> &Reference {
        &self.reference
    }

    /// Argument being completed.
    #[must_use]
    pub fn argument(&self) -> &CompletionArgument {
        &self.argument
    }
}

/// `completion/complete`: asks for candidate argument values.
#[derive(Debug, Clone, PartialEq)]
pub struct CompleteRequest {
    params: CompleteParams,
}

impl CompleteRequest {
    /// `arg_name` must be non-empty; `arg_value` may be.
    pub fn new(
        reference: Reference,
        arg_name: impl Into<String>,
        arg_value: impl Into<String>,
    ) -> Result<Self, ConstructionError> {
        build(
            Self {
                params: CompleteParams {
                    reference,
                    argument: CompletionArgument {
                        name: arg_name.into(),
                        value: arg_value.into(),
                    },
                },
            },
            [],
        )
    }
}

impl Validated for CompleteRequest {
    type Step = Infallible;

    fn apply(&mut self, step: Infallible) -> Result<(), ConstructionError> {
        match step {}
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        self.params
            .reference
            .validate()
            .map_err(|e| e.within("ref"))?;
        check_non_empty("argument.name", &self.params.argument.name)
    }
}

impl_envelope!(CompleteRequest, CompleteParams, "completion/complete");

/// Candidate values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionValues {
    values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    has_more: Option<bool>,
}

impl CompletionValues {
    /// The candidates.
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Total number of candidates, if known.
    #[must_use]
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    /// Whether more candidates exist beyond these.
    #[must_use]
    pub fn has_more(&self) -> Option<bool> {
        self.has_more
    }
}

/// Reply to [`CompleteRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteResult {
    completion: CompletionValues,
}

/// Configuration steps for [`CompleteResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompleteStep {
    /// Total number of candidates; at least the number returned.
    Total(u64),
    /// More candidates are available.
    HasMore(bool),
}

impl CompleteResult {
    /// At most [`MAX_COMPLETION_VALUES`] values.
    pub fn new(
        values: Vec<String>,
        steps: impl IntoIterator<Item = CompleteStep>,
    ) -> Result<Self, ConstructionError> {
        if values.len() > MAX_COMPLETION_VALUES {
            return Err(too_many(values.len()));
        }
        build(
            Self {
                completion: CompletionValues {
                    values,
                    total: None,
                    has_more: None,
                },
            },
            steps,
        )
    }

    /// The candidate list.
    #[must_use]
    pub fn completion(&self) -> &CompletionValues {
        &self.completion
    }
}

fn too_many(len: usize) -> ConstructionError {
    ConstructionError::new(
        "completion.values",
        format!("at most {MAX_COMPLETION_VALUES} values allowed, got {len}"),
    )
}

fn check_total(total: u64, len: usize) -> Result<(), ConstructionError> {
    if usize::try_from(total).is_ok_and(|t| t < len) {
        return Err(ConstructionError::new(
            "completion.total",
            format!("{total} is less than the {len} values returned"),
        ));
    }
    Ok(())
}

impl Validated for CompleteResult {
    type Step = CompleteStep;

    fn apply(&mut self, step: CompleteStep) -> Result<(), ConstructionError> {
        match step {
            CompleteStep::Total(total) => {
                check_total(total, self.completion.values.len())?;
                self.completion.total = Some(total);
            }
            CompleteStep::HasMore(more) => self.completion.has_more = Some(more),
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        let len = self.completion.values.len();
        if len > MAX_COMPLETION_VALUES {
            return Err(too_many(len));
        }
        if let Some(total) = self.completion.total {
            check_total(total, len)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::Envelope;
    use mcpwire_core::DecodeError;
    use serde_json::json;

    #[test]
    fn prompt_reference_rules() {
        assert!(Reference::prompt("greet").is_ok());
        assert!(Reference::prompt("").is_err());
        let err = Reference::new(
            ReferenceKind::Prompt,
            Some("greet".into()),
            Some("file:///x".into()),
        )
        .unwrap_err();
        assert_eq!(err.field(), "uri");
    }

    #[test]
    fn resource_reference_rules() {
        assert!(Reference::resource("file:///x").is_ok());
        assert!(Reference::new(ReferenceKind::Resource, None, None).is_err());
        let err = Reference::new(
            ReferenceKind::Resource,
            Some("n".into()),
            Some("file:///x".into()),
        )
        .unwrap_err();
        assert_eq!(err.field(), "name");
    }

    #[test]
    fn complete_request_wire_shape() {
        let request =
            CompleteRequest::new(Reference::prompt("greet").unwrap(), "language", "py").unwrap();
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "method": "completion/complete",
                "params": {
                    "ref": {"type": "ref/prompt", "name": "greet"},
                    "argument": {"name": "language", "value": "py"}
                }
            })
        );
        assert_eq!(CompleteRequest::decode(&request.encode().unwrap()).unwrap(), request);
    }

    #[test]
    fn argument_name_required() {
        let err = CompleteRequest::new(Reference::resource("file:///x").unwrap(), "", "")
            .unwrap_err();
        assert_eq!(err.field(), "argument.name");
    }

    #[test]
    fn decoded_reference_is_validated() {
        let err = CompleteRequest::decode(
            br#"{"method":"completion/complete","params":{"ref":{"type":"ref/prompt","name":"a","uri":"b"},"argument":{"name":"x","value":""}}}"#,
        )
        .unwrap_err();
        match err {
            DecodeError::InvalidVariant { source, .. } => assert_eq!(source.field(), "ref.uri"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn value_limit() {
        let hundred: Vec<String> = (0..100).map(|i| i.to_string()).collect();
        assert!(CompleteResult::new(hundred.clone(), []).is_ok());

        let mut overflow = hundred;
        overflow.push("100".into());
        let err = CompleteResult::new(overflow, []).unwrap_err();
        assert_eq!(err.field(), "completion.values");
    }

    #[test]
    fn total_must_cover_values() {
        let values = vec!["a".to_string(), "b".to_string()];
        assert!(CompleteResult::new(values.clone(), [CompleteStep::Total(1)]).is_err());

        let result = CompleteResult::new(
            values,
            [CompleteStep::Total(10), CompleteStep::HasMore(true)],
        )
        .unwrap();
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"completion": {"values": ["a", "b"], "total": 10, "hasMore": true}})
        );
    }
}
