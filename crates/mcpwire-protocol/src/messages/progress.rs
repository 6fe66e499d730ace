//! Progress notifications for long-running requests.

use mcpwire_core::{ConstructionError, Validated, build, check_non_empty};
use serde::{Deserialize, Serialize};

use crate::envelope::impl_envelope;

/// Progress token used to correlate progress notifications with requests.
///
/// Tokens can be either strings or integers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProgressToken {
    /// String progress token.
    String(String),
    /// Integer progress token.
    Number(i64),
}

impl From<String> for ProgressToken {
    fn from(s: String) -> Self {
        ProgressToken::String(s)
    }
}

impl From<&str> for ProgressToken {
    fn from(s: &str) -> Self {
        ProgressToken::String(s.to_owned())
    }
}

impl From<i64> for ProgressToken {
    fn from(n: i64) -> Self {
        ProgressToken::Number(n)
    }
}

impl std::fmt::Display for ProgressToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgressToken::String(s) => write!(f, "{s}"),
            ProgressToken::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Request metadata containing an optional progress token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMeta {
    /// Token the receiver should echo in progress notifications.
    #[serde(rename = "progressToken", default, skip_serializing_if = "Option::is_none")]
    pub progress_token: Option<ProgressToken>,
}

/// Parameters of [`ProgressNotification`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressParams {
    progress_token: ProgressToken,
    progress: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl ProgressParams {
    /// Token from the request's `_meta.progressToken`.
    #[must_use]
    pub fn progress_token(&self) -> &ProgressToken {
        &self.progress_token
    }

    /// Progress so far.
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Expected final value, for determinate progress.
    #[must_use]
    pub fn total(&self) -> Option<f64> {
        self.total
    }

    /// Status text.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns the progress as a fraction (0.0 to 1.0) if total is known.
    #[must_use]
    pub fn fraction(&self) -> Option<f64> {
        self.total.map(|t| self.progress / t)
    }
}

/// `notifications/progress`: reports progress on a request.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressNotification {
    params: ProgressParams,
}

/// Configuration steps for [`ProgressNotification`].
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressStep {
    /// Expected final value; positive and not below the progress.
    Total(f64),
    /// Status text.
    Message(String),
}

fn check_progress(progress: f64) -> Result<(), ConstructionError> {
    if !progress.is_finite() || progress < 0.0 {
        return Err(ConstructionError::out_of_range(
            "progress",
            progress,
            "a non-negative number",
        ));
    }
    Ok(())
}

fn check_total(progress: f64, total: f64) -> Result<(), ConstructionError> {
    if !total.is_finite() || total <= 0.0 {
        return Err(ConstructionError::out_of_range(
            "total",
            total,
            "a positive number",
        ));
    }
    if progress > total {
        return Err(ConstructionError::new(
            "total",
            format!("progress {progress} exceeds total {total}"),
        ));
    }
    Ok(())
}

impl ProgressNotification {
    /// `progress` must be non-negative.
    pub fn new(
        token: impl Into<ProgressToken>,
        progress: f64,
        steps: impl IntoIterator<Item = ProgressStep>,
    ) -> Result<Self, ConstructionError> {
        check_progress(progress)?;
        build(
            Self {
                params: ProgressParams {
                    progress_token: token.into(),
                    progress,
                    total: None,
                    message: None,
                },
            },
            steps,
        )
    }

    /// Progress 0.
    pub fn start(token: impl Into<ProgressToken>) -> Result<Self, ConstructionError> {
        Self::new(token, 0.0, [])
    }

    /// Progress 100.
    pub fn complete(token: impl Into<ProgressToken>) -> Result<Self, ConstructionError> {
        Self::new(token, 100.0, [])
    }

    /// Progress as a percentage in `[0, 100]`.
    pub fn percentage(
        token: impl Into<ProgressToken>,
        percentage: f64,
    ) -> Result<Self, ConstructionError> {
        mcpwire_core::check_range("percentage", percentage, 0.0, 100.0)?;
        Self::new(token, percentage, [])
    }

    /// `completed` out of `total` items.
    pub fn with_items(
        token: impl Into<ProgressToken>,
        completed: u64,
        total: u64,
    ) -> Result<Self, ConstructionError> {
        if total == 0 {
            return Err(ConstructionError::new("total", "must be positive"));
        }
        if completed > total {
            return Err(ConstructionError::new(
                "completed",
                format!("{completed} exceeds the {total} items"),
            ));
        }
        #[allow(clippy::cast_precision_loss)]
        let (completed, total) = (completed as f64, total as f64);
        Self::new(token, completed, [ProgressStep::Total(total)])
    }
}

impl Validated for ProgressNotification {
    type Step = ProgressStep;

    fn apply(&mut self, step: ProgressStep) -> Result<(), ConstructionError> {
        match step {
            ProgressStep::Total(total) => {
                check_total(self.params.progress, total)?;
                self.params.total = Some(total);
            }
            ProgressStep::Message(message) => {
                check_non_empty("message", &message)?;
                self.params.message = Some(message);
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        check_progress(self.params.progress)?;
        if let Some(total) = self.params.total {
            check_total(self.params.progress, total)?;
        }
        Ok(())
    }
}

impl_envelope!(ProgressNotification, ProgressParams, "notifications/progress");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::Envelope;
    use mcpwire_core::DecodeError;
    use serde_json::json;

    #[test]
    fn wire_shape() {
        let n = ProgressNotification::new(
            "upload-1",
            5.0,
            [
                ProgressStep::Total(10.0),
                ProgressStep::Message("halfway".into()),
            ],
        )
        .unwrap();
        assert_eq!(
            serde_json::to_value(&n).unwrap(),
            json!({
                "method": "notifications/progress",
                "params": {"progressToken": "upload-1", "progress": 5.0, "total": 10.0, "message": "halfway"}
            })
        );
        assert_eq!(n.params().fraction(), Some(0.5));
        assert_eq!(ProgressNotification::decode(&n.encode().unwrap()).unwrap(), n);
    }

    #[test]
    fn negative_progress_rejected() {
        let err = ProgressNotification::new(1i64, -1.0, []).unwrap_err();
        assert_eq!(err.field(), "progress");
    }

    #[test]
    fn total_rules() {
        assert!(ProgressNotification::new(1i64, 0.0, [ProgressStep::Total(0.0)]).is_err());
        assert!(ProgressNotification::new(1i64, 11.0, [ProgressStep::Total(10.0)]).is_err());
        assert!(ProgressNotification::new(1i64, 10.0, [ProgressStep::Total(10.0)]).is_ok());
    }

    #[test]
    fn helpers() {
        assert_eq!(ProgressNotification::start(1i64).unwrap().params().progress(), 0.0);
        assert_eq!(ProgressNotification::complete(1i64).unwrap().params().progress(), 100.0);
        assert!(ProgressNotification::percentage(1i64, 101.0).is_err());
        assert!(ProgressNotification::percentage(1i64, 42.0).is_ok());

        let items = ProgressNotification::with_items("job", 3, 4).unwrap();
        assert_eq!(items.params().total(), Some(4.0));
        assert_eq!(items.params().fraction(), Some(0.75));
        assert!(ProgressNotification::with_items("job", 5, 4).is_err());
        assert!(ProgressNotification::with_items("job", 0, 0).is_err());
    }

    #[test]
    fn integer_token_round_trip() {
        let n = ProgressNotification::start(42i64).unwrap();
        let value = serde_json::to_value(&n).unwrap();
        assert_eq!(value["params"]["progressToken"], json!(42));
        assert_eq!(
            ProgressNotification::from_value(value).unwrap().params().progress_token(),
            &ProgressToken::Number(42)
        );
    }

    #[test]
    fn decoded_progress_is_validated() {
        assert!(matches!(
            ProgressNotification::decode(
                br#"{"method":"notifications/progress","params":{"progressToken":1,"progress":5,"total":2}}"#
            ),
            Err(DecodeError::InvalidVariant { .. })
        ));
    }

    #[test]
    fn request_meta() {
        let meta = RequestMeta {
            progress_token: Some("abc".into()),
        };
        assert_eq!(
            serde_json::to_value(&meta).unwrap(),
            json!({"progressToken": "abc"})
        );
        assert_eq!(serde_json::to_value(RequestMeta::default()).unwrap(), json!({}));
    }
}
