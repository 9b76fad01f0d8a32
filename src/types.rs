//! Request and outcome types shared across the gateway and adapters.
//!
//! Inbound structs deserialize from camelCase message payloads; outcome
//! envelopes serialize back the same way. Credentials ride in
//! [`SecretString`] so accidental `Debug` output stays redacted.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, RelayError};

/// The two kinds of work the gateway dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    TextGeneration,
    SpeechSynthesis,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TextGeneration => "text-generation",
            Self::SpeechSynthesis => "speech-synthesis",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A text-generation work item.
///
/// Only `provider` is structurally required; everything else is validated
/// by the selected adapter so that missing fields surface as
/// `InvalidArgument` outcomes rather than deserialization failures.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextRequest {
    pub provider: String,
    /// Base URL override. Required for `openai-compatible`; optional for
    /// providers with a fixed API host.
    pub endpoint: Option<String>,
    pub credentials: Option<SecretString>,
    pub model: Option<String>,
    /// Instruction prepended to every call; defaults to the caption-rewrite
    /// prompt when absent or blank.
    pub system_prompt: Option<String>,
    pub user_prompt: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    /// Ask the provider to avoid typographic Unicode in its output
    /// (`openai` only).
    pub ascii_only: bool,
    /// Protocol revision header override (`anthropic` only).
    pub protocol_version: Option<String>,
    pub request_id: Option<String>,
    pub batch_id: Option<String>,
}

impl TextRequest {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            ..Self::default()
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_credentials(mut self, key: impl Into<String>) -> Self {
        self.credentials = Some(SecretString::from(key.into()));
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_user_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.user_prompt = Some(prompt.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_ascii_only(mut self, ascii_only: bool) -> Self {
        self.ascii_only = ascii_only;
        self
    }

    pub fn with_protocol_version(mut self, version: impl Into<String>) -> Self {
        self.protocol_version = Some(version.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_batch_id(mut self, batch_id: impl Into<String>) -> Self {
        self.batch_id = Some(batch_id.into());
        self
    }
}

/// A speech-synthesis work item.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpeechRequest {
    pub provider: String,
    pub text: Option<String>,
    pub voice: Option<String>,
    /// Synthesis model override (OpenAI-style providers).
    pub model: Option<String>,
    pub endpoint: Option<String>,
    /// URL path override (`kokoro-fastapi` only).
    pub path: Option<String>,
    /// Language hint (`kokoro-fastapi` only).
    pub lang: Option<String>,
    pub credentials: Option<SecretString>,
    /// Service region (`azure-tts` only).
    pub region: Option<String>,
    /// Preferred audio container: `mp3`, `wav`, or `ogg`.
    pub audio_format: Option<String>,
    pub request_id: Option<String>,
    pub batch_id: Option<String>,
}

impl SpeechRequest {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            ..Self::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    pub fn with_credentials(mut self, key: impl Into<String>) -> Self {
        self.credentials = Some(SecretString::from(key.into()));
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_audio_format(mut self, format: impl Into<String>) -> Self {
        self.audio_format = Some(format.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_batch_id(mut self, batch_id: impl Into<String>) -> Self {
        self.batch_id = Some(batch_id.into());
        self
    }
}

/// Synthesized audio, transcoded for text-safe transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechAudio {
    /// Base64 encoding of the binary audio body.
    pub audio_bytes: String,
    pub mime_type: String,
}

/// The uniform settlement envelope: exactly one per dispatch, success or
/// not. Cancellation is always distinguishable from failure via
/// `cancelled`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchOutcome<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<OutcomeError>,
    pub cancelled: bool,
}

impl<T> DispatchOutcome<T> {
    pub fn success(value: T) -> Self {
        Self {
            success: true,
            value: Some(value),
            error: None,
            cancelled: false,
        }
    }

    pub fn failure(error: &RelayError) -> Self {
        Self {
            success: false,
            value: None,
            error: Some(OutcomeError::from(error)),
            cancelled: matches!(error, RelayError::Cancelled),
        }
    }

    pub fn from_result(result: Result<T, RelayError>) -> Self {
        match result {
            Ok(value) => Self::success(value),
            Err(error) => Self::failure(&error),
        }
    }

    /// The taxonomy name of the failure, if any.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}

/// Failure details inside an outcome envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeError {
    pub kind: ErrorKind,
    pub message: String,
    /// HTTP status, present for `ProviderError` only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl From<&RelayError> for OutcomeError {
    fn from(error: &RelayError) -> Self {
        let status = match error {
            RelayError::Provider { status, .. } => Some(*status),
            _ => None,
        };
        Self {
            kind: error.kind(),
            message: error.to_string(),
            status,
        }
    }
}

/// Scope of a cancel call: a single request, a batch, or both.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CancelRequest {
    pub request_id: Option<String>,
    pub batch_id: Option<String>,
}

impl CancelRequest {
    pub fn for_request(request_id: impl Into<String>) -> Self {
        Self {
            request_id: Some(request_id.into()),
            batch_id: None,
        }
    }

    pub fn for_batch(batch_id: impl Into<String>) -> Self {
        Self {
            request_id: None,
            batch_id: Some(batch_id.into()),
        }
    }
}

/// Result of a cancel call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelOutcome {
    pub success: bool,
    pub cancelled_count: usize,
}

/// Treat blank strings as absent, preserving the original value otherwise.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_deserialize_from_camel_case() {
        let request: TextRequest = serde_json::from_value(serde_json::json!({
            "provider": "anthropic",
            "userPrompt": "Rewrite this line",
            "maxTokens": 256,
            "asciiOnly": true,
            "requestId": "batch-1:0:0",
            "batchId": "batch-1"
        }))
        .unwrap();
        assert_eq!(request.provider, "anthropic");
        assert_eq!(request.user_prompt.as_deref(), Some("Rewrite this line"));
        assert_eq!(request.max_tokens, Some(256));
        assert!(request.ascii_only);
        assert_eq!(request.request_id.as_deref(), Some("batch-1:0:0"));
    }

    #[test]
    fn missing_optionals_default_to_absent() {
        let request: SpeechRequest =
            serde_json::from_value(serde_json::json!({ "provider": "openai-tts" })).unwrap();
        assert!(request.text.is_none());
        assert!(request.voice.is_none());
        assert!(request.credentials.is_none());
    }

    #[test]
    fn outcome_serializes_taxonomy_names() {
        let outcome: DispatchOutcome<String> = DispatchOutcome::failure(&RelayError::Provider {
            status: 502,
            body: "bad gateway".into(),
        });
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["kind"], "ProviderError");
        assert_eq!(json["error"]["status"], 502);
        assert_eq!(json["cancelled"], false);
    }

    #[test]
    fn cancelled_failures_are_marked() {
        let outcome: DispatchOutcome<String> = DispatchOutcome::failure(&RelayError::Cancelled);
        assert!(!outcome.success);
        assert!(outcome.cancelled);
        assert_eq!(outcome.error_kind(), Some(ErrorKind::Cancelled));
    }

    #[test]
    fn success_envelope_carries_value_only() {
        let outcome = DispatchOutcome::success("rewritten".to_string());
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["value"], "rewritten");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn credentials_stay_redacted_in_debug_output() {
        let request = TextRequest::new("openai").with_credentials("sk-very-secret");
        let printed = format!("{request:?}");
        assert!(!printed.contains("sk-very-secret"));
    }

    #[test]
    fn blank_strings_count_as_absent() {
        assert_eq!(non_empty(Some("value")), Some("value"));
        assert_eq!(non_empty(Some("")), None);
        assert_eq!(non_empty(Some("   ")), None);
        assert_eq!(non_empty(None), None);
    }
}
