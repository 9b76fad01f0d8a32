//! OpenAI-style speech synthesis: the hosted API and compatible servers.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};

use crate::error::RelayError;
use crate::http;
use crate::providers::text::openai::OPENAI_API_BASE;
use crate::providers::{SpeechAdapter, required, required_key};
use crate::registry::CancelSignal;
use crate::types::{SpeechAudio, SpeechRequest, non_empty};
use crate::utils::audio::{AudioFormat, encode_audio, response_mime};
use crate::utils::http_headers::HeaderBuilder;

pub(crate) const DEFAULT_SPEECH_MODEL: &str = "gpt-4o-mini-tts";
pub(crate) const DEFAULT_VOICE: &str = "alloy";

fn speech_url(base: &str) -> String {
    format!("{}/v1/audio/speech", base.trim_end_matches('/'))
}

fn build_body(request: &SpeechRequest, text: &str, format: AudioFormat) -> Value {
    json!({
        "model": non_empty(request.model.as_deref()).unwrap_or(DEFAULT_SPEECH_MODEL),
        "voice": non_empty(request.voice.as_deref()).unwrap_or(DEFAULT_VOICE),
        "input": text,
        "format": format.wire_value(),
    })
}

async fn synthesize_at(
    base: &str,
    bearer: Option<&SecretString>,
    request: &SpeechRequest,
    http: &reqwest::Client,
    signal: &CancelSignal,
) -> Result<SpeechAudio, RelayError> {
    let text = required(request.text.as_deref(), "text")?;
    let format = AudioFormat::negotiate(request.audio_format.as_deref());

    let mut headers = HeaderBuilder::new().with_json_content_type();
    if let Some(key) = bearer {
        headers = headers.with_bearer_auth(key.expose_secret())?;
    }
    let body = build_body(request, text, format);

    let response = http::post_json(http, &speech_url(base), headers.build(), &body, signal).await?;
    Ok(SpeechAudio {
        audio_bytes: encode_audio(&response.body),
        mime_type: response_mime(&response.headers, format.mime_type()),
    })
}

/// Adapter for the hosted OpenAI speech API.
pub struct OpenAiSpeechAdapter;

#[async_trait]
impl SpeechAdapter for OpenAiSpeechAdapter {
    fn provider_tag(&self) -> &'static str {
        "openai-tts"
    }

    fn validate(&self, request: &SpeechRequest) -> Result<(), RelayError> {
        required(request.text.as_deref(), "text")?;
        required_key(request.credentials.as_ref(), "credentials")?;
        Ok(())
    }

    async fn synthesize(
        &self,
        request: &SpeechRequest,
        http: &reqwest::Client,
        signal: &CancelSignal,
    ) -> Result<SpeechAudio, RelayError> {
        let key = required_key(request.credentials.as_ref(), "credentials")?;
        let base = non_empty(request.endpoint.as_deref()).unwrap_or(OPENAI_API_BASE);
        synthesize_at(base, Some(key), request, http, signal).await
    }
}

/// Adapter for self-hosted speech servers speaking the same contract;
/// credentials are optional.
pub struct OpenAiCompatibleSpeechAdapter;

#[async_trait]
impl SpeechAdapter for OpenAiCompatibleSpeechAdapter {
    fn provider_tag(&self) -> &'static str {
        "openai-compatible-tts"
    }

    fn validate(&self, request: &SpeechRequest) -> Result<(), RelayError> {
        required(request.endpoint.as_deref(), "endpoint")?;
        required(request.text.as_deref(), "text")?;
        Ok(())
    }

    async fn synthesize(
        &self,
        request: &SpeechRequest,
        http: &reqwest::Client,
        signal: &CancelSignal,
    ) -> Result<SpeechAudio, RelayError> {
        let base = required(request.endpoint.as_deref(), "endpoint")?;
        let bearer = request
            .credentials
            .as_ref()
            .filter(|key| !key.expose_secret().is_empty());
        synthesize_at(base, bearer, request, http, signal).await
    }
}
