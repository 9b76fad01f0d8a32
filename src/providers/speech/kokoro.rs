//! Kokoro FastAPI speech adapter: a local, unauthenticated synthesis
//! server returning WAV by default.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::error::RelayError;
use crate::http;
use crate::providers::{SpeechAdapter, required};
use crate::registry::CancelSignal;
use crate::types::{SpeechAudio, SpeechRequest, non_empty};
use crate::utils::audio::{encode_audio, response_mime};
use crate::utils::http_headers::HeaderBuilder;

pub(crate) const DEFAULT_KOKORO_BASE: &str = "http://localhost:8000";
pub(crate) const DEFAULT_KOKORO_PATH: &str = "/tts";
const KOKORO_FALLBACK_MIME: &str = "audio/wav";

fn synthesis_url(request: &SpeechRequest) -> String {
    let base = non_empty(request.endpoint.as_deref()).unwrap_or(DEFAULT_KOKORO_BASE);
    let path = non_empty(request.path.as_deref()).unwrap_or(DEFAULT_KOKORO_PATH);
    format!("{}{}", base.trim_end_matches('/'), path)
}

fn build_body(request: &SpeechRequest, text: &str) -> Value {
    json!({
        "text": text,
        "voice": non_empty(request.voice.as_deref()).unwrap_or("default"),
        "lang": non_empty(request.lang.as_deref()).unwrap_or(""),
    })
}

pub struct KokoroSpeechAdapter;

#[async_trait]
impl SpeechAdapter for KokoroSpeechAdapter {
    fn provider_tag(&self) -> &'static str {
        "kokoro-fastapi"
    }

    fn validate(&self, request: &SpeechRequest) -> Result<(), RelayError> {
        required(request.text.as_deref(), "text")?;
        Ok(())
    }

    async fn synthesize(
        &self,
        request: &SpeechRequest,
        http: &reqwest::Client,
        signal: &CancelSignal,
    ) -> Result<SpeechAudio, RelayError> {
        let text = required(request.text.as_deref(), "text")?;
        let headers = HeaderBuilder::new().with_json_content_type().build();
        let body = build_body(request, text);

        let response =
            http::post_json(http, &synthesis_url(request), headers, &body, signal).await?;
        Ok(SpeechAudio {
            audio_bytes: encode_audio(&response.body),
            mime_type: response_mime(&response.headers, KOKORO_FALLBACK_MIME),
        })
    }
}
