//! Azure Cognitive Services speech adapter.
//!
//! Region-addressed host, subscription-key auth, SSML request body. This
//! variant takes no audio-format parameter: the output encoding is pinned
//! and only the response's `content-type` can refine the reported MIME.
//! The adapter also serves the region's voice catalog, which callers use
//! to populate voice pickers.

use async_trait::async_trait;
use secrecy::ExposeSecret;

use crate::error::RelayError;
use crate::http;
use crate::providers::{SpeechAdapter, required, required_key};
use crate::registry::CancelSignal;
use crate::types::{SpeechAudio, SpeechRequest, non_empty};
use crate::utils::audio::{encode_audio, response_mime};
use crate::utils::http_headers::HeaderBuilder;

pub(crate) const DEFAULT_AZURE_VOICE: &str = "en-US-JennyNeural";
const AZURE_OUTPUT_FORMAT: &str = "audio-24khz-96kbitrate-mono-mp3";
const AZURE_FALLBACK_MIME: &str = "audio/mpeg";
const USER_AGENT: &str = concat!("restyle-relay/", env!("CARGO_PKG_VERSION"));

/// Escape the five XML special characters in one pass.
pub(crate) fn escape_ssml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Assemble the SSML document and collapse all whitespace runs, so the
/// payload (text included) goes out as a single line.
fn build_ssml(voice: &str, text: &str) -> String {
    let document = format!(
        r#"<speak version="1.0" xml:lang="en-US"><voice name="{voice}"><prosody rate="0%" pitch="0%">{}</prosody></voice></speak>"#,
        escape_ssml(text)
    );
    document.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn synthesis_url(request: &SpeechRequest, region: &str) -> String {
    match non_empty(request.endpoint.as_deref()) {
        Some(endpoint) => format!(
            "{}/cognitiveservices/v1",
            endpoint.trim_end_matches('/')
        ),
        None => format!("https://{region}.tts.speech.microsoft.com/cognitiveservices/v1"),
    }
}

fn voices_url(request: &SpeechRequest, region: &str) -> String {
    match non_empty(request.endpoint.as_deref()) {
        Some(endpoint) => format!(
            "{}/cognitiveservices/voices/list",
            endpoint.trim_end_matches('/')
        ),
        None => {
            format!("https://{region}.tts.speech.microsoft.com/cognitiveservices/voices/list")
        }
    }
}

pub struct AzureSpeechAdapter;

impl AzureSpeechAdapter {
    /// Fetch the region's voice catalog and pass the service's JSON list
    /// through untouched.
    ///
    /// Needs `region` and `credentials`; `text` plays no part here. The
    /// `endpoint` override redirects the lookup the same way it redirects
    /// synthesis.
    pub async fn list_voices(
        &self,
        request: &SpeechRequest,
        http: &reqwest::Client,
        signal: &CancelSignal,
    ) -> Result<serde_json::Value, RelayError> {
        let region = required(request.region.as_deref(), "region")?;
        let key = required_key(request.credentials.as_ref(), "credentials")?;

        let headers = HeaderBuilder::new()
            .with_custom_auth("Ocp-Apim-Subscription-Key", key.expose_secret())?
            .with_user_agent(USER_AGENT)?
            .build();
        let response = http::get(http, &voices_url(request, region), headers, signal).await?;
        http::parse_json(&response.body)
    }
}

#[async_trait]
impl SpeechAdapter for AzureSpeechAdapter {
    fn provider_tag(&self) -> &'static str {
        "azure-tts"
    }

    fn validate(&self, request: &SpeechRequest) -> Result<(), RelayError> {
        required(request.text.as_deref(), "text")?;
        required(request.region.as_deref(), "region")?;
        required_key(request.credentials.as_ref(), "credentials")?;
        Ok(())
    }

    async fn synthesize(
        &self,
        request: &SpeechRequest,
        http: &reqwest::Client,
        signal: &CancelSignal,
    ) -> Result<SpeechAudio, RelayError> {
        let text = required(request.text.as_deref(), "text")?;
        let region = required(request.region.as_deref(), "region")?;
        let key = required_key(request.credentials.as_ref(), "credentials")?;

        let voice = non_empty(request.voice.as_deref()).unwrap_or(DEFAULT_AZURE_VOICE);
        let headers = HeaderBuilder::new()
            .with_ssml_content_type()
            .with_custom_auth("Ocp-Apim-Subscription-Key", key.expose_secret())?
            .with_header("X-Microsoft-OutputFormat", AZURE_OUTPUT_FORMAT)?
            .with_user_agent(USER_AGENT)?
            .build();

        let response = http::post_body(
            http,
            &synthesis_url(request, region),
            headers,
            build_ssml(voice, text),
            signal,
        )
        .await?;
        Ok(SpeechAudio {
            audio_bytes: encode_audio(&response.body),
            mime_type: response_mime(&response.headers, AZURE_FALLBACK_MIME),
        })
    }
}
