//! OpenAI chat-completions adapter.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::{Map, Value, json};

use super::{
    DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, chat_completions_url, chat_messages,
    first_choice_text, system_prompt,
};
use crate::error::RelayError;
use crate::http;
use crate::providers::{TextAdapter, required, required_key};
use crate::registry::CancelSignal;
use crate::types::{TextRequest, non_empty};
use crate::utils::http_headers::HeaderBuilder;

pub(crate) const OPENAI_API_BASE: &str = "https://api.openai.com";

/// Typographic Unicode suppressed when the caller asks for ASCII-only
/// output: dashes, ellipsis, curly and angle quotes, nbsp, bullets,
/// arrows, and the ™ ® © marks.
const ASCII_BIAS_CHARS: [&str; 21] = [
    "\u{2014}", "\u{2013}", "\u{2026}", "\u{201C}", "\u{201D}", "\u{2018}", "\u{2019}",
    "\u{201E}", "\u{201A}", "\u{00AB}", "\u{00BB}", "\u{00A0}", "\u{2022}", "\u{2027}",
    "\u{2192}", "\u{2190}", "\u{2191}", "\u{2193}", "\u{2122}", "\u{00AE}", "\u{00A9}",
];

fn ascii_logit_bias() -> Value {
    let map: Map<String, Value> = ASCII_BIAS_CHARS
        .iter()
        .map(|ch| (ch.to_string(), json!(-100)))
        .collect();
    Value::Object(map)
}

fn build_body(request: &TextRequest, model: &str, prompt: &str) -> Value {
    let mut body = json!({
        "model": model,
        "temperature": request.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        "max_tokens": request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        "messages": chat_messages(system_prompt(request), prompt),
        "response_format": { "type": "text" },
    });
    if request.ascii_only {
        body["logit_bias"] = ascii_logit_bias();
    }
    body
}

/// Adapter for the hosted OpenAI API.
pub struct OpenAiTextAdapter;

#[async_trait]
impl TextAdapter for OpenAiTextAdapter {
    fn provider_tag(&self) -> &'static str {
        "openai"
    }

    fn validate(&self, request: &TextRequest) -> Result<(), RelayError> {
        required(request.model.as_deref(), "model")?;
        required(request.user_prompt.as_deref(), "userPrompt")?;
        required_key(request.credentials.as_ref(), "credentials")?;
        Ok(())
    }

    async fn generate(
        &self,
        request: &TextRequest,
        http: &reqwest::Client,
        signal: &CancelSignal,
    ) -> Result<String, RelayError> {
        let model = required(request.model.as_deref(), "model")?;
        let prompt = required(request.user_prompt.as_deref(), "userPrompt")?;
        let key = required_key(request.credentials.as_ref(), "credentials")?;

        let base = non_empty(request.endpoint.as_deref()).unwrap_or(OPENAI_API_BASE);
        let headers = HeaderBuilder::new()
            .with_json_content_type()
            .with_bearer_auth(key.expose_secret())?
            .build();
        let body = build_body(request, model, prompt);

        let response =
            http::post_json(http, &chat_completions_url(base), headers, &body, signal).await?;
        let parsed = http::parse_json(&response.body)?;
        Ok(first_choice_text(&parsed))
    }
}
