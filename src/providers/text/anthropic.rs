//! Anthropic messages adapter.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::{Value, json};

use super::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, system_prompt};
use crate::error::RelayError;
use crate::http;
use crate::providers::{TextAdapter, required, required_key};
use crate::registry::CancelSignal;
use crate::types::{TextRequest, non_empty};
use crate::utils::http_headers::HeaderBuilder;

pub(crate) const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com";

/// Protocol revision sent unless the caller overrides it.
pub(crate) const DEFAULT_ANTHROPIC_VERSION: &str = "2023-06-01";

fn messages_url(base: &str) -> String {
    format!("{}/v1/messages", base.trim_end_matches('/'))
}

fn protocol_version(request: &TextRequest) -> &str {
    non_empty(request.protocol_version.as_deref()).unwrap_or(DEFAULT_ANTHROPIC_VERSION)
}

fn build_body(request: &TextRequest, model: &str, prompt: &str) -> Value {
    json!({
        "model": model,
        "max_tokens": request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        "temperature": request.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        "system": system_prompt(request),
        "messages": [{ "role": "user", "content": prompt }],
    })
}

/// The response text lives in `content[0].text`; missing fields collapse
/// to the empty string, matching the chat-completions extraction.
fn first_content_text(response: &Value) -> String {
    response
        .pointer("/content/0/text")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default()
        .to_string()
}

pub struct AnthropicTextAdapter;

#[async_trait]
impl TextAdapter for AnthropicTextAdapter {
    fn provider_tag(&self) -> &'static str {
        "anthropic"
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

        let base = non_empty(request.endpoint.as_deref()).unwrap_or(ANTHROPIC_API_BASE);
        let headers = HeaderBuilder::new()
            .with_json_content_type()
            .with_custom_auth("x-api-key", key.expose_secret())?
            .with_header("anthropic-version", protocol_version(request))?
            .build();
        let body = build_body(request, model, prompt);

        let response = http::post_json(http, &messages_url(base), headers, &body, signal).await?;
        let parsed = http::parse_json(&response.body)?;
        Ok(first_content_text(&parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_puts_system_at_top_level_with_single_user_message() {
        let request = TextRequest::new("anthropic");
        let body = build_body(&request, "claude-3-5-haiku-latest", "Rewrite me");

        assert_eq!(body["model"], "claude-3-5-haiku-latest");
        assert_eq!(body["max_tokens"], json!(1024));
        assert_eq!(body["temperature"], json!(0.3));
        assert_eq!(body["system"], super::super::DEFAULT_SYSTEM_PROMPT);
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["content"], "Rewrite me");
    }

    #[test]
    fn protocol_version_defaults_and_overrides() {
        let request = TextRequest::new("anthropic");
        assert_eq!(protocol_version(&request), "2023-06-01");

        let pinned = TextRequest::new("anthropic").with_protocol_version("2024-10-22");
        assert_eq!(protocol_version(&pinned), "2024-10-22");

        let blank = TextRequest::new("anthropic").with_protocol_version("  ");
        assert_eq!(protocol_version(&blank), "2023-06-01");
    }

    #[test]
    fn content_extraction_tolerates_missing_fields() {
        let response = json!({ "content": [{ "type": "text", "text": " done " }] });
        assert_eq!(first_content_text(&response), "done");
        assert_eq!(first_content_text(&json!({ "content": [] })), "");
        assert_eq!(first_content_text(&json!({})), "");
    }

    #[test]
    fn messages_url_handles_trailing_slash() {
        assert_eq!(
            messages_url("http://127.0.0.1:9999/"),
            "http://127.0.0.1:9999/v1/messages"
        );
        assert_eq!(
            messages_url(ANTHROPIC_API_BASE),
            "https://api.anthropic.com/v1/messages"
        );
    }
}
