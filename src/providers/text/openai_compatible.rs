//! Adapter for self-hosted or third-party OpenAI-compatible chat APIs.
//!
//! Same wire shape as the hosted adapter minus the OpenAI-only extras
//! (`response_format`, `logit_bias`); the caller must supply the endpoint
//! and may omit credentials for unauthenticated local servers.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::{Value, json};

use super::{
    DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, chat_completions_url, chat_messages,
    first_choice_text, system_prompt,
};
use crate::error::RelayError;
use crate::http;
use crate::providers::{TextAdapter, required};
use crate::registry::CancelSignal;
use crate::types::TextRequest;
use crate::utils::http_headers::HeaderBuilder;

fn build_body(request: &TextRequest, model: &str, prompt: &str) -> Value {
    json!({
        "model": model,
        "temperature": request.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        "max_tokens": request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        "messages": chat_messages(system_prompt(request), prompt),
    })
}

pub struct OpenAiCompatibleTextAdapter;

#[async_trait]
impl TextAdapter for OpenAiCompatibleTextAdapter {
    fn provider_tag(&self) -> &'static str {
        "openai-compatible"
    }

    fn validate(&self, request: &TextRequest) -> Result<(), RelayError> {
        required(request.endpoint.as_deref(), "endpoint")?;
        required(request.model.as_deref(), "model")?;
        required(request.user_prompt.as_deref(), "userPrompt")?;
        Ok(())
    }

    async fn generate(
        &self,
        request: &TextRequest,
        http: &reqwest::Client,
        signal: &CancelSignal,
    ) -> Result<String, RelayError> {
        let base = required(request.endpoint.as_deref(), "endpoint")?;
        let model = required(request.model.as_deref(), "model")?;
        let prompt = required(request.user_prompt.as_deref(), "userPrompt")?;

        let mut headers = HeaderBuilder::new().with_json_content_type();
        if let Some(key) = &request.credentials {
            if !key.expose_secret().is_empty() {
                headers = headers.with_bearer_auth(key.expose_secret())?;
            }
        }
        let body = build_body(request, model, prompt);

        let response = http::post_json(
            http,
            &chat_completions_url(base),
            headers.build(),
            &body,
            signal,
        )
        .await?;
        let parsed = http::parse_json(&response.body)?;
        Ok(first_choice_text(&parsed))
    }
}
