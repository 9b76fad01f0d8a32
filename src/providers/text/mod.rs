//! Text-generation adapters: caption rewriting over chat-completion APIs.

pub mod anthropic;
pub mod openai;
pub mod openai_compatible;

pub use anthropic::AnthropicTextAdapter;
pub use openai::OpenAiTextAdapter;
pub use openai_compatible::OpenAiCompatibleTextAdapter;

use serde_json::{Value, json};

use crate::types::{TextRequest, non_empty};

/// Instruction sent when the caller supplies no system prompt.
pub(crate) const DEFAULT_SYSTEM_PROMPT: &str =
    "You rewrite captions carefully. Output only the rewritten line.";

pub(crate) const DEFAULT_TEMPERATURE: f64 = 0.3;
pub(crate) const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Chat-completions endpoint under a base URL, trailing slashes trimmed.
pub(crate) fn chat_completions_url(base: &str) -> String {
    format!("{}/v1/chat/completions", base.trim_end_matches('/'))
}

/// The fixed two-message conversation: system instruction plus user line.
pub(crate) fn chat_messages(system: &str, user: &str) -> Value {
    json!([
        { "role": "system", "content": system },
        { "role": "user", "content": user },
    ])
}

pub(crate) fn system_prompt(request: &TextRequest) -> &str {
    non_empty(request.system_prompt.as_deref()).unwrap_or(DEFAULT_SYSTEM_PROMPT)
}

/// Pull the first choice's message text out of a chat-completions
/// response; a missing field yields the empty string rather than an error.
pub(crate) fn first_choice_text(response: &Value) -> String {
    response
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default()
        .to_string()
}
