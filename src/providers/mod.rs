//! Provider adapters and the catalog that routes work items to them.
//!
//! Each adapter normalizes one provider's HTTP contract behind a small
//! capability trait. The gateway resolves adapters through the
//! [`AdapterCatalog`] map, so adding a provider means registering an
//! adapter, not editing dispatch code.

pub mod speech;
pub mod text;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::error::RelayError;
use crate::registry::CancelSignal;
use crate::types::{Capability, SpeechAudio, SpeechRequest, TextRequest, non_empty};

/// A text-generation provider contract.
#[async_trait]
pub trait TextAdapter: Send + Sync {
    /// Stable tag callers use to select this adapter.
    fn provider_tag(&self) -> &'static str;

    /// Presence checks that must pass before the request is registered;
    /// nothing may reach the network if these fail.
    fn validate(&self, request: &TextRequest) -> Result<(), RelayError>;

    /// Run the exchange and extract the generated text.
    async fn generate(
        &self,
        request: &TextRequest,
        http: &reqwest::Client,
        signal: &CancelSignal,
    ) -> Result<String, RelayError>;
}

/// A speech-synthesis provider contract.
#[async_trait]
pub trait SpeechAdapter: Send + Sync {
    fn provider_tag(&self) -> &'static str;

    fn validate(&self, request: &SpeechRequest) -> Result<(), RelayError>;

    /// Run the exchange and hand back transcoded audio plus its MIME type.
    async fn synthesize(
        &self,
        request: &SpeechRequest,
        http: &reqwest::Client,
        signal: &CancelSignal,
    ) -> Result<SpeechAudio, RelayError>;
}

/// Registered adapters, keyed by provider tag per capability.
pub struct AdapterCatalog {
    text: HashMap<&'static str, Arc<dyn TextAdapter>>,
    speech: HashMap<&'static str, Arc<dyn SpeechAdapter>>,
}

impl AdapterCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self {
            text: HashMap::new(),
            speech: HashMap::new(),
        }
    }

    /// The seven built-in adapters.
    pub fn with_builtin_adapters() -> Self {
        let mut catalog = Self::new();
        catalog.register_text(Arc::new(text::OpenAiTextAdapter));
        catalog.register_text(Arc::new(text::OpenAiCompatibleTextAdapter));
        catalog.register_text(Arc::new(text::AnthropicTextAdapter));
        catalog.register_speech(Arc::new(speech::OpenAiSpeechAdapter));
        catalog.register_speech(Arc::new(speech::OpenAiCompatibleSpeechAdapter));
        catalog.register_speech(Arc::new(speech::KokoroSpeechAdapter));
        catalog.register_speech(Arc::new(speech::AzureSpeechAdapter));
        catalog
    }

    /// Register (or replace) a text-generation adapter under its own tag.
    pub fn register_text(&mut self, adapter: Arc<dyn TextAdapter>) {
        self.text.insert(adapter.provider_tag(), adapter);
    }

    /// Register (or replace) a speech-synthesis adapter under its own tag.
    pub fn register_speech(&mut self, adapter: Arc<dyn SpeechAdapter>) {
        self.speech.insert(adapter.provider_tag(), adapter);
    }

    /// Resolve a text-generation adapter by tag.
    pub fn text(&self, provider: &str) -> Result<Arc<dyn TextAdapter>, RelayError> {
        self.text
            .get(provider)
            .cloned()
            .ok_or_else(|| RelayError::UnsupportedProvider {
                capability: Capability::TextGeneration,
                provider: provider.to_string(),
            })
    }

    /// Resolve a speech-synthesis adapter by tag.
    pub fn speech(&self, provider: &str) -> Result<Arc<dyn SpeechAdapter>, RelayError> {
        self.speech
            .get(provider)
            .cloned()
            .ok_or_else(|| RelayError::UnsupportedProvider {
                capability: Capability::SpeechSynthesis,
                provider: provider.to_string(),
            })
    }
}

impl Default for AdapterCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// A caller-supplied string field that must be present and non-blank.
pub(crate) fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, RelayError> {
    non_empty(value).ok_or_else(|| RelayError::missing_field(field))
}

/// A caller-supplied credential that must be present and non-empty.
pub(crate) fn required_key<'a>(
    value: Option<&'a SecretString>,
    field: &str,
) -> Result<&'a SecretString, RelayError> {
    value
        .filter(|key| !key.expose_secret().is_empty())
        .ok_or_else(|| RelayError::missing_field(field))
}
