//! Speech-synthesis adapters.

pub mod azure;
pub mod kokoro;
pub mod openai;

pub use azure::AzureSpeechAdapter;
pub use kokoro::KokoroSpeechAdapter;
pub use openai::{OpenAiCompatibleSpeechAdapter, OpenAiSpeechAdapter};
