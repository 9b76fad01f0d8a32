//! # Restyle Relay - Cancellable Provider Dispatch
//!
//! Restyle Relay mediates between a caption-rewriting front end and the
//! external providers that do the work: LLM chat-completion APIs for text
//! and TTS APIs for speech. It owns the request lifecycle so callers never
//! have to: validate, register for cancellation, invoke, settle.
//!
//! ## Design
//!
//! - **Uniform settlement**: every dispatch resolves to a
//!   [`DispatchOutcome`] envelope; provider failures, transport faults, and
//!   cancellation are data, never panics.
//! - **Cooperative cancellation**: in-flight requests register with the
//!   [`CancellationRegistry`] and race their HTTP exchange against a cancel
//!   signal, individually or as a batch.
//! - **Wire fidelity**: each adapter reproduces its provider's HTTP
//!   contract exactly - URLs, headers, and body shapes - so the relay can
//!   stand in for a direct integration.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use restyle_relay::{CancellationRegistry, DispatchGateway, TextRequest};
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = Arc::new(CancellationRegistry::new());
//!     let gateway = DispatchGateway::new(registry);
//!
//!     let request = TextRequest::new("openai")
//!         .with_credentials("your-api-key")
//!         .with_model("gpt-4o-mini")
//!         .with_user_prompt("so i was like, whatever")
//!         .with_request_id("caption-42");
//!
//!     let outcome = gateway.dispatch_text(request).await;
//!     if let Some(text) = outcome.value {
//!         println!("{text}");
//!     }
//! }
//! ```

#![deny(unsafe_code)]

pub mod error;
pub mod gateway;
pub mod providers;
pub mod registry;
pub mod types;

mod http;
mod utils;

pub use error::{ErrorKind, RelayError};
pub use gateway::DispatchGateway;
pub use registry::{CancelSignal, CancellationRegistry, RequestHandle};
pub use types::{
    CancelOutcome, CancelRequest, Capability, DispatchOutcome, OutcomeError, SpeechAudio,
    SpeechRequest, TextRequest,
};
