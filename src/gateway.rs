//! Dispatch gateway: the single entry point that carries a work item from
//! validation through provider invocation to settlement.
//!
//! Every dispatch follows the same lifecycle: resolve the adapter, validate
//! the request, register it for cancellation, run the exchange racing the
//! cancel signal, then release the registration no matter how the exchange
//! ended. Callers always get back a [`DispatchOutcome`]; errors never
//! surface as panics or bare `Result`s.

use std::sync::Arc;
use std::time::Instant;

use crate::error::RelayError;
use crate::providers::speech::AzureSpeechAdapter;
use crate::providers::{AdapterCatalog, SpeechAdapter};
use crate::registry::{CancelSignal, CancellationRegistry, RequestHandle};
use crate::types::{
    CancelOutcome, CancelRequest, Capability, DispatchOutcome, SpeechAudio, SpeechRequest,
    TextRequest, non_empty,
};

/// Mediates between callers and provider adapters.
///
/// Cheap to share behind an [`Arc`]; all state lives in the registry and
/// the pooled HTTP client.
pub struct DispatchGateway {
    http: reqwest::Client,
    registry: Arc<CancellationRegistry>,
    adapters: AdapterCatalog,
}

impl DispatchGateway {
    /// Gateway over the built-in adapters with a default HTTP client.
    pub fn new(registry: Arc<CancellationRegistry>) -> Self {
        Self {
            http: reqwest::Client::new(),
            registry,
            adapters: AdapterCatalog::with_builtin_adapters(),
        }
    }

    /// Swap in a preconfigured HTTP client (timeouts, proxy, TLS options).
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Swap in a custom adapter catalog.
    pub fn with_adapters(mut self, adapters: AdapterCatalog) -> Self {
        self.adapters = adapters;
        self
    }

    /// The registry this gateway registers dispatches with.
    pub fn registry(&self) -> &Arc<CancellationRegistry> {
        &self.registry
    }

    /// Dispatch a text-generation request and settle it into an outcome.
    pub async fn dispatch_text(&self, request: TextRequest) -> DispatchOutcome<String> {
        let capability = Capability::TextGeneration;
        let started = Instant::now();
        let adapter = match self.adapters.text(&request.provider) {
            Ok(adapter) => adapter,
            Err(error) => return Self::reject(capability, &request.provider, &error),
        };
        if let Err(error) = adapter.validate(&request) {
            return Self::reject(capability, &request.provider, &error);
        }
        let (handle, signal) =
            match self.checkout(request.request_id.as_deref(), request.batch_id.as_deref()) {
                Ok(checkout) => checkout,
                Err(error) => return Self::reject(capability, &request.provider, &error),
            };

        let result = adapter.generate(&request, &self.http, &signal).await;
        Self::settle(capability, &request.provider, handle, &result, started);
        DispatchOutcome::from_result(result)
    }

    /// Dispatch a speech-synthesis request and settle it into an outcome.
    pub async fn dispatch_speech(&self, request: SpeechRequest) -> DispatchOutcome<SpeechAudio> {
        let capability = Capability::SpeechSynthesis;
        let started = Instant::now();
        let adapter = match self.adapters.speech(&request.provider) {
            Ok(adapter) => adapter,
            Err(error) => return Self::reject(capability, &request.provider, &error),
        };
        if let Err(error) = adapter.validate(&request) {
            return Self::reject(capability, &request.provider, &error);
        }
        let (handle, signal) =
            match self.checkout(request.request_id.as_deref(), request.batch_id.as_deref()) {
                Ok(checkout) => checkout,
                Err(error) => return Self::reject(capability, &request.provider, &error),
            };

        let result = adapter.synthesize(&request, &self.http, &signal).await;
        Self::settle(capability, &request.provider, handle, &result, started);
        DispatchOutcome::from_result(result)
    }

    /// Fetch the Azure voice catalog and settle it into the same outcome
    /// envelope as a dispatch.
    ///
    /// Catalog lookups are short-lived reads: they are not registered for
    /// cancellation, and any request or batch id on the request is ignored.
    pub async fn list_azure_voices(
        &self,
        request: SpeechRequest,
    ) -> DispatchOutcome<serde_json::Value> {
        let started = Instant::now();
        let adapter = AzureSpeechAdapter;
        let result = adapter
            .list_voices(&request, &self.http, &CancelSignal::never())
            .await;
        Self::settle(
            Capability::SpeechSynthesis,
            adapter.provider_tag(),
            None,
            &result,
            started,
        );
        DispatchOutcome::from_result(result)
    }

    /// Cancel an in-flight request, a batch, or both.
    ///
    /// Always reports success; `cancelled_count` says how many live
    /// dispatches were actually interrupted. A call naming neither scope is
    /// a no-op.
    pub fn cancel(&self, request: CancelRequest) -> CancelOutcome {
        let request_id = non_empty(request.request_id.as_deref());
        let batch_id = non_empty(request.batch_id.as_deref());
        if request_id.is_none() && batch_id.is_none() {
            tracing::warn!("cancel call named neither a request nor a batch");
            return CancelOutcome {
                success: true,
                cancelled_count: 0,
            };
        }

        let mut cancelled_count = 0;
        if let Some(request_id) = request_id {
            if self.registry.cancel_request(request_id) {
                cancelled_count += 1;
            }
        }
        if let Some(batch_id) = batch_id {
            cancelled_count += self.registry.cancel_batch(batch_id);
        }
        CancelOutcome {
            success: true,
            cancelled_count,
        }
    }

    /// Register the request if it carries an id; otherwise hand back a
    /// signal that never fires. Blank ids count as absent.
    fn checkout(
        &self,
        request_id: Option<&str>,
        batch_id: Option<&str>,
    ) -> Result<(Option<RequestHandle>, CancelSignal), RelayError> {
        match non_empty(request_id) {
            Some(request_id) => {
                let handle = Arc::clone(&self.registry).register(request_id, batch_id)?;
                let signal = handle.signal().clone();
                Ok((Some(handle), signal))
            }
            None => Ok((None, CancelSignal::never())),
        }
    }

    /// Log how the dispatch ended. The handle, when present, releases its
    /// registration as it drops here; if the dispatch future is dropped
    /// before reaching this point, the handle drops with it and releases
    /// the registration all the same.
    fn settle<T>(
        capability: Capability,
        provider: &str,
        handle: Option<RequestHandle>,
        result: &Result<T, RelayError>,
        started: Instant,
    ) {
        drop(handle);
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match result {
            Ok(_) => {
                tracing::debug!(capability = %capability, provider = %provider, elapsed_ms, "dispatch completed");
            }
            Err(RelayError::Cancelled) => {
                tracing::debug!(capability = %capability, provider = %provider, elapsed_ms, "dispatch cancelled");
            }
            Err(error) => {
                tracing::warn!(capability = %capability, provider = %provider, elapsed_ms, error = %error, "dispatch failed");
            }
        }
    }

    /// Settle a request that never reached the adapter.
    fn reject<T>(capability: Capability, provider: &str, error: &RelayError) -> DispatchOutcome<T> {
        tracing::warn!(capability = %capability, provider = %provider, error = %error, "dispatch rejected");
        DispatchOutcome::failure(error)
    }
}
