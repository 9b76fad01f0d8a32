//! In-flight request registry with per-request and batch-scoped
//! cancellation.
//!
//! One registry instance is constructed per process and injected into the
//! gateway. Every mutation takes the single interior lock, so registration,
//! release, and cancellation are atomic with respect to each other; nothing
//! awaits while holding it.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio_util::sync::CancellationToken;

use crate::error::RelayError;
use crate::types::non_empty;

/// Observe-only view of a request's cancellation state.
///
/// Clones share the underlying token; only the registry can trigger it.
#[derive(Clone, Debug)]
pub struct CancelSignal {
    token: CancellationToken,
}

impl CancelSignal {
    /// A signal that never fires, for dispatches without a request id.
    pub fn never() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Check if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// A future that resolves when cancellation is requested.
    pub fn cancelled(&self) -> tokio_util::sync::WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }
}

/// Proof of registration, held for the lifetime of one dispatch.
///
/// Dropping the handle releases the registration, so a dispatch future
/// that is dropped mid-await (timed out, aborted) cannot strand its entry
/// in the registry.
#[derive(Debug)]
pub struct RequestHandle {
    request_id: String,
    signal: CancelSignal,
    registry: Arc<CancellationRegistry>,
}

impl RequestHandle {
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn signal(&self) -> &CancelSignal {
        &self.signal
    }
}

impl Drop for RequestHandle {
    fn drop(&mut self) {
        self.registry.release(&self.request_id);
    }
}

#[derive(Debug, Default)]
struct RegistryInner {
    /// Live request id → its cancellation token.
    handles: HashMap<String, CancellationToken>,
    /// Batch id → live member request ids.
    batches: HashMap<String, HashSet<String>>,
    /// Reverse membership: request id → batch id.
    memberships: HashMap<String, String>,
}

/// Tracks every in-flight request and owns the tokens that cancel them.
#[derive(Debug, Default)]
pub struct CancellationRegistry {
    inner: Mutex<RegistryInner>,
}

impl CancellationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request as in flight and hand back its handle. The handle
    /// keeps the registry alive and releases the registration when dropped.
    ///
    /// Blank request ids are rejected, as is an id that is already live:
    /// replacing a live entry would break the one-release-per-registration
    /// bookkeeping of the first dispatch.
    pub fn register(
        self: Arc<Self>,
        request_id: &str,
        batch_id: Option<&str>,
    ) -> Result<RequestHandle, RelayError> {
        if request_id.trim().is_empty() {
            return Err(RelayError::InvalidArgument(
                "request id must not be blank".into(),
            ));
        }
        let token = CancellationToken::new();
        {
            let mut inner = self.lock();
            if inner.handles.contains_key(request_id) {
                return Err(RelayError::InvalidArgument(format!(
                    "request id `{request_id}` is already in flight"
                )));
            }
            inner
                .handles
                .insert(request_id.to_string(), token.clone());
            if let Some(batch_id) = non_empty(batch_id) {
                inner
                    .batches
                    .entry(batch_id.to_string())
                    .or_default()
                    .insert(request_id.to_string());
                inner
                    .memberships
                    .insert(request_id.to_string(), batch_id.to_string());
            }
        }
        tracing::debug!(request_id = %request_id, batch_id = ?non_empty(batch_id), "request registered");
        Ok(RequestHandle {
            request_id: request_id.to_string(),
            signal: CancelSignal { token },
            registry: self,
        })
    }

    /// Remove a request without triggering its token. Idempotent: releasing
    /// an unknown or already-released id is a no-op.
    pub fn release(&self, request_id: &str) {
        let mut inner = self.lock();
        if Self::remove_entry(&mut inner, request_id).is_some() {
            tracing::debug!(request_id = %request_id, "request released");
        }
    }

    /// Trigger a request's cancellation signal and release its entry.
    /// Returns `false` for an unknown or already-settled id.
    pub fn cancel_request(&self, request_id: &str) -> bool {
        let mut inner = self.lock();
        Self::cancel_entry(&mut inner, request_id)
    }

    /// Cancel every live member of a batch, returning how many were
    /// actually cancelled. The membership is snapshotted first (members
    /// self-remove as they are cancelled) and the whole pass runs under one
    /// lock acquisition, so a racing registration either lands before the
    /// pass and is cancelled, or after it and survives.
    pub fn cancel_batch(&self, batch_id: &str) -> usize {
        let mut inner = self.lock();
        let Some(members) = inner.batches.get(batch_id) else {
            return 0;
        };
        let snapshot: Vec<String> = members.iter().cloned().collect();
        let mut cancelled = 0;
        for request_id in &snapshot {
            if Self::cancel_entry(&mut inner, request_id) {
                cancelled += 1;
            }
        }
        tracing::info!(batch_id = %batch_id, cancelled, "batch cancelled");
        cancelled
    }

    pub fn is_registered(&self, request_id: &str) -> bool {
        self.lock().handles.contains_key(request_id)
    }

    /// Number of live requests. Bounded by the number of live dispatch
    /// futures: every handle releases its entry when it drops.
    pub fn in_flight(&self) -> usize {
        self.lock().handles.len()
    }

    /// Live member count of a batch; 0 for an unknown batch.
    pub fn batch_size(&self, batch_id: &str) -> usize {
        self.lock()
            .batches
            .get(batch_id)
            .map(HashSet::len)
            .unwrap_or(0)
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().expect("cancellation registry lock poisoned")
    }

    fn cancel_entry(inner: &mut RegistryInner, request_id: &str) -> bool {
        match Self::remove_entry(inner, request_id) {
            Some(token) => {
                token.cancel();
                tracing::info!(request_id = %request_id, "request cancelled");
                true
            }
            None => false,
        }
    }

    fn remove_entry(inner: &mut RegistryInner, request_id: &str) -> Option<CancellationToken> {
        let token = inner.handles.remove(request_id)?;
        if let Some(batch_id) = inner.memberships.remove(request_id) {
            if let Some(members) = inner.batches.get_mut(&batch_id) {
                members.remove(request_id);
                if members.is_empty() {
                    inner.batches.remove(&batch_id);
                }
            }
        }
        Some(token)
    }
}
