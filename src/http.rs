//! Cancellable HTTP execution shared by every provider adapter.
//!
//! All adapter traffic funnels through [`get`]/[`post_json`]/[`post_body`];
//! the exchange races the request's cancellation signal, so a fired signal
//! drops the in-flight future (closing the connection) and surfaces
//! `Cancelled`.

use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::error::RelayError;
use crate::registry::CancelSignal;

/// Characters of a non-success body kept in the error message.
const PROVIDER_BODY_EXCERPT_CHARS: usize = 300;

/// A completed 2xx exchange.
#[derive(Debug)]
pub(crate) struct HttpResponse {
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// GET a resource and collect the raw response under the signal.
pub(crate) async fn get(
    client: &reqwest::Client,
    url: &str,
    headers: HeaderMap,
    signal: &CancelSignal,
) -> Result<HttpResponse, RelayError> {
    execute(client.get(url).headers(headers), signal).await
}

/// POST a JSON body and collect the raw response under the signal.
pub(crate) async fn post_json(
    client: &reqwest::Client,
    url: &str,
    headers: HeaderMap,
    body: &Value,
    signal: &CancelSignal,
) -> Result<HttpResponse, RelayError> {
    execute(client.post(url).headers(headers).json(body), signal).await
}

/// POST a preassembled text body (SSML) under the signal.
pub(crate) async fn post_body(
    client: &reqwest::Client,
    url: &str,
    headers: HeaderMap,
    body: String,
    signal: &CancelSignal,
) -> Result<HttpResponse, RelayError> {
    execute(client.post(url).headers(headers).body(body), signal).await
}

async fn execute(
    request: reqwest::RequestBuilder,
    signal: &CancelSignal,
) -> Result<HttpResponse, RelayError> {
    tokio::select! {
        _ = signal.cancelled() => Err(RelayError::Cancelled),
        result = exchange(request) => result,
    }
}

async fn exchange(request: reqwest::RequestBuilder) -> Result<HttpResponse, RelayError> {
    let response = request.send().await?;
    let status = response.status();
    let headers = response.headers().clone();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), "provider returned non-success status");
        return Err(RelayError::Provider {
            status: status.as_u16(),
            body: excerpt(&body),
        });
    }
    let body = response.bytes().await?;
    Ok(HttpResponse {
        headers,
        body: body.to_vec(),
    })
}

/// Decode a provider response body as JSON. A garbled success body is a
/// wire-level failure, not a provider-status failure.
pub(crate) fn parse_json(body: &[u8]) -> Result<Value, RelayError> {
    serde_json::from_slice(body)
        .map_err(|e| RelayError::Transport(format!("malformed provider response: {e}")))
}

fn excerpt(body: &str) -> String {
    body.chars().take(PROVIDER_BODY_EXCERPT_CHARS).collect()
}
