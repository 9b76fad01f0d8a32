//! HTTP header construction for provider requests.
//!
//! Header values derived from caller input (API keys, version overrides)
//! can be malformed; those inserts are fallible and reject with
//! `InvalidArgument` before anything reaches the network.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};

use crate::error::RelayError;

/// HTTP header builder for provider requests.
pub(crate) struct HeaderBuilder {
    headers: HeaderMap,
}

impl HeaderBuilder {
    pub fn new() -> Self {
        Self {
            headers: HeaderMap::new(),
        }
    }

    /// Add Bearer token authorization.
    pub fn with_bearer_auth(mut self, token: &str) -> Result<Self, RelayError> {
        let auth_value = format!("Bearer {token}");
        self.headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth_value)
                .map_err(|e| RelayError::InvalidArgument(format!("invalid API key format: {e}")))?,
        );
        Ok(self)
    }

    /// Add a custom authorization header (e.g. `x-api-key`,
    /// `Ocp-Apim-Subscription-Key`). The value never appears in errors.
    pub fn with_custom_auth(mut self, header_name: &str, value: &str) -> Result<Self, RelayError> {
        let header_name = HeaderName::from_bytes(header_name.as_bytes()).map_err(|e| {
            RelayError::InvalidArgument(format!("invalid header name '{header_name}': {e}"))
        })?;
        self.headers.insert(
            header_name,
            HeaderValue::from_str(value)
                .map_err(|e| RelayError::InvalidArgument(format!("invalid header value: {e}")))?,
        );
        Ok(self)
    }

    /// Add JSON content type.
    pub fn with_json_content_type(mut self) -> Self {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self
    }

    /// Add SSML content type.
    pub fn with_ssml_content_type(mut self) -> Self {
        self.headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/ssml+xml"),
        );
        self
    }

    /// Add user agent.
    pub fn with_user_agent(mut self, user_agent: &str) -> Result<Self, RelayError> {
        self.headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .map_err(|e| RelayError::InvalidArgument(format!("invalid user agent: {e}")))?,
        );
        Ok(self)
    }

    /// Add a custom header.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, RelayError> {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| RelayError::InvalidArgument(format!("invalid header name '{name}': {e}")))?;
        self.headers.insert(
            header_name,
            HeaderValue::from_str(value).map_err(|e| {
                RelayError::InvalidArgument(format!("invalid header value '{value}': {e}"))
            })?,
        );
        Ok(self)
    }

    /// Build the final HeaderMap.
    pub fn build(self) -> HeaderMap {
        self.headers
    }
}

impl Default for HeaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}
