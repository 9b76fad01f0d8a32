//! Small shared utilities for the provider adapters.

pub mod audio;
pub mod http_headers;
