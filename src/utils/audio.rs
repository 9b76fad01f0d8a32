//! Audio container negotiation and payload transcoding.

use base64::Engine;
use reqwest::header::{CONTENT_TYPE, HeaderMap};

/// Containers callers may request. Anything else normalizes to [`Mp3`].
///
/// [`Mp3`]: AudioFormat::Mp3
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AudioFormat {
    Mp3,
    Wav,
    Ogg,
}

impl AudioFormat {
    /// Map a caller's preference (case-insensitive) onto a supported
    /// container, falling back to `mp3` for absent or unrecognized values.
    pub fn negotiate(requested: Option<&str>) -> Self {
        match requested.map(str::to_ascii_lowercase).as_deref() {
            Some("wav") => Self::Wav,
            Some("ogg") => Self::Ogg,
            _ => Self::Mp3,
        }
    }

    /// The value sent to the provider.
    pub fn wire_value(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::Ogg => "ogg",
        }
    }

    /// MIME type assumed when the provider does not declare one.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Wav => "audio/wav",
            Self::Ogg => "audio/ogg",
        }
    }
}

/// The MIME type to report for a synthesis response: the provider's
/// `content-type` header when present, the negotiated fallback otherwise.
pub(crate) fn response_mime(headers: &HeaderMap, fallback: &str) -> String {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}

/// Base64-encode binary audio for text-safe transport.
pub(crate) fn encode_audio(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn wav_maps_to_wav_wire_value_and_mime() {
        let format = AudioFormat::negotiate(Some("wav"));
        assert_eq!(format, AudioFormat::Wav);
        assert_eq!(format.wire_value(), "wav");
        assert_eq!(format.mime_type(), "audio/wav");
    }

    #[test]
    fn unrecognized_format_falls_back_to_mp3() {
        let format = AudioFormat::negotiate(Some("flac"));
        assert_eq!(format, AudioFormat::Mp3);
        assert_eq!(format.wire_value(), "mp3");
        assert_eq!(format.mime_type(), "audio/mpeg");
    }

    #[test]
    fn negotiation_is_case_insensitive_and_defaults_to_mp3() {
        assert_eq!(AudioFormat::negotiate(Some("WAV")), AudioFormat::Wav);
        assert_eq!(AudioFormat::negotiate(Some("Ogg")), AudioFormat::Ogg);
        assert_eq!(AudioFormat::negotiate(None), AudioFormat::Mp3);
    }

    #[test]
    fn content_type_header_wins_over_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("audio/ogg"));
        assert_eq!(response_mime(&headers, "audio/mpeg"), "audio/ogg");
        assert_eq!(response_mime(&HeaderMap::new(), "audio/mpeg"), "audio/mpeg");
    }

    #[test]
    fn audio_bytes_are_base64_encoded() {
        assert_eq!(encode_audio(b"abc"), "YWJj");
    }
}
