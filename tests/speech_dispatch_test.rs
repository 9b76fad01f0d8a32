//! End-to-end dispatch tests for the speech-synthesis adapters.
//!
//! Each provider's wire contract is pinned against a mock server: URL
//! path, auth headers, body shape, and how the returned audio is encoded
//! and typed for the caller.

use std::sync::Arc;

use restyle_relay::{CancellationRegistry, DispatchGateway, ErrorKind, SpeechRequest};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway() -> DispatchGateway {
    DispatchGateway::new(Arc::new(CancellationRegistry::new()))
}

#[tokio::test]
async fn openai_tts_sends_documented_body_and_encodes_audio() {
    let server = MockServer::start().await;

    // Model, voice, and format all defaulted; the format field is
    // literally named `format` on this wire.
    let expected_body = json!({
        "model": "gpt-4o-mini-tts",
        "voice": "alloy",
        "input": "hello there",
        "format": "mp3"
    });

    Mock::given(method("POST"))
        .and(path("/v1/audio/speech"))
        .and(header("authorization", "Bearer test-api-key"))
        .and(header("content-type", "application/json"))
        .and(body_json(expected_body))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"abc".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let request = SpeechRequest::new("openai-tts")
        .with_endpoint(server.uri())
        .with_credentials("test-api-key")
        .with_text("hello there");
    let outcome = gateway().dispatch_speech(request).await;

    assert!(outcome.success);
    let audio = outcome.value.unwrap();
    assert_eq!(audio.audio_bytes, "YWJj"); // base64 of b"abc"
    // No content-type on the response: fall back to the negotiated format.
    assert_eq!(audio.mime_type, "audio/mpeg");
}

#[tokio::test]
async fn openai_tts_negotiates_format_and_prefers_response_content_type() {
    let server = MockServer::start().await;

    let expected_body = json!({
        "model": "tts-1",
        "voice": "nova",
        "input": "hi",
        "format": "wav"
    });

    Mock::given(method("POST"))
        .and(path("/v1/audio/speech"))
        .and(body_json(expected_body))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"RIFF....WAVE".to_vec())
                .insert_header("content-type", "audio/x-custom"),
        )
        .expect(1)
        .mount(&server)
        .await;

    // Uppercase format is accepted; the wire value is lowercased.
    let request = SpeechRequest::new("openai-tts")
        .with_endpoint(server.uri())
        .with_credentials("test-api-key")
        .with_text("hi")
        .with_model("tts-1")
        .with_voice("nova")
        .with_audio_format("WAV");
    let outcome = gateway().dispatch_speech(request).await;

    assert!(outcome.success);
    // The provider's own content-type wins over the format fallback.
    assert_eq!(outcome.value.unwrap().mime_type, "audio/x-custom");
}

#[tokio::test]
async fn unrecognized_audio_format_normalizes_to_mp3() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/audio/speech"))
        .and(body_string_contains("\"format\":\"mp3\""))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"abc".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let request = SpeechRequest::new("openai-tts")
        .with_endpoint(server.uri())
        .with_credentials("test-api-key")
        .with_text("hi")
        .with_audio_format("flac");
    let outcome = gateway().dispatch_speech(request).await;

    assert!(outcome.success);
    assert_eq!(outcome.value.unwrap().mime_type, "audio/mpeg");
}

#[tokio::test]
async fn compatible_tts_requires_endpoint_but_not_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/audio/speech"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"abc".to_vec()))
        .mount(&server)
        .await;

    // Without an endpoint there is nowhere to send the request.
    let missing_endpoint = SpeechRequest::new("openai-compatible-tts").with_text("hi");
    let outcome = gateway().dispatch_speech(missing_endpoint).await;
    assert_eq!(outcome.error_kind(), Some(ErrorKind::InvalidArgument));
    assert!(outcome.error.unwrap().message.contains("endpoint"));

    // With one, anonymous access is fine.
    let anonymous = SpeechRequest::new("openai-compatible-tts")
        .with_endpoint(server.uri())
        .with_text("hi");
    let outcome = gateway().dispatch_speech(anonymous).await;
    assert!(outcome.success);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn kokoro_posts_text_voice_lang_with_defaults() {
    let server = MockServer::start().await;

    // Absent voice and lang still go out, as "default" and "".
    let expected_body = json!({
        "text": "hi there",
        "voice": "default",
        "lang": ""
    });

    Mock::given(method("POST"))
        .and(path("/tts"))
        .and(body_json(expected_body))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"abc".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let request = SpeechRequest::new("kokoro-fastapi")
        .with_endpoint(server.uri())
        .with_text("hi there");
    let outcome = gateway().dispatch_speech(request).await;

    assert!(outcome.success);
    let audio = outcome.value.unwrap();
    assert_eq!(audio.audio_bytes, "YWJj");
    // Kokoro serves WAV by default; that is the fallback MIME here.
    assert_eq!(audio.mime_type, "audio/wav");

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn kokoro_honors_voice_lang_and_path_overrides() {
    let server = MockServer::start().await;

    let expected_body = json!({
        "text": "hola",
        "voice": "af_bella",
        "lang": "es"
    });

    Mock::given(method("POST"))
        .and(path("/api/speech"))
        .and(body_json(expected_body))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"abc".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let request = SpeechRequest::new("kokoro-fastapi")
        .with_endpoint(server.uri())
        .with_path("/api/speech")
        .with_text("hola")
        .with_voice("af_bella")
        .with_lang("es");
    let outcome = gateway().dispatch_speech(request).await;
    assert!(outcome.success);
}

#[tokio::test]
async fn azure_posts_collapsed_ssml_with_subscription_key() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/cognitiveservices/v1"))
        .and(header("ocp-apim-subscription-key", "test-azure-key"))
        .and(header("content-type", "application/ssml+xml"))
        .and(header(
            "x-microsoft-outputformat",
            "audio-24khz-96kbitrate-mono-mp3",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"abc".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let request = SpeechRequest::new("azure-tts")
        .with_endpoint(server.uri())
        .with_region("eastus")
        .with_credentials("test-azure-key")
        .with_text("A & B\n  second   line")
        // Ignored: this provider's output format is pinned server-side.
        .with_audio_format("wav");
    let outcome = gateway().dispatch_speech(request).await;

    assert!(outcome.success);
    let audio = outcome.value.unwrap();
    assert_eq!(audio.audio_bytes, "YWJj");
    assert_eq!(audio.mime_type, "audio/mpeg");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let ssml = String::from_utf8(requests[0].body.clone()).unwrap();
    assert_eq!(
        ssml,
        r#"<speak version="1.0" xml:lang="en-US"><voice name="en-US-JennyNeural"><prosody rate="0%" pitch="0%">A &amp; B second line</prosody></voice></speak>"#
    );
    let user_agent = requests[0].headers.get("user-agent").unwrap();
    assert!(user_agent.to_str().unwrap().starts_with("restyle-relay/"));
}

#[tokio::test]
async fn azure_escapes_markup_in_caption_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/cognitiveservices/v1"))
        .and(body_string_contains("&lt;b&gt;A&amp;B&lt;/b&gt;"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"abc".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let request = SpeechRequest::new("azure-tts")
        .with_endpoint(server.uri())
        .with_region("eastus")
        .with_credentials("test-azure-key")
        .with_text("<b>A&B</b>")
        .with_voice("en-GB-SoniaNeural");
    let outcome = gateway().dispatch_speech(request).await;
    assert!(outcome.success);
}

#[tokio::test]
async fn azure_voice_catalog_passes_through_the_service_list() {
    let server = MockServer::start().await;

    let voices = json!([
        {
            "Name": "Microsoft Server Speech Text to Speech Voice (en-US, JennyNeural)",
            "ShortName": "en-US-JennyNeural",
            "Gender": "Female",
            "Locale": "en-US"
        },
        {
            "Name": "Microsoft Server Speech Text to Speech Voice (es-ES, ElviraNeural)",
            "ShortName": "es-ES-ElviraNeural",
            "Gender": "Female",
            "Locale": "es-ES"
        }
    ]);

    Mock::given(method("GET"))
        .and(path("/cognitiveservices/voices/list"))
        .and(header("ocp-apim-subscription-key", "test-azure-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(voices.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let request = SpeechRequest::new("azure-tts")
        .with_endpoint(server.uri())
        .with_region("eastus")
        .with_credentials("test-azure-key");
    let outcome = gateway().list_azure_voices(request).await;

    assert!(outcome.success);
    // The list is not reshaped: callers get the service's own entries.
    assert_eq!(outcome.value.unwrap(), voices);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let user_agent = requests[0].headers.get("user-agent").unwrap();
    assert!(user_agent.to_str().unwrap().starts_with("restyle-relay/"));
}

#[tokio::test]
async fn azure_voice_catalog_failure_maps_to_provider_error_outcome() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cognitiveservices/voices/list"))
        .respond_with(ResponseTemplate::new(403).set_body_string("invalid subscription key"))
        .mount(&server)
        .await;

    let request = SpeechRequest::new("azure-tts")
        .with_endpoint(server.uri())
        .with_region("eastus")
        .with_credentials("wrong-key");
    let outcome = gateway().list_azure_voices(request).await;

    assert!(!outcome.success);
    assert_eq!(outcome.error_kind(), Some(ErrorKind::ProviderError));
    let error = outcome.error.unwrap();
    assert_eq!(error.status, Some(403));
    assert!(error.message.contains("invalid subscription key"));
}

#[tokio::test]
async fn speech_provider_failure_maps_to_provider_error_outcome() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tts"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let request = SpeechRequest::new("kokoro-fastapi")
        .with_endpoint(server.uri())
        .with_text("hi");
    let outcome = gateway().dispatch_speech(request).await;

    assert!(!outcome.success);
    assert!(!outcome.cancelled);
    assert_eq!(outcome.error_kind(), Some(ErrorKind::ProviderError));
    let error = outcome.error.unwrap();
    assert_eq!(error.status, Some(503));
    assert!(error.message.contains("overloaded"));
}
