use crate::e2e::helpers;

use axum::http::StatusCode;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use helpers::{repeat, FakeResponse, FakeVendor};
use pretty_assertions::assert_eq;
use serde_json::json;
use serial_test::serial;
use unified_tts::{TextToSpeech, TtsError, TtsProviderKind};

fn client(vendor: &FakeVendor) -> TextToSpeech {
    TextToSpeech::new(helpers::settings(TtsProviderKind::Google, &vendor.base_url)).unwrap()
}

/// Answers with the request text encoded the way Google returns audio
async fn echo_vendor() -> FakeVendor {
    FakeVendor::start(|request| {
        let text = request.json()["input"]["text"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        FakeResponse::json(
            StatusCode::OK,
            json!({"audioContent": STANDARD.encode(text.chars().take(1).collect::<String>())}),
        )
    })
    .await
}

#[tokio::test]
#[serial]
async fn it_should_synthesize_speech_with_google() {
    let vendor = FakeVendor::start(|_| {
        FakeResponse::json(
            StatusCode::OK,
            json!({"audioContent": STANDARD.encode(b"google-audio")}),
        )
    })
    .await;
    let mut tts = client(&vendor);

    tts.speak("Hello, world!").await.unwrap();

    assert_eq!(tts.audio().unwrap(), b"google-audio");

    let requests = vendor.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/text:synthesize");
    assert_eq!(requests[0].query.as_deref(), Some("key=test-api-key"));
    assert_eq!(
        requests[0].json(),
        json!({
            "input": {"text": "Hello, world!"},
            "voice": {"languageCode": "en-GB", "name": "en-GB-Neural2-D", "ssmlGender": "MALE"},
            "audioConfig": {"audioEncoding": "MP3"}
        })
    );
}

#[tokio::test]
#[serial]
async fn it_should_fail_when_google_returns_no_audio() {
    let vendor = FakeVendor::start(|_| FakeResponse::json(StatusCode::OK, json!({}))).await;
    let mut tts = client(&vendor);

    let err = tts.speak("Hello").await.err().unwrap();

    match err {
        TtsError::Provider { provider, message } => {
            assert_eq!(provider, TtsProviderKind::Google);
            assert_eq!(message, "No audio content found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
#[serial]
async fn it_should_surface_google_api_errors() {
    let vendor = FakeVendor::start(|_| {
        FakeResponse::json(
            StatusCode::BAD_REQUEST,
            json!({"error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}}),
        )
    })
    .await;
    let mut tts = client(&vendor);

    let err = tts.speak("Hello").await.err().unwrap();

    assert_eq!(err.to_string(), "Google error: API key not valid");
}

#[tokio::test]
#[serial]
async fn it_should_switch_language_with_the_voice() {
    let vendor = echo_vendor().await;
    let mut tts = client(&vendor);

    tts.set_voice("es-ES-Standard-A");
    tts.speak("Hola").await.unwrap();

    let body = vendor.requests()[0].json();
    assert_eq!(body["voice"]["languageCode"], "es-ES");
    assert_eq!(body["voice"]["name"], "es-ES-Standard-A");
}

#[tokio::test]
#[serial]
async fn it_should_long_speak_with_google_in_reading_order() {
    let vendor = echo_vendor().await;
    let mut tts = client(&vendor);
    let text = format!("{}{}{}", repeat('a', 5000), repeat('b', 5000), repeat('c', 1));

    tts.long_speak(&text).await.unwrap();

    assert_eq!(tts.audio().unwrap(), b"abc");
    assert_eq!(vendor.request_count(), 3);
}

#[tokio::test]
#[serial]
async fn it_should_list_google_voices_for_a_language() {
    let vendor = FakeVendor::start(|_| {
        FakeResponse::json(
            StatusCode::OK,
            json!({"voices": [
                {"name": "en-GB-Neural2-D", "languageCodes": ["en-GB"], "ssmlGender": "MALE", "naturalSampleRateHertz": 24000},
                {"name": "en-GB-Neural2-A", "languageCodes": ["en-GB"], "ssmlGender": "FEMALE", "naturalSampleRateHertz": 24000}
            ]}),
        )
    })
    .await;
    let tts = client(&vendor);

    let voices = tts.list_voices(Some("en-GB")).await.unwrap();
    tts.list_voices(Some("en-GB")).await.unwrap();

    assert_eq!(voices.len(), 2);
    assert_eq!(voices[0].id, "en-GB-Neural2-D");
    assert_eq!(voices[1].gender.as_deref(), Some("FEMALE"));
    assert!(voices[0].supports_language("en-GB"));

    let requests = vendor.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/voices");
    assert!(requests[0]
        .query
        .as_deref()
        .unwrap_or_default()
        .contains("languageCode=en-GB"));
}

#[tokio::test]
#[serial]
async fn it_should_not_support_listing_google_models() {
    let vendor = echo_vendor().await;
    let tts = client(&vendor);

    let err = tts.list_models().await.err().unwrap();

    assert!(matches!(
        err,
        TtsError::Unsupported {
            provider: TtsProviderKind::Google,
            ..
        }
    ));
    assert_eq!(vendor.request_count(), 0);
}
