use crate::e2e::helpers;

use axum::http::StatusCode;
use helpers::{repeat, FakeResponse, FakeVendor};
use pretty_assertions::assert_eq;
use serde_json::json;
use serial_test::serial;
use std::time::Duration;
use unified_tts::{TextToSpeech, TtsError, TtsProviderKind};

fn client(vendor: &FakeVendor) -> TextToSpeech {
    TextToSpeech::new(helpers::settings(TtsProviderKind::ElevenLabs, &vendor.base_url)).unwrap()
}

fn provider_message(err: TtsError) -> String {
    match err {
        TtsError::Provider { provider, message } => {
            assert_eq!(provider, TtsProviderKind::ElevenLabs);
            message
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
#[serial]
async fn it_should_synthesize_speech_with_elevenlabs() {
    let vendor = FakeVendor::start(|_| FakeResponse::ok(b"eleven-audio".to_vec())).await;
    let mut tts = client(&vendor);

    tts.speak("Hello, world!").await.unwrap();

    assert_eq!(tts.audio().unwrap(), b"eleven-audio");

    let requests = vendor.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/text-to-speech/29vD33N1CtxCmqQRPOHJ");
    assert_eq!(requests[0].header("xi-api-key"), Some("test-api-key"));
    assert_eq!(
        requests[0].json(),
        json!({"model_id": "eleven_multilingual_v1", "text": "Hello, world!"})
    );
}

#[tokio::test]
#[serial]
async fn it_should_use_the_selected_voice_and_model() {
    let vendor = FakeVendor::start(|_| FakeResponse::ok(b"audio".to_vec())).await;
    let mut tts = client(&vendor);

    tts.set_voice("voice-2");
    tts.set_model("eleven_turbo_v2").unwrap();
    tts.speak("Hello").await.unwrap();

    let request = &vendor.requests()[0];
    assert_eq!(request.path, "/text-to-speech/voice-2");
    assert_eq!(request.json()["model_id"], "eleven_turbo_v2");
}

#[tokio::test]
#[serial]
async fn it_should_map_bad_request_errors() {
    let vendor = FakeVendor::start(|_| {
        FakeResponse::json(
            StatusCode::BAD_REQUEST,
            json!({"detail": {"status": "voice_not_found", "message": "A voice with that id was not found"}}),
        )
    })
    .await;
    let mut tts = client(&vendor);

    let err = tts.speak("Hello").await.err().unwrap();

    assert_eq!(provider_message(err), "A voice with that id was not found");
}

#[tokio::test]
#[serial]
async fn it_should_map_validation_errors() {
    let vendor = FakeVendor::start(|_| {
        FakeResponse::json(
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({"detail": [
                {"loc": ["body", "text"], "msg": "field required", "type": "value_error.missing"},
                {"loc": ["body", "model_id"], "msg": "unknown model", "type": "value_error"}
            ]}),
        )
    })
    .await;
    let mut tts = client(&vendor);

    let err = tts.speak("Hello").await.err().unwrap();

    assert_eq!(
        provider_message(err),
        "value_error.missing: body.text field required\nvalue_error: body.model_id unknown model"
    );
}

#[tokio::test]
#[serial]
async fn it_should_map_other_failures_to_a_generic_error() {
    let vendor = FakeVendor::start(|_| {
        FakeResponse::json(StatusCode::INTERNAL_SERVER_ERROR, json!({"oops": true}))
    })
    .await;
    let mut tts = client(&vendor);

    let err = tts.speak("Hello").await.err().unwrap();

    assert_eq!(provider_message(err), "Failed ElevenLabs API call");
}

#[tokio::test]
#[serial]
async fn it_should_list_and_cache_elevenlabs_models() {
    let vendor = FakeVendor::start(|_| {
        FakeResponse::json(
            StatusCode::OK,
            json!([
                {"model_id": "eleven_multilingual_v1", "name": "Multilingual v1"},
                {"model_id": "eleven_monolingual_v1", "name": "English v1"}
            ]),
        )
    })
    .await;
    let tts = client(&vendor);

    let first = tts.list_models().await.unwrap();
    let second = tts.list_models().await.unwrap();

    assert_eq!(first, vec!["eleven_multilingual_v1", "eleven_monolingual_v1"]);
    assert_eq!(first, second);

    let requests = vendor.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].path, "/models");
}

#[tokio::test]
#[serial]
async fn it_should_list_elevenlabs_voices() {
    let vendor = FakeVendor::start(|_| {
        FakeResponse::json(
            StatusCode::OK,
            json!({"voices": [
                {
                    "voice_id": "29vD33N1CtxCmqQRPOHJ",
                    "name": "Drew",
                    "labels": {"gender": "male", "description": "well-rounded"},
                    "preview_url": "https://storage.example.com/drew.mp3"
                },
                {"voice_id": "21m00Tcm4TlvDq8ikWAM", "name": "Rachel"}
            ]}),
        )
    })
    .await;
    let tts = client(&vendor);

    let voices = tts.list_voices(None).await.unwrap();

    assert_eq!(voices.len(), 2);
    assert_eq!(voices[0].id, "29vD33N1CtxCmqQRPOHJ");
    assert_eq!(voices[0].name, "Drew");
    assert_eq!(voices[0].gender.as_deref(), Some("male"));
    assert_eq!(voices[0].description.as_deref(), Some("well-rounded"));
    assert_eq!(voices[1].preview_url, None);
    assert_eq!(vendor.requests()[0].path, "/voices");
}

#[tokio::test]
#[serial]
async fn it_should_long_speak_in_reading_order_within_the_default_budget() {
    // Earlier chunks answer slower so completion order is reversed
    let vendor = FakeVendor::start(|request| {
        let text = request.json()["text"].as_str().unwrap_or_default().to_string();
        let first = text.chars().next().unwrap_or('?');
        let delay = 20 + ('e' as u64 - first as u64) * 15;
        FakeResponse::ok(first.to_string()).with_delay(Duration::from_millis(delay))
    })
    .await;
    let mut tts = client(&vendor);
    let text = format!(
        "{}{}{}{}{}",
        repeat('a', 5000),
        repeat('b', 5000),
        repeat('c', 5000),
        repeat('d', 5000),
        repeat('e', 100)
    );

    tts.long_speak(&text).await.unwrap();

    assert_eq!(tts.audio().unwrap(), b"abcde");
    assert_eq!(vendor.request_count(), 5);
    assert!(vendor.peak_in_flight() <= 2);
}

#[tokio::test]
#[serial]
async fn it_should_fail_long_speak_when_one_chunk_fails() {
    let vendor = FakeVendor::start(|request| {
        let text = request.json()["text"].as_str().unwrap_or_default().to_string();
        if text.starts_with('b') {
            FakeResponse::json(
                StatusCode::BAD_REQUEST,
                json!({"detail": {"message": "quota exceeded"}}),
            )
        } else {
            FakeResponse::ok(text.chars().take(1).collect::<String>())
        }
    })
    .await;
    let mut tts = client(&vendor);
    let text = format!("{}{}{}", repeat('a', 5000), repeat('b', 5000), repeat('c', 10));

    let err = tts.long_speak(&text).await.err().unwrap();

    assert_eq!(provider_message(err), "quota exceeded");
    assert!(matches!(tts.audio(), Err(TtsError::NoAudio)));
}

#[tokio::test]
#[serial]
async fn it_should_refuse_long_speak_for_short_text() {
    let vendor = FakeVendor::start(|_| FakeResponse::ok(b"audio".to_vec())).await;
    let mut tts = client(&vendor);

    let err = tts.long_speak("Hello, world!").await.err().unwrap();

    assert!(matches!(
        err,
        TtsError::InputTooShort { required: 5000, received: 12 }
    ));
    assert_eq!(vendor.request_count(), 0);
}
