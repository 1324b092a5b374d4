use crate::e2e::helpers;

use axum::http::StatusCode;
use helpers::{repeat, FakeResponse, FakeVendor};
use pretty_assertions::assert_eq;
use serde_json::json;
use serial_test::serial;
use unified_tts::{ConcurrencyBudget, TextToSpeech, TtsError, TtsProviderKind};

/// Answers each speech request with the first character of its input
async fn first_char_vendor() -> FakeVendor {
    FakeVendor::start(|request| {
        let input = request.json()["input"].as_str().unwrap_or_default().to_string();
        FakeResponse::ok(input.chars().take(1).collect::<String>())
    })
    .await
}

fn client(vendor: &FakeVendor) -> TextToSpeech {
    let base_url = format!("{}/v1", vendor.base_url);
    TextToSpeech::new(helpers::settings(TtsProviderKind::OpenAi, &base_url)).unwrap()
}

#[tokio::test]
#[serial]
async fn it_should_synthesize_speech_with_openai() {
    let vendor = FakeVendor::start(|_| FakeResponse::ok(b"mp3-bytes".to_vec())).await;
    let mut tts = client(&vendor);

    tts.speak("Hello, world!").await.unwrap();

    assert_eq!(tts.audio().unwrap(), b"mp3-bytes");

    let requests = vendor.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/v1/audio/speech");
    assert_eq!(requests[0].header("authorization"), Some("Bearer test-api-key"));

    let body = requests[0].json();
    assert_eq!(body["input"], "Hello, world!");
    assert_eq!(body["voice"], "onyx");
    assert_eq!(body["model"], "tts-1");
}

#[tokio::test]
#[serial]
async fn it_should_surface_openai_api_errors() {
    let vendor = FakeVendor::start(|_| {
        FakeResponse::json(
            StatusCode::BAD_REQUEST,
            json!({
                "error": {
                    "message": "Input is not valid",
                    "type": "invalid_request_error",
                    "param": "input",
                    "code": null
                }
            }),
        )
    })
    .await;
    let mut tts = client(&vendor);

    let err = tts.speak("Hello, world!").await.err().unwrap();

    assert!(matches!(err, TtsError::OpenAi(_)));
    assert!(err.to_string().contains("Input is not valid"));
    assert!(matches!(tts.audio(), Err(TtsError::NoAudio)));
}

#[tokio::test]
#[serial]
async fn it_should_reject_unknown_voices_before_calling_openai() {
    let vendor = first_char_vendor().await;
    let mut tts = client(&vendor);
    tts.set_voice("narrator");

    let err = tts.speak("Hello, world!").await.err().unwrap();

    assert!(matches!(err, TtsError::Validation(_)));
    assert_eq!(vendor.request_count(), 0);
}

#[tokio::test]
#[serial]
async fn it_should_reject_text_over_the_openai_limit() {
    let vendor = first_char_vendor().await;
    let mut tts = client(&vendor);

    let err = tts.speak(&repeat('a', 4097)).await.err().unwrap();

    assert_eq!(
        err.to_string(),
        "Value must be less than 4096 characters received 4097 characters."
    );
    assert_eq!(vendor.request_count(), 0);
}

#[tokio::test]
#[serial]
async fn it_should_long_speak_with_openai_in_reading_order() {
    let vendor = first_char_vendor().await;
    let mut tts = client(&vendor);
    let text = format!("{}{}{}", repeat('a', 4096), repeat('b', 4096), repeat('c', 5));

    tts.long_speak(&text).await.unwrap();

    assert_eq!(tts.audio().unwrap(), b"abc");
    assert_eq!(vendor.request_count(), 3);

    let mut lengths: Vec<usize> = vendor
        .requests()
        .iter()
        .map(|r| r.json()["input"].as_str().unwrap_or_default().chars().count())
        .collect();
    lengths.sort_unstable();
    assert_eq!(lengths, vec![5, 4096, 4096]);
}

#[tokio::test]
#[serial]
async fn it_should_honor_a_configured_budget_with_openai() {
    let vendor = FakeVendor::start(|request| {
        let input = request.json()["input"].as_str().unwrap_or_default().to_string();
        FakeResponse::ok(input.chars().take(1).collect::<String>())
            .with_delay(std::time::Duration::from_millis(30))
    })
    .await;
    let base_url = format!("{}/v1", vendor.base_url);
    let settings = helpers::settings(TtsProviderKind::OpenAi, &base_url)
        .with_max_concurrent_requests(ConcurrencyBudget::limited(1).unwrap());
    let mut tts = TextToSpeech::new(settings).unwrap();
    let text = format!("{}{}{}", repeat('x', 4096), repeat('y', 4096), repeat('z', 4096));

    tts.long_speak(&text).await.unwrap();

    assert_eq!(tts.audio().unwrap(), b"xyz");
    assert_eq!(vendor.peak_in_flight(), 1);
}
