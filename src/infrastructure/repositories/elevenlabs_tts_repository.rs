use super::tts_repository::TtsRepository;
use crate::domain::tts::text::char_len;
use crate::domain::tts::{
    ChunkSynthesizer, ConcurrencyBudget, MaxChunkSize, TtsProviderKind, VoiceInfo,
};
use crate::error::{TtsError, TtsResult};
use crate::infrastructure::config::{AudioFormat, ElevenLabsVoiceSettings, TtsSettings};
use async_trait::async_trait;
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

pub const ELEVENLABS_API_URL: &str = "https://api.elevenlabs.io/v1";

/// ElevenLabs accepts up to 5000 characters per request
const MAX_BATCH_SIZE: MaxChunkSize = MaxChunkSize::new_const(5000);

/// Budget for long synthesis when the settings leave it unset
const DEFAULT_MAX_CONCURRENT_REQUESTS: NonZeroUsize = match NonZeroUsize::new(2) {
    Some(max) => max,
    None => panic!("default budget must be non-zero"),
};

const GENERIC_ERROR: &str = "Failed ElevenLabs API call";

#[derive(Debug, Serialize)]
struct SynthesizeRequest<'a> {
    model_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    voice_settings: Option<&'a ElevenLabsVoiceSettings>,
}

#[derive(Debug, Deserialize)]
struct ElevenLabsModel {
    model_id: String,
}

#[derive(Debug, Deserialize)]
struct ElevenLabsVoicesResponse {
    voices: Vec<ElevenLabsVoice>,
}

#[derive(Debug, Deserialize)]
struct ElevenLabsVoice {
    voice_id: String,
    name: String,
    #[serde(default)]
    labels: Option<ElevenLabsVoiceLabels>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    preview_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ElevenLabsVoiceLabels {
    #[serde(default)]
    gender: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Body of 400 responses
#[derive(Debug, Deserialize)]
struct ElevenLabsError {
    detail: ElevenLabsErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ElevenLabsErrorDetail {
    message: String,
}

/// Body of 422 responses
#[derive(Debug, Deserialize)]
struct ElevenLabsValidationError {
    detail: Vec<ElevenLabsValidationDetail>,
}

#[derive(Debug, Deserialize)]
struct ElevenLabsValidationDetail {
    loc: Vec<serde_json::Value>,
    msg: String,
    #[serde(rename = "type")]
    kind: String,
}

impl ElevenLabsValidationDetail {
    fn to_line(&self) -> String {
        let loc = self
            .loc
            .iter()
            .map(|part| match part {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".");
        format!("{}: {} {}", self.kind, loc, self.msg)
    }
}

/// ElevenLabs implementation of TTS repository
pub struct ElevenLabsTtsRepository {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
    voice: String,
    model: String,
    voice_settings: Option<ElevenLabsVoiceSettings>,
    models_cache: Cache<String, Arc<Vec<String>>>,
    voices_cache: Cache<String, Arc<Vec<VoiceInfo>>>,
}

impl ElevenLabsTtsRepository {
    pub fn new(http_client: reqwest::Client, settings: &TtsSettings) -> TtsResult<Self> {
        Ok(Self {
            http_client,
            api_key: settings.resolve_api_key()?,
            base_url: settings
                .base_url
                .clone()
                .unwrap_or_else(|| ELEVENLABS_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            voice: settings.voice.clone(),
            model: settings
                .model
                .clone()
                .unwrap_or_else(|| crate::infrastructure::config::ELEVENLABS_DEFAULT_MODEL.to_string()),
            voice_settings: settings.voice_settings.clone(),
            models_cache: catalog_cache(),
            voices_cache: catalog_cache(),
        })
    }

    pub fn from_settings(settings: &TtsSettings) -> TtsResult<Self> {
        Self::new(reqwest::Client::new(), settings)
    }

    /// Send a request with the API key attached and map error bodies
    async fn call_api(&self, request: reqwest::RequestBuilder) -> TtsResult<reqwest::Response> {
        let response = request
            .header("Content-Type", "application/json")
            .header("xi-api-key", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = match status.as_u16() {
            400 => serde_json::from_str::<ElevenLabsError>(&body)
                .map(|e| e.detail.message)
                .unwrap_or_else(|_| GENERIC_ERROR.to_string()),
            422 => serde_json::from_str::<ElevenLabsValidationError>(&body)
                .map(|e| {
                    e.detail
                        .iter()
                        .map(ElevenLabsValidationDetail::to_line)
                        .collect::<Vec<_>>()
                        .join("\n")
                })
                .unwrap_or_else(|_| GENERIC_ERROR.to_string()),
            _ => GENERIC_ERROR.to_string(),
        };

        tracing::error!(
            status = status.as_u16(),
            error = %message,
            "ElevenLabs API call failed"
        );

        Err(TtsError::provider(TtsProviderKind::ElevenLabs, message))
    }

    async fn call_elevenlabs(&self, text: &str) -> TtsResult<Vec<u8>> {
        tracing::info!(
            model = %self.model,
            voice = %self.voice,
            text_length = char_len(text),
            "Calling ElevenLabs TTS API"
        );

        let body = SynthesizeRequest {
            model_id: &self.model,
            text,
            voice_settings: self.voice_settings.as_ref(),
        };
        let url = format!("{}/text-to-speech/{}", self.base_url, self.voice);

        let response = self.call_api(self.http_client.post(url).json(&body)).await?;
        let audio_bytes = response.bytes().await?.to_vec();

        tracing::debug!(
            audio_size = audio_bytes.len(),
            "ElevenLabs TTS audio received successfully"
        );

        Ok(audio_bytes)
    }

    async fn fetch_models(&self) -> TtsResult<Vec<String>> {
        let url = format!("{}/models", self.base_url);
        let models: Vec<ElevenLabsModel> = self.call_api(self.http_client.get(url)).await?.json().await?;
        Ok(models.into_iter().map(|m| m.model_id).collect())
    }

    async fn fetch_voices(&self) -> TtsResult<Vec<VoiceInfo>> {
        let url = format!("{}/voices", self.base_url);
        let response: ElevenLabsVoicesResponse =
            self.call_api(self.http_client.get(url)).await?.json().await?;

        Ok(response
            .voices
            .into_iter()
            .map(|voice| {
                let labels = voice.labels;
                VoiceInfo {
                    id: voice.voice_id,
                    name: voice.name,
                    language_codes: Vec::new(),
                    gender: labels.as_ref().and_then(|l| l.gender.clone()),
                    description: voice
                        .description
                        .or_else(|| labels.and_then(|l| l.description)),
                    preview_url: voice.preview_url,
                }
            })
            .collect())
    }
}

fn catalog_cache<V: Clone + Send + Sync + 'static>() -> Cache<String, V> {
    Cache::builder()
        .max_capacity(16)
        .time_to_idle(Duration::from_secs(30 * 60))
        .build()
}

#[async_trait]
impl ChunkSynthesizer for ElevenLabsTtsRepository {
    async fn synthesize_chunk(&self, chunk: &str) -> TtsResult<Vec<u8>> {
        self.call_elevenlabs(chunk).await
    }
}

#[async_trait]
impl TtsRepository for ElevenLabsTtsRepository {
    fn provider(&self) -> TtsProviderKind {
        TtsProviderKind::ElevenLabs
    }

    fn max_chunk_size(&self) -> MaxChunkSize {
        MAX_BATCH_SIZE
    }

    fn default_concurrency(&self) -> ConcurrencyBudget {
        ConcurrencyBudget::Limited(DEFAULT_MAX_CONCURRENT_REQUESTS)
    }

    fn audio_format(&self) -> AudioFormat {
        AudioFormat::Mp3
    }

    fn voice(&self) -> &str {
        &self.voice
    }

    fn set_voice(&mut self, voice: String) {
        self.voice = voice;
    }

    fn model(&self) -> Option<&str> {
        Some(&self.model)
    }

    fn set_model(&mut self, model: String) -> TtsResult<()> {
        self.model = model;
        Ok(())
    }

    async fn list_models(&self) -> TtsResult<Vec<String>> {
        let key = "models".to_string();
        if let Some(models) = self.models_cache.get(&key).await {
            return Ok(models.as_ref().clone());
        }

        let models = Arc::new(self.fetch_models().await?);
        self.models_cache.insert(key, models.clone()).await;
        Ok(models.as_ref().clone())
    }

    async fn list_voices(&self, language_code: Option<&str>) -> TtsResult<Vec<VoiceInfo>> {
        let key = "voices".to_string();
        let voices = match self.voices_cache.get(&key).await {
            Some(voices) => voices,
            None => {
                let voices = Arc::new(self.fetch_voices().await?);
                self.voices_cache.insert(key, voices.clone()).await;
                voices
            }
        };

        Ok(voices
            .iter()
            .filter(|voice| language_code.map_or(true, |code| voice.supports_language(code)))
            .cloned()
            .collect())
    }
}
