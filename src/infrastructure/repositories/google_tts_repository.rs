use super::tts_repository::TtsRepository;
use crate::domain::tts::text::char_len;
use crate::domain::tts::{
    ChunkSynthesizer, ConcurrencyBudget, MaxChunkSize, TtsProviderKind, VoiceInfo,
};
use crate::error::{TtsError, TtsResult};
use crate::infrastructure::config::{AudioFormat, TtsSettings, GOOGLE_DEFAULT_GENDER};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

pub const GOOGLE_TTS_API_URL: &str = "https://texttospeech.googleapis.com/v1";

/// Google Cloud TTS accepts up to 5000 bytes of input per request
const MAX_BATCH_SIZE: MaxChunkSize = MaxChunkSize::new_const(5000);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelectionParams<'a>,
    audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelectionParams<'a> {
    language_code: &'a str,
    name: &'a str,
    ssml_gender: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    #[serde(default)]
    audio_content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListVoicesResponse {
    #[serde(default)]
    voices: Vec<GoogleVoice>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleVoice {
    name: String,
    #[serde(default)]
    language_codes: Vec<String>,
    #[serde(default)]
    ssml_gender: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorResponse {
    error: GoogleErrorBody,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    message: String,
}

/// Google Cloud Text-to-Speech implementation of TTS repository
pub struct GoogleTtsRepository {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
    voice: String,
    language_code: String,
    ssml_gender: String,
    audio_encoding: &'static str,
    response_format: AudioFormat,
    voices_cache: Cache<String, Arc<Vec<VoiceInfo>>>,
}

impl GoogleTtsRepository {
    pub fn new(http_client: reqwest::Client, settings: &TtsSettings) -> TtsResult<Self> {
        let audio_encoding = match settings.response_format {
            AudioFormat::Mp3 => "MP3",
            AudioFormat::Opus => "OGG_OPUS",
            AudioFormat::Wav | AudioFormat::Pcm => "LINEAR16",
            other => {
                return Err(TtsError::Unsupported {
                    provider: TtsProviderKind::Google,
                    message: format!("audio format {:?}", other),
                })
            }
        };

        let language_code = settings
            .language_code
            .clone()
            .or_else(|| language_of_voice(&settings.voice))
            .ok_or_else(|| {
                TtsError::Validation(format!(
                    "cannot derive a language code from Google voice '{}'",
                    settings.voice
                ))
            })?;

        Ok(Self {
            http_client,
            api_key: settings.resolve_api_key()?,
            base_url: settings
                .base_url
                .clone()
                .unwrap_or_else(|| GOOGLE_TTS_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            voice: settings.voice.clone(),
            language_code,
            ssml_gender: settings
                .ssml_gender
                .clone()
                .unwrap_or_else(|| GOOGLE_DEFAULT_GENDER.to_string()),
            audio_encoding,
            response_format: settings.response_format,
            voices_cache: Cache::builder()
                .max_capacity(64)
                .time_to_idle(Duration::from_secs(30 * 60))
                .build(),
        })
    }

    pub fn from_settings(settings: &TtsSettings) -> TtsResult<Self> {
        Self::new(reqwest::Client::new(), settings)
    }

    pub fn language_code(&self) -> &str {
        &self.language_code
    }

    async fn error_from(response: reqwest::Response) -> TtsError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<GoogleErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| format!("Google TTS request failed with status {}", status));

        tracing::error!(status = status.as_u16(), error = %message, "Google TTS API call failed");
        TtsError::provider(TtsProviderKind::Google, message)
    }

    async fn call_google(&self, text: &str) -> TtsResult<Vec<u8>> {
        tracing::info!(
            voice = %self.voice,
            language = %self.language_code,
            text_length = char_len(text),
            "Calling Google TTS API"
        );

        let body = SynthesizeRequest {
            input: SynthesisInput { text },
            voice: VoiceSelectionParams {
                language_code: &self.language_code,
                name: &self.voice,
                ssml_gender: &self.ssml_gender,
            },
            audio_config: AudioConfig {
                audio_encoding: self.audio_encoding,
            },
        };

        let response = self
            .http_client
            .post(format!("{}/text:synthesize", self.base_url))
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let payload: SynthesizeResponse = response.json().await?;
        let audio_content = payload
            .audio_content
            .filter(|content| !content.is_empty())
            .ok_or_else(|| TtsError::provider(TtsProviderKind::Google, "No audio content found"))?;

        let audio_bytes = STANDARD.decode(audio_content).map_err(|e| {
            TtsError::provider(
                TtsProviderKind::Google,
                format!("audio content is not valid base64: {}", e),
            )
        })?;

        tracing::debug!(
            audio_size = audio_bytes.len(),
            "Google TTS audio received successfully"
        );

        Ok(audio_bytes)
    }

    async fn fetch_voices(&self, language_code: Option<&str>) -> TtsResult<Vec<VoiceInfo>> {
        let mut request = self
            .http_client
            .get(format!("{}/voices", self.base_url))
            .query(&[("key", self.api_key.as_str())]);
        if let Some(code) = language_code {
            request = request.query(&[("languageCode", code)]);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let payload: ListVoicesResponse = response.json().await?;
        Ok(payload
            .voices
            .into_iter()
            .map(|voice| VoiceInfo {
                id: voice.name.clone(),
                name: voice.name,
                language_codes: voice.language_codes,
                gender: voice.ssml_gender,
                description: None,
                preview_url: None,
            })
            .collect())
    }
}

/// "en-GB-Neural2-D" -> "en-GB"
fn language_of_voice(voice: &str) -> Option<String> {
    let mut parts = voice.splitn(3, '-');
    match (parts.next(), parts.next()) {
        (Some(language), Some(region)) if !language.is_empty() && !region.is_empty() => {
            Some(format!("{}-{}", language, region))
        }
        _ => None,
    }
}

#[async_trait]
impl ChunkSynthesizer for GoogleTtsRepository {
    async fn synthesize_chunk(&self, chunk: &str) -> TtsResult<Vec<u8>> {
        self.call_google(chunk).await
    }
}

#[async_trait]
impl TtsRepository for GoogleTtsRepository {
    fn provider(&self) -> TtsProviderKind {
        TtsProviderKind::Google
    }

    fn max_chunk_size(&self) -> MaxChunkSize {
        MAX_BATCH_SIZE
    }

    fn default_concurrency(&self) -> ConcurrencyBudget {
        ConcurrencyBudget::Unbounded
    }

    fn audio_format(&self) -> AudioFormat {
        self.response_format
    }

    fn voice(&self) -> &str {
        &self.voice
    }

    /// Also switches the language when the voice name carries one
    fn set_voice(&mut self, voice: String) {
        if let Some(language_code) = language_of_voice(&voice) {
            self.language_code = language_code;
        }
        self.voice = voice;
    }

    fn model(&self) -> Option<&str> {
        None
    }

    fn set_model(&mut self, _model: String) -> TtsResult<()> {
        Err(TtsError::Unsupported {
            provider: TtsProviderKind::Google,
            message: "google does not support selecting models, it has only one model".to_string(),
        })
    }

    async fn list_models(&self) -> TtsResult<Vec<String>> {
        Err(TtsError::Unsupported {
            provider: TtsProviderKind::Google,
            message: "google does not support listing models, it has only one model".to_string(),
        })
    }

    async fn list_voices(&self, language_code: Option<&str>) -> TtsResult<Vec<VoiceInfo>> {
        let key = language_code.unwrap_or("*").to_string();
        if let Some(voices) = self.voices_cache.get(&key).await {
            return Ok(voices.as_ref().clone());
        }

        let voices = Arc::new(self.fetch_voices(language_code).await?);
        self.voices_cache.insert(key, voices.clone()).await;
        Ok(voices.as_ref().clone())
    }
}
