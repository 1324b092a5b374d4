use super::tts_repository::TtsRepository;
use crate::domain::tts::text::char_len;
use crate::domain::tts::{
    ChunkSynthesizer, ConcurrencyBudget, MaxChunkSize, TtsProviderKind, VoiceInfo,
};
use crate::error::{TtsError, TtsResult};
use crate::infrastructure::config::{AudioFormat, TtsSettings};
use async_openai::{
    config::OpenAIConfig,
    types::{CreateSpeechRequest, SpeechModel, SpeechResponseFormat, Voice},
    Client,
};
use async_trait::async_trait;
use std::sync::Arc;

/// OpenAI has a limit of 4096 characters per request
const MAX_BATCH_SIZE: MaxChunkSize = MaxChunkSize::new_const(4096);

const MODELS: [&str; 2] = ["tts-1", "tts-1-hd"];

const VOICES: [&str; 6] = ["alloy", "echo", "fable", "onyx", "nova", "shimmer"];

/// OpenAI TTS implementation of TTS repository
pub struct OpenAiTtsRepository {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
    voice: String,
    speed: Option<f32>,
    response_format: AudioFormat,
}

impl OpenAiTtsRepository {
    pub fn new(client: Arc<Client<OpenAIConfig>>, settings: &TtsSettings) -> Self {
        Self {
            client,
            model: settings
                .model
                .clone()
                .unwrap_or_else(|| MODELS[0].to_string()),
            voice: settings.voice.clone(),
            speed: settings.speed,
            response_format: settings.response_format,
        }
    }

    pub fn from_settings(settings: &TtsSettings) -> TtsResult<Self> {
        let mut config = OpenAIConfig::new().with_api_key(settings.resolve_api_key()?);
        if let Some(base_url) = &settings.base_url {
            config = config.with_api_base(base_url.trim_end_matches('/'));
        }
        Ok(Self::new(Arc::new(Client::with_config(config)), settings))
    }

    fn speech_model(&self) -> SpeechModel {
        match self.model.as_str() {
            "tts-1" => SpeechModel::Tts1,
            "tts-1-hd" => SpeechModel::Tts1Hd,
            other => SpeechModel::Other(other.to_string()),
        }
    }

    fn speech_voice(&self) -> TtsResult<Voice> {
        match self.voice.to_lowercase().as_str() {
            "alloy" => Ok(Voice::Alloy),
            "echo" => Ok(Voice::Echo),
            "fable" => Ok(Voice::Fable),
            "onyx" => Ok(Voice::Onyx),
            "nova" => Ok(Voice::Nova),
            "shimmer" => Ok(Voice::Shimmer),
            other => Err(TtsError::Validation(format!(
                "unknown OpenAI voice '{}', expected one of {}",
                other,
                VOICES.join(", ")
            ))),
        }
    }

    fn speech_format(&self) -> SpeechResponseFormat {
        match self.response_format {
            AudioFormat::Mp3 => SpeechResponseFormat::Mp3,
            AudioFormat::Opus => SpeechResponseFormat::Opus,
            AudioFormat::Aac => SpeechResponseFormat::Aac,
            AudioFormat::Flac => SpeechResponseFormat::Flac,
            AudioFormat::Wav => SpeechResponseFormat::Wav,
            AudioFormat::Pcm => SpeechResponseFormat::Pcm,
        }
    }

    /// Call OpenAI TTS API to synthesize a single text chunk
    async fn call_openai(&self, text: &str) -> TtsResult<Vec<u8>> {
        let voice = self.speech_voice()?;

        tracing::info!(
            model = %self.model,
            voice = %self.voice,
            text_length = char_len(text),
            "Calling OpenAI TTS API"
        );

        let request = CreateSpeechRequest {
            model: self.speech_model(),
            input: text.to_string(),
            voice,
            response_format: Some(self.speech_format()),
            speed: self.speed,
        };

        let response = self.client.audio().speech(request).await.map_err(|e| {
            tracing::error!(
                error = %e,
                model = %self.model,
                voice = %self.voice,
                text_length = char_len(text),
                "OpenAI TTS API call failed"
            );
            TtsError::from(e)
        })?;

        let audio_bytes = response.bytes.to_vec();
        tracing::debug!(
            audio_size = audio_bytes.len(),
            "OpenAI TTS audio received successfully"
        );

        Ok(audio_bytes)
    }
}

#[async_trait]
impl ChunkSynthesizer for OpenAiTtsRepository {
    async fn synthesize_chunk(&self, chunk: &str) -> TtsResult<Vec<u8>> {
        self.call_openai(chunk).await
    }
}

#[async_trait]
impl TtsRepository for OpenAiTtsRepository {
    fn provider(&self) -> TtsProviderKind {
        TtsProviderKind::OpenAi
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

    /// The API has no TTS-only model listing, so the list is fixed
    async fn list_models(&self) -> TtsResult<Vec<String>> {
        Ok(MODELS.iter().map(|m| m.to_string()).collect())
    }

    async fn list_voices(&self, _language_code: Option<&str>) -> TtsResult<Vec<VoiceInfo>> {
        Ok(VOICES
            .iter()
            .map(|voice| VoiceInfo::new(*voice, *voice))
            .collect())
    }
}
