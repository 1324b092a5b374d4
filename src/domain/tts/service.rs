use super::long_speak::LongSpeakOrchestrator;
use super::provider::TtsProviderKind;
use super::text::{char_len, normalize_text, MaxChunkSize};
use super::voice::VoiceInfo;
use crate::error::{TtsError, TtsResult};
use crate::infrastructure::config::TtsSettings;
use crate::infrastructure::repositories::{repository_for, TtsRepository};
use crate::infrastructure::storage::{default_audio_path, save_audio, AudioUploader, HttpUploader};
use std::path::{Path, PathBuf};

/// Text-to-speech client with a common lifecycle across vendors:
/// configure, synthesize with [`speak`](Self::speak) or
/// [`long_speak`](Self::long_speak), then [`save`](Self::save) or
/// [`upload`](Self::upload) the result.
///
/// Each synthesis replaces the previously stored audio.
pub struct TextToSpeech {
    settings: TtsSettings,
    repository: Box<dyn TtsRepository>,
    http_client: reqwest::Client,
    audio: Option<Vec<u8>>,
}

impl TextToSpeech {
    pub fn new(settings: TtsSettings) -> TtsResult<Self> {
        let repository = repository_for(&settings)?;
        Ok(Self::with_repository(settings, repository))
    }

    /// Use a custom adapter; `settings.provider` should describe it
    pub fn with_repository(settings: TtsSettings, repository: Box<dyn TtsRepository>) -> Self {
        Self {
            settings,
            repository,
            http_client: reqwest::Client::new(),
            audio: None,
        }
    }

    pub fn provider(&self) -> TtsProviderKind {
        self.repository.provider()
    }

    pub fn settings(&self) -> &TtsSettings {
        &self.settings
    }

    pub fn max_chunk_size(&self) -> MaxChunkSize {
        self.repository.max_chunk_size()
    }

    /// Orchestrator configured from the adapter limit and the settings budget
    pub fn long_speak_orchestrator(&self) -> LongSpeakOrchestrator {
        let budget = self
            .settings
            .max_concurrent_requests
            .unwrap_or_else(|| self.repository.default_concurrency());
        LongSpeakOrchestrator::new(self.repository.max_chunk_size(), budget)
    }

    /// Synthesize text that fits in one vendor request
    pub async fn speak(&mut self, text: &str) -> TtsResult<&mut Self> {
        if text.trim().is_empty() {
            return Err(TtsError::Validation("text is required".to_string()));
        }

        let max = self.repository.max_chunk_size().get();
        let received = char_len(text);
        if received > max {
            return Err(TtsError::TextTooLong { max, received });
        }

        tracing::info!(
            provider = %self.provider(),
            voice = %self.repository.voice(),
            text_length = received,
            "Starting TTS synthesis"
        );

        let audio_data = self.repository.synthesize_chunk(text).await?;
        self.audio = Some(audio_data);
        Ok(self)
    }

    /// Synthesize text beyond the vendor limit by splitting it into chunks.
    ///
    /// Whitespace is removed before splitting.
    pub async fn long_speak(&mut self, text: &str) -> TtsResult<&mut Self> {
        tracing::info!(
            provider = %self.provider(),
            voice = %self.repository.voice(),
            text_length = char_len(text),
            "Starting long TTS synthesis"
        );

        let orchestrator = self.long_speak_orchestrator();
        let audio_data = orchestrator
            .long_speak(self.repository.as_ref(), text)
            .await?;
        self.audio = Some(audio_data);
        Ok(self)
    }

    /// Synthesize text of any length.
    ///
    /// Text that fits one request goes through [`speak`](Self::speak) as is.
    /// Longer text is measured after whitespace removal: it goes through
    /// [`long_speak`](Self::long_speak) when it still fills a chunk, otherwise
    /// the normalized text is spoken in one request.
    pub async fn synthesize(&mut self, text: &str) -> TtsResult<&mut Self> {
        let max = self.repository.max_chunk_size().get();
        if char_len(text) <= max {
            return self.speak(text).await;
        }

        let normalized = normalize_text(text);
        if char_len(&normalized) >= max {
            self.long_speak(&normalized).await
        } else {
            self.speak(&normalized).await
        }
    }

    /// The last synthesized audio
    pub fn audio(&self) -> TtsResult<&[u8]> {
        self.audio.as_deref().ok_or(TtsError::NoAudio)
    }

    /// Save the audio to `path`, or to `{audio_dir}/{unix_millis}.{ext}`
    pub async fn save(&self, path: Option<&Path>) -> TtsResult<PathBuf> {
        let audio = self.audio()?;
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => default_audio_path(
                self.settings.audio_dir.as_deref(),
                self.repository.audio_format(),
            ),
        };
        save_audio(audio, &path).await
    }

    /// Upload the audio to `storage_api_url`, returning the stored URL
    pub async fn upload(&self) -> TtsResult<String> {
        let url = self.settings.storage_api_url.as_deref().ok_or_else(|| {
            TtsError::Validation("storage_api_url is required to upload audio".to_string())
        })?;
        let uploader = HttpUploader::new(
            self.http_client.clone(),
            url,
            self.settings.upload_headers.clone(),
        )?;
        self.upload_with(&uploader).await
    }

    pub async fn upload_with<U>(&self, uploader: &U) -> TtsResult<String>
    where
        U: AudioUploader + ?Sized,
    {
        let audio = self.audio()?;
        uploader.upload(audio).await
    }

    pub fn set_voice(&mut self, voice: impl Into<String>) -> &mut Self {
        let voice = voice.into();
        self.settings.voice = voice.clone();
        self.repository.set_voice(voice);
        self
    }

    pub fn set_model(&mut self, model: impl Into<String>) -> TtsResult<&mut Self> {
        let model = model.into();
        self.repository.set_model(model.clone())?;
        self.settings.model = Some(model);
        Ok(self)
    }

    pub async fn list_models(&self) -> TtsResult<Vec<String>> {
        self.repository.list_models().await
    }

    pub async fn list_voices(&self, language_code: Option<&str>) -> TtsResult<Vec<VoiceInfo>> {
        self.repository.list_voices(language_code).await
    }
}
