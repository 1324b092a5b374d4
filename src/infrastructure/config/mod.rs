use crate::domain::tts::{ConcurrencyBudget, TtsProviderKind};
use crate::error::{TtsError, TtsResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const OPENAI_DEFAULT_VOICE: &str = "onyx";
pub const OPENAI_DEFAULT_MODEL: &str = "tts-1";
pub const ELEVENLABS_DEFAULT_VOICE: &str = "29vD33N1CtxCmqQRPOHJ";
pub const ELEVENLABS_DEFAULT_MODEL: &str = "eleven_multilingual_v1";
pub const GOOGLE_DEFAULT_VOICE: &str = "en-GB-Neural2-D";
pub const GOOGLE_DEFAULT_LANGUAGE: &str = "en-GB";
pub const GOOGLE_DEFAULT_GENDER: &str = "MALE";

/// Encoding of the synthesized audio
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Mp3,
    Opus,
    Aac,
    Flac,
    Wav,
    Pcm,
}

impl AudioFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Opus => "opus",
            AudioFormat::Aac => "aac",
            AudioFormat::Flac => "flac",
            AudioFormat::Wav => "wav",
            AudioFormat::Pcm => "pcm",
        }
    }
}

impl FromStr for AudioFormat {
    type Err = TtsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "mp3" => Ok(AudioFormat::Mp3),
            "opus" => Ok(AudioFormat::Opus),
            "aac" => Ok(AudioFormat::Aac),
            "flac" => Ok(AudioFormat::Flac),
            "wav" => Ok(AudioFormat::Wav),
            "pcm" => Ok(AudioFormat::Pcm),
            other => Err(TtsError::Config(format!("unknown audio format '{}'", other))),
        }
    }
}

/// ElevenLabs `voice_settings` request object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevenLabsVoiceSettings {
    pub similarity_boost: f32,
    pub stability: f32,
    pub style: f32,
    pub use_speaker_boost: bool,
}

/// Settings of one TTS client.
///
/// Fields that only one vendor understands are ignored by the others.
#[derive(Debug, Clone)]
pub struct TtsSettings {
    pub provider: TtsProviderKind,
    pub api_key: Option<String>,
    pub voice: String,
    /// Unused by Google, which has a single model
    pub model: Option<String>,
    /// Directory for [`save`](crate::domain::tts::TextToSpeech::save) when no path is given
    pub audio_dir: Option<PathBuf>,
    /// Endpoint accepting a POST with the raw audio as body, answering with the stored URL
    pub storage_api_url: Option<String>,
    /// Extra headers sent along with uploads
    pub upload_headers: Vec<(String, String)>,
    /// `None` falls back to the adapter's `default_concurrency`
    pub max_concurrent_requests: Option<ConcurrencyBudget>,
    /// Override of the vendor API root
    pub base_url: Option<String>,
    pub response_format: AudioFormat,
    /// OpenAI
    pub speed: Option<f32>,
    /// ElevenLabs
    pub voice_settings: Option<ElevenLabsVoiceSettings>,
    /// Google
    pub language_code: Option<String>,
    /// Google
    pub ssml_gender: Option<String>,
}

impl TtsSettings {
    /// Vendor defaults, without an API key
    pub fn for_provider(provider: TtsProviderKind) -> Self {
        let base = Self {
            provider,
            api_key: None,
            voice: String::new(),
            model: None,
            audio_dir: None,
            storage_api_url: None,
            upload_headers: Vec::new(),
            max_concurrent_requests: None,
            base_url: None,
            response_format: AudioFormat::Mp3,
            speed: None,
            voice_settings: None,
            language_code: None,
            ssml_gender: None,
        };

        match provider {
            TtsProviderKind::OpenAi => Self {
                voice: OPENAI_DEFAULT_VOICE.to_string(),
                model: Some(OPENAI_DEFAULT_MODEL.to_string()),
                speed: Some(1.0),
                ..base
            },
            TtsProviderKind::ElevenLabs => Self {
                voice: ELEVENLABS_DEFAULT_VOICE.to_string(),
                model: Some(ELEVENLABS_DEFAULT_MODEL.to_string()),
                ..base
            },
            TtsProviderKind::Google => Self {
                voice: GOOGLE_DEFAULT_VOICE.to_string(),
                language_code: Some(GOOGLE_DEFAULT_LANGUAGE.to_string()),
                ssml_gender: Some(GOOGLE_DEFAULT_GENDER.to_string()),
                ..base
            },
        }
    }

    /// Vendor defaults overridden by the environment (and `.env`)
    pub fn from_env(provider: TtsProviderKind) -> TtsResult<Self> {
        dotenvy::dotenv().ok();

        let mut settings = Self::for_provider(provider);
        settings.api_key = Some(settings.resolve_api_key()?);

        if let Some(voice) = env_var("TTS_VOICE") {
            settings.voice = voice;
        }
        if let Some(model) = env_var("TTS_MODEL") {
            settings.model = Some(model);
        }
        settings.audio_dir = env_var("TTS_AUDIO_DIR").map(PathBuf::from);
        settings.storage_api_url = env_var("TTS_STORAGE_API_URL");
        settings.base_url = env_var("TTS_BASE_URL");
        if let Some(budget) = env_var("TTS_MAX_CONCURRENT_REQUESTS") {
            settings.max_concurrent_requests = Some(budget.parse()?);
        }
        if let Some(format) = env_var("TTS_RESPONSE_FORMAT") {
            settings.response_format = format.parse()?;
        }
        if let Some(speed) = env_var("TTS_SPEED") {
            settings.speed = Some(
                speed
                    .parse()
                    .map_err(|_| TtsError::Config(format!("TTS_SPEED is not a number: {}", speed)))?,
            );
        }
        if let Some(language_code) = env_var("TTS_LANGUAGE_CODE") {
            settings.language_code = Some(language_code);
        }

        Ok(settings)
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_max_concurrent_requests(mut self, budget: ConcurrencyBudget) -> Self {
        self.max_concurrent_requests = Some(budget);
        self
    }

    /// Name of the environment variable holding the vendor API key
    pub fn api_key_env_var(&self) -> String {
        format!("{}_TTS_API_KEY", self.provider.env_prefix())
    }

    /// The explicit key if set, otherwise `{VENDOR}_TTS_API_KEY`
    pub fn resolve_api_key(&self) -> TtsResult<String> {
        if let Some(api_key) = self.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
            return Ok(api_key.clone());
        }

        let var = self.api_key_env_var();
        env_var(&var).ok_or_else(|| {
            TtsError::Config(format!(
                "{} requires an API key: pass one explicitly or set {}",
                self.provider, var
            ))
        })
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Configuration of the demo binary
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub provider: TtsProviderKind,
    pub log_format: LogFormat,
    pub tts: TtsSettings,
}

impl AppConfig {
    pub fn from_env() -> TtsResult<Self> {
        dotenvy::dotenv().ok();

        let provider = env_var("TTS_PROVIDER")
            .ok_or_else(|| TtsError::Config("TTS_PROVIDER is required".to_string()))?
            .parse::<TtsProviderKind>()?;

        let log_format = match env_var("LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            provider,
            log_format,
            tts: TtsSettings::from_env(provider)?,
        })
    }
}

fn env_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}
