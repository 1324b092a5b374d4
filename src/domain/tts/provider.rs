use crate::error::TtsError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Text-to-speech vendors supported by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TtsProviderKind {
    #[serde(rename = "OpenAi")]
    OpenAi,
    #[serde(rename = "ElevenLabs")]
    ElevenLabs,
    #[serde(rename = "Google")]
    Google,
}

impl TtsProviderKind {
    pub const ALL: [TtsProviderKind; 3] = [
        TtsProviderKind::OpenAi,
        TtsProviderKind::ElevenLabs,
        TtsProviderKind::Google,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TtsProviderKind::OpenAi => "OpenAi",
            TtsProviderKind::ElevenLabs => "ElevenLabs",
            TtsProviderKind::Google => "Google",
        }
    }

    /// Prefix of the environment variables holding this vendor's settings
    pub fn env_prefix(&self) -> &'static str {
        match self {
            TtsProviderKind::OpenAi => "OPENAI",
            TtsProviderKind::ElevenLabs => "ELEVENLABS",
            TtsProviderKind::Google => "GOOGLE",
        }
    }
}

impl std::fmt::Display for TtsProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TtsProviderKind {
    type Err = TtsError;

    /// Case-insensitive; accepts the canonical names and the common spellings
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "openai" | "open_ai" | "open-ai" => Ok(TtsProviderKind::OpenAi),
            "elevenlabs" | "eleven_labs" | "eleven-labs" => Ok(TtsProviderKind::ElevenLabs),
            "google" | "google-cloud" => Ok(TtsProviderKind::Google),
            other => Err(TtsError::Validation(format!(
                "TtsProvider must be one of {}, got '{}'",
                TtsProviderKind::ALL
                    .iter()
                    .map(|p| p.as_str())
                    .collect::<Vec<_>>()
                    .join(","),
                other
            ))),
        }
    }
}
