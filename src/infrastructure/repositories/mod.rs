pub mod elevenlabs_tts_repository;
pub mod google_tts_repository;
pub mod openai_tts_repository;
pub mod tts_repository;

pub use elevenlabs_tts_repository::ElevenLabsTtsRepository;
pub use google_tts_repository::GoogleTtsRepository;
pub use openai_tts_repository::OpenAiTtsRepository;
pub use tts_repository::TtsRepository;

use crate::domain::tts::TtsProviderKind;
use crate::error::TtsResult;
use crate::infrastructure::config::TtsSettings;

/// Build the adapter matching `settings.provider`
pub fn repository_for(settings: &TtsSettings) -> TtsResult<Box<dyn TtsRepository>> {
    let repository: Box<dyn TtsRepository> = match settings.provider {
        TtsProviderKind::OpenAi => Box::new(OpenAiTtsRepository::from_settings(settings)?),
        TtsProviderKind::ElevenLabs => Box::new(ElevenLabsTtsRepository::from_settings(settings)?),
        TtsProviderKind::Google => Box::new(GoogleTtsRepository::from_settings(settings)?),
    };
    Ok(repository)
}
