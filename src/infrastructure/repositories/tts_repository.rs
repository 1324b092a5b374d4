use crate::domain::tts::{ChunkSynthesizer, ConcurrencyBudget, MaxChunkSize, TtsProviderKind, VoiceInfo};
use crate::error::TtsResult;
use crate::infrastructure::config::AudioFormat;
use async_trait::async_trait;

/// Repository for TTS synthesis operations.
/// Abstracts the underlying TTS vendor (OpenAI, ElevenLabs, Google).
///
/// Implementations are responsible for:
/// - Translating one bounded-length text into the vendor request shape
/// - Mapping vendor errors into [`TtsError`](crate::error::TtsError)
/// - Vendor-specific voice and model selection
///
/// Splitting and merging for long texts happens above this layer, driven by
/// [`max_chunk_size`](TtsRepository::max_chunk_size).
#[async_trait]
pub trait TtsRepository: ChunkSynthesizer {
    fn provider(&self) -> TtsProviderKind;

    /// Maximum characters accepted by one synthesis request
    fn max_chunk_size(&self) -> MaxChunkSize;

    /// Budget used by long synthesis when the settings leave it unset
    fn default_concurrency(&self) -> ConcurrencyBudget;

    fn audio_format(&self) -> AudioFormat;

    fn voice(&self) -> &str;

    fn set_voice(&mut self, voice: String);

    fn model(&self) -> Option<&str>;

    /// # Errors
    /// Returns `Unsupported` for vendors with a single model
    fn set_model(&mut self, model: String) -> TtsResult<()>;

    async fn list_models(&self) -> TtsResult<Vec<String>>;

    /// Voices available, optionally restricted to a BCP-47 language code
    async fn list_voices(&self, language_code: Option<&str>) -> TtsResult<Vec<VoiceInfo>>;
}
