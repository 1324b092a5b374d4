pub mod concat;
pub mod concurrency;
pub mod long_speak;
pub mod provider;
pub mod service;
pub mod text;
pub mod voice;

pub use concat::concat_fragments;
pub use concurrency::{ConcurrencyBudget, ConcurrencyLimiter};
pub use long_speak::{ChunkSynthesizer, LongSpeakOrchestrator};
pub use provider::TtsProviderKind;
pub use service::TextToSpeech;
pub use text::{normalize_text, split_long_text, MaxChunkSize};
pub use voice::VoiceInfo;
