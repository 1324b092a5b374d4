//! One text-to-speech interface over OpenAI, ElevenLabs and Google Cloud.
//!
//! Texts longer than a vendor accepts go through [`TextToSpeech::long_speak`],
//! which splits them, synthesizes the chunks under a concurrency budget and
//! joins the audio back in reading order.

pub mod domain;
pub mod error;
pub mod infrastructure;

pub use domain::tts::{ConcurrencyBudget, TextToSpeech, TtsProviderKind, VoiceInfo};
pub use error::{TtsError, TtsResult};
pub use infrastructure::config::{AudioFormat, TtsSettings};
