use crate::error::{TtsError, TtsResult};
use regex::Regex;
use std::num::NonZeroUsize;
use std::sync::OnceLock;

/// Per-request character limit of a vendor. Non-zero by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MaxChunkSize(NonZeroUsize);

impl MaxChunkSize {
    /// For vendor constants; zero fails const evaluation
    pub const fn new_const(size: usize) -> Self {
        match NonZeroUsize::new(size) {
            Some(size) => Self(size),
            None => panic!("max chunk size must be non-zero"),
        }
    }

    /// Returns `None` for zero
    pub fn from_usize(size: usize) -> Option<Self> {
        NonZeroUsize::new(size).map(Self)
    }

    pub fn get(&self) -> usize {
        self.0.get()
    }
}

impl std::fmt::Display for MaxChunkSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn whitespace_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern is valid"))
}

/// Remove every whitespace run from the text.
///
/// This is lossy: spacing inside code samples or poetry is not preserved.
pub fn normalize_text(text: &str) -> String {
    whitespace_pattern().replace_all(text, "").into_owned()
}

/// Number of characters as counted for vendor limits (Unicode scalar values)
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Split text into fixed windows of `max_chunk_size` characters.
///
/// Cuts are position based and may land mid-word; the last chunk may be
/// shorter. Text shorter than one window belongs on the single-request path
/// and is rejected with [`TtsError::InputTooShort`].
pub fn split_long_text(text: &str, max_chunk_size: MaxChunkSize) -> TtsResult<Vec<String>> {
    let size = max_chunk_size.get();
    let chars: Vec<char> = text.chars().collect();

    if chars.len() < size {
        return Err(TtsError::InputTooShort {
            required: size,
            received: chars.len(),
        });
    }

    Ok(chars.chunks(size).map(|chunk| chunk.iter().collect()).collect())
}
