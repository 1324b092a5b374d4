use crate::domain::tts::TtsProviderKind;

/// Main library error type
#[derive(Debug, thiserror::Error)]
pub enum TtsError {
    #[error(
        "text must be at least {required} characters long to use the \"long_speak\" method, \
         received {received}. Use the \"speak\" method instead"
    )]
    InputTooShort { required: usize, received: usize },

    #[error("Value must be less than {max} characters received {received} characters.")]
    TextTooLong { max: usize, received: usize },

    #[error("Invalid concurrency budget: {0} (must be a positive integer or unbounded)")]
    InvalidConcurrencyBudget(String),

    #[error("Fragment count {actual} does not match chunk count {expected}")]
    FragmentMismatch { expected: usize, actual: usize },

    /// Slot acquisition failed because the semaphore was closed.
    /// `ConcurrencyLimiter` never closes its own semaphore.
    #[error("Concurrency limiter closed")]
    LimiterClosed,

    #[error("audio is not available, call speak or long_speak first")]
    NoAudio,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not supported by {provider}: {message}")]
    Unsupported {
        provider: TtsProviderKind,
        message: String,
    },

    #[error("{provider} error: {message}")]
    Provider {
        provider: TtsProviderKind,
        message: String,
    },

    #[error("OpenAI error: {0}")]
    OpenAi(#[from] async_openai::error::OpenAIError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Upload failed: {0}")]
    Upload(String),
}

impl TtsError {
    pub fn provider(provider: TtsProviderKind, message: impl Into<String>) -> Self {
        Self::Provider {
            provider,
            message: message.into(),
        }
    }
}

/// Custom result type for the library
pub type TtsResult<T> = Result<T, TtsError>;
