use crate::error::{TtsError, TtsResult};
use crate::infrastructure::config::AudioFormat;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_AUDIO_DIR: &str = "audio";

/// `{audio_dir}/{unix_millis}.{ext}`
pub fn default_audio_path(audio_dir: Option<&Path>, format: AudioFormat) -> PathBuf {
    let dir = audio_dir.unwrap_or_else(|| Path::new(DEFAULT_AUDIO_DIR));
    dir.join(format!(
        "{}.{}",
        chrono::Utc::now().timestamp_millis(),
        format.extension()
    ))
}

/// Write audio to `path`, creating missing parent directories
pub async fn save_audio(audio: &[u8], path: &Path) -> TtsResult<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, audio).await?;

    tracing::info!(
        path = %path.display(),
        audio_size_bytes = audio.len(),
        "Audio saved"
    );

    Ok(path.to_path_buf())
}

/// Destination for synthesized audio, answering with where it was stored
#[async_trait]
pub trait AudioUploader: Send + Sync {
    async fn upload(&self, audio: &[u8]) -> TtsResult<String>;
}

#[derive(Debug, Deserialize)]
struct UploadErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct UploadedBody {
    url: String,
}

/// POSTs the raw audio to a storage endpoint
pub struct HttpUploader {
    http_client: reqwest::Client,
    url: reqwest::Url,
    headers: Vec<(String, String)>,
}

impl HttpUploader {
    pub fn new(
        http_client: reqwest::Client,
        url: &str,
        headers: Vec<(String, String)>,
    ) -> TtsResult<Self> {
        let url = reqwest::Url::parse(url)
            .map_err(|e| TtsError::Validation(format!("storage API URL '{}' is invalid: {}", url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(TtsError::Validation(format!(
                "storage API URL must be http or https, got '{}'",
                url.scheme()
            )));
        }

        Ok(Self {
            http_client,
            url,
            headers,
        })
    }
}

#[async_trait]
impl AudioUploader for HttpUploader {
    async fn upload(&self, audio: &[u8]) -> TtsResult<String> {
        let mut request = self
            .http_client
            .post(self.url.clone())
            .header("Content-Type", "application/octet-stream")
            .body(audio.to_vec());
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<UploadErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or_else(|_| format!("storage API responded with status {}", status));
            tracing::error!(status = status.as_u16(), error = %message, "Audio upload failed");
            return Err(TtsError::Upload(message));
        }

        let location = serde_json::from_str::<UploadedBody>(&body)
            .map(|b| b.url)
            .or_else(|_| serde_json::from_str::<String>(&body))
            .unwrap_or_else(|_| body.trim().to_string());

        tracing::info!(
            url = %location,
            audio_size_bytes = audio.len(),
            "Audio uploaded"
        );

        Ok(location)
    }
}
