use serde::{Deserialize, Serialize};

/// Vendor-neutral entry of a voice catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub language_codes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
}

impl VoiceInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            language_codes: Vec::new(),
            gender: None,
            description: None,
            preview_url: None,
        }
    }

    pub fn supports_language(&self, language_code: &str) -> bool {
        self.language_codes.is_empty()
            || self
                .language_codes
                .iter()
                .any(|code| code.eq_ignore_ascii_case(language_code))
    }
}
