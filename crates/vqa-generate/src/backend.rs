//! The remote multimodal inference capability

use serde::Serialize;
use std::time::Duration;

/// One part of a message; serializes as `{"image": ...}` or `{"text": ...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentPart {
    /// Inline `data:` URI
    Image(String),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub role: String,
    pub content: Vec<ContentPart>,
}

impl Message {
    pub fn user(content: Vec<ContentPart>) -> Self {
        Self {
            role: "user".to_string(),
            content,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceRequest {
    pub model: String,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub text: String,
}

/// Status and output of one call, successful or not
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceResponse {
    pub status_code: u16,
    /// Service error code, e.g. `InvalidApiKey`
    pub code: Option<String>,
    pub message: Option<String>,
    pub choices: Vec<Choice>,
}

impl InferenceResponse {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            status_code: 200,
            code: None,
            message: None,
            choices: vec![Choice { text: text.into() }],
        }
    }

    pub fn failure(status_code: u16, code: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            status_code,
            code: code.map(String::from),
            message: Some(message.into()),
            choices: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }

    /// First choice carrying non-empty text
    pub fn first_text(&self) -> Option<&str> {
        self.choices
            .iter()
            .map(|c| c.text.as_str())
            .find(|t| !t.trim().is_empty())
    }
}

/// Failure to obtain any response at all
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("malformed response body: {0}")]
    InvalidBody(#[from] serde_json::Error),

    #[error("no API key configured (set DASHSCOPE_API_KEY)")]
    MissingApiKey,

    #[error("{0}")]
    Unavailable(String),
}

pub trait InferenceBackend {
    fn call(
        &self,
        request: &InferenceRequest,
        timeout: Duration,
    ) -> Result<InferenceResponse, BackendError>;
}

impl<T: InferenceBackend + ?Sized> InferenceBackend for &T {
    fn call(
        &self,
        request: &InferenceRequest,
        timeout: Duration,
    ) -> Result<InferenceResponse, BackendError> {
        (**self).call(request, timeout)
    }
}
