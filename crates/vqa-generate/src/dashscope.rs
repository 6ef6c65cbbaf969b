//! DashScope multimodal-generation backend (blocking HTTP)

use crate::backend::{
    BackendError, Choice, InferenceBackend, InferenceRequest, InferenceResponse, Message,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use vqa_core::ApiSettings;

pub struct DashScopeBackend {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
}

impl DashScopeBackend {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, BackendError> {
        let client = reqwest::blocking::Client::builder().build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }

    pub fn from_settings(settings: &ApiSettings) -> Result<Self, BackendError> {
        let api_key = settings
            .api_key
            .as_deref()
            .ok_or(BackendError::MissingApiKey)?;
        Self::new(settings.endpoint.clone(), api_key)
    }
}

impl InferenceBackend for DashScopeBackend {
    fn call(
        &self,
        request: &InferenceRequest,
        timeout: Duration,
    ) -> Result<InferenceResponse, BackendError> {
        let body = WireRequest {
            model: &request.model,
            input: WireInput {
                messages: &request.messages,
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .timeout(timeout)
            .json(&body)
            .send()?;

        let status = response.status().as_u16();
        let text = response.text()?;
        parse_response(status, &text)
    }
}

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    input: WireInput<'a>,
}

#[derive(Serialize)]
struct WireInput<'a> {
    messages: &'a [Message],
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    output: Option<WireOutput>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireOutput {
    #[serde(default)]
    choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireMessage,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    #[serde(default)]
    content: WireContent,
}

/// Multimodal replies carry a list of parts; text-only replies a plain string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireContent {
    Text(String),
    Parts(Vec<WirePart>),
}

impl Default for WireContent {
    fn default() -> Self {
        WireContent::Parts(Vec::new())
    }
}

#[derive(Debug, Deserialize)]
struct WirePart {
    #[serde(default)]
    text: Option<String>,
}

impl WireContent {
    fn into_text(self) -> String {
        match self {
            WireContent::Text(text) => text,
            WireContent::Parts(parts) => parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join(""),
        }
    }
}

/// Map an HTTP status and body to a response.
///
/// A non-200 body that is not JSON still yields a response, with the raw
/// body as its message; a 200 body that is not JSON is an error.
pub(crate) fn parse_response(status: u16, body: &str) -> Result<InferenceResponse, BackendError> {
    let wire: WireResponse = match serde_json::from_str(body) {
        Ok(wire) => wire,
        Err(e) if status == 200 => return Err(BackendError::InvalidBody(e)),
        Err(_) => {
            return Ok(InferenceResponse {
                status_code: status,
                code: None,
                message: Some(body.trim().to_string()),
                choices: Vec::new(),
            })
        }
    };

    let choices = wire
        .output
        .map(|o| o.choices)
        .unwrap_or_default()
        .into_iter()
        .map(|c| Choice {
            text: c.message.content.into_text(),
        })
        .collect();

    Ok(InferenceResponse {
        status_code: status,
        code: wire.code.filter(|c| !c.is_empty()),
        message: wire.message.filter(|m| !m.is_empty()),
        choices,
    })
}
