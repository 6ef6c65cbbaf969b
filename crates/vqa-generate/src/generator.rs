//! Three-question VQA generation with bounded retries

use crate::backend::{
    BackendError, ContentPart, InferenceBackend, InferenceRequest, InferenceResponse, Message,
};
use crate::encode::{encode_image_file, EncodeError, EncodedImage, MimePolicy};
use crate::prompt::{build_prompt, PromptTemplate};
use crate::retry::{Delay, RetryPolicy, ThreadSleep};
use std::path::{Path, PathBuf};
use std::time::Duration;
use vqa_annotations::AnnotationRecord;
use vqa_core::Settings;

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("image file does not exist: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("image processing failed: {0}")]
    Encode(#[from] EncodeError),

    #[error("API call failed, status {status}: {message}")]
    RemoteCallFailure {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("API call raised an exception: {description}")]
    RemoteCallException { description: String },
}

impl GenerateError {
    /// Stable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            GenerateError::MissingFile(_) => "MissingFile",
            GenerateError::Encode(_) => "EncodeError",
            GenerateError::RemoteCallFailure { .. } => "RemoteCallFailure",
            GenerateError::RemoteCallException { .. } => "RemoteCallException",
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub model: String,
    /// Per-call timeout handed to the backend
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub mime_policy: MimePolicy,
}

impl GeneratorConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            model: settings.api.model.clone(),
            timeout: settings.api.timeout(),
            retry: RetryPolicy::from_settings(settings),
            mime_policy: MimePolicy::default(),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Two encoded images, their optional annotations and the prompt variant
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub image_a: EncodedImage,
    pub image_b: EncodedImage,
    pub annotation_a: Option<AnnotationRecord>,
    pub annotation_b: Option<AnnotationRecord>,
    pub template: PromptTemplate,
}

impl GenerationRequest {
    /// Template follows from whether any annotation is present
    pub fn new(
        image_a: EncodedImage,
        image_b: EncodedImage,
        annotation_a: Option<AnnotationRecord>,
        annotation_b: Option<AnnotationRecord>,
    ) -> Self {
        let template =
            PromptTemplate::for_annotations(annotation_a.as_ref(), annotation_b.as_ref());
        Self {
            image_a,
            image_b,
            annotation_a,
            annotation_b,
            template,
        }
    }

    pub fn prompt(&self) -> String {
        build_prompt(
            self.template,
            &self.image_a,
            &self.image_b,
            self.annotation_a.as_ref(),
            self.annotation_b.as_ref(),
        )
    }

    /// Single user message: image A, image B, then the instruction
    pub fn to_inference_request(&self, model: &str) -> InferenceRequest {
        InferenceRequest {
            model: model.to_string(),
            messages: vec![Message::user(vec![
                ContentPart::Image(self.image_a.data_uri()),
                ContentPart::Image(self.image_b.data_uri()),
                ContentPart::Text(self.prompt()),
            ])],
        }
    }
}

/// Raw model output, passed through unvalidated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub text: String,
    pub attempts: u32,
}

enum AttemptFailure {
    Status(InferenceResponse),
    Transport(BackendError),
}

impl From<AttemptFailure> for GenerateError {
    fn from(failure: AttemptFailure) -> Self {
        match failure {
            AttemptFailure::Status(response) => GenerateError::RemoteCallFailure {
                status: response.status_code,
                message: response
                    .message
                    .unwrap_or_else(|| "response contained no text".to_string()),
                code: response.code,
            },
            AttemptFailure::Transport(e) => GenerateError::RemoteCallException {
                description: e.to_string(),
            },
        }
    }
}

pub struct QuestionGenerator<B, D = ThreadSleep> {
    backend: B,
    delay: D,
    config: GeneratorConfig,
}

impl<B: InferenceBackend> QuestionGenerator<B, ThreadSleep> {
    pub fn new(backend: B, config: GeneratorConfig) -> Self {
        Self::with_delay(backend, ThreadSleep, config)
    }
}

impl<B: InferenceBackend, D: Delay> QuestionGenerator<B, D> {
    pub fn with_delay(backend: B, delay: D, config: GeneratorConfig) -> Self {
        Self {
            backend,
            delay,
            config,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Check, encode and generate from two image files.
    ///
    /// Missing files and undecodable images fail immediately without
    /// contacting the backend.
    pub fn generate_from_paths(
        &self,
        path_a: &Path,
        path_b: &Path,
        annotation_a: Option<&AnnotationRecord>,
        annotation_b: Option<&AnnotationRecord>,
    ) -> Result<Generation, GenerateError> {
        for path in [path_a, path_b] {
            if !path.is_file() {
                tracing::error!(image = %path.display(), "Image file does not exist");
                return Err(GenerateError::MissingFile(path.to_path_buf()));
            }
        }

        let image_a = encode_image_file(path_a, self.config.mime_policy)?;
        let image_b = encode_image_file(path_b, self.config.mime_policy)?;

        let request = GenerationRequest::new(
            image_a,
            image_b,
            annotation_a.cloned(),
            annotation_b.cloned(),
        );
        self.generate(&request)
    }

    /// Call the backend until it answers with text or the attempt budget is spent
    pub fn generate(&self, request: &GenerationRequest) -> Result<Generation, GenerateError> {
        let inference = request.to_inference_request(&self.config.model);
        let max_attempts = self.config.retry.max_attempts.max(1);

        let mut attempt = 0;
        loop {
            attempt += 1;
            let failure = match self.backend.call(&inference, self.config.timeout) {
                Ok(response) if response.is_success() => match response.first_text() {
                    Some(text) => {
                        tracing::info!(attempt, model = %self.config.model, "API call succeeded");
                        return Ok(Generation {
                            text: text.to_string(),
                            attempts: attempt,
                        });
                    }
                    None => AttemptFailure::Status(response),
                },
                Ok(response) => AttemptFailure::Status(response),
                Err(e) => AttemptFailure::Transport(e),
            };

            let error = GenerateError::from(failure);
            if attempt >= max_attempts {
                tracing::error!(
                    attempt,
                    max_attempts,
                    error = %error,
                    "API call failed after all attempts"
                );
                return Err(error);
            }

            let wait = self.config.retry.delay_for(attempt - 1);
            tracing::warn!(
                attempt,
                max_attempts,
                error = %error,
                wait_ms = wait.as_millis() as u64,
                "API call attempt failed, retrying"
            );
            self.delay.sleep(wait);
        }
    }
}
