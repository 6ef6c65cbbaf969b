//! Multiple-choice vehicle VQA generation through a remote multimodal model

mod backend;
mod dashscope;
mod encode;
mod generator;
mod prompt;
mod retry;

pub use backend::{
    BackendError, Choice, ContentPart, InferenceBackend, InferenceRequest, InferenceResponse,
    Message,
};
pub use dashscope::DashScopeBackend;
pub use encode::{
    decode_base64, encode_base64, encode_image_bytes, encode_image_file, EncodeError,
    EncodedImage, MimePolicy,
};
pub use generator::{
    GenerateError, Generation, GenerationRequest, GeneratorConfig, QuestionGenerator,
};
pub use prompt::{build_prompt, PromptTemplate};
pub use retry::{Delay, NoDelay, RecordingDelay, RetryPolicy, ThreadSleep};
