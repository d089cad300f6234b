pub mod gateway;

pub use gateway::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("model gateway unreachable at {0}")]
    Connection(String),

    #[error("model gateway returned error (status {status}): {body}")]
    Gateway { status: u16, body: String },

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("response parsing error: {0}")]
    ResponseParsing(String),

    #[error("model reply contained no content")]
    EmptyReply,
}

/// One generation request. The image, when present, is base64 (bare or as a
/// full data URL).
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub prompt: String,
    pub image: Option<String>,
    pub temperature: f32,
}

/// The hosted multimodal model, seen as an opaque text generator.
///
/// No retry policy lives here; output is untrusted text that the OCR and
/// advice parsers defend against.
#[async_trait::async_trait]
pub trait GenerativeClient: Send + Sync {
    async fn generate(&self, request: GenerateRequest) -> Result<String, ModelError>;
}
