//! The text-model seam the gateway talks through.

use serde_json::Value;

/// One structured-output generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    /// JSON schema the model's reply must conform to.
    pub response_schema: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Credential not found in environment variable {0}")]
    MissingCredential(String),
    #[error("Transport failure: {0}")]
    Transport(String),
    #[error("Model endpoint returned status {code}: {body}")]
    Status { code: u16, body: String },
    #[error("Malformed model envelope: {0}")]
    Malformed(String),
}

/// A generative model that returns the raw text of its reply.
pub trait TextModel: Send + Sync {
    fn generate(&self, request: &GenerationRequest) -> Result<String, ModelError>;
}
