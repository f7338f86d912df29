//! API-key resolution for the text-model API.

use crate::error::LlmError;

pub const API_KEY_ENV: &str = "BUMPWRIGHT_API_KEY";
pub const API_KEY_FALLBACK_ENV: &str = "OPENAI_API_KEY";

/// Resolve the API key from the environment.
///
/// A missing key is a hard precondition failure: the caller must surface it
/// before any classification is attempted, not after collecting a diff and
/// building a prompt.
pub fn resolve_api_key() -> Result<String, LlmError> {
    for var in [API_KEY_ENV, API_KEY_FALLBACK_ENV] {
        if let Ok(value) = std::env::var(var) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Ok(trimmed.to_string());
            }
        }
    }
    Err(LlmError::MissingApiKey)
}
