//! Generative text-model collaborator: auth, transport, retry, prompts.

pub mod auth;
pub mod classifier;
pub mod client;
pub mod json;
pub mod retry;

pub use auth::resolve_api_key;
pub use classifier::{classify_bump, summarize};
pub use client::{HttpTextModel, TextModel, DEFAULT_API_URL, DEFAULT_MODEL};
pub use json::extract_json;
