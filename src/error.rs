//! Error types for bumpwright modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Not a git repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("Failed to read working tree status: {0}")]
    StatusFailed(#[source] git2::Error),

    #[error("Failed to collect diff: {0}")]
    DiffFailed(#[source] git2::Error),

    #[error("Failed to resolve revision '{spec}': {source}")]
    RevparseFailed {
        spec: String,
        #[source]
        source: git2::Error,
    },

    #[error("Failed to stage '{path}': {source}")]
    StagingFailed {
        path: String,
        #[source]
        source: git2::Error,
    },

    #[error("Nothing to commit (staged tree matches HEAD)")]
    NothingToCommit,

    #[error("Git config error (missing user.name or user.email): {0}")]
    ConfigError(#[source] git2::Error),

    #[error("Failed to create commit: {0}")]
    CommitFailed(#[source] git2::Error),
}

/// Errors from manifest read/write and version parsing.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {reason}")]
    ParseFailed { path: PathBuf, reason: String },

    #[error("No 'version' field in {path}")]
    MissingVersionField { path: PathBuf },

    #[error("Invalid version string '{value}': {reason}")]
    InvalidVersion { value: String, reason: String },
}

/// Errors from the generative text-model API.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error(
        "No API key found. Set BUMPWRIGHT_API_KEY (or OPENAI_API_KEY) before running classification"
    )]
    MissingApiKey,

    #[error("Text-model request failed: {0}")]
    RequestFailed(#[source] reqwest::Error),

    #[error("Text-model API returned HTTP {status}: {body}")]
    ApiStatus { status: u16, body: String },

    #[error("Text-model returned a malformed response: {0}")]
    MalformedResponse(String),

    #[error(
        "Text-model returned an unrecognized bump value: '{raw}' (expected major, minor, or patch)"
    )]
    InvalidBumpValue { raw: String },

    #[error("All retry attempts failed: {0}")]
    RetriesExhausted(#[source] Box<LlmError>),
}

impl LlmError {
    /// Whether another attempt could plausibly succeed.
    ///
    /// Transport failures, server-side statuses, and contract violations
    /// (malformed output, unrecognized bump value) are retryable. A missing
    /// API key or a client-side rejection is guaranteed to recur.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::RequestFailed(_)
            | LlmError::MalformedResponse(_)
            | LlmError::InvalidBumpValue { .. } => true,
            LlmError::ApiStatus { status, .. } => {
                *status == 408 || *status == 429 || *status >= 500
            }
            LlmError::MissingApiKey | LlmError::RetriesExhausted(_) => false,
        }
    }
}

/// Errors from the bump orchestrator.
#[derive(Error, Debug)]
pub enum BumpError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("No versioned manifest found in {root} (looked for package.json and a Helm Chart.yaml)")]
    NoManifests { root: PathBuf },

    #[error(
        "Manifest update incomplete: {} already rewritten, then {path} failed: {source}",
        written.join(", ")
    )]
    MutationIncomplete {
        written: Vec<String>,
        path: PathBuf,
        #[source]
        source: ManifestError,
    },

    #[error("Cancelled by user")]
    Cancelled,
}
