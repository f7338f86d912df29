//! bumpwright - A CLI tool that classifies a change set and bumps the right
//! version manifests.
//!
//! # Overview
//!
//! bumpwright reads a git diff (working tree or commit range), filters out
//! version-bump noise, decides which parts of the workspace changed
//! (application code, infrastructure, or both), asks a text model for the
//! semver bump kind, and rewrites `package.json` and/or `Chart.yaml`
//! accordingly. It can then stage and commit the rewritten manifests.

pub mod bump;
pub mod classify;
pub mod diff;
pub mod error;
pub mod git;
pub mod llm;
pub mod manifest;

// Re-export commonly used types
pub use bump::{run_bump, BumpConfig, BumpOutcome, Workspace};
pub use classify::{ChangeType, ClassifyRules, WorkspaceFacts};
pub use error::{BumpError, GitError, LlmError, ManifestError};
pub use llm::{HttpTextModel, TextModel};
pub use manifest::BumpKind;
