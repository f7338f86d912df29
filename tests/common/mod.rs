//! Shared test utilities for integration tests.
//!
//! Not all helpers are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::Path;

use async_trait::async_trait;
use git2::{IndexAddOption, Oid, Repository};

use bumpwright::error::LlmError;
use bumpwright::llm::TextModel;

/// A git-backed workspace in a temp directory.
pub struct TestWorkspace {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestWorkspace {
    /// Create an empty git repository with a commit identity configured.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        {
            let mut config = repo.config().expect("Failed to open repo config");
            config.set_str("user.name", "Test User").unwrap();
            config.set_str("user.email", "test@example.com").unwrap();
        }
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file at a repo-relative path, creating parent directories.
    pub fn write(&self, rel: &str, content: &str) {
        let path = self.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path().join(rel)).unwrap()
    }

    /// Stage everything and commit. Returns the commit OID.
    pub fn commit_all(&self, message: &str) -> Oid {
        let mut index = self.repo.index().unwrap();
        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = self.repo.find_tree(tree_id).unwrap();
        let sig = self.repo.signature().unwrap();
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    /// Message of the current HEAD commit.
    pub fn head_message(&self) -> String {
        self.repo
            .head()
            .unwrap()
            .peel_to_commit()
            .unwrap()
            .message()
            .unwrap()
            .to_string()
    }
}

/// Text model that always returns the same canned response.
pub struct StubModel {
    pub response: String,
}

impl StubModel {
    /// A model that classifies every diff as the given bump kind.
    pub fn bump(kind: &str) -> Self {
        StubModel {
            response: format!(r#"{{"bump": "{kind}", "reasoning": "stubbed"}}"#),
        }
    }

    pub fn text(response: &str) -> Self {
        StubModel {
            response: response.to_string(),
        }
    }
}

#[async_trait]
impl TextModel for StubModel {
    async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
        Ok(self.response.clone())
    }
}

/// Text model that records every prompt it is given.
pub struct RecordingModel {
    pub response: String,
    pub prompts: std::sync::Mutex<Vec<String>>,
}

impl RecordingModel {
    pub fn bump(kind: &str) -> Self {
        RecordingModel {
            response: format!(r#"{{"bump": "{kind}", "reasoning": "stubbed"}}"#),
            prompts: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn last_prompt(&self) -> String {
        self.prompts
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("model was never called")
    }
}

#[async_trait]
impl TextModel for RecordingModel {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.response.clone())
    }
}

/// Text model that fails the test if it is ever contacted.
pub struct UnreachableModel;

#[async_trait]
impl TextModel for UnreachableModel {
    async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
        panic!("the text model should not have been contacted");
    }
}
