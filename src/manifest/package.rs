//! Application manifest (package.json) read/write.
//!
//! The manifest is always read fresh from disk immediately before a
//! mutation and written back as one complete document, because the external
//! git and package-manager tools may touch it between steps.

use std::io::Write;
use std::path::Path;

use semver::Version;
use tracing::warn;

use crate::error::ManifestError;
use crate::manifest::version::parse_strict;

/// Read the current version from a package.json.
pub fn read_version(path: &Path) -> Result<Version, ManifestError> {
    let json = read_document(path)?;
    let raw = json
        .get("version")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ManifestError::MissingVersionField {
            path: path.to_path_buf(),
        })?;
    parse_strict(raw)
}

/// Rewrite the version field, preserving every other key.
///
/// Single atomic read-modify-write: the document is re-read, mutated in
/// memory, and replaced via a temp file in the same directory, so a failure
/// can never leave a half-serialized manifest behind.
pub fn write_version(path: &Path, new_version: &Version) -> Result<(), ManifestError> {
    let mut json = read_document(path)?;
    json["version"] = serde_json::Value::String(new_version.to_string());

    let output = serde_json::to_string_pretty(&json).map_err(|e| ManifestError::ParseFailed {
        path: path.to_path_buf(),
        reason: format!("Failed to serialize JSON: {e}"),
    })?;

    // npm keeps a trailing newline
    write_atomic(path, &format!("{output}\n"))
}

/// Best-effort refresh of package-lock.json after a version bump.
///
/// Rewrites the top-level `version` and the root entry under `packages.""`
/// when the lockfile exists. Absence or failure only warns; the lockfile is
/// a derived artifact and must never fail the run.
pub fn refresh_lockfile(root: &Path, new_version: &Version) {
    let lock_path = root.join("package-lock.json");
    if !lock_path.exists() {
        return;
    }

    let result = (|| -> Result<(), ManifestError> {
        let mut json = read_document(&lock_path)?;
        json["version"] = serde_json::Value::String(new_version.to_string());
        if let Some(root_pkg) = json
            .get_mut("packages")
            .and_then(|p| p.get_mut(""))
            .and_then(|r| r.as_object_mut())
        {
            root_pkg.insert(
                "version".to_string(),
                serde_json::Value::String(new_version.to_string()),
            );
        }
        let output =
            serde_json::to_string_pretty(&json).map_err(|e| ManifestError::ParseFailed {
                path: lock_path.clone(),
                reason: e.to_string(),
            })?;
        write_atomic(&lock_path, &format!("{output}\n"))
    })();

    if let Err(e) = result {
        warn!("Could not refresh package-lock.json: {e}");
    }
}

fn read_document(path: &Path) -> Result<serde_json::Value, ManifestError> {
    let content = std::fs::read_to_string(path).map_err(|e| ManifestError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&content).map_err(|e| ManifestError::ParseFailed {
        path: path.to_path_buf(),
        reason: format!("Invalid JSON: {e}"),
    })
}

pub(crate) fn write_atomic(path: &Path, content: &str) -> Result<(), ManifestError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let io_err = |e: std::io::Error| ManifestError::WriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(content.as_bytes()).map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}
