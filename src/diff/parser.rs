//! Unified-diff parsing into a per-file change model.
//!
//! The parser only needs to identify file boundaries, per-line add/delete
//! markers, and file metadata. It does not apply patches, so it stays
//! deliberately tolerant: a malformed header skips that file and parsing
//! continues with the next one.

use tracing::warn;

/// Marker of a single hunk line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMarker {
    Context,
    Add,
    Delete,
}

/// One line inside a hunk, with its leading marker stripped.
#[derive(Debug, Clone)]
pub struct HunkLine {
    pub marker: LineMarker,
    pub text: String,
}

/// How a file changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileKind {
    Modified,
    Added,
    Deleted,
    Renamed { from: String, to: String },
}

/// One file's changes in the diff.
#[derive(Debug, Clone)]
pub struct FileChange {
    /// Repo-relative path, forward-slash normalized.
    pub path: String,
    pub kind: FileKind,
    pub hunk_lines: Vec<HunkLine>,
    /// Binary files carry no hunk lines but still count as a change.
    pub binary: bool,
    /// File-mode-only entries carry no hunk lines either.
    pub mode_change: bool,
}

impl FileChange {
    pub fn additions(&self) -> usize {
        self.hunk_lines
            .iter()
            .filter(|l| l.marker == LineMarker::Add)
            .count()
    }

    pub fn deletions(&self) -> usize {
        self.hunk_lines
            .iter()
            .filter(|l| l.marker == LineMarker::Delete)
            .count()
    }

    /// Whether this entry still represents an actual change.
    ///
    /// A modified file whose add/delete lines were all stripped (by the
    /// version-noise filter) is no longer a change and must not feed the
    /// change-type aggregation.
    pub fn has_effective_change(&self) -> bool {
        self.additions() > 0
            || self.deletions() > 0
            || self.binary
            || self.mode_change
            || !matches!(self.kind, FileKind::Modified)
    }
}

/// Ordered sequence of per-file changes, in diff-text order.
#[derive(Debug, Clone, Default)]
pub struct DiffDocument {
    pub files: Vec<FileChange>,
}

impl DiffDocument {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Parse unified-diff text into a [`DiffDocument`].
///
/// Tolerates diffs with no trailing newline, mode-change-only entries, and
/// binary files. A file with a malformed `diff --git` header is skipped with
/// a warning; subsequent files still parse.
pub fn parse_diff(text: &str) -> DiffDocument {
    let mut doc = DiffDocument::default();
    let mut current: Option<FileChange> = None;
    // Content +/- lines only exist after a hunk header. This keeps the
    // `--- a/...` and `+++ b/...` metadata lines out of the hunks.
    let mut in_hunk = false;
    // Set when a header failed to parse: swallow lines until the next header.
    let mut skipping = false;

    for line in text.lines() {
        if let Some(rest) = line.strip_prefix("diff --git ") {
            if let Some(file) = current.take() {
                doc.files.push(file);
            }
            in_hunk = false;
            match parse_header_paths(rest) {
                Some((_old, new)) => {
                    skipping = false;
                    current = Some(FileChange {
                        path: new,
                        kind: FileKind::Modified,
                        hunk_lines: Vec::new(),
                        binary: false,
                        mode_change: false,
                    });
                }
                None => {
                    skipping = true;
                    warn!("Skipping file with malformed diff header: {line}");
                }
            }
            continue;
        }

        if skipping {
            continue;
        }

        let Some(file) = current.as_mut() else {
            // Preamble before the first header (e.g. command echo). Ignore.
            continue;
        };

        if line.starts_with("@@") {
            in_hunk = true;
            continue;
        }

        if !in_hunk {
            if line.starts_with("new file mode") {
                file.kind = FileKind::Added;
            } else if line.starts_with("deleted file mode") {
                file.kind = FileKind::Deleted;
            } else if let Some(from) = line.strip_prefix("rename from ") {
                file.kind = FileKind::Renamed {
                    from: normalize_path(from),
                    to: file.path.clone(),
                };
            } else if let Some(to) = line.strip_prefix("rename to ") {
                let to = normalize_path(to);
                file.path = to.clone();
                if let FileKind::Renamed { to: ref mut t, .. } = file.kind {
                    *t = to;
                }
            } else if line.starts_with("old mode") || line.starts_with("new mode") {
                file.mode_change = true;
            } else if line.starts_with("Binary files") || line.starts_with("GIT binary patch") {
                file.binary = true;
            }
            // index lines, ---/+++ markers, similarity scores: metadata, skipped.
            continue;
        }

        if let Some(text) = line.strip_prefix('+') {
            file.hunk_lines.push(HunkLine {
                marker: LineMarker::Add,
                text: text.to_string(),
            });
        } else if let Some(text) = line.strip_prefix('-') {
            file.hunk_lines.push(HunkLine {
                marker: LineMarker::Delete,
                text: text.to_string(),
            });
        } else if let Some(text) = line.strip_prefix(' ') {
            file.hunk_lines.push(HunkLine {
                marker: LineMarker::Context,
                text: text.to_string(),
            });
        }
        // "\ No newline at end of file" and anything else: ignored.
    }

    if let Some(file) = current.take() {
        doc.files.push(file);
    }

    doc
}

/// Extract (old, new) paths from the text after `diff --git `.
///
/// The header is `a/<old> b/<new>`. Splitting on ` b/` rather than
/// whitespace keeps paths containing spaces intact.
fn parse_header_paths(rest: &str) -> Option<(String, String)> {
    let old_part = rest.strip_prefix("a/")?;
    let split = old_part.find(" b/")?;
    let old = &old_part[..split];
    let new = &old_part[split + 3..];
    if old.is_empty() || new.is_empty() {
        return None;
    }
    Some((normalize_path(old), normalize_path(new)))
}

fn normalize_path(path: &str) -> String {
    path.trim().replace('\\', "/")
}
