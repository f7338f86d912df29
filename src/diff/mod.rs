//! Diff model, parsing, noise filtering, and truncation.

pub mod noise;
pub mod parser;
pub mod truncate;

pub use noise::strip_version_noise;
pub use parser::{parse_diff, DiffDocument, FileChange, FileKind, HunkLine, LineMarker};
pub use truncate::{estimate_tokens, truncate_to_budget, CHARS_PER_TOKEN};
