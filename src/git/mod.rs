//! Version-control collaborator: status, diff text, and commits via git2.

pub mod commit;
pub mod diff;
pub mod status;

pub use commit::stage_and_commit;
pub use diff::{range_diff, working_tree_diff, working_tree_diff_for_paths};
pub use status::{working_tree_status, EntryStatus, StatusEntry};
