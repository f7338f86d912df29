//! Versioned manifest documents and bump arithmetic.

pub mod chart;
pub mod package;
pub mod version;

pub use version::{apply_bump, parse_strict, BumpKind};
