//! File classification: which paths are noise, infra, or application code.

pub mod aggregate;
pub mod rules;

pub use aggregate::{aggregate, aggregate_diff, ChangeType};
pub use rules::{ClassifyRules, ExclusionRule, ExclusionSet};

/// Semantic bucket for a changed path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Non-semantic noise (lockfiles, build output, the chart manifest).
    Excluded,
    /// Operational tooling under the infra root.
    InfraScript,
    /// Deployment configuration under the infra root.
    InfraConfig,
    /// Application source.
    AppCode,
}

/// Facts about the workspace the classifier needs, passed explicitly so
/// classification stays a pure function with no filesystem access.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkspaceFacts {
    pub has_app_manifest: bool,
    pub has_chart_manifest: bool,
}

/// Classify one repo-relative path.
///
/// Exclusion is checked first and is terminal. The chart manifest itself is
/// excluded too: it is this tool's own bump target, and a change to it is
/// either our previous bump or chart bookkeeping, never an application
/// change. In a workspace with no application manifest there is no
/// application to version, so stray non-infra paths fall into the infra
/// bucket instead.
pub fn classify(path: &str, rules: &ClassifyRules, facts: &WorkspaceFacts) -> Category {
    if rules.exclusions.matches(path) || path == rules.chart_manifest {
        return Category::Excluded;
    }

    if path.starts_with(rules.infra_root.as_str()) {
        return if rules.is_script_path(path) {
            Category::InfraScript
        } else {
            Category::InfraConfig
        };
    }

    if facts.has_app_manifest {
        Category::AppCode
    } else {
        Category::InfraConfig
    }
}
