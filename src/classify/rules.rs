//! Data-driven classification rules.
//!
//! Which paths count as noise, which subtree is deployment configuration,
//! and what makes a file "script-like" are all data here, so the classifier
//! itself never needs to change when a project's conventions differ.

/// A single path-matching rule: either a literal substring or a glob with a
/// single `*` wildcard.
#[derive(Debug, Clone)]
pub struct ExclusionRule(String);

impl ExclusionRule {
    pub fn new(pattern: impl Into<String>) -> Self {
        ExclusionRule(pattern.into())
    }

    pub fn matches(&self, path: &str) -> bool {
        match self.0.split_once('*') {
            Some((prefix, suffix)) => {
                path.len() >= prefix.len() + suffix.len()
                    && path.starts_with(prefix)
                    && path.ends_with(suffix)
            }
            None => path.contains(self.0.as_str()),
        }
    }
}

/// Ordered set of rules identifying non-semantic files.
#[derive(Debug, Clone)]
pub struct ExclusionSet {
    rules: Vec<ExclusionRule>,
}

impl ExclusionSet {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ExclusionSet {
            rules: patterns.into_iter().map(ExclusionRule::new).collect(),
        }
    }

    /// A path is excluded if any rule matches.
    pub fn matches(&self, path: &str) -> bool {
        self.rules.iter().any(|r| r.matches(path))
    }
}

impl Default for ExclusionSet {
    /// Lockfiles, dependency directories, build/coverage output, and
    /// generated assets.
    fn default() -> Self {
        ExclusionSet::new([
            "package-lock.json",
            "npm-shrinkwrap.json",
            "yarn.lock",
            "pnpm-lock.yaml",
            "node_modules/",
            "dist/",
            "build/",
            "coverage/",
            ".nyc_output/",
            "*.min.js",
            "*.min.css",
            "*.map",
        ])
    }
}

/// Full rule set driving classification and aggregation.
#[derive(Debug, Clone)]
pub struct ClassifyRules {
    pub exclusions: ExclusionSet,
    /// Subtree treated as deployment/packaging configuration, with a
    /// trailing slash (e.g. `helm/`).
    pub infra_root: String,
    /// Repo-relative path of the chart manifest.
    pub chart_manifest: String,
    pub script_extensions: Vec<String>,
    /// Path segments under the infra root whose files are scripts regardless
    /// of extension.
    pub script_segments: Vec<String>,
    /// Product policy: infra changes that touch only scripts stay a
    /// chart-only bump and never trigger an application bump.
    pub scripts_only_is_helm_only: bool,
}

impl ClassifyRules {
    pub fn with_infra_root(infra_root: &str) -> Self {
        let root = if infra_root.ends_with('/') {
            infra_root.to_string()
        } else {
            format!("{infra_root}/")
        };
        let chart_manifest = format!("{root}Chart.yaml");
        ClassifyRules {
            exclusions: ExclusionSet::default(),
            infra_root: root,
            chart_manifest,
            script_extensions: [".sh", ".bash", ".zsh", ".py", ".rb", ".ps1"]
                .map(String::from)
                .to_vec(),
            script_segments: ["scripts/", "hooks/"].map(String::from).to_vec(),
            scripts_only_is_helm_only: true,
        }
    }

    /// Whether an infra-root path is script-like.
    pub fn is_script_path(&self, path: &str) -> bool {
        let below_root = path.strip_prefix(self.infra_root.as_str()).unwrap_or(path);
        self.script_extensions
            .iter()
            .any(|ext| path.ends_with(ext.as_str()))
            || self
                .script_segments
                .iter()
                .any(|seg| below_root.contains(seg.as_str()))
    }
}

impl Default for ClassifyRules {
    fn default() -> Self {
        ClassifyRules::with_infra_root("helm")
    }
}
