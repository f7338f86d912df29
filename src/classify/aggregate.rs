//! Change-type aggregation over classified files.

use crate::classify::{classify, Category, ClassifyRules, WorkspaceFacts};
use crate::diff::DiffDocument;

/// Structural shape of a change set. Always recomputed from a diff, never
/// stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    None,
    HelmOnly,
    AppOnly,
    Both,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::None => "none",
            ChangeType::HelmOnly => "helm-only",
            ChangeType::AppOnly => "app-only",
            ChangeType::Both => "both",
        }
    }
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reduce per-file categories to a [`ChangeType`].
///
/// Decision table, first match wins:
/// 1. nothing classified → None
/// 2. scripts and nothing else → HelmOnly (policy: operational tooling never
///    bumps the application; disabled via
///    [`ClassifyRules::scripts_only_is_helm_only`], which folds scripts into
///    the infra-config bucket instead)
/// 3. infra (either kind) and app together → Both
/// 4. infra alone → HelmOnly
/// 5. app alone → AppOnly
pub fn aggregate(categories: &[Category], rules: &ClassifyRules) -> ChangeType {
    let mut infra_non_script = categories.iter().any(|c| *c == Category::InfraConfig);
    let mut infra_script = categories.iter().any(|c| *c == Category::InfraScript);
    let app = categories.iter().any(|c| *c == Category::AppCode);

    if !rules.scripts_only_is_helm_only && infra_script {
        infra_non_script = true;
        infra_script = false;
    }

    if !infra_non_script && !infra_script && !app {
        ChangeType::None
    } else if infra_script && !infra_non_script && !app {
        ChangeType::HelmOnly
    } else if (infra_script || infra_non_script) && app {
        ChangeType::Both
    } else if infra_script || infra_non_script {
        ChangeType::HelmOnly
    } else if app {
        ChangeType::AppOnly
    } else {
        ChangeType::None
    }
}

/// Classify every effectively-changed file in a diff and aggregate.
///
/// Files whose changes were entirely stripped by the noise filter (no
/// add/delete lines left, not binary, not renamed/added/deleted) do not
/// count as changes.
pub fn aggregate_diff(
    doc: &DiffDocument,
    rules: &ClassifyRules,
    facts: &WorkspaceFacts,
) -> ChangeType {
    let categories: Vec<Category> = doc
        .files
        .iter()
        .filter(|f| f.has_effective_change())
        .map(|f| classify(&f.path, rules, facts))
        .collect();
    aggregate(&categories, rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::parse_diff;

    fn rules() -> ClassifyRules {
        ClassifyRules::default()
    }

    #[test]
    fn test_empty_is_none() {
        assert_eq!(aggregate(&[], &rules()), ChangeType::None);
    }

    #[test]
    fn test_excluded_only_is_none() {
        let cats = [Category::Excluded, Category::Excluded];
        assert_eq!(aggregate(&cats, &rules()), ChangeType::None);
    }

    #[test]
    fn test_scripts_only_is_helm_only() {
        let cats = [Category::InfraScript];
        assert_eq!(aggregate(&cats, &rules()), ChangeType::HelmOnly);
    }

    #[test]
    fn test_scripts_plus_app_is_both() {
        // Rule 2 requires zero app files; with app files present the script
        // change counts as infra and the result is Both. Deliberately kept
        // asymmetric with the scripts-only rule.
        let cats = [Category::InfraScript, Category::AppCode];
        assert_eq!(aggregate(&cats, &rules()), ChangeType::Both);
    }

    #[test]
    fn test_infra_config_plus_app_is_both() {
        let cats = [Category::InfraConfig, Category::AppCode];
        assert_eq!(aggregate(&cats, &rules()), ChangeType::Both);
    }

    #[test]
    fn test_infra_alone_is_helm_only() {
        let cats = [Category::InfraConfig, Category::InfraScript];
        assert_eq!(aggregate(&cats, &rules()), ChangeType::HelmOnly);
    }

    #[test]
    fn test_app_alone_is_app_only() {
        let cats = [Category::AppCode, Category::Excluded];
        assert_eq!(aggregate(&cats, &rules()), ChangeType::AppOnly);
    }

    #[test]
    fn test_scripts_policy_disabled_folds_into_config() {
        let mut rules = rules();
        rules.scripts_only_is_helm_only = false;
        // Still helm-only on its own, but via the infra-config path.
        assert_eq!(
            aggregate(&[Category::InfraScript], &rules),
            ChangeType::HelmOnly
        );
        assert_eq!(
            aggregate(&[Category::InfraScript, Category::AppCode], &rules),
            ChangeType::Both
        );
    }

    #[test]
    fn test_aggregate_diff_skips_non_effective_files() {
        // A modified file with all its add/delete lines stripped must not
        // contribute a category.
        let text = "\
diff --git a/src/index.ts b/src/index.ts
--- a/src/index.ts
+++ b/src/index.ts
@@ -1,2 +1,2 @@
 unchanged
diff --git a/helm/values.yaml b/helm/values.yaml
--- a/helm/values.yaml
+++ b/helm/values.yaml
@@ -1 +1 @@
-replicas: 1
+replicas: 2
";
        let doc = parse_diff(text);
        let facts = WorkspaceFacts {
            has_app_manifest: true,
            has_chart_manifest: true,
        };
        assert_eq!(aggregate_diff(&doc, &rules(), &facts), ChangeType::HelmOnly);
    }

    #[test]
    fn test_aggregate_diff_excluded_paths_only_is_none() {
        let text = "\
diff --git a/package-lock.json b/package-lock.json
--- a/package-lock.json
+++ b/package-lock.json
@@ -1 +1 @@
-x
+y
";
        let doc = parse_diff(text);
        let facts = WorkspaceFacts {
            has_app_manifest: true,
            has_chart_manifest: true,
        };
        assert_eq!(aggregate_diff(&doc, &rules(), &facts), ChangeType::None);
    }
}
