//! Version-bump noise removal.
//!
//! A diff that includes the tool's own previous version bump would show the
//! classifier a `-"version": "1.0.0"` / `+"version": "1.1.0"` pair and bias
//! it toward "something changed". This filter strips exactly those pairs
//! before aggregation and classification. The unfiltered diff is still what
//! a human operator sees.

use std::sync::OnceLock;

use regex_lite::Regex;

/// A diff line is version noise when its content (after the +/- marker) is
/// nothing but a version-field assignment: a quoted JSON `"version"` field or
/// a bare YAML `version:` / `appVersion:` field with a three-part number.
fn version_field_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"^\s*(?:"(?:version|appVersion)"\s*:\s*"\d+\.\d+\.\d+"\s*,?|(?:version|appVersion)\s*:\s*["']?\d+\.\d+\.\d+["']?)\s*$"#,
        )
        .expect("version-field pattern is valid")
    })
}

fn is_noise_delete(line: &str) -> bool {
    !line.starts_with("---")
        && line
            .strip_prefix('-')
            .is_some_and(|rest| version_field_re().is_match(rest))
}

fn is_noise_add(line: &str) -> bool {
    !line.starts_with("+++")
        && line
            .strip_prefix('+')
            .is_some_and(|rest| version_field_re().is_match(rest))
}

fn is_noise_pair(a: &str, b: &str) -> bool {
    (is_noise_delete(a) && is_noise_add(b)) || (is_noise_add(a) && is_noise_delete(b))
}

/// Remove adjacent delete/add pairs that are pure version-field mutations.
///
/// Matching is line-pairwise: a matching deletion immediately followed by a
/// matching addition (or vice versa) is dropped as a pair. An unpaired match
/// stays, since the line may carry some other change.
///
/// Each incoming line is checked against the last *kept* line, so removing a
/// pair can expose an outer pair that is then removed too. The output never
/// contains an adjacent pair, which makes the filter idempotent.
pub fn strip_version_noise(diff_text: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();

    for line in diff_text.lines() {
        match kept.last() {
            Some(prev) if is_noise_pair(prev, line) => {
                kept.pop();
            }
            _ => kept.push(line),
        }
    }

    let mut out = kept.join("\n");
    if diff_text.ends_with('\n') && !out.is_empty() {
        out.push('\n');
    }
    out
}
