//! Bump classification and change summarization over a [`TextModel`].

use serde::de::{self, Deserializer};
use serde::Deserialize;
use tracing::debug;

use crate::classify::ChangeType;
use crate::error::LlmError;
use crate::llm::client::TextModel;
use crate::llm::json::extract_json;
use crate::llm::retry::retry_linear;
use crate::manifest::BumpKind;

/// `BumpKind` wrapper with case-insensitive deserialization, kept private so
/// the core type stays serde-free.
#[derive(Debug, Clone, Copy)]
struct RawBump(BumpKind);

impl<'de> Deserialize<'de> for RawBump {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<BumpKind>()
            .map(RawBump)
            .map_err(|_| de::Error::unknown_variant(&s, &["major", "minor", "patch"]))
    }
}

#[derive(Deserialize)]
struct BumpResponse {
    bump: RawBump,
    reasoning: Option<String>,
}

/// Build the classification prompt from a filtered, truncated diff.
pub fn build_bump_prompt(diff_text: &str, change_type: ChangeType) -> String {
    format!(
        r#"You are deciding the semantic-versioning bump for a set of changes.

## Semantic Versioning Rules
- **major**: breaking changes, incompatible with previous API/behavior
- **minor**: new features or functionality, backwards-compatible
- **patch**: backwards-compatible bug fixes, tweaks, or internal changes

The change set was classified structurally as: {change_type}.

## Diff
```diff
{diff_text}
```

## Instructions
Analyze the diff and decide whether it warrants a **major**, **minor**, or **patch** bump.

Respond with JSON only (no markdown wrapping):
{{"bump": "major|minor|patch", "reasoning": "brief explanation"}}"#,
    )
}

/// Build the commit-summary prompt from a (separately truncated) diff.
pub fn build_summary_prompt(diff_text: &str) -> String {
    format!(
        r#"Summarize the following diff as a single-line git commit message.

Rules:
- Imperative mood ("add", "fix", "update"), no trailing period
- At most 72 characters
- Describe the most significant change, not every file

## Diff
```diff
{diff_text}
```

Respond with the commit message only, no quotes and no explanation."#,
    )
}

/// Parse a classification response into a bump kind.
///
/// The bump value is validated at deserialization time; anything outside
/// major/minor/patch is a contract violation and therefore retryable.
fn parse_bump_response(raw: &str) -> Result<(BumpKind, Option<String>), LlmError> {
    let json = extract_json(raw);
    let parsed: BumpResponse =
        serde_json::from_str(&json).map_err(|_| LlmError::InvalidBumpValue {
            raw: raw.chars().take(200).collect(),
        })?;
    Ok((parsed.bump.0, parsed.reasoning))
}

/// Ask the model for a bump kind, retrying contract violations.
///
/// The caller is responsible for keeping `diff_text` inside the token
/// budget; the model is never expected to truncate on its own.
pub async fn classify_bump(
    model: &dyn TextModel,
    diff_text: &str,
    change_type: ChangeType,
) -> Result<(BumpKind, Option<String>), LlmError> {
    let prompt = build_bump_prompt(diff_text, change_type);

    retry_linear(|| async {
        let response = model.complete(&prompt).await?;
        let (bump, reasoning) = parse_bump_response(&response)?;
        debug!("Model chose {bump}: {}", reasoning.as_deref().unwrap_or("(no reasoning)"));
        Ok((bump, reasoning))
    })
    .await
}

/// Ask the model for a one-line commit summary.
pub async fn summarize(model: &dyn TextModel, diff_text: &str) -> Result<String, LlmError> {
    let prompt = build_summary_prompt(diff_text);

    retry_linear(|| async {
        let response = model.complete(&prompt).await?;
        let line = response.lines().find(|l| !l.trim().is_empty());
        match line {
            Some(l) => Ok(l.trim().trim_matches('"').trim_matches('`').to_string()),
            None => Err(LlmError::MalformedResponse(
                "summary response was empty".to_string(),
            )),
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Returns canned responses in sequence.
    struct ScriptedModel {
        responses: Vec<&'static str>,
        calls: AtomicU32,
    }

    impl ScriptedModel {
        fn new(responses: Vec<&'static str>) -> Self {
            ScriptedModel {
                responses,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl TextModel for ScriptedModel {
        async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
            let idx = n.min(self.responses.len() - 1);
            Ok(self.responses[idx].to_string())
        }
    }

    #[test]
    fn test_parse_plain_json_response() {
        let (bump, reasoning) =
            parse_bump_response(r#"{"bump": "minor", "reasoning": "new endpoint"}"#).unwrap();
        assert_eq!(bump, BumpKind::Minor);
        assert_eq!(reasoning.as_deref(), Some("new endpoint"));
    }

    #[test]
    fn test_parse_markdown_wrapped_response() {
        let raw = "Here it is:\n```json\n{\"bump\": \"major\"}\n```";
        let (bump, _) = parse_bump_response(raw).unwrap();
        assert_eq!(bump, BumpKind::Major);
    }

    #[test]
    fn test_parse_case_insensitive() {
        let (bump, _) = parse_bump_response(r#"{"bump": "PATCH"}"#).unwrap();
        assert_eq!(bump, BumpKind::Patch);
    }

    #[test]
    fn test_parse_unrecognized_value_is_contract_violation() {
        let err = parse_bump_response(r#"{"bump": "huge"}"#).unwrap_err();
        assert!(matches!(err, LlmError::InvalidBumpValue { .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_parse_non_json_is_contract_violation() {
        assert!(parse_bump_response("no json here").is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_classify_bump_retries_bad_value() {
        let model = ScriptedModel::new(vec![
            r#"{"bump": "enormous"}"#,
            r#"{"bump": "patch", "reasoning": "fix"}"#,
        ]);
        let (bump, _) = classify_bump(&model, "diff", ChangeType::AppOnly)
            .await
            .unwrap();
        assert_eq!(bump, BumpKind::Patch);
        assert_eq!(model.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_classify_bump_exhausts_on_persistent_garbage() {
        let model = ScriptedModel::new(vec!["garbage"]);
        let result = classify_bump(&model, "diff", ChangeType::Both).await;
        assert!(matches!(result, Err(LlmError::RetriesExhausted(_))));
    }

    #[tokio::test]
    async fn test_summarize_takes_first_line() {
        let model = ScriptedModel::new(vec!["\n  \"add retry to uploader\"  \nextra"]);
        let summary = summarize(&model, "diff").await.unwrap();
        assert_eq!(summary, "add retry to uploader");
    }

    #[test]
    fn test_bump_prompt_contains_diff_and_change_type() {
        let prompt = build_bump_prompt("-old\n+new", ChangeType::HelmOnly);
        assert!(prompt.contains("-old"));
        assert!(prompt.contains("helm-only"));
        assert!(prompt.contains("major|minor|patch"));
    }
}
