//! JSON extraction from text-model responses.
//!
//! Models often wrap JSON in markdown fences or surround it with
//! conversational text. Extraction handles fenced blocks, then falls back
//! to balanced-brace scanning with string-escape awareness.

/// Extract a JSON object from a model response.
///
/// Tries, in order: a ` ```json ` fenced block, a bare ` ``` ` fenced block
/// whose content starts with `{`, a balanced-brace object anywhere in the
/// text, and finally the trimmed input unchanged.
pub fn extract_json(response: &str) -> String {
    let trimmed = response.trim();

    if let Some(start) = trimmed.find("```json") {
        if let Some(end) = trimmed[start + 7..].find("```") {
            return trimmed[start + 7..start + 7 + end].trim().to_string();
        }
    }

    if let Some(start) = trimmed.find("```") {
        if let Some(end) = trimmed[start + 3..].find("```") {
            let inner = trimmed[start + 3..start + 3 + end].trim();
            if inner.starts_with('{') {
                return inner.to_string();
            }
        }
    }

    if let Some(json) = find_balanced_object(trimmed) {
        return json;
    }

    trimmed.to_string()
}

/// Find the first balanced `{...}` whose content parses as JSON.
///
/// Brace depth is tracked while respecting string literals and escapes, so
/// `{"msg": "use { and } carefully"}` extracts correctly.
fn find_balanced_object(text: &str) -> Option<String> {
    for (start, _) in text.match_indices('{') {
        if let Some(candidate) = balanced_span(&text[start..]) {
            if serde_json::from_str::<serde_json::Value>(candidate).is_ok() {
                return Some(candidate.to_string());
            }
        }
    }
    None
}

/// Slice of `text` covering the `{...}` that opens at byte 0.
///
/// All the structural characters are ASCII, so a byte walk is safe; bytes of
/// multi-byte characters never match the match arms, and the returned slice
/// always ends on a `}` boundary.
fn balanced_span(text: &str) -> Option<&str> {
    debug_assert!(text.starts_with('{'));
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            // Skip the escaped byte so \" does not end the string.
            b'\\' if in_string => i += 1,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[..=i]);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_from_json_fence() {
        let response = "Here you go:\n```json\n{\"bump\": \"minor\"}\n```\n";
        assert_eq!(extract_json(response), r#"{"bump": "minor"}"#);
    }

    #[test]
    fn test_extract_from_bare_fence() {
        let response = "```\n{\"bump\": \"patch\"}\n```";
        assert_eq!(extract_json(response), r#"{"bump": "patch"}"#);
    }

    #[test]
    fn test_extract_raw_json_unwrapped() {
        let response = r#"{"bump": "major"}"#;
        let parsed: serde_json::Value = serde_json::from_str(&extract_json(response)).unwrap();
        assert_eq!(parsed["bump"], "major");
    }

    #[test]
    fn test_extract_with_surrounding_text() {
        let response = r#"Based on the diff: {"bump": "minor", "reasoning": "new feature"} Hope that helps."#;
        let parsed: serde_json::Value = serde_json::from_str(&extract_json(response)).unwrap();
        assert_eq!(parsed["bump"], "minor");
    }

    #[test]
    fn test_extract_respects_braces_in_strings() {
        let response = r#"{"reasoning": "changed { and } handling", "bump": "patch"}"#;
        let parsed: serde_json::Value = serde_json::from_str(&extract_json(response)).unwrap();
        assert_eq!(parsed["bump"], "patch");
    }

    #[test]
    fn test_extract_nested_object() {
        let response = r#"note {"outer": {"inner": 1}, "bump": "major"} done"#;
        let parsed: serde_json::Value = serde_json::from_str(&extract_json(response)).unwrap();
        assert_eq!(parsed["outer"]["inner"], 1);
    }

    #[test]
    fn test_no_json_returns_input() {
        let response = "plain text, nothing to see";
        assert_eq!(extract_json(response), response);
    }

    #[test]
    fn test_empty_fence() {
        assert_eq!(extract_json("```json\n```"), "");
    }
}
