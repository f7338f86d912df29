//! Content-aware diff truncation to fit a token budget.
//!
//! The text-model API has a prompt budget the caller is responsible for.
//! Rather than chopping the diff at a byte offset (which can cut a file in
//! half mid-hunk and silently drop its very existence), this keeps whole
//! files in their original order for as long as they fit, trims the first
//! overflowing file to a prefix, and reports what was dropped in a single
//! synthetic summary line.

/// Fixed characters-per-token estimate. Approximate by design.
pub const CHARS_PER_TOKEN: usize = 4;

/// Estimate the token count of a piece of text.
pub fn estimate_tokens(text: &str) -> usize {
    text.len().div_ceil(CHARS_PER_TOKEN)
}

/// One file's slice of the diff, split into header/metadata and content.
struct FileSegment<'a> {
    header_lines: Vec<&'a str>,
    content_lines: Vec<&'a str>,
    additions: usize,
    deletions: usize,
}

impl FileSegment<'_> {
    fn char_len(&self) -> usize {
        self.header_lines
            .iter()
            .chain(self.content_lines.iter())
            .map(|l| l.len() + 1)
            .sum()
    }
}

/// Split diff text into per-file segments at `diff --git` boundaries.
///
/// Lines before the first hunk marker are header/metadata; everything from
/// the first `@@` on (including further hunk headers) is content. Text with
/// no file header at all becomes a single header-less segment.
fn split_segments(text: &str) -> Vec<FileSegment<'_>> {
    let mut segments: Vec<FileSegment> = Vec::new();

    for line in text.lines() {
        let starts_file = line.starts_with("diff --git ");
        if starts_file || segments.is_empty() {
            segments.push(FileSegment {
                header_lines: Vec::new(),
                content_lines: Vec::new(),
                additions: 0,
                deletions: 0,
            });
        }
        let seg = segments.last_mut().expect("segment exists");

        // Metadata until the first hunk marker (or, for header-less text,
        // the first +/- line). After that everything is content.
        if starts_file || (seg.content_lines.is_empty() && !line_is_content(line)) {
            seg.header_lines.push(line);
            continue;
        }

        if line.starts_with('+') && !line.starts_with("+++") {
            seg.additions += 1;
        } else if line.starts_with('-') && !line.starts_with("---") {
            seg.deletions += 1;
        }
        seg.content_lines.push(line);
    }

    segments
}

fn line_is_content(line: &str) -> bool {
    line.starts_with("@@")
        || (line.starts_with('+') && !line.starts_with("+++"))
        || (line.starts_with('-') && !line.starts_with("---"))
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

/// Reduce `diff_text` so that its estimated token count fits `token_budget`.
///
/// Returns the input unchanged when it already fits. Otherwise whole file
/// segments are kept greedily in original order; the first file that would
/// overflow keeps its header and a budget-fitting prefix of its content,
/// followed by one summary line carrying the file's true addition/deletion
/// counts and the number of files dropped after it. Later files are dropped
/// entirely. Never panics; the result is always plausible diff text, though
/// hunk counts in headers may no longer match the trimmed content.
pub fn truncate_to_budget(diff_text: &str, token_budget: usize) -> String {
    if estimate_tokens(diff_text) <= token_budget {
        return diff_text.to_string();
    }

    let char_budget = token_budget.saturating_mul(CHARS_PER_TOKEN);
    let segments = split_segments(diff_text);
    let mut out = String::new();

    for (idx, seg) in segments.iter().enumerate() {
        if out.len() + seg.char_len() <= char_budget {
            for line in seg.header_lines.iter().chain(seg.content_lines.iter()) {
                push_line(&mut out, line);
            }
            continue;
        }

        // First overflowing file: header, trimmed content, summary. All
        // remaining files are dropped; the summary is the only evidence.
        let omitted = segments.len() - idx - 1;
        let summary = format!(
            "... [diff truncated: {} addition(s) and {} deletion(s) in this file; {} subsequent file(s) omitted]",
            seg.additions, seg.deletions, omitted
        );
        let reserve = summary.len() + 1;

        for line in &seg.header_lines {
            if out.len() + line.len() + 1 + reserve > char_budget {
                break;
            }
            push_line(&mut out, line);
        }
        for line in &seg.content_lines {
            if out.len() + line.len() + 1 + reserve > char_budget {
                break;
            }
            push_line(&mut out, line);
        }
        if out.len() + reserve <= char_budget {
            push_line(&mut out, &summary);
        }
        break;
    }

    out
}
