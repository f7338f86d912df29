//! Unified diff text collection from the working tree or a commit range.

use git2::{Diff, DiffFormat, DiffOptions, ErrorCode, Repository, Tree};

use crate::error::GitError;

/// Resolve the HEAD tree, distinguishing empty-repo errors from real failures.
///
/// Returns `Ok(None)` for repos with no commits (unborn branch / not found),
/// `Ok(Some(tree))` for repos with a valid HEAD, or an error for corrupt
/// HEAD, permission issues, or missing objects.
fn resolve_head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, GitError> {
    let head_ref = match repo.head() {
        Ok(r) => r,
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok(None);
        }
        Err(e) => return Err(GitError::DiffFailed(e)),
    };

    let tree = head_ref.peel_to_tree().map_err(GitError::DiffFailed)?;
    Ok(Some(tree))
}

/// Collect the full working-tree diff text (staged + unstaged + untracked).
pub fn working_tree_diff(repo: &Repository) -> Result<String, GitError> {
    working_tree_diff_impl(repo, &[])
}

/// Working-tree diff text restricted to the given paths.
pub fn working_tree_diff_for_paths(
    repo: &Repository,
    paths: &[String],
) -> Result<String, GitError> {
    working_tree_diff_impl(repo, paths)
}

fn working_tree_diff_impl(repo: &Repository, paths: &[String]) -> Result<String, GitError> {
    let head_tree = resolve_head_tree(repo)?;

    let mut staged_opts = DiffOptions::new();
    for p in paths {
        staged_opts.pathspec(p);
    }
    let staged = repo
        .diff_tree_to_index(head_tree.as_ref(), None, Some(&mut staged_opts))
        .map_err(GitError::DiffFailed)?;

    let mut unstaged_opts = DiffOptions::new();
    // include_untracked alone only lists the delta; the patch text for a
    // never-staged file additionally needs show_untracked_content.
    unstaged_opts
        .include_untracked(true)
        .recurse_untracked_dirs(true)
        .show_untracked_content(true);
    for p in paths {
        unstaged_opts.pathspec(p);
    }
    let unstaged = repo
        .diff_index_to_workdir(None, Some(&mut unstaged_opts))
        .map_err(GitError::DiffFailed)?;

    let mut text = String::new();
    append_patch_text(&staged, &mut text)?;
    append_patch_text(&unstaged, &mut text)?;
    Ok(text)
}

/// Diff text for the range `HEAD~n..HEAD`.
///
/// When the history is shorter than `n`, diffs from the empty tree so the
/// whole history is covered rather than failing.
pub fn range_diff(repo: &Repository, n: usize) -> Result<String, GitError> {
    let head_spec = "HEAD";
    let head = repo
        .revparse_single(head_spec)
        .map_err(|e| GitError::RevparseFailed {
            spec: head_spec.to_string(),
            source: e,
        })?;
    let head_tree = head
        .peel_to_commit()
        .and_then(|c| c.tree())
        .map_err(GitError::DiffFailed)?;

    let base_spec = format!("HEAD~{n}");
    let base_tree = match repo.revparse_single(&base_spec) {
        Ok(obj) => Some(
            obj.peel_to_commit()
                .and_then(|c| c.tree())
                .map_err(GitError::DiffFailed)?,
        ),
        Err(e) if e.code() == ErrorCode::NotFound => None,
        Err(e) => {
            return Err(GitError::RevparseFailed {
                spec: base_spec,
                source: e,
            })
        }
    };

    let diff = repo
        .diff_tree_to_tree(base_tree.as_ref(), Some(&head_tree), None)
        .map_err(GitError::DiffFailed)?;

    let mut text = String::new();
    append_patch_text(&diff, &mut text)?;
    Ok(text)
}

/// Render a diff object as unified patch text, marker characters included.
fn append_patch_text(diff: &Diff<'_>, text: &mut String) -> Result<(), GitError> {
    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        let origin = line.origin();
        if origin == '+' || origin == '-' || origin == ' ' {
            text.push(origin);
        }
        text.push_str(std::str::from_utf8(line.content()).unwrap_or(""));
        true
    })
    .map_err(GitError::DiffFailed)
}
