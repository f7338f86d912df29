//! Working-tree status via git2.

use git2::{Repository, Status, StatusOptions};

use crate::error::GitError;

/// How a working-tree entry differs from HEAD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    Modified,
    Added,
    Deleted,
    Renamed,
    Untracked,
}

/// One changed entry in the working tree.
#[derive(Debug, Clone)]
pub struct StatusEntry {
    pub path: String,
    pub status: EntryStatus,
}

/// Collect the working-tree status, untracked files included.
///
/// Staged and unstaged flavors of the same state collapse into one entry;
/// a dirty tree is normal input here, never an error.
pub fn working_tree_status(repo: &Repository) -> Result<Vec<StatusEntry>, GitError> {
    let mut opts = StatusOptions::new();
    opts.include_untracked(true)
        .recurse_untracked_dirs(true)
        .renames_head_to_index(true);

    let statuses = repo.statuses(Some(&mut opts)).map_err(GitError::StatusFailed)?;

    let mut entries = Vec::new();
    for entry in statuses.iter() {
        let Some(path) = entry.path() else { continue };
        let s = entry.status();

        let status = if s.contains(Status::WT_NEW) {
            EntryStatus::Untracked
        } else if s.contains(Status::INDEX_NEW) {
            EntryStatus::Added
        } else if s.contains(Status::WT_DELETED) || s.contains(Status::INDEX_DELETED) {
            EntryStatus::Deleted
        } else if s.contains(Status::INDEX_RENAMED) || s.contains(Status::WT_RENAMED) {
            EntryStatus::Renamed
        } else if s.contains(Status::WT_MODIFIED) || s.contains(Status::INDEX_MODIFIED) {
            EntryStatus::Modified
        } else {
            continue;
        };

        entries.push(StatusEntry {
            path: path.to_string(),
            status,
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Repository;

    fn init_repo_with_commit(dir: &std::path::Path) -> Repository {
        let repo = Repository::init(dir).unwrap();
        {
            let sig = git2::Signature::now("Test", "test@test.com").unwrap();
            let tree_id = repo.index().unwrap().write_tree().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "init", &tree, &[])
                .unwrap();
        }
        repo
    }

    #[test]
    fn test_clean_tree_has_no_entries() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo_with_commit(dir.path());
        let entries = working_tree_status(&repo).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_untracked_file_reported() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo_with_commit(dir.path());
        std::fs::write(dir.path().join("new.txt"), "hello\n").unwrap();

        let entries = working_tree_status(&repo).unwrap();
        assert!(entries
            .iter()
            .any(|e| e.path == "new.txt" && e.status == EntryStatus::Untracked));
    }

    #[test]
    fn test_modified_file_reported() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();

        std::fs::write(dir.path().join("file.txt"), "original\n").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(std::path::Path::new("file.txt")).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = git2::Signature::now("Test", "test@test.com").unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "init", &tree, &[])
            .unwrap();
        drop(tree);

        std::fs::write(dir.path().join("file.txt"), "changed\n").unwrap();

        let entries = working_tree_status(&repo).unwrap();
        assert!(entries
            .iter()
            .any(|e| e.path == "file.txt" && e.status == EntryStatus::Modified));
    }
}
