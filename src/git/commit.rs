//! Staging a file subset and committing via git2.

use std::path::Path;

use git2::Repository;

use crate::error::GitError;

/// Stage the given repo-relative paths and create a commit.
///
/// Paths that no longer exist on disk are staged as deletions. Errors if
/// the staged tree is identical to HEAD (nothing to commit) or if the
/// committer identity is missing from git config.
pub fn stage_and_commit(
    repo: &Repository,
    paths: &[String],
    message: &str,
) -> Result<git2::Oid, GitError> {
    let workdir = repo.workdir();
    let mut index = repo.index().map_err(GitError::CommitFailed)?;

    for path in paths {
        let rel = Path::new(path);
        let on_disk = workdir.map(|w| w.join(rel).exists()).unwrap_or(false);
        let staged = if on_disk {
            index.add_path(rel)
        } else {
            index.remove_path(rel)
        };
        staged.map_err(|e| GitError::StagingFailed {
            path: path.clone(),
            source: e,
        })?;
    }
    index.write().map_err(GitError::CommitFailed)?;

    let tree_id = index.write_tree().map_err(GitError::CommitFailed)?;
    let tree = repo.find_tree(tree_id).map_err(GitError::CommitFailed)?;

    let parent = match repo.head() {
        Ok(head) => Some(head.peel_to_commit().map_err(GitError::CommitFailed)?),
        Err(e)
            if e.code() == git2::ErrorCode::UnbornBranch
                || e.code() == git2::ErrorCode::NotFound =>
        {
            None
        }
        Err(e) => return Err(GitError::CommitFailed(e)),
    };

    if let Some(ref parent_commit) = parent {
        if parent_commit.tree_id() == tree_id {
            return Err(GitError::NothingToCommit);
        }
    }

    let sig = repo.signature().map_err(GitError::ConfigError)?;
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .map_err(GitError::CommitFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Repository;

    fn init_repo(dir: &std::path::Path) -> Repository {
        let repo = Repository::init(dir).unwrap();
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test").unwrap();
        config.set_str("user.email", "test@test.com").unwrap();
        repo
    }

    #[test]
    fn test_commit_staged_subset() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());

        std::fs::write(dir.path().join("included.txt"), "in\n").unwrap();
        std::fs::write(dir.path().join("left-out.txt"), "out\n").unwrap();

        let oid = stage_and_commit(&repo, &["included.txt".to_string()], "add included").unwrap();

        let commit = repo.find_commit(oid).unwrap();
        assert_eq!(commit.message().unwrap(), "add included");
        let tree = commit.tree().unwrap();
        assert!(tree.get_name("included.txt").is_some());
        assert!(tree.get_name("left-out.txt").is_none());
    }

    #[test]
    fn test_commit_on_empty_repo_creates_root() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        std::fs::write(dir.path().join("first.txt"), "x\n").unwrap();

        let oid = stage_and_commit(&repo, &["first.txt".to_string()], "root").unwrap();
        assert_eq!(repo.find_commit(oid).unwrap().parent_count(), 0);
    }

    #[test]
    fn test_nothing_to_commit() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        std::fs::write(dir.path().join("a.txt"), "x\n").unwrap();
        stage_and_commit(&repo, &["a.txt".to_string()], "first").unwrap();

        // Staging the same unchanged file again produces the same tree.
        let result = stage_and_commit(&repo, &["a.txt".to_string()], "again");
        assert!(matches!(result, Err(GitError::NothingToCommit)));
    }

    #[test]
    fn test_deleted_path_staged_as_removal() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        std::fs::write(dir.path().join("gone.txt"), "x\n").unwrap();
        stage_and_commit(&repo, &["gone.txt".to_string()], "add").unwrap();

        std::fs::remove_file(dir.path().join("gone.txt")).unwrap();
        let oid = stage_and_commit(&repo, &["gone.txt".to_string()], "remove").unwrap();

        let tree = repo.find_commit(oid).unwrap().tree().unwrap();
        assert!(tree.get_name("gone.txt").is_none());
    }
}
