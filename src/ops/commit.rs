use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::index::Index;
use crate::object::write_commit;
use crate::refs::{read_branch, read_head, write_branch};
use crate::repo::Repo;
use crate::types::{Commit, Parent, StagingEntry};

/// build a commit object and store it, returning its hash
///
/// this only writes the object; no ref moves.
pub fn create_commit(
    repo: &Repo,
    parent: Option<Parent>,
    message: &str,
    files: Vec<StagingEntry>,
) -> Result<Hash> {
    let commit = Commit::new(parent, message, files);
    write_commit(repo, &commit)
}

/// commit the staged entries on the current branch
///
/// the commit records exactly the staged entries. the index is cleared
/// only after the commit object is stored and the branch advanced, so a
/// failure anywhere before that leaves the staged entries in place.
///
/// once the branch has moved the commit has happened: a failure to clear
/// the index is logged and the new commit hash is still returned.
pub fn commit(repo: &Repo, message: &str) -> Result<Hash> {
    commit_staged(repo, message, clear_index)
}

fn commit_staged<F>(repo: &Repo, message: &str, clear: F) -> Result<Hash>
where
    F: FnOnce(&Repo, &mut Index) -> Result<()>,
{
    let _lock = repo.lock()?;

    let mut index = Index::load(repo)?;
    if index.is_empty() {
        return Err(Error::NothingToCommit);
    }

    let branch = read_head(repo)?;
    let parent = read_branch(repo, &branch)?.map(Parent::Single);

    let commit_hash = create_commit(repo, parent, message, index.entries().to_vec())?;

    // the object is durable; now the ref may point at it
    write_branch(repo, &branch, Some(&commit_hash))?;

    tracing::info!(branch = %branch, commit = %commit_hash.short(), "created commit");

    if let Err(e) = clear(repo, &mut index) {
        tracing::warn!(
            commit = %commit_hash.short(),
            error = %e,
            "commit recorded but staging index was not cleared"
        );
    }

    Ok(commit_hash)
}

fn clear_index(repo: &Repo, index: &mut Index) -> Result<()> {
    index.clear();
    index.save(repo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::read_commit;
    use crate::ops::add;
    use std::fs;
    use tempfile::tempdir;

    fn test_repo() -> (tempfile::TempDir, Repo) {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();
        (dir, repo)
    }

    fn stage(dir: &tempfile::TempDir, repo: &Repo, name: &str, content: &str) -> StagingEntry {
        let file = dir.path().join(name);
        fs::write(&file, content).unwrap();
        add(repo, &file).unwrap()
    }

    #[test]
    fn test_commit_records_staged_entries() {
        let (dir, repo) = test_repo();

        let a = stage(&dir, &repo, "a.txt", "a");
        let b = stage(&dir, &repo, "b.txt", "b");

        let hash = commit(&repo, "first").unwrap();
        let commit = read_commit(&repo, &hash).unwrap();

        assert_eq!(commit.message, "first");
        assert_eq!(commit.files, vec![a, b]);
        assert!(commit.is_root());
        assert!(Index::load(&repo).unwrap().is_empty());
    }

    #[test]
    fn test_commit_advances_current_branch() {
        let (dir, repo) = test_repo();

        stage(&dir, &repo, "a.txt", "1");
        let first = commit(&repo, "first").unwrap();
        assert_eq!(read_branch(&repo, "main").unwrap(), Some(first));

        stage(&dir, &repo, "a.txt", "2");
        let second = commit(&repo, "second").unwrap();
        assert_eq!(read_branch(&repo, "main").unwrap(), Some(second));

        let commit = read_commit(&repo, &second).unwrap();
        assert_eq!(commit.parent, Some(Parent::Single(first)));
    }

    #[test]
    fn test_commit_with_empty_index() {
        let (_dir, repo) = test_repo();

        let result = commit(&repo, "nothing");
        assert!(matches!(result, Err(Error::NothingToCommit)));
        assert_eq!(read_branch(&repo, "main").unwrap(), None);
    }

    #[test]
    fn test_failed_commit_keeps_index_and_ref() {
        let (dir, repo) = test_repo();

        stage(&dir, &repo, "a.txt", "a");
        let first = commit(&repo, "first").unwrap();
        stage(&dir, &repo, "b.txt", "b");

        // HEAD naming a missing branch makes the commit fail before any write
        fs::write(repo.head_path(), "ghost\n").unwrap();
        let result = commit(&repo, "second");
        assert!(matches!(result, Err(Error::UnknownBranch(_))));

        assert_eq!(Index::load(&repo).unwrap().len(), 1);
        assert_eq!(read_branch(&repo, "main").unwrap(), Some(first));
    }

    #[test]
    fn test_create_commit_does_not_move_refs() {
        let (_dir, repo) = test_repo();

        let hash = create_commit(&repo, None, "detached", vec![]).unwrap();
        assert_eq!(read_commit(&repo, &hash).unwrap().message, "detached");
        assert_eq!(read_branch(&repo, "main").unwrap(), None);
    }

    #[test]
    fn test_commit_succeeds_when_index_cannot_be_cleared() {
        let (dir, repo) = test_repo();

        let staged = stage(&dir, &repo, "a.txt", "a");

        let hash = commit_staged(&repo, "first", |_, _| {
            Err(Error::Io {
                path: repo.index_path(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            })
        })
        .unwrap();

        assert_eq!(read_branch(&repo, "main").unwrap(), Some(hash));
        assert_eq!(read_commit(&repo, &hash).unwrap().files, vec![staged]);
    }

    #[test]
    fn test_commit_under_contention() {
        let (dir, repo) = test_repo();

        stage(&dir, &repo, "a.txt", "a");
        let first = commit(&repo, "first").unwrap();
        stage(&dir, &repo, "b.txt", "b");

        let _held = repo.lock().unwrap();
        assert!(matches!(commit(&repo, "second"), Err(Error::LockContention)));

        assert_eq!(read_branch(&repo, "main").unwrap(), Some(first));
        assert_eq!(Index::load(&repo).unwrap().len(), 1);
    }
}
