use std::path::Path;

use crate::error::Result;
use crate::index::Index;
use crate::object::write_blob_from_file;
use crate::repo::Repo;
use crate::types::StagingEntry;

/// store a worktree file as a blob and stage it
///
/// the staged path is relative to the repository root. staging a path that
/// is already staged follows the repository's `index.on_duplicate` policy.
pub fn add(repo: &Repo, file: &Path) -> Result<StagingEntry> {
    let _lock = repo.lock()?;

    let rel = repo.relative_path(file)?;
    let hash = write_blob_from_file(repo, file)?;

    let mut index = Index::load(repo)?;
    index.stage(rel.clone(), hash, repo.config().index.on_duplicate);
    index.save(repo)?;

    tracing::debug!(path = %rel, blob = %hash.short(), "staged file");

    Ok(StagingEntry::new(rel, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, DuplicatePolicy};
    use crate::object::read_blob;
    use crate::Error;
    use std::fs;
    use tempfile::tempdir;

    fn test_repo() -> (tempfile::TempDir, Repo) {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();
        (dir, repo)
    }

    #[test]
    fn test_add_stages_file() {
        let (dir, repo) = test_repo();

        let file = dir.path().join("readme.txt");
        fs::write(&file, "A").unwrap();

        let entry = add(&repo, &file).unwrap();
        assert_eq!(entry.path, "readme.txt");
        assert_eq!(read_blob(&repo, &entry.hash).unwrap(), b"A");

        let index = Index::load(&repo).unwrap();
        assert_eq!(index.entries(), &[entry]);
    }

    #[test]
    fn test_add_nested_path() {
        let (dir, repo) = test_repo();

        fs::create_dir_all(dir.path().join("docs/guide")).unwrap();
        let file = dir.path().join("docs/guide/intro.md");
        fs::write(&file, "# intro").unwrap();

        let entry = add(&repo, &file).unwrap();
        assert_eq!(entry.path, "docs/guide/intro.md");
    }

    #[test]
    fn test_add_same_path_replaces_by_default() {
        let (dir, repo) = test_repo();

        let file = dir.path().join("a.txt");
        fs::write(&file, "v1").unwrap();
        add(&repo, &file).unwrap();
        fs::write(&file, "v2").unwrap();
        let second = add(&repo, &file).unwrap();

        let index = Index::load(&repo).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.entries()[0].hash, second.hash);
    }

    #[test]
    fn test_add_same_path_append_policy() {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.index.on_duplicate = DuplicatePolicy::Append;
        let repo = Repo::init_with_config(dir.path(), config).unwrap();

        let file = dir.path().join("a.txt");
        fs::write(&file, "v1").unwrap();
        add(&repo, &file).unwrap();
        fs::write(&file, "v2").unwrap();
        add(&repo, &file).unwrap();

        assert_eq!(Index::load(&repo).unwrap().len(), 2);
    }

    #[test]
    fn test_add_missing_file() {
        let (dir, repo) = test_repo();

        let result = add(&repo, &dir.path().join("missing.txt"));
        assert!(matches!(result, Err(Error::Io { .. })));
        assert!(Index::load(&repo).unwrap().is_empty());
    }

    #[test]
    fn test_add_respects_lock() {
        let (dir, repo) = test_repo();

        let file = dir.path().join("a.txt");
        fs::write(&file, "a").unwrap();

        let _held = repo.lock().unwrap();
        assert!(matches!(add(&repo, &file), Err(Error::LockContention)));
    }
}
