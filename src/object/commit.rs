use crate::error::Result;
use crate::hash::Hash;
use crate::object::store::{get_object, put_object};
use crate::repo::Repo;
use crate::types::Commit;

/// write a commit to the object store
///
/// commits are serialized as CBOR; the hash is computed over the encoded
/// bytes, so an identical commit (same timestamp included) dedups.
pub fn write_commit(repo: &Repo, commit: &Commit) -> Result<Hash> {
    let mut cbor_bytes = Vec::new();
    ciborium::into_writer(commit, &mut cbor_bytes)?;

    put_object(repo, &cbor_bytes)
}

/// read a commit from the object store
pub fn read_commit(repo: &Repo, hash: &Hash) -> Result<Commit> {
    let cbor_bytes = get_object(repo, hash)?;
    let commit: Commit = ciborium::from_reader(&cbor_bytes[..])?;
    Ok(commit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{object_path, write_blob};
    use crate::types::{Parent, StagingEntry};
    use crate::Error;
    use tempfile::tempdir;

    fn test_repo() -> (tempfile::TempDir, Repo) {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();
        (dir, repo)
    }

    #[test]
    fn test_write_and_read_commit() {
        let (_dir, repo) = test_repo();

        let blob = write_blob(&repo, b"A").unwrap();
        let commit = Commit::with_timestamp(
            None,
            1234567890,
            "test commit",
            vec![StagingEntry::new("readme.txt", blob)],
        );

        let hash = write_commit(&repo, &commit).unwrap();
        assert_eq!(read_commit(&repo, &hash).unwrap(), commit);
    }

    #[test]
    fn test_commit_deduplication() {
        let (_dir, repo) = test_repo();

        let commit = Commit::with_timestamp(None, 1234567890, "test", vec![]);

        let h1 = write_commit(&repo, &commit).unwrap();
        let h2 = write_commit(&repo, &commit).unwrap();

        assert_eq!(h1, h2);
    }

    #[test]
    fn test_commit_bytes_are_stable() {
        let (_dir, repo) = test_repo();

        let commit = Commit::with_timestamp(None, 42, "stable", vec![]);
        let hash = write_commit(&repo, &commit).unwrap();

        let first = std::fs::read(object_path(&repo, &hash)).unwrap();
        let _ = read_commit(&repo, &hash).unwrap();
        let second = std::fs::read(object_path(&repo, &hash)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_merge_commit() {
        let (_dir, repo) = test_repo();

        let p1 = write_commit(&repo, &Commit::with_timestamp(None, 1, "one", vec![])).unwrap();
        let p2 = write_commit(&repo, &Commit::with_timestamp(None, 2, "two", vec![])).unwrap();

        let commit = Commit::with_timestamp(Some(Parent::Merge([p1, p2])), 3, "merge", vec![]);
        let hash = write_commit(&repo, &commit).unwrap();

        let read_back = read_commit(&repo, &hash).unwrap();
        assert!(read_back.is_merge());
        assert_eq!(read_back.parents(), &[p1, p2]);
    }

    #[test]
    fn test_read_nonexistent_commit() {
        let (_dir, repo) = test_repo();

        let result = read_commit(&repo, &Hash::ZERO);
        assert!(matches!(result, Err(Error::ObjectNotFound(_))));
    }

    #[test]
    fn test_read_blob_as_commit() {
        let (_dir, repo) = test_repo();

        let blob = write_blob(&repo, b"plain text, not cbor").unwrap();
        let result = read_commit(&repo, &blob);
        assert!(matches!(result, Err(Error::CborDecode(_))));
    }
}
