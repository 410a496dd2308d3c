use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::{Error, IoResultExt, Result};
use crate::repo::{Repo, MARKER_DIR};

/// clone statistics
#[derive(Debug, Default, Clone)]
pub struct CloneStats {
    pub files: usize,
    pub bytes: u64,
}

/// copy a repository's on-disk state to a new location
///
/// the whole marker directory is copied byte for byte, except the lock file
/// and the contents of the temp directory. worktree files are not copied.
pub fn clone_repo(src: &Path, dst: &Path) -> Result<(Repo, CloneStats)> {
    let source = Repo::open(src)?;
    let _lock = source.lock()?;

    if dst.join(MARKER_DIR).exists() {
        return Err(Error::AlreadyInitialized(dst.to_path_buf()));
    }

    let src_marker = source.path();
    let dst_marker = dst.join(MARKER_DIR);
    let mut stats = CloneStats::default();

    for entry in WalkDir::new(&src_marker).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Io {
            path: src_marker.clone(),
            source: e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "walkdir error")),
        })?;

        let rel = match entry.path().strip_prefix(&src_marker) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        if skip_on_clone(rel) {
            continue;
        }

        let target = dst_marker.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).with_path(&target)?;
        } else if entry.file_type().is_file() {
            stats.bytes += fs::copy(entry.path(), &target).with_path(&target)?;
            stats.files += 1;
        } else {
            tracing::warn!(path = %entry.path().display(), "skipping non-regular file during clone");
        }
    }

    let repo = Repo::open(dst)?;

    tracing::info!(
        from = %src.display(),
        to = %dst.display(),
        files = stats.files,
        bytes = stats.bytes,
        "cloned repository"
    );

    Ok((repo, stats))
}

fn skip_on_clone(rel: &Path) -> bool {
    let mut components = rel.components();
    match components.next().and_then(|c| c.as_os_str().to_str()) {
        Some(".lock") => true,
        // keep the tmp directory itself, drop leftovers inside it
        Some("tmp") => components.next().is_some(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{list_objects, read_commit};
    use crate::ops::{add, commit, create_branch, log, switch_branch};
    use crate::refs::{list_branches, read_branch, read_head};
    use tempfile::tempdir;

    fn populated_repo() -> (tempfile::TempDir, Repo) {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();

        let file = dir.path().join("readme.txt");
        fs::write(&file, "A").unwrap();
        add(&repo, &file).unwrap();
        commit(&repo, "first").unwrap();

        create_branch(&repo, "feature").unwrap();
        switch_branch(&repo, "feature").unwrap();
        (dir, repo)
    }

    #[test]
    fn test_clone_copies_state() {
        let (src_dir, src) = populated_repo();
        let dst_dir = tempdir().unwrap();
        let dst_path = dst_dir.path().join("copy");

        let (dst, stats) = clone_repo(src_dir.path(), &dst_path).unwrap();
        assert!(stats.files > 0);

        assert_eq!(read_head(&dst).unwrap(), "feature");
        assert_eq!(list_branches(&dst).unwrap(), list_branches(&src).unwrap());
        assert_eq!(list_objects(&dst).unwrap(), list_objects(&src).unwrap());

        let tip = read_branch(&dst, "main").unwrap().unwrap();
        assert_eq!(read_commit(&dst, &tip).unwrap().message, "first");
        assert_eq!(log(&dst, None).unwrap().len(), 1);
    }

    #[test]
    fn test_clone_is_independent() {
        let (src_dir, src) = populated_repo();
        let dst_dir = tempdir().unwrap();

        let (dst, _) = clone_repo(src_dir.path(), dst_dir.path()).unwrap();
        create_branch(&dst, "only-in-clone").unwrap();

        assert!(!list_branches(&src).unwrap().contains(&"only-in-clone".to_string()));
    }

    #[test]
    fn test_clone_skips_lock_and_tmp_leftovers() {
        let (src_dir, src) = populated_repo();
        fs::write(src.tmp_path().join("leftover"), "junk").unwrap();
        let dst_dir = tempdir().unwrap();

        let (dst, _) = clone_repo(src_dir.path(), dst_dir.path()).unwrap();

        assert!(dst.tmp_path().is_dir());
        assert!(!dst.tmp_path().join("leftover").exists());
        assert!(!dst.lock_path().exists());
    }

    #[test]
    fn test_clone_into_existing_repo() {
        let (src_dir, _src) = populated_repo();
        let dst_dir = tempdir().unwrap();
        Repo::init(dst_dir.path()).unwrap();

        let result = clone_repo(src_dir.path(), dst_dir.path());
        assert!(matches!(result, Err(Error::AlreadyInitialized(_))));
    }

    #[test]
    fn test_clone_from_non_repo() {
        let src_dir = tempdir().unwrap();
        let dst_dir = tempdir().unwrap();

        let result = clone_repo(src_dir.path(), dst_dir.path());
        assert!(matches!(result, Err(Error::NoRepo(_))));
    }
}
