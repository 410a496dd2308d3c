use std::fs::{self, File};
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use nix::fcntl::{Flock, FlockArg};

use crate::config::Config;
use crate::error::{Error, IoResultExt, Result};
use crate::index::Index;
use crate::refs;

/// name of the marker directory inside the worktree root
pub const MARKER_DIR: &str = ".sprig";

/// a sprig repository handle
///
/// every operation takes the handle explicitly; nothing about the active
/// branch or staging state lives in process-wide globals.
pub struct Repo {
    root: PathBuf,
    config: Config,
}

impl Repo {
    /// initialize a new repository rooted at the given worktree path
    pub fn init(path: &Path) -> Result<Self> {
        Self::init_with_config(path, Config::default())
    }

    /// initialize a new repository with explicit configuration
    ///
    /// fails with `AlreadyInitialized` without touching anything when the
    /// marker directory is already present.
    pub fn init_with_config(path: &Path, config: Config) -> Result<Self> {
        let marker = path.join(MARKER_DIR);
        if marker.exists() {
            return Err(Error::AlreadyInitialized(path.to_path_buf()));
        }

        refs::validate_branch_name(&config.core.default_branch)?;

        // create directory structure
        fs::create_dir_all(marker.join("objects")).with_path(&marker)?;
        fs::create_dir_all(marker.join("refs/branches")).with_path(&marker)?;
        fs::create_dir_all(marker.join("tmp")).with_path(&marker)?;

        let repo = Self {
            root: path.to_path_buf(),
            config,
        };
        repo.config.save(&repo.config_path())?;

        let default_branch = repo.config.core.default_branch.clone();
        refs::write_branch(&repo, &default_branch, None)?;
        refs::write_head(&repo, &default_branch)?;
        Index::default().save(&repo)?;

        tracing::info!(path = %path.display(), branch = %default_branch, "initialized repository");

        Ok(repo)
    }

    /// open an existing repository
    pub fn open(path: &Path) -> Result<Self> {
        let marker = path.join(MARKER_DIR);
        if !marker.join("HEAD").is_file() {
            return Err(Error::NoRepo(path.to_path_buf()));
        }

        let config_path = marker.join("config.toml");
        let config = if config_path.exists() {
            Config::load(&config_path)?
        } else {
            Config::default()
        };

        Ok(Self {
            root: path.to_path_buf(),
            config,
        })
    }

    /// worktree root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// repository configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// path to the marker directory
    pub fn path(&self) -> PathBuf {
        self.root.join(MARKER_DIR)
    }

    /// path to config.toml
    pub fn config_path(&self) -> PathBuf {
        self.path().join("config.toml")
    }

    /// path to HEAD
    pub fn head_path(&self) -> PathBuf {
        self.path().join("HEAD")
    }

    /// path to the staging index
    pub fn index_path(&self) -> PathBuf {
        self.path().join("index")
    }

    /// path to objects directory
    pub fn objects_path(&self) -> PathBuf {
        self.path().join("objects")
    }

    /// path to branch refs directory
    pub fn branches_path(&self) -> PathBuf {
        self.path().join("refs/branches")
    }

    /// path to tmp directory (for atomic writes)
    pub fn tmp_path(&self) -> PathBuf {
        self.path().join("tmp")
    }

    /// path to lock file
    pub fn lock_path(&self) -> PathBuf {
        self.path().join(".lock")
    }

    /// acquire exclusive lock on repository
    /// returns a guard that releases the lock on drop
    pub fn lock(&self) -> Result<RepoLock> {
        let lock_path = self.lock_path();
        let file = File::create(&lock_path).with_path(&lock_path)?;

        let flock = Flock::lock(file, FlockArg::LockExclusiveNonblock)
            .map_err(|_| Error::LockContention)?;

        Ok(RepoLock { flock })
    }

    /// write a file atomically: temp -> fsync -> rename -> fsync parent
    pub(crate) fn write_atomic(&self, dest: &Path, content: &[u8]) -> Result<()> {
        let tmp_path = self.tmp_path().join(uuid::Uuid::new_v4().to_string());
        {
            let mut tmp_file = File::create(&tmp_path).with_path(&tmp_path)?;
            tmp_file.write_all(content).with_path(&tmp_path)?;
            tmp_file.sync_all().with_path(&tmp_path)?;
        }

        if let Err(e) = fs::rename(&tmp_path, dest) {
            let _ = fs::remove_file(&tmp_path);
            return Err(Error::Io {
                path: dest.to_path_buf(),
                source: e,
            });
        }

        if let Some(parent) = dest.parent() {
            let dir = File::open(parent).with_path(parent)?;
            dir.sync_all().with_path(parent)?;
        }

        Ok(())
    }

    /// express a worktree file as a `/`-separated path relative to the root
    pub fn relative_path(&self, file: &Path) -> Result<String> {
        let root = self.root.canonicalize().with_path(&self.root)?;
        let absolute = if file.is_absolute() {
            file.to_path_buf()
        } else {
            std::env::current_dir().with_path(file)?.join(file)
        };
        let absolute = absolute.canonicalize().with_path(&absolute)?;

        let rel = absolute
            .strip_prefix(&root)
            .map_err(|_| Error::PathOutsideRepo(file.to_path_buf()))?;

        let mut parts = Vec::new();
        for component in rel.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
                _ => return Err(Error::PathOutsideRepo(file.to_path_buf())),
            }
        }

        if parts.is_empty() || parts[0] == MARKER_DIR {
            return Err(Error::PathOutsideRepo(file.to_path_buf()));
        }

        Ok(parts.join("/"))
    }
}

/// guard that holds repository lock until dropped
pub struct RepoLock {
    #[allow(dead_code)]
    flock: Flock<File>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_repo_init() {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();

        let marker = dir.path().join(MARKER_DIR);
        assert!(marker.join("objects").is_dir());
        assert!(marker.join("refs/branches").is_dir());
        assert!(marker.join("tmp").is_dir());
        assert!(marker.join("config.toml").is_file());
        assert!(marker.join("index").is_file());

        assert_eq!(fs::read_to_string(marker.join("HEAD")).unwrap().trim(), "main");
        assert_eq!(fs::read_to_string(marker.join("refs/branches/main")).unwrap(), "");
        assert_eq!(repo.path(), marker);
    }

    #[test]
    fn test_repo_init_already_initialized() {
        let dir = tempdir().unwrap();
        Repo::init(dir.path()).unwrap();

        let marker = dir.path().join(MARKER_DIR);
        fs::write(marker.join("refs/branches/keep"), "").unwrap();

        let result = Repo::init(dir.path());
        assert!(matches!(result, Err(Error::AlreadyInitialized(_))));

        // existing state survives the second init
        assert!(marker.join("refs/branches/keep").exists());
    }

    #[test]
    fn test_repo_init_custom_default_branch() {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.core.default_branch = "trunk".to_string();

        Repo::init_with_config(dir.path(), config).unwrap();

        let marker = dir.path().join(MARKER_DIR);
        assert_eq!(fs::read_to_string(marker.join("HEAD")).unwrap().trim(), "trunk");
        assert!(marker.join("refs/branches/trunk").is_file());
    }

    #[test]
    fn test_repo_open() {
        let dir = tempdir().unwrap();
        Repo::init(dir.path()).unwrap();

        let repo = Repo::open(dir.path()).unwrap();
        assert_eq!(repo.root(), dir.path());
        assert_eq!(repo.config().core.default_branch, "main");
    }

    #[test]
    fn test_repo_open_not_found() {
        let dir = tempdir().unwrap();
        let result = Repo::open(dir.path());
        assert!(matches!(result, Err(Error::NoRepo(_))));
    }

    #[test]
    fn test_repo_lock() {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();

        let lock = repo.lock().unwrap();
        assert!(matches!(repo.lock(), Err(Error::LockContention)));

        // a second handle on the same repository contends too
        let other = Repo::open(dir.path()).unwrap();
        assert!(matches!(other.lock(), Err(Error::LockContention)));

        drop(lock);
        assert!(other.lock().is_ok());
    }

    #[test]
    fn test_write_atomic_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();

        let dest = repo.path().join("scratch");
        repo.write_atomic(&dest, b"one").unwrap();
        repo.write_atomic(&dest, b"two").unwrap();

        assert_eq!(fs::read(&dest).unwrap(), b"two");
        assert_eq!(fs::read_dir(repo.tmp_path()).unwrap().count(), 0);
    }

    #[test]
    fn test_relative_path() {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();

        fs::create_dir_all(dir.path().join("src/nested")).unwrap();
        fs::write(dir.path().join("src/nested/a.txt"), "a").unwrap();

        let rel = repo
            .relative_path(&dir.path().join("src/nested/a.txt"))
            .unwrap();
        assert_eq!(rel, "src/nested/a.txt");
    }

    #[test]
    fn test_relative_path_outside_repo() {
        let dir = tempdir().unwrap();
        let other = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();

        fs::write(other.path().join("x.txt"), "x").unwrap();
        let result = repo.relative_path(&other.path().join("x.txt"));
        assert!(matches!(result, Err(Error::PathOutsideRepo(_))));

        let result = repo.relative_path(&repo.head_path());
        assert!(matches!(result, Err(Error::PathOutsideRepo(_))));
    }
}
