use std::path::PathBuf;

use crate::Hash;

/// error type for sprig operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("not a sprig repository: {0}")]
    NoRepo(PathBuf),

    #[error("repository already initialized at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("object not found: {0}")]
    ObjectNotFound(Hash),

    #[error("corrupt object: hash mismatch for {0}")]
    CorruptObject(Hash),

    #[error("no object matches prefix {0}")]
    PrefixNotFound(String),

    #[error("ambiguous object prefix {prefix}: {count} objects match")]
    AmbiguousHash { prefix: String, count: usize },

    #[error("unknown branch: {0}")]
    UnknownBranch(String),

    #[error("branch already exists: {0}")]
    BranchExists(String),

    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("nothing to merge: branch '{0}' has no commits")]
    NothingToMerge(String),

    #[error("nothing to commit: staging index is empty")]
    NothingToCommit,

    #[error("path is outside the repository: {0}")]
    PathOutsideRepo(PathBuf),

    #[error("lock contention on repository")]
    LockContention,

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cbor serialization error: {0}")]
    CborEncode(#[from] ciborium::ser::Error<std::io::Error>),

    #[error("cbor deserialization error: {0}")]
    CborDecode(#[from] ciborium::de::Error<std::io::Error>),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("config serialization error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("invalid hash hex: {0}")]
    InvalidHashHex(String),

    #[error("invalid object type: {0}")]
    InvalidObjectType(String),

    #[error("repository check found {0} problem(s)")]
    CheckFailed(usize),
}

pub type Result<T> = std::result::Result<T, Error>;

/// helper to wrap io errors with path context
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.into(),
            source,
        })
    }
}
