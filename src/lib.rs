//! sprig - a minimal content-addressed version control engine
//!
//! an object store plus a commit graph with branches, a staging index and a
//! two-parent union merge.
//!
//! # Core concepts
//!
//! - **Blob**: raw file content, named by the SHA-256 of its bytes
//! - **Commit**: a list of (path, blob) entries plus message, timestamp and
//!   parent link(s), stored as CBOR and named by the hash of that encoding
//! - **Branch**: a mutable pointer to a commit (or to nothing, before the
//!   first commit); HEAD names the active branch
//! - **Index**: entries staged for the next commit
//!
//! # On-disk layout
//!
//! ```text
//! .sprig/HEAD               active branch name
//! .sprig/index              staged entries (CBOR)
//! .sprig/config.toml        settings
//! .sprig/objects/<hash>     blobs and commits
//! .sprig/refs/branches/<n>  branch tip hash, empty if no commits
//! ```
//!
//! At most one mutating operation runs against a repository at a time; this
//! is enforced with an exclusive `flock` on `.sprig/.lock`.
//!
//! # Example usage
//!
//! ```no_run
//! use sprig::{ops, Repo};
//! use std::path::Path;
//!
//! let repo = Repo::init(Path::new("/path/to/project")).unwrap();
//!
//! ops::add(&repo, Path::new("/path/to/project/readme.txt")).unwrap();
//! let hash = ops::commit(&repo, "first").unwrap();
//!
//! ops::create_branch(&repo, "feature").unwrap();
//! ops::switch_branch(&repo, "feature").unwrap();
//! // ... commit on feature, then
//! ops::switch_branch(&repo, "main").unwrap();
//! ops::merge(&repo, "feature").unwrap();
//! # let _ = hash;
//! ```

mod config;
mod error;
mod hash;
mod index;
mod object;
mod refs;
mod repo;

pub mod ops;
pub mod types;

pub use config::{Config, CoreConfig, DuplicatePolicy, IndexConfig};
pub use error::{Error, Result};
pub use hash::{compute_hash, Hash};
pub use index::Index;
pub use object::{
    get_object, list_objects, object_count, object_exists, put_object, read_blob, read_commit,
    resolve_object, write_blob, write_blob_from_file, write_commit,
};
pub use refs::{
    branch_exists, create_branch, head_tip, list_branches, read_branch, read_head, write_branch,
    write_head,
};
pub use repo::{Repo, RepoLock, MARKER_DIR};
pub use types::{Commit, DiffLine, LineKind, Parent, StagingEntry};
