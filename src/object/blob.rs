use std::fs;
use std::path::Path;

use crate::error::{IoResultExt, Result};
use crate::hash::Hash;
use crate::object::store::{get_object, put_object};
use crate::repo::Repo;

/// write a blob to the object store
///
/// blobs are stored as raw file bytes; the hash is computed over exactly
/// those bytes.
pub fn write_blob(repo: &Repo, content: &[u8]) -> Result<Hash> {
    put_object(repo, content)
}

/// read a file from disk and store it as a blob
pub fn write_blob_from_file(repo: &Repo, path: &Path) -> Result<Hash> {
    let content = fs::read(path).with_path(path)?;
    write_blob(repo, &content)
}

/// read blob content
pub fn read_blob(repo: &Repo, hash: &Hash) -> Result<Vec<u8>> {
    get_object(repo, hash)
}
