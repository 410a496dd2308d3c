use std::fs;
use std::path::PathBuf;

use crate::error::{Error, IoResultExt, Result};
use crate::hash::{compute_hash, Hash};
use crate::repo::Repo;

/// minimum number of hex chars accepted as an abbreviated object name
pub const MIN_PREFIX_LEN: usize = 4;

/// store raw bytes, returning their content hash
///
/// objects are written once: storing bytes that are already present is a
/// no-op that returns the existing name.
pub fn put_object(repo: &Repo, content: &[u8]) -> Result<Hash> {
    let hash = compute_hash(content);
    let path = object_path(repo, &hash);

    // dedup: if object already exists, we're done
    if path.exists() {
        return Ok(hash);
    }

    repo.write_atomic(&path, content)?;
    tracing::debug!(object = %hash.short(), bytes = content.len(), "stored object");

    Ok(hash)
}

/// read raw bytes of a stored object, verifying they still match their name
pub fn get_object(repo: &Repo, hash: &Hash) -> Result<Vec<u8>> {
    let path = object_path(repo, hash);

    let content = fs::read(&path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::ObjectNotFound(*hash)
        } else {
            Error::Io {
                path: path.clone(),
                source: e,
            }
        }
    })?;

    if compute_hash(&content) != *hash {
        return Err(Error::CorruptObject(*hash));
    }

    Ok(content)
}

/// get the filesystem path to an object
pub fn object_path(repo: &Repo, hash: &Hash) -> PathBuf {
    repo.objects_path().join(hash.to_hex())
}

/// check if an object exists in the store
pub fn object_exists(repo: &Repo, hash: &Hash) -> bool {
    object_path(repo, hash).is_file()
}

/// list every object in the store, sorted
pub fn list_objects(repo: &Repo) -> Result<Vec<Hash>> {
    let dir = repo.objects_path();
    let mut hashes = Vec::new();

    for entry in fs::read_dir(&dir).with_path(&dir)? {
        let entry = entry.with_path(&dir)?;
        if !entry.file_type().with_path(entry.path())?.is_file() {
            continue;
        }

        let name = entry.file_name();
        match name.to_str().map(Hash::from_hex) {
            Some(Ok(hash)) => hashes.push(hash),
            _ => tracing::warn!(file = ?name, "ignoring stray file in object store"),
        }
    }

    hashes.sort();
    Ok(hashes)
}

/// number of stored objects
pub fn object_count(repo: &Repo) -> Result<usize> {
    Ok(list_objects(repo)?.len())
}

/// resolve a full hash or a unique abbreviated prefix to a stored object
pub fn resolve_object(repo: &Repo, rev: &str) -> Result<Hash> {
    let rev = rev.trim().to_ascii_lowercase();

    if rev.len() == Hash::HEX_LEN {
        let hash = Hash::from_hex(&rev)?;
        if !object_exists(repo, &hash) {
            return Err(Error::ObjectNotFound(hash));
        }
        return Ok(hash);
    }

    if rev.len() < MIN_PREFIX_LEN
        || rev.len() > Hash::HEX_LEN
        || !rev.chars().all(|c| c.is_ascii_hexdigit())
    {
        return Err(Error::InvalidHashHex(rev));
    }

    let matches: Vec<Hash> = list_objects(repo)?
        .into_iter()
        .filter(|h| h.to_hex().starts_with(&rev))
        .collect();

    match matches.as_slice() {
        [hash] => Ok(*hash),
        [] => Err(Error::PrefixNotFound(rev)),
        _ => Err(Error::AmbiguousHash {
            prefix: rev,
            count: matches.len(),
        }),
    }
}
