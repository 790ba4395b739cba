// src/packages/mod.rs

//! Per-file hash manifests of DEB packages
//!
//! A manifest is the parsed `md5sums` control member of one architecture
//! build. Paths are kept as raw bytes: file names in packages are not
//! guaranteed to be UTF-8.

pub mod deb;

pub use deb::{DebManifestFetcher, read_md5sums};

use crate::error::{Error, Result};
use crate::hash::{ContentHash, HASH_HEX_LEN};
use std::collections::BTreeMap;

/// Source of raw manifests, keyed by archive location
pub trait ManifestSource {
    /// Fetch the archive at `location` and return its raw `md5sums` bytes
    ///
    /// Returns `Error::MissingControlMember` when the archive carries no
    /// `md5sums` member; any other error is fatal to the run.
    fn fetch_manifest(&self, location: &str) -> Result<Vec<u8>>;
}

/// Parsed file path -> content hash mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: BTreeMap<Vec<u8>, ContentHash>,
}

impl Manifest {
    /// Parse raw `md5sums` contents
    ///
    /// Each line holds a 32-character hex hash, a two-character separator
    /// (`"  "`, or `" *"` for binary mode) and the path up to the newline.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let mut entries = BTreeMap::new();

        for (index, line) in raw.split(|&b| b == b'\n').enumerate() {
            if line.is_empty() {
                continue;
            }

            if line.len() <= HASH_HEX_LEN {
                return Err(Error::ParseError(format!(
                    "md5sums line {} is too short: {:?}",
                    index + 1,
                    String::from_utf8_lossy(line)
                )));
            }

            let (hash, rest) = line.split_at(HASH_HEX_LEN);
            let hash = ContentHash::from_hex(hash).map_err(|e| {
                Error::ParseError(format!("md5sums line {}: {}", index + 1, e))
            })?;

            let path = strip_separator(rest);
            if path.is_empty() {
                return Err(Error::ParseError(format!(
                    "md5sums line {} has no path",
                    index + 1
                )));
            }

            entries.insert(path.to_vec(), hash);
        }

        Ok(Self { entries })
    }

    /// Look up the hash recorded for a path
    pub fn get(&self, path: &[u8]) -> Option<&ContentHash> {
        self.entries.get(path)
    }

    /// Iterate over (path, hash) pairs in path order
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &ContentHash)> {
        self.entries.iter().map(|(path, hash)| (path.as_slice(), hash))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn strip_separator(rest: &[u8]) -> &[u8] {
    rest.strip_prefix(b"  ")
        .or_else(|| rest.strip_prefix(b" *"))
        .or_else(|| rest.strip_prefix(b" "))
        .unwrap_or(rest)
}
