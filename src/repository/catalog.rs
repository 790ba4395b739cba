// src/repository/catalog.rs

//! Repository catalog: Release and Packages indices
//!
//! For a distribution on a mirror this reads
//! `dists/<dist>/Release` for the declared architectures and
//! `dists/<dist>/<section>/binary-<arch>/Packages{.xz,.gz,}` for records.
//! Both are deserialized from their RFC 822-style stanzas.

use super::client::Mirror;
use crate::compression::Codec;
use crate::error::{Error, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

/// Value of the `Multi-Arch` field for architecture-uniform packages
pub const MULTI_ARCH_SAME: &str = "same";

/// Index file suffixes, in order of preference
const INDEX_SUFFIXES: &[&str] = &[".xz", ".gz", ""];

/// One binary package record from a Packages index
///
/// `Package`, `Version` and `Filename` are required; other fields are
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PackageRecord {
    #[serde(rename = "Package")]
    pub name: String,
    #[serde(rename = "Version")]
    pub version: String,
    /// `Multi-Arch` field, if present
    #[serde(rename = "Multi-Arch", default)]
    pub multi_arch: Option<String>,
    /// Archive path relative to the mirror root
    #[serde(rename = "Filename")]
    pub filename: String,
}

impl PackageRecord {
    /// Whether the package is declared `Multi-Arch: same`
    pub fn is_multi_arch_same(&self) -> bool {
        self.multi_arch.as_deref() == Some(MULTI_ARCH_SAME)
    }
}

/// The part of a Release file the audit needs
#[derive(Debug, Deserialize)]
struct Release {
    #[serde(rename = "Architectures")]
    architectures: String,
}

/// Deserialize every stanza of an index
fn parse_stanzas<T: DeserializeOwned>(data: &[u8], origin: &str) -> Result<Vec<T>> {
    let text = std::str::from_utf8(data)
        .map_err(|e| Error::ParseError(format!("{} is not valid UTF-8: {}", origin, e)))?;
    rfc822_like::from_str(text).map_err(|e| Error::ParseError(format!("{}: {}", origin, e)))
}

/// Lazy sequence of package records
pub type RecordStream = Box<dyn Iterator<Item = Result<PackageRecord>>>;

/// Source of package records for a distribution
pub trait RepositoryCatalog {
    /// Architectures declared by the distribution
    fn architectures(&self) -> Result<Vec<String>>;

    /// Records of one section for one architecture
    ///
    /// Returns `Ok(None)` when the section has no index for that
    /// architecture.
    fn records(&self, section: &str, architecture: &str) -> Result<Option<RecordStream>>;
}

/// Catalog read from a mirror
#[derive(Debug)]
pub struct MirrorCatalog<'a> {
    mirror: &'a Mirror,
    distribution: String,
}

impl<'a> MirrorCatalog<'a> {
    pub fn new(mirror: &'a Mirror, distribution: impl Into<String>) -> Self {
        Self {
            mirror,
            distribution: distribution.into(),
        }
    }

    fn release_path(&self) -> String {
        format!("dists/{}/Release", self.distribution)
    }

    fn index_path(&self, section: &str, architecture: &str) -> String {
        format!(
            "dists/{}/{}/binary-{}/Packages",
            self.distribution, section, architecture
        )
    }

    /// Fetch the first available variant of an index, decompressed
    fn fetch_index(&self, base: &str) -> Result<Option<(String, Vec<u8>)>> {
        for suffix in INDEX_SUFFIXES {
            let path = format!("{}{}", base, suffix);
            match self.mirror.fetch_bytes(&path) {
                Ok(bytes) => {
                    let data = Codec::from_name(&path).decode_all(&bytes)?;
                    debug!("Decompressed {} bytes -> {} bytes", bytes.len(), data.len());
                    return Ok(Some((path, data)));
                }
                Err(Error::NotFoundError(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }
}

impl RepositoryCatalog for MirrorCatalog<'_> {
    fn architectures(&self) -> Result<Vec<String>> {
        let path = self.release_path();
        info!("Reading {}", self.mirror.url_for(&path));

        let bytes = self.mirror.fetch_bytes(&path)?;
        let release: Release = parse_stanzas(&bytes, &path)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::ParseError(format!("{} is empty", path)))?;

        Ok(release
            .architectures
            .split_whitespace()
            .map(str::to_string)
            .collect())
    }

    fn records(&self, section: &str, architecture: &str) -> Result<Option<RecordStream>> {
        let base = self.index_path(section, architecture);
        let Some((path, data)) = self.fetch_index(&base)? else {
            return Ok(None);
        };

        info!("Reading {}", self.mirror.url_for(&path));
        let records: Vec<PackageRecord> = parse_stanzas(&data, &path)?;
        debug!("{} records in {}", records.len(), path);

        Ok(Some(Box::new(records.into_iter().map(Ok))))
    }
}
