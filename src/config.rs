// src/config.rs

//! Run configuration
//!
//! Command-line options are resolved once into an [`AuditConfig`]; the rest
//! of the crate only sees these typed values.

use crate::error::{Error, Result};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Default mirror location
pub const DEFAULT_MIRROR: &str = "http://deb.debian.org/debian";

/// Default distribution name
pub const DEFAULT_DISTRIBUTION: &str = "unstable";

/// Default archive sections
pub const DEFAULT_SECTIONS: &[&str] = &["main", "contrib", "non-free", "non-free-firmware"];

/// Directory name under the per-user cache directory
const CACHE_DIR_NAME: &str = "multiarch-audit";

/// File name of the manifest cache database
const CACHE_FILE_NAME: &str = "manifests.sqlite";

/// Which package names are audited
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PackageFilter {
    /// Every package in the catalog
    #[default]
    AllPackages,
    /// Only the named packages
    NamedSubset(BTreeSet<String>),
}

impl PackageFilter {
    /// Build a filter from package names; no names means all packages
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            Self::AllPackages
        } else {
            Self::NamedSubset(names)
        }
    }

    /// Check whether a package name passes the filter
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::AllPackages => true,
            Self::NamedSubset(names) => names.contains(name),
        }
    }
}

/// How the set of audited architectures is chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchSelection {
    /// Exactly these architectures
    Explicit(Vec<String>),
    /// The distribution's declared architectures minus these
    Derived { exclude: BTreeSet<String> },
}

impl ArchSelection {
    /// Resolve against the architectures a distribution declares
    ///
    /// `all` is never an audited architecture: it has no per-architecture
    /// builds to compare.
    pub fn resolve(&self, declared: &[String]) -> Vec<String> {
        let selected: BTreeSet<&String> = match self {
            Self::Explicit(archs) => archs.iter().collect(),
            Self::Derived { exclude } => declared
                .iter()
                .filter(|arch| !exclude.contains(arch.as_str()))
                .collect(),
        };

        selected
            .into_iter()
            .filter(|arch| arch.as_str() != "all")
            .cloned()
            .collect()
    }

    /// Whether the Release file must be consulted
    pub fn needs_release(&self) -> bool {
        matches!(self, Self::Derived { .. })
    }
}

/// Where manifests are cached
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLocation {
    /// No caching; every manifest is fetched
    Disabled,
    /// SQLite database at this path
    Path(PathBuf),
}

impl CacheLocation {
    /// Default cache database in the per-user cache directory
    pub fn default_path() -> Result<PathBuf> {
        dirs::cache_dir()
            .map(|dir| dir.join(CACHE_DIR_NAME).join(CACHE_FILE_NAME))
            .ok_or_else(|| {
                Error::InitError("Unable to determine the user cache directory".to_string())
            })
    }

    /// Resolve the three-state `--cache [PATH]` option
    pub fn from_option(option: Option<Option<PathBuf>>) -> Result<Self> {
        match option {
            None => Ok(Self::Disabled),
            Some(None) => Ok(Self::Path(Self::default_path()?)),
            Some(Some(path)) => Ok(Self::Path(path)),
        }
    }
}

/// Complete configuration for one audit run
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// Mirror URL or local mirror directory
    pub mirror: String,
    /// Distribution name, e.g. `unstable`
    pub distribution: String,
    /// Archive sections to scan
    pub sections: Vec<String>,
    pub architectures: ArchSelection,
    pub packages: PackageFilter,
    /// Suppress per-hash lines for fully divergent files
    pub compact: bool,
    pub cache: CacheLocation,
    /// Delete cache entries not used by this run
    pub prune_cache: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            mirror: DEFAULT_MIRROR.to_string(),
            distribution: DEFAULT_DISTRIBUTION.to_string(),
            sections: DEFAULT_SECTIONS.iter().map(|s| s.to_string()).collect(),
            architectures: ArchSelection::Derived {
                exclude: BTreeSet::new(),
            },
            packages: PackageFilter::AllPackages,
            compact: false,
            cache: CacheLocation::Disabled,
            prune_cache: false,
        }
    }
}
