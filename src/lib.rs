// src/lib.rs

//! multiarch-audit
//!
//! Audits a Debian-style binary repository for `Multi-Arch: same` packages
//! whose files differ between architecture builds.
//!
//! # Architecture
//!
//! - Catalog: Release and Packages indices read from a mirror
//! - Collector: builds grouped by (name, version)
//! - Manifests: `md5sums` control members, cached in SQLite between runs
//! - Aggregation: path -> hash -> architectures, reported when a path has
//!   more than one hash

pub mod audit;
pub mod cache;
pub mod compression;
pub mod config;
mod error;
pub mod hash;
pub mod packages;
pub mod repository;

pub use audit::{
    ArchitectureBuild, Auditor, DivergenceReport, PackageGroups, PackageIdentity, Reporter,
    RunSummary, run_audit,
};
pub use cache::{CacheKey, ManifestCache, NullCache, SqliteCache, open_cache};
pub use config::{ArchSelection, AuditConfig, CacheLocation, PackageFilter};
pub use error::{Error, Result};
pub use hash::{ContentHash, HashError};
pub use packages::{Manifest, ManifestSource};
pub use repository::{Mirror, PackageRecord, RepositoryCatalog};
