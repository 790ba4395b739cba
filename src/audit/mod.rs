// src/audit/mod.rs

//! Cross-architecture divergence audit
//!
//! The audit runs in one sequential pass:
//! 1. Collect `Multi-Arch: same` builds from the catalog, grouped by
//!    (name, version)
//! 2. For each identity with at least two builds, resolve every build's
//!    manifest from the cache, or fetch and cache it
//! 3. Aggregate path -> hash -> architectures and report divergent paths
//! 4. Optionally prune cache entries this run did not touch

mod aggregate;
mod collector;
mod report;

pub use aggregate::{DivergenceReport, HashArchitectures, is_fully_divergent};
pub use collector::PackageGroups;
pub use report::Reporter;

use crate::cache::{CacheKey, ManifestCache, open_cache};
use crate::config::AuditConfig;
use crate::error::{Error, Result};
use crate::packages::{DebManifestFetcher, Manifest, ManifestSource};
use crate::repository::{Mirror, MirrorCatalog, RepositoryCatalog};
use std::collections::HashSet;
use std::fmt;
use std::io::Write;
use tracing::{debug, error, info};

/// A package release independent of architecture
///
/// Orders by name, then version, both compared bytewise.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackageIdentity {
    pub name: String,
    pub version: String,
}

impl PackageIdentity {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Cache key for this identity's build on `architecture`
    pub fn cache_key(&self, architecture: &str) -> CacheKey {
        CacheKey::new(&self.name, &self.version, architecture)
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

/// One architecture's build of a package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchitectureBuild {
    pub architecture: String,
    /// Archive path relative to the mirror root
    pub location: String,
}

/// Counters for one audit run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Package identities examined
    pub packages: usize,
    /// Identities with a single architecture build
    pub skipped: usize,
    /// Archives downloaded
    pub downloads: usize,
    /// Manifests served from the cache
    pub cache_hits: usize,
    /// Builds whose archive had no `md5sums` member
    pub missing_manifests: usize,
    /// Identities with at least one divergent file
    pub divergent: usize,
}

/// Drives manifest resolution, aggregation and cache pruning
pub struct Auditor<'a> {
    cache: Box<dyn ManifestCache>,
    source: &'a dyn ManifestSource,
    touched: HashSet<CacheKey>,
    summary: RunSummary,
}

impl<'a> Auditor<'a> {
    pub fn new(cache: Box<dyn ManifestCache>, source: &'a dyn ManifestSource) -> Self {
        Self {
            cache,
            source,
            touched: HashSet::new(),
            summary: RunSummary::default(),
        }
    }

    /// Audit every group in (name, version) order, reporting as it goes
    pub fn run<W: Write>(
        &mut self,
        groups: PackageGroups,
        reporter: &mut Reporter<W>,
    ) -> Result<RunSummary> {
        for (identity, builds) in groups.into_sorted() {
            if let Some(report) = self.audit_package(&identity, &builds)? {
                if reporter.write_package(&identity, &report)? {
                    self.summary.divergent += 1;
                }
            }
        }

        info!(
            "Audited {} packages: {} skipped, {} downloads, {} cache hits, {} without md5sums, {} divergent",
            self.summary.packages,
            self.summary.skipped,
            self.summary.downloads,
            self.summary.cache_hits,
            self.summary.missing_manifests,
            self.summary.divergent
        );
        Ok(self.summary.clone())
    }

    /// Aggregate the manifests of one package identity
    ///
    /// Returns `None` when the identity has fewer than two builds.
    pub fn audit_package(
        &mut self,
        identity: &PackageIdentity,
        builds: &[ArchitectureBuild],
    ) -> Result<Option<DivergenceReport>> {
        self.summary.packages += 1;

        if builds.len() < 2 {
            info!("{} => skip", identity);
            self.summary.skipped += 1;
            return Ok(None);
        }

        let architectures: Vec<&str> = builds.iter().map(|b| b.architecture.as_str()).collect();
        info!("{} => download ({})", identity, architectures.join(" "));

        let mut report = DivergenceReport::new();
        for build in builds {
            if let Some(manifest) = self.resolve_manifest(identity, build)? {
                report.add_manifest(&build.architecture, &manifest);
            }
        }

        Ok(Some(report))
    }

    /// Get a build's manifest from the cache, or fetch and cache it
    ///
    /// Returns `None` when the archive has no `md5sums` member.
    fn resolve_manifest(
        &mut self,
        identity: &PackageIdentity,
        build: &ArchitectureBuild,
    ) -> Result<Option<Manifest>> {
        let key = identity.cache_key(&build.architecture);

        if let Some(raw) = self.cache.get(&key)? {
            debug!("Cache hit for {}", key);
            let manifest = Manifest::parse(&raw)?;
            self.touched.insert(key);
            self.summary.cache_hits += 1;
            return Ok(Some(manifest));
        }

        match self.source.fetch_manifest(&build.location) {
            Ok(raw) => {
                let manifest = Manifest::parse(&raw)?;
                self.cache.put(&key, &raw)?;
                self.touched.insert(key);
                self.summary.downloads += 1;
                Ok(Some(manifest))
            }
            Err(Error::MissingControlMember(msg)) => {
                error!("{} => {} ({})", identity, msg, build.architecture);
                self.summary.missing_manifests += 1;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Delete cache entries not read or written during this run
    ///
    /// Returns the number of entries removed.
    pub fn prune(&mut self) -> Result<usize> {
        let stale: Vec<CacheKey> = self
            .cache
            .keys()?
            .into_iter()
            .filter(|key| !self.touched.contains(key))
            .collect();

        for key in &stale {
            debug!("Pruning {}", key);
            self.cache.delete(key)?;
        }

        info!("Pruned {} stale cache entries", stale.len());
        Ok(stale.len())
    }

    /// Cache keys read or written so far
    pub fn touched(&self) -> &HashSet<CacheKey> {
        &self.touched
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Close the cache
    pub fn close(self) -> Result<()> {
        self.cache.close()
    }
}

/// Run a complete audit, writing the report to `out`
///
/// Pruning only happens once every package has been audited; a fatal
/// error returns early and leaves the cache as it was.
pub fn run_audit<W: Write>(config: &AuditConfig, out: W) -> Result<RunSummary> {
    let mirror = Mirror::new(&config.mirror)?;
    let cache = open_cache(&config.cache)?;

    let catalog = MirrorCatalog::new(&mirror, config.distribution.as_str());
    let declared = if config.architectures.needs_release() {
        catalog.architectures()?
    } else {
        Vec::new()
    };

    let architectures = config.architectures.resolve(&declared);
    if architectures.is_empty() {
        return Err(Error::InitError("No architectures selected".to_string()));
    }
    info!("Checking architectures: {}", architectures.join(" "));

    let groups = PackageGroups::collect(&catalog, &config.sections, &architectures, &config.packages)?;

    let fetcher = DebManifestFetcher::new(&mirror);
    let mut auditor = Auditor::new(cache, &fetcher);
    let mut reporter = Reporter::new(out, config.compact);

    let summary = auditor.run(groups, &mut reporter)?;

    if config.prune_cache {
        auditor.prune()?;
    }
    auditor.close()?;

    Ok(summary)
}
