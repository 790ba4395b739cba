// src/audit/collector.rs

//! Grouping of `Multi-Arch: same` builds by package identity

use super::{ArchitectureBuild, PackageIdentity};
use crate::config::PackageFilter;
use crate::error::{Error, Result};
use crate::repository::{PackageRecord, RepositoryCatalog};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

/// Architecture builds observed for each package identity
///
/// Unordered; the auditor sorts identities before reporting.
#[derive(Debug, Clone, Default)]
pub struct PackageGroups {
    groups: HashMap<PackageIdentity, BTreeMap<String, ArchitectureBuild>>,
}

impl PackageGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan every section of every architecture and group matching records
    ///
    /// A section without an index for some architecture is skipped; finding
    /// no index at all is an error. Malformed records abort the scan.
    pub fn collect(
        catalog: &dyn RepositoryCatalog,
        sections: &[String],
        architectures: &[String],
        filter: &PackageFilter,
    ) -> Result<Self> {
        let mut groups = Self::new();
        let mut indices = 0usize;

        for architecture in architectures {
            for section in sections {
                let Some(records) = catalog.records(section, architecture)? else {
                    warn!("No Packages index for {} on {}", section, architecture);
                    continue;
                };
                indices += 1;

                for record in records {
                    let record = record?;
                    if record.is_multi_arch_same() && filter.matches(&record.name) {
                        groups.insert(architecture, record);
                    }
                }
            }
        }

        if indices == 0 && !architectures.is_empty() {
            return Err(Error::NotFoundError(format!(
                "No Packages index found for sections {} on {}",
                sections.join(" "),
                architectures.join(" ")
            )));
        }

        info!(
            "Found {} Multi-Arch: same packages across {} indices",
            groups.len(),
            indices
        );
        Ok(groups)
    }

    /// Record one architecture build of a package
    pub fn insert(&mut self, architecture: &str, record: PackageRecord) {
        let identity = PackageIdentity::new(record.name, record.version);
        let builds = self.groups.entry(identity).or_default();

        let build = ArchitectureBuild {
            architecture: architecture.to_string(),
            location: record.filename,
        };
        if let Some(previous) = builds.insert(architecture.to_string(), build) {
            debug!(
                "Replacing duplicate {} build at {}",
                architecture, previous.location
            );
        }
    }

    /// Builds recorded for an identity, ordered by architecture
    pub fn builds(&self, identity: &PackageIdentity) -> Option<Vec<&ArchitectureBuild>> {
        self.groups.get(identity).map(|builds| builds.values().collect())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Consume into identities sorted by (name, version)
    pub fn into_sorted(self) -> Vec<(PackageIdentity, Vec<ArchitectureBuild>)> {
        let mut groups: Vec<_> = self
            .groups
            .into_iter()
            .map(|(identity, builds)| (identity, builds.into_values().collect()))
            .collect();
        groups.sort_by(|a, b| a.0.cmp(&b.0));
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::RecordStream;

    /// Catalog backed by in-memory records per (section, architecture)
    struct StaticCatalog {
        indices: HashMap<(String, String), Vec<PackageRecord>>,
    }

    impl RepositoryCatalog for StaticCatalog {
        fn architectures(&self) -> Result<Vec<String>> {
            Ok(vec!["amd64".to_string(), "arm64".to_string()])
        }

        fn records(&self, section: &str, architecture: &str) -> Result<Option<RecordStream>> {
            Ok(self
                .indices
                .get(&(section.to_string(), architecture.to_string()))
                .cloned()
                .map(|records| Box::new(records.into_iter().map(Ok)) as RecordStream))
        }
    }

    fn record(name: &str, version: &str, multi_arch: Option<&str>, arch: &str) -> PackageRecord {
        PackageRecord {
            name: name.to_string(),
            version: version.to_string(),
            multi_arch: multi_arch.map(str::to_string),
            filename: format!("pool/main/{name}_{version}_{arch}.deb"),
        }
    }

    fn catalog() -> StaticCatalog {
        let mut indices = HashMap::new();
        indices.insert(
            ("main".to_string(), "amd64".to_string()),
            vec![
                record("libp1", "1.0", Some("same"), "amd64"),
                record("tool", "2.0", Some("foreign"), "amd64"),
                record("libq1", "3.0", Some("same"), "amd64"),
            ],
        );
        indices.insert(
            ("main".to_string(), "arm64".to_string()),
            vec![record("libp1", "1.0", Some("same"), "arm64")],
        );
        indices.insert(
            ("contrib".to_string(), "arm64".to_string()),
            vec![record("libr1", "1.0", Some("same"), "arm64")],
        );
        StaticCatalog { indices }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_collect_groups_same_packages() {
        let groups = PackageGroups::collect(
            &catalog(),
            &strings(&["main", "contrib"]),
            &strings(&["amd64", "arm64"]),
            &PackageFilter::AllPackages,
        )
        .unwrap();

        assert_eq!(groups.len(), 3);

        let libp = groups.builds(&PackageIdentity::new("libp1", "1.0")).unwrap();
        assert_eq!(libp.len(), 2);
        assert_eq!(libp[0].architecture, "amd64");
        assert_eq!(libp[1].location, "pool/main/libp1_1.0_arm64.deb");

        assert!(groups.builds(&PackageIdentity::new("tool", "2.0")).is_none());
    }

    #[test]
    fn test_collect_with_filter() {
        let groups = PackageGroups::collect(
            &catalog(),
            &strings(&["main"]),
            &strings(&["amd64", "arm64"]),
            &PackageFilter::from_names(["libq1"]),
        )
        .unwrap();

        let sorted = groups.into_sorted();
        assert_eq!(sorted.len(), 1);
        assert_eq!(sorted[0].0, PackageIdentity::new("libq1", "3.0"));
    }

    #[test]
    fn test_collect_without_any_index_fails() {
        let result = PackageGroups::collect(
            &catalog(),
            &strings(&["non-free"]),
            &strings(&["amd64"]),
            &PackageFilter::AllPackages,
        );
        assert!(matches!(result, Err(Error::NotFoundError(_))));
    }

    #[test]
    fn test_into_sorted_orders_by_name_then_version() {
        let mut groups = PackageGroups::new();
        groups.insert("amd64", record("b", "1", Some("same"), "amd64"));
        groups.insert("amd64", record("a", "2", Some("same"), "amd64"));
        groups.insert("amd64", record("a", "10", Some("same"), "amd64"));

        let order: Vec<String> = groups
            .into_sorted()
            .into_iter()
            .map(|(identity, _)| identity.to_string())
            .collect();
        assert_eq!(order, vec!["a 10", "a 2", "b 1"]);
    }
}
