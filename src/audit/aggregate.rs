// src/audit/aggregate.rs

//! Cross-architecture aggregation of manifests

use crate::hash::ContentHash;
use crate::packages::Manifest;
use std::collections::{BTreeMap, BTreeSet};

/// Hash -> architectures that shipped a file with that hash
pub type HashArchitectures = BTreeMap<ContentHash, BTreeSet<String>>;

/// Path -> hash -> architectures, for one package identity
///
/// Ordering of both levels is bytewise, which is the report order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DivergenceReport {
    files: BTreeMap<Vec<u8>, HashArchitectures>,
}

impl DivergenceReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one architecture's manifest into the report
    pub fn add_manifest(&mut self, architecture: &str, manifest: &Manifest) {
        for (path, hash) in manifest.iter() {
            self.files
                .entry(path.to_vec())
                .or_default()
                .entry(*hash)
                .or_default()
                .insert(architecture.to_string());
        }
    }

    /// Hashes observed for a path
    pub fn file(&self, path: &[u8]) -> Option<&HashArchitectures> {
        self.files.get(path)
    }

    /// Files with more than one distinct hash, in path order
    pub fn divergent_files(&self) -> impl Iterator<Item = (&[u8], &HashArchitectures)> {
        self.files
            .iter()
            .filter(|(_, hashes)| hashes.len() > 1)
            .map(|(path, hashes)| (path.as_slice(), hashes))
    }

    pub fn has_divergence(&self) -> bool {
        self.divergent_files().next().is_some()
    }

    /// Number of distinct paths seen across all architectures
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// True when no two architectures agree on any hash for a file
pub fn is_fully_divergent(hashes: &HashArchitectures) -> bool {
    hashes.values().all(|architectures| architectures.len() == 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const B: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

    fn manifest(lines: &[(&str, &str)]) -> Manifest {
        let raw: String = lines
            .iter()
            .map(|(hash, path)| format!("{hash}  {path}\n"))
            .collect();
        Manifest::parse(raw.as_bytes()).unwrap()
    }

    #[test]
    fn test_identical_files_not_divergent() {
        let mut report = DivergenceReport::new();
        report.add_manifest("amd64", &manifest(&[(A, "usr/bin/p")]));
        report.add_manifest("arm64", &manifest(&[(A, "usr/bin/p")]));

        assert!(!report.has_divergence());
        let hashes = report.file(b"usr/bin/p").unwrap();
        assert_eq!(hashes.len(), 1);
        assert_eq!(hashes.values().next().unwrap().len(), 2);
    }

    #[test]
    fn test_differing_files_divergent() {
        let mut report = DivergenceReport::new();
        report.add_manifest("amd64", &manifest(&[(A, "usr/bin/p"), (A, "usr/share/x")]));
        report.add_manifest("arm64", &manifest(&[(B, "usr/bin/p"), (A, "usr/share/x")]));

        let divergent: Vec<_> = report.divergent_files().collect();
        assert_eq!(divergent.len(), 1);
        assert_eq!(divergent[0].0, b"usr/bin/p");
        assert!(is_fully_divergent(divergent[0].1));
    }

    #[test]
    fn test_partial_clustering() {
        let mut report = DivergenceReport::new();
        report.add_manifest("amd64", &manifest(&[(A, "usr/lib/f")]));
        report.add_manifest("i386", &manifest(&[(A, "usr/lib/f")]));
        report.add_manifest("arm64", &manifest(&[(B, "usr/lib/f")]));

        let hashes = report.file(b"usr/lib/f").unwrap();
        assert_eq!(hashes.len(), 2);
        assert!(!is_fully_divergent(hashes));

        let a: ContentHash = A.parse().unwrap();
        let archs: Vec<&str> = hashes[&a].iter().map(String::as_str).collect();
        assert_eq!(archs, vec!["amd64", "i386"]);
    }

    #[test]
    fn test_file_missing_on_one_architecture_is_not_divergent() {
        let mut report = DivergenceReport::new();
        report.add_manifest("amd64", &manifest(&[(A, "usr/bin/p"), (B, "usr/bin/only-amd64")]));
        report.add_manifest("arm64", &manifest(&[(A, "usr/bin/p")]));

        assert!(!report.has_divergence());
        assert_eq!(report.len(), 2);
    }

    #[test]
    fn test_single_architecture_never_divergent() {
        let mut report = DivergenceReport::new();
        report.add_manifest("amd64", &manifest(&[(A, "usr/bin/p")]));
        assert!(!report.has_divergence());
    }
}
