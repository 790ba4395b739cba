// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.
//!
//! Builds a throwaway mirror on disk with a Release file, Packages indices
//! and real `.deb` archives whose `md5sums` match their file contents.

#![allow(dead_code)]

use flate2::Compression;
use flate2::write::GzEncoder;
use md5::{Digest, Md5};
use multiarch_audit::{
    ArchSelection, AuditConfig, CacheLocation, PackageFilter, RunSummary, run_audit,
};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

pub const DISTRIBUTION: &str = "sid";

/// md5 of `content` as lowercase hex
pub fn md5_hex(content: &[u8]) -> String {
    hex::encode(Md5::digest(content))
}

/// One architecture build of a package
pub struct Build<'a> {
    pub section: &'a str,
    pub name: &'a str,
    pub version: &'a str,
    pub architecture: &'a str,
    pub multi_arch: Option<&'a str>,
    /// `None` builds an archive without an `md5sums` member
    pub files: Option<&'a [(&'a str, &'a [u8])]>,
}

impl<'a> Build<'a> {
    /// A `Multi-Arch: same` build in `main`
    pub fn same(
        name: &'a str,
        version: &'a str,
        architecture: &'a str,
        files: &'a [(&'a str, &'a [u8])],
    ) -> Self {
        Self {
            section: "main",
            name,
            version,
            architecture,
            multi_arch: Some("same"),
            files: Some(files),
        }
    }
}

/// A local mirror in a temporary directory
pub struct TestMirror {
    dir: TempDir,
    architectures: Vec<String>,
    indices: BTreeMap<(String, String), String>,
}

impl TestMirror {
    pub fn new(architectures: &[&str]) -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            architectures: architectures.iter().map(|a| a.to_string()).collect(),
            indices: BTreeMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write the archive for a build and record it in its Packages index
    pub fn add(&mut self, build: Build<'_>) -> &mut Self {
        let filename = format!(
            "pool/{}/{}/{}_{}_{}.deb",
            build.section,
            &build.name[..1],
            build.name,
            build.version,
            build.architecture
        );
        write(self.root(), &filename, &deb_archive(build.name, build.files));

        let mut stanza = format!(
            "Package: {}\nVersion: {}\nArchitecture: {}\n",
            build.name, build.version, build.architecture
        );
        if let Some(multi_arch) = build.multi_arch {
            stanza.push_str(&format!("Multi-Arch: {}\n", multi_arch));
        }
        stanza.push_str(&format!(
            "Filename: {}\nDescription: test package\n continuation line\n\n",
            filename
        ));

        self.indices
            .entry((build.section.to_string(), build.architecture.to_string()))
            .or_default()
            .push_str(&stanza);
        self
    }

    /// Write Release and every Packages index
    ///
    /// `main` indices are gzip-compressed, other sections are plain.
    pub fn publish(&self) {
        let dist = format!("dists/{}", DISTRIBUTION);
        let mut architectures = self.architectures.clone();
        architectures.push("all".to_string());
        let components: BTreeSet<&str> = self.indices.keys().map(|(s, _)| s.as_str()).collect();
        let release = format!(
            "Origin: Test\nSuite: unstable\nCodename: {}\nArchitectures: {}\nComponents: {}\n",
            DISTRIBUTION,
            architectures.join(" "),
            components.into_iter().collect::<Vec<_>>().join(" ")
        );
        write(self.root(), &format!("{}/Release", dist), release.as_bytes());

        for ((section, architecture), index) in &self.indices {
            let base = format!("{}/{}/binary-{}/Packages", dist, section, architecture);
            if section == "main" {
                write(self.root(), &format!("{}.gz", base), &gzip(index.as_bytes()));
            } else {
                write(self.root(), &base, index.as_bytes());
            }
        }
    }

    /// Configuration auditing this mirror with derived architectures
    pub fn config(&self, cache: CacheLocation) -> AuditConfig {
        AuditConfig {
            mirror: self.root().display().to_string(),
            distribution: DISTRIBUTION.to_string(),
            sections: vec!["main".to_string(), "contrib".to_string()],
            architectures: ArchSelection::Derived {
                exclude: BTreeSet::new(),
            },
            packages: PackageFilter::AllPackages,
            compact: false,
            cache,
            prune_cache: false,
        }
    }
}

/// Run an audit and return (report, summary)
pub fn audit(config: &AuditConfig) -> (String, RunSummary) {
    let mut out = Vec::new();
    let summary = run_audit(config, &mut out).unwrap();
    (String::from_utf8(out).unwrap(), summary)
}

fn write(root: &Path, relative: &str, content: &[u8]) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn tar_member(builder: &mut tar::Builder<Vec<u8>>, name: &str, content: &[u8]) {
    let mut header = tar::Header::new_gnu();
    header.set_size(content.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder.append_data(&mut header, name, content).unwrap();
}

/// Build a `.deb` with a gzip control member and an empty data member
fn deb_archive(name: &str, files: Option<&[(&str, &[u8])]>) -> Vec<u8> {
    let mut control = tar::Builder::new(Vec::new());
    tar_member(&mut control, "./control", format!("Package: {}\n", name).as_bytes());
    if let Some(files) = files {
        let md5sums: String = files
            .iter()
            .map(|(path, content)| format!("{}  {}\n", md5_hex(content), path))
            .collect();
        tar_member(&mut control, "./md5sums", md5sums.as_bytes());
    }
    let control = gzip(&control.into_inner().unwrap());

    let data = gzip(&tar::Builder::new(Vec::new()).into_inner().unwrap());

    let mut archive = ar::Builder::new(Vec::new());
    let members: [(&[u8], &[u8]); 3] = [
        (b"debian-binary", b"2.0\n"),
        (b"control.tar.gz", &control),
        (b"data.tar.gz", &data),
    ];
    for (member, content) in members {
        let header = ar::Header::new(member.to_vec(), content.len() as u64);
        archive.append(&header, content).unwrap();
    }
    archive.into_inner().unwrap()
}
