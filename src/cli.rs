// src/cli.rs
//! Command-line interface for multiarch-audit
//!
//! Parsed once and converted into an [`AuditConfig`].

use anyhow::Result;
use clap::Parser;
use multiarch_audit::config::{DEFAULT_DISTRIBUTION, DEFAULT_MIRROR, DEFAULT_SECTIONS};
use multiarch_audit::{ArchSelection, AuditConfig, CacheLocation, PackageFilter};
use std::collections::BTreeSet;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "multiarch-audit")]
#[command(author = "multiarch-audit Contributors")]
#[command(version)]
#[command(
    about = "Report files that differ between architecture builds of Multi-Arch: same packages",
    long_about = None
)]
pub struct Cli {
    /// Mirror URL, or path to a local mirror directory
    #[arg(short, long, default_value = DEFAULT_MIRROR)]
    pub mirror: String,

    /// Distribution to audit
    #[arg(short, long, default_value = DEFAULT_DISTRIBUTION)]
    pub distribution: String,

    /// Architectures to compare (default: all from the Release file)
    #[arg(short, long, value_delimiter = ',', conflicts_with = "exclude_architectures")]
    pub architectures: Vec<String>,

    /// Architectures to leave out of the derived list
    #[arg(short = 'x', long, value_delimiter = ',')]
    pub exclude_architectures: Vec<String>,

    /// Archive sections to scan
    #[arg(short, long, value_delimiter = ',', default_values = DEFAULT_SECTIONS)]
    pub sections: Vec<String>,

    /// Omit hash lines for files where every architecture differs
    #[arg(long)]
    pub compact: bool,

    /// Cache manifests in an SQLite database
    ///
    /// Takes the next argument as PATH unless it is another option; without
    /// PATH the per-user cache directory is used.
    #[arg(long, value_name = "PATH", num_args = 0..=1)]
    pub cache: Option<Option<PathBuf>>,

    /// Delete cached manifests not used by this run
    #[arg(long, requires = "cache")]
    pub prune_cache: bool,

    /// Write the log here instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Packages to audit (default: every Multi-Arch: same package)
    #[arg(value_name = "PACKAGE")]
    pub packages: Vec<String>,
}

impl Cli {
    /// Resolve arguments into a run configuration
    pub fn into_config(self) -> Result<AuditConfig> {
        let architectures = if self.architectures.is_empty() {
            ArchSelection::Derived {
                exclude: self.exclude_architectures.into_iter().collect::<BTreeSet<_>>(),
            }
        } else {
            ArchSelection::Explicit(self.architectures)
        };

        Ok(AuditConfig {
            mirror: self.mirror,
            distribution: self.distribution,
            sections: self.sections,
            architectures,
            packages: PackageFilter::from_names(self.packages),
            compact: self.compact,
            cache: CacheLocation::from_option(self.cache)?,
            prune_cache: self.prune_cache,
        })
    }
}
