// src/audit/report.rs

//! Text report of divergent files
//!
//! ```text
//! [libfoo1 1.0-1]
//! usr/lib/x86_64-linux-gnu/foo/config.h
//!   0123456789abcdef0123456789abcdef amd64 i386
//!   fedcba9876543210fedcba9876543210 arm64
//!
//! [libbar2 2.3]
//! usr/share/bar/table.dat
//! ```

use super::PackageIdentity;
use super::aggregate::{DivergenceReport, is_fully_divergent};
use crate::error::Result;
use std::io::Write;

/// Writes package groups to an output stream as they are audited
#[derive(Debug)]
pub struct Reporter<W: Write> {
    out: W,
    compact: bool,
    groups_written: usize,
}

impl<W: Write> Reporter<W> {
    /// Create a reporter
    ///
    /// In compact mode the per-hash lines of a file are omitted when every
    /// hash belongs to a single architecture.
    pub fn new(out: W, compact: bool) -> Self {
        Self {
            out,
            compact,
            groups_written: 0,
        }
    }

    /// Write the group for one package, if it has divergent files
    ///
    /// Returns whether anything was written.
    pub fn write_package(
        &mut self,
        identity: &PackageIdentity,
        report: &DivergenceReport,
    ) -> Result<bool> {
        let mut files = report.divergent_files().peekable();
        if files.peek().is_none() {
            return Ok(false);
        }

        if self.groups_written > 0 {
            writeln!(self.out)?;
        }
        writeln!(self.out, "[{} {}]", identity.name, identity.version)?;

        for (path, hashes) in files {
            self.out.write_all(path)?;
            self.out.write_all(b"\n")?;

            if self.compact && is_fully_divergent(hashes) {
                continue;
            }

            for (hash, architectures) in hashes {
                let architectures: Vec<&str> = architectures.iter().map(String::as_str).collect();
                writeln!(self.out, "  {} {}", hash, architectures.join(" "))?;
            }
        }

        self.out.flush()?;
        self.groups_written += 1;
        Ok(true)
    }

    /// Number of package groups written so far
    pub fn groups_written(&self) -> usize {
        self.groups_written
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
