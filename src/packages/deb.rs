// src/packages/deb.rs

//! DEB archive reading
//!
//! DEB packages are ar archives containing:
//! - debian-binary: format version
//! - control.tar[.gz|.xz|.zst]: package metadata, including `md5sums`
//! - data.tar[.*]: file contents (never read here)

use super::ManifestSource;
use crate::compression::Codec;
use crate::error::{Error, Result};
use crate::repository::Mirror;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use tar::Archive;
use tracing::debug;

/// Name of the control member holding per-file hashes
const MD5SUMS_MEMBER: &str = "md5sums";

/// Read the raw `md5sums` control member from a DEB archive
pub fn read_md5sums<R: Read>(reader: R) -> Result<Vec<u8>> {
    let mut archive = ar::Archive::new(reader);

    while let Some(entry) = archive.next_entry() {
        let mut entry =
            entry.map_err(|e| Error::ParseError(format!("Invalid DEB archive: {}", e)))?;

        // GNU ar terminates member names with '/'
        let name = String::from_utf8_lossy(entry.header().identifier())
            .trim_end_matches('/')
            .to_string();

        if name.starts_with("control.tar") {
            let codec = Codec::from_name(&name);
            debug!("Reading {} ({})", name, codec);
            return find_md5sums(codec.reader(&mut entry)?, &name);
        }
    }

    Err(Error::ParseError(
        "DEB archive has no control.tar member".to_string(),
    ))
}

/// Scan a control tarball for the `md5sums` member
fn find_md5sums<R: Read>(reader: R, member: &str) -> Result<Vec<u8>> {
    let mut archive = Archive::new(reader);

    let entries = archive
        .entries()
        .map_err(|e| Error::ParseError(format!("Failed to read {}: {}", member, e)))?;

    for entry in entries {
        let mut entry =
            entry.map_err(|e| Error::ParseError(format!("Failed to read {} entry: {}", member, e)))?;

        let path = entry
            .path()
            .map_err(|e| Error::ParseError(format!("Invalid path in {}: {}", member, e)))?
            .to_string_lossy()
            .into_owned();

        if path.trim_start_matches("./") == MD5SUMS_MEMBER {
            let mut content = Vec::new();
            entry
                .read_to_end(&mut content)
                .map_err(|e| Error::IoError(format!("Failed to read md5sums: {}", e)))?;
            return Ok(content);
        }
    }

    Err(Error::MissingControlMember(
        "package has no 'md5sums' control member".to_string(),
    ))
}

/// Fetches manifests by downloading DEB archives from a mirror
#[derive(Debug)]
pub struct DebManifestFetcher<'a> {
    mirror: &'a Mirror,
}

impl<'a> DebManifestFetcher<'a> {
    pub fn new(mirror: &'a Mirror) -> Self {
        Self { mirror }
    }
}

impl ManifestSource for DebManifestFetcher<'_> {
    fn fetch_manifest(&self, location: &str) -> Result<Vec<u8>> {
        // The temporary file is removed when it goes out of scope
        let download = self.mirror.download_to_temp(location)?;

        let mut file: &File = download.as_file();
        file.seek(SeekFrom::Start(0))
            .map_err(|e| Error::IoError(format!("Failed to rewind download: {}", e)))?;

        read_md5sums(file)
    }
}
