// src/repository/client.rs

//! Mirror access
//!
//! A mirror is either an HTTP(S) URL or a local directory laid out like a
//! Debian archive (`dists/`, `pool/`). Relative paths from Release and
//! Packages files are resolved against it.

use crate::error::{Error, Result};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::{debug, warn};
use url::Url;

/// Maximum retry attempts for failed requests
const MAX_RETRIES: u32 = 3;

/// Retry delay in milliseconds
const RETRY_DELAY_MS: u64 = 1000;

#[derive(Debug, Clone)]
enum MirrorLocation {
    Remote(Url),
    Local(PathBuf),
}

/// Handle on a package mirror
#[derive(Debug)]
pub struct Mirror {
    location: MirrorLocation,
    client: Client,
    max_retries: u32,
}

impl Mirror {
    /// Create a mirror handle from a URL or a local directory path
    ///
    /// Paths starting with `/` or `.` and `file://` URLs are read from the
    /// local filesystem; `http://` and `https://` URLs are fetched.
    pub fn new(location: &str) -> Result<Self> {
        let location = if location.starts_with('/') || location.starts_with('.') {
            MirrorLocation::Local(PathBuf::from(location))
        } else {
            let mut url = Url::parse(location)
                .map_err(|e| Error::InitError(format!("Invalid mirror URL {}: {}", location, e)))?;

            match url.scheme() {
                "http" | "https" => {
                    // Url::join replaces the last segment unless the base ends with '/'
                    if !url.path().ends_with('/') {
                        let path = format!("{}/", url.path());
                        url.set_path(&path);
                    }
                    MirrorLocation::Remote(url)
                }
                "file" => MirrorLocation::Local(url.to_file_path().map_err(|_| {
                    Error::InitError(format!("Invalid file URL: {}", location))
                })?),
                scheme => {
                    return Err(Error::InitError(format!(
                        "Unsupported mirror scheme '{}' in {}",
                        scheme, location
                    )));
                }
            }
        };

        // No request timeout: a download runs until it completes or fails
        let client = Client::builder()
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| Error::InitError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            location,
            client,
            max_retries: MAX_RETRIES,
        })
    }

    /// Whether this mirror is read from the local filesystem
    pub fn is_local(&self) -> bool {
        matches!(self.location, MirrorLocation::Local(_))
    }

    /// Display form of a path on this mirror
    pub fn url_for(&self, path: &str) -> String {
        match &self.location {
            MirrorLocation::Remote(base) => base
                .join(path)
                .map(String::from)
                .unwrap_or_else(|_| format!("{}{}", base, path)),
            MirrorLocation::Local(root) => root.join(path).display().to_string(),
        }
    }

    /// Fetch a file from the mirror into memory
    ///
    /// A missing file is reported as `Error::NotFoundError`.
    pub fn fetch_bytes(&self, path: &str) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.copy_to(path, &mut buffer)?;
        Ok(buffer)
    }

    /// Download a file from the mirror into a temporary file
    ///
    /// The file is deleted when the returned handle is dropped.
    pub fn download_to_temp(&self, path: &str) -> Result<NamedTempFile> {
        let mut temp = NamedTempFile::new()
            .map_err(|e| Error::IoError(format!("Failed to create temporary file: {e}")))?;
        self.copy_to(path, temp.as_file_mut())?;
        Ok(temp)
    }

    fn copy_to<W: io::Write>(&self, path: &str, dest: &mut W) -> Result<u64> {
        debug!("Downloading {}", self.url_for(path));

        match &self.location {
            MirrorLocation::Local(root) => {
                let full_path = root.join(path);
                let mut file = File::open(&full_path).map_err(|e| {
                    if e.kind() == io::ErrorKind::NotFound {
                        Error::NotFoundError(full_path.display().to_string())
                    } else {
                        Error::IoError(format!("Failed to open {}: {e}", full_path.display()))
                    }
                })?;
                io::copy(&mut file, dest).map_err(|e| {
                    Error::IoError(format!("Failed to read {}: {e}", full_path.display()))
                })
            }
            MirrorLocation::Remote(base) => {
                let url = base
                    .join(path)
                    .map_err(|e| Error::DownloadError(format!("Invalid path {}: {e}", path)))?;
                self.download_url(url.as_str(), dest)
            }
        }
    }

    /// Fetch a URL with retry on connection failures
    fn download_url<W: io::Write>(&self, url: &str, dest: &mut W) -> Result<u64> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.client.get(url).send() {
                Ok(mut response) => {
                    let status = response.status();
                    if status == StatusCode::NOT_FOUND {
                        return Err(Error::NotFoundError(url.to_string()));
                    }
                    if !status.is_success() {
                        return Err(Error::DownloadError(format!("HTTP {} from {}", status, url)));
                    }

                    return response.copy_to(dest).map_err(|e| {
                        Error::DownloadError(format!("Failed to read response from {}: {e}", url))
                    });
                }
                Err(e) => {
                    if attempt >= self.max_retries {
                        return Err(Error::DownloadError(format!(
                            "Failed to download {} after {attempt} attempts: {e}",
                            url
                        )));
                    }
                    warn!("Download attempt {} for {} failed: {}, retrying...", attempt, url, e);
                    std::thread::sleep(Duration::from_millis(RETRY_DELAY_MS * attempt as u64));
                }
            }
        }
    }
}
