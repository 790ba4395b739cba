// src/compression/mod.rs
//! Codecs for repository indices and DEB control members
//!
//! The codec is always known from the file or member name: `Packages.xz`,
//! `Packages.gz`, `control.tar.zst` and so on.

use crate::error::{Error, Result};
use std::fmt;
use std::io::Read;

/// Compression applied to an index or archive member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Plain,
    Gzip,
    Xz,
    Zstd,
}

impl Codec {
    /// Pick the codec from a name's suffix; unknown suffixes are plain
    pub fn from_name(name: &str) -> Self {
        match name.rsplit_once('.').map(|(_, suffix)| suffix) {
            Some("gz") => Self::Gzip,
            Some("xz") => Self::Xz,
            Some("zst") => Self::Zstd,
            _ => Self::Plain,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Gzip => "gzip",
            Self::Xz => "xz",
            Self::Zstd => "zstd",
        }
    }

    /// Wrap `reader` in a streaming decoder
    pub fn reader<'a, R: Read + 'a>(self, reader: R) -> Result<Box<dyn Read + 'a>> {
        Ok(match self {
            Self::Plain => Box::new(reader),
            Self::Gzip => Box::new(flate2::read::GzDecoder::new(reader)),
            Self::Xz => Box::new(xz2::read::XzDecoder::new(reader)),
            Self::Zstd => Box::new(zstd::Decoder::new(reader).map_err(|e| {
                Error::ParseError(format!("Failed to start zstd decoder: {}", e))
            })?),
        })
    }

    /// Decode a whole buffer
    pub fn decode_all(self, data: &[u8]) -> Result<Vec<u8>> {
        if self == Self::Plain {
            return Ok(data.to_vec());
        }

        let mut output = Vec::new();
        self.reader(data)?
            .read_to_end(&mut output)
            .map_err(|e| Error::ParseError(format!("Corrupt {} data: {}", self, e)))?;
        Ok(output)
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
