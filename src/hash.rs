// src/hash.rs

//! Content hashes as found in `md5sums` control members
//!
//! Debian packages record an MD5 digest per shipped file. The auditor only
//! compares these values, it never computes them, so a hash here is a
//! validated 16-byte value with a lowercase hex rendering.

use std::fmt;
use std::str::FromStr;

/// Hash output length in bytes
pub const HASH_LEN: usize = 16;

/// Hash output length as a hex string
pub const HASH_HEX_LEN: usize = HASH_LEN * 2;

/// Hash parsing errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    /// Hash string has wrong length
    InvalidLength { expected: usize, got: usize },
    /// Hash string contains invalid hex characters
    InvalidHex(String),
}

impl fmt::Display for HashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLength { expected, got } => {
                write!(f, "invalid hash length: expected {}, got {}", expected, got)
            }
            Self::InvalidHex(s) => write!(f, "invalid hex in hash: {}", s),
        }
    }
}

impl std::error::Error for HashError {}

/// A fixed-width content hash
///
/// Ordering is bytewise, which matches ordering of the hex rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentHash([u8; HASH_LEN]);

impl ContentHash {
    /// Parse a hash from its hex rendering (either case)
    pub fn from_hex(value: &[u8]) -> Result<Self, HashError> {
        if value.len() != HASH_HEX_LEN {
            return Err(HashError::InvalidLength {
                expected: HASH_HEX_LEN,
                got: value.len(),
            });
        }

        let mut bytes = [0u8; HASH_LEN];
        hex::decode_to_slice(value, &mut bytes)
            .map_err(|_| HashError::InvalidHex(String::from_utf8_lossy(value).into_owned()))?;

        Ok(Self(bytes))
    }

    /// Get the raw hash bytes
    #[inline]
    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    /// Get the hash as a lowercase hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for ContentHash {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let hash: ContentHash = "d41d8cd98f00b204e9800998ecf8427e".parse().unwrap();
        assert_eq!(hash.to_hex(), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(hash.as_bytes()[0], 0xd4);
    }

    #[test]
    fn test_parse_uppercase_normalizes() {
        let hash: ContentHash = "D41D8CD98F00B204E9800998ECF8427E".parse().unwrap();
        assert_eq!(hash.to_string(), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_invalid_length() {
        let err = ContentHash::from_hex(b"abc").unwrap_err();
        assert_eq!(err, HashError::InvalidLength { expected: 32, got: 3 });
    }

    #[test]
    fn test_invalid_hex() {
        let err = ContentHash::from_hex(b"zz1d8cd98f00b204e9800998ecf8427e").unwrap_err();
        assert!(matches!(err, HashError::InvalidHex(_)));
    }

    #[test]
    fn test_ordering_matches_hex() {
        let a: ContentHash = "0a000000000000000000000000000000".parse().unwrap();
        let b: ContentHash = "b0000000000000000000000000000000".parse().unwrap();
        assert!(a < b);
        assert!(a.to_hex() < b.to_hex());
    }
}
