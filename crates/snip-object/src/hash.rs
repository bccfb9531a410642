//! Content addresses
//!
//! Provides [`ContentHash`], the 32-byte blake3 digest that identifies every
//! tree and snapshot in a repository.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Number of hex characters in a full content address
pub const HEX_LEN: usize = 64;

/// A 32-byte content address (blake3)
///
/// Identical serialized content always yields an identical address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Wrap raw digest bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Create hash from byte slice
    ///
    /// # Errors
    /// Returns error if slice length is not exactly 32 bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, HashError> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| HashError::InvalidLength {
            expected: 32,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    /// Address of a serialized object
    #[inline]
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Short form used in log lines and listings (first 16 hex chars)
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }

    /// Whether the hex form of this address starts with `prefix`
    ///
    /// Comparison is case-insensitive; an empty prefix matches everything.
    #[must_use]
    pub fn has_prefix(&self, prefix: &str) -> bool {
        let full = self.to_string();
        full.starts_with(&prefix.to_ascii_lowercase())
    }

    /// First byte as two hex chars, used for on-disk sharding
    #[inline]
    #[must_use]
    pub fn shard(&self) -> String {
        hex::encode(&self.0[..1])
    }
}

impl Display for ContentHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for ContentHash {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != HEX_LEN {
            return Err(HashError::InvalidLength {
                expected: HEX_LEN,
                actual: s.len(),
            });
        }
        let bytes = hex::decode(s)?;
        Self::from_slice(&bytes)
    }
}

impl AsRef<[u8; 32]> for ContentHash {
    fn as_ref(&self) -> &[u8; 32] {
        &self.0
    }
}

// Always hex on the wire: trees and snapshots are JSON documents.
impl serde::Serialize for ContentHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for ContentHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct ContentHashVisitor;

        impl serde::de::Visitor<'_> for ContentHashVisitor {
            type Value = ContentHash;

            fn expecting(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
                formatter.write_str("a 64-character hex content address")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                value.parse().map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_str(ContentHashVisitor)
    }
}

/// Errors that can occur when parsing content addresses
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    /// Invalid hash length
    #[error("invalid hash length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Hex encoding error
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compute_is_deterministic() {
        assert_eq!(ContentHash::compute(b"tree"), ContentHash::compute(b"tree"));
        assert_ne!(ContentHash::compute(b"tree"), ContentHash::compute(b"tree2"));
    }

    #[test]
    fn from_slice_rejects_wrong_length() {
        let result = ContentHash::from_slice(&[7u8; 31]);
        assert!(matches!(
            result,
            Err(HashError::InvalidLength { expected: 32, actual: 31 })
        ));
    }

    #[test]
    fn display_and_parse() {
        let hash = ContentHash::compute(b"snapshot");
        let text = hash.to_string();
        assert_eq!(text.len(), HEX_LEN);
        assert_eq!(text.parse::<ContentHash>().unwrap(), hash);
    }

    #[test]
    fn parse_rejects_short_and_non_hex() {
        assert!("abcd".parse::<ContentHash>().is_err());
        let bogus = "zz".repeat(32);
        assert!(matches!(
            bogus.parse::<ContentHash>(),
            Err(HashError::HexDecode(_))
        ));
    }

    #[test]
    fn short_is_prefix_of_full() {
        let hash = ContentHash::compute(b"x");
        assert_eq!(hash.short().len(), 16);
        assert!(hash.to_string().starts_with(&hash.short()));
    }

    #[test]
    fn prefix_matching() {
        let hash = ContentHash::compute(b"prefix");
        let full = hash.to_string();
        assert!(hash.has_prefix(""));
        assert!(hash.has_prefix(&full[..6]));
        assert!(hash.has_prefix(&full[..6].to_ascii_uppercase()));
        assert!(!hash.has_prefix("not-hex"));
    }

    #[test]
    fn shard_is_first_byte() {
        let hash = ContentHash::new([0xab; 32]);
        assert_eq!(hash.shard(), "ab");
    }

    #[test]
    fn serde_json_is_hex_string() {
        let hash = ContentHash::compute(b"json");
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{hash}\""));
        let decoded: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, hash);
    }
}
