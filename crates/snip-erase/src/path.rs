//! Paths to erase
//!
//! [`ErasePath`] is the non-empty sequence of names leading from a
//! snapshot's root tree to the entry being removed. Parsing only splits and
//! drops empty segments: `.`/`..` and case are taken literally, so callers
//! are expected to pass an already clean path.

use crate::error::EraseError;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Non-empty list of path components
///
/// # Examples
/// - `"/home/user/.ssh/id_rsa"` → `["home", "user", ".ssh", "id_rsa"]`
/// - `"a//b/"` → `["a", "b"]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ErasePath(Vec<String>);

fn is_separator(c: char) -> bool {
    c == '/' || c == std::path::MAIN_SEPARATOR
}

impl ErasePath {
    /// Split a path string into components
    ///
    /// # Errors
    /// Returns [`EraseError::EmptyPath`] if no component remains
    pub fn parse(path: &str) -> Result<Self, EraseError> {
        Self::from_components(path.split(is_separator))
    }

    /// Build from already split components, dropping empty ones
    ///
    /// # Errors
    /// Returns [`EraseError::EmptyPath`] if no component remains
    pub fn from_components<I, S>(components: I) -> Result<Self, EraseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let segments: Vec<String> = components
            .into_iter()
            .filter(|s| !s.as_ref().is_empty())
            .map(|s| s.as_ref().to_owned())
            .collect();
        if segments.is_empty() {
            return Err(EraseError::EmptyPath);
        }
        Ok(Self(segments))
    }

    #[inline]
    #[must_use]
    pub fn components(&self) -> &[String] {
        &self.0
    }

    /// Number of components, always at least one
    #[inline]
    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Name looked up in the root tree
    #[inline]
    #[must_use]
    pub fn first(&self) -> &str {
        &self.0[0]
    }

    /// Components after the first
    #[inline]
    #[must_use]
    pub fn rest(&self) -> &[String] {
        &self.0[1..]
    }

    /// Whether the path names an entry of the root tree itself
    #[inline]
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.0.len() == 1
    }

    /// Name of the entry that gets removed
    #[inline]
    #[must_use]
    pub fn leaf(&self) -> &str {
        &self.0[self.0.len() - 1]
    }
}

impl Display for ErasePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

impl FromStr for ErasePath {
    type Err = EraseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
