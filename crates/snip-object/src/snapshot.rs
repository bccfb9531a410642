//! Snapshots
//!
//! A [`Snapshot`] pins a root tree together with the metadata describing
//! when and where it was taken. Snapshots are stored as standalone
//! (unpacked) JSON objects and addressed by the hash of that JSON.

use crate::hash::ContentHash;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time view of a hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ContentHash>,
    pub tree: ContentHash,
    pub paths: Vec<String>,
    pub hostname: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excludes: Vec<String>,
}

impl Snapshot {
    /// Snapshot of `tree` with no parent, tags or excludes
    #[must_use]
    pub fn new(
        paths: Vec<String>,
        hostname: impl Into<String>,
        time: DateTime<Utc>,
        tree: ContentHash,
    ) -> Self {
        Self {
            time,
            parent: None,
            tree,
            paths,
            hostname: hostname.into(),
            tags: Vec::new(),
            excludes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent: ContentHash) -> Self {
        self.parent = Some(parent);
        self
    }

    #[must_use]
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    #[must_use]
    pub fn with_excludes(mut self, excludes: Vec<String>) -> Self {
        self.excludes = excludes;
        self
    }

    /// Whether every one of `tags` is set on this snapshot
    #[must_use]
    pub fn has_tags(&self, tags: &[String]) -> bool {
        tags.iter().all(|tag| self.tags.contains(tag))
    }

    /// Whether every one of `paths` was part of this snapshot
    #[must_use]
    pub fn has_paths(&self, paths: &[String]) -> bool {
        paths.iter().all(|path| self.paths.contains(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Snapshot {
        Snapshot::new(
            vec!["/home".into(), "/etc".into()],
            "box",
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            ContentHash::compute(b"root"),
        )
        .with_tags(vec!["daily".into(), "laptop".into()])
    }

    #[test]
    fn tag_and_path_matching() {
        let snap = sample();
        assert!(snap.has_tags(&[]));
        assert!(snap.has_tags(&["daily".into()]));
        assert!(!snap.has_tags(&["daily".into(), "weekly".into()]));
        assert!(snap.has_paths(&["/etc".into()]));
        assert!(!snap.has_paths(&["/var".into()]));
    }

    #[test]
    fn json_omits_empty_optional_fields() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(!json.contains("parent"));
        assert!(!json.contains("excludes"));
        assert!(json.contains("\"time\":\"2024-03-01T12:00:00Z\""));
        let decoded: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, sample());
    }
}
