//! Snapshot selection
//!
//! A selector is either an id (full or unique prefix) or `latest`, which
//! picks the newest snapshot passing a [`SnapshotFilter`].

use crate::error::{EraseError, SelectorError};
use snip_object::{ContentHash, Repository, Snapshot};
use std::convert::Infallible;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Tags that must all be present, parsed from `a,b,c`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagList(Vec<String>);

impl TagList {
    #[must_use]
    pub fn new(tags: Vec<String>) -> Self {
        Self(tags)
    }

    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.0
    }
}

impl FromStr for TagList {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(
            s.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_owned)
                .collect(),
        ))
    }
}

/// Restrictions applied when selecting `latest`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotFilter {
    pub host: Option<String>,
    pub paths: Vec<String>,
    pub tags: Vec<TagList>,
}

impl SnapshotFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    #[must_use]
    pub fn with_paths(mut self, paths: Vec<String>) -> Self {
        self.paths = paths;
        self
    }

    #[must_use]
    pub fn with_tags(mut self, tags: Vec<TagList>) -> Self {
        self.tags = tags;
        self
    }

    /// Host equal (if set), all paths present, and at least one tag list
    /// fully present (if any are set)
    #[must_use]
    pub fn matches(&self, snapshot: &Snapshot) -> bool {
        if self
            .host
            .as_deref()
            .is_some_and(|host| host != snapshot.hostname)
        {
            return false;
        }
        if !snapshot.has_paths(&self.paths) {
            return false;
        }
        self.tags.is_empty() || self.tags.iter().any(|list| snapshot.has_tags(list.tags()))
    }
}

/// Which snapshot to erase from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotSelector {
    /// Full id or unique id prefix
    Id(String),
    /// Newest snapshot passing the filter
    Latest(SnapshotFilter),
}

impl SnapshotSelector {
    /// Value that selects [`SnapshotSelector::Latest`]
    pub const LATEST: &'static str = "latest";

    /// Interpret a `--snapshot` value; the filter only applies to `latest`
    #[must_use]
    pub fn parse(value: &str, filter: SnapshotFilter) -> Self {
        if value == Self::LATEST {
            Self::Latest(filter)
        } else {
            Self::Id(value.to_owned())
        }
    }

    /// Find the address of the selected snapshot
    ///
    /// # Errors
    /// Returns [`EraseError::SelectorResolution`] if nothing (or, for an id
    /// prefix, more than one snapshot) matches
    pub fn resolve<R: Repository>(&self, repo: &R) -> Result<ContentHash, EraseError> {
        let resolved = match self {
            Self::Id(prefix) => resolve_prefix(repo, prefix),
            Self::Latest(filter) => resolve_latest(repo, filter),
        };
        resolved.map_err(|source| EraseError::SelectorResolution {
            selector: self.to_string(),
            source,
        })
    }
}

impl Display for SnapshotSelector {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id:?}"),
            Self::Latest(filter) => {
                write!(f, "latest")?;
                if let Some(host) = &filter.host {
                    write!(f, " host={host}")?;
                }
                if !filter.paths.is_empty() {
                    write!(f, " paths={:?}", filter.paths)?;
                }
                for list in &filter.tags {
                    write!(f, " tags={}", list.tags().join(","))?;
                }
                Ok(())
            }
        }
    }
}

fn resolve_prefix<R: Repository>(repo: &R, prefix: &str) -> Result<ContentHash, SelectorError> {
    if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(SelectorError::InvalidId(prefix.to_owned()));
    }
    let candidates: Vec<ContentHash> = repo
        .list_snapshots()
        .map_err(SelectorError::Listing)?
        .into_iter()
        .filter(|id| id.has_prefix(prefix))
        .collect();
    match candidates.as_slice() {
        [] => Err(SelectorError::NoMatch),
        [id] => Ok(*id),
        many => Err(SelectorError::Ambiguous(many.len())),
    }
}

fn resolve_latest<R: Repository>(
    repo: &R,
    filter: &SnapshotFilter,
) -> Result<ContentHash, SelectorError> {
    let mut latest: Option<(ContentHash, Snapshot)> = None;
    for id in repo.list_snapshots().map_err(SelectorError::Listing)? {
        let snapshot = repo.load_snapshot(&id).map_err(SelectorError::Candidate)?;
        if !filter.matches(&snapshot) {
            continue;
        }
        // ties on time go to the larger id so the choice is stable
        let newer = latest
            .as_ref()
            .map_or(true, |(best_id, best)| (snapshot.time, id) > (best.time, *best_id));
        if newer {
            latest = Some((id, snapshot));
        }
    }
    latest.map(|(id, _)| id).ok_or(SelectorError::NoMatch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use snip_object::MemoryStore;

    fn snap(host: &str, paths: &[&str], tags: &[&str], minutes: i64) -> Snapshot {
        Snapshot::new(
            paths.iter().map(|p| (*p).to_owned()).collect(),
            host,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes),
            ContentHash::compute(host.as_bytes()),
        )
        .with_tags(tags.iter().map(|t| (*t).to_owned()).collect())
    }

    #[test]
    fn parse_recognises_latest() {
        assert!(matches!(
            SnapshotSelector::parse("latest", SnapshotFilter::new()),
            SnapshotSelector::Latest(_)
        ));
        assert_eq!(
            SnapshotSelector::parse("ab12", SnapshotFilter::new().with_host("h")),
            SnapshotSelector::Id("ab12".into())
        );
    }

    #[test]
    fn tag_list_parsing() {
        let list: TagList = " a, b,,c ".parse().unwrap();
        assert_eq!(list.tags(), &["a", "b", "c"]);
    }

    #[test]
    fn filter_semantics() {
        let s = snap("web", &["/srv", "/etc"], &["daily", "prod"], 0);
        assert!(SnapshotFilter::new().matches(&s));
        assert!(SnapshotFilter::new().with_host("web").matches(&s));
        assert!(!SnapshotFilter::new().with_host("db").matches(&s));
        assert!(SnapshotFilter::new().with_paths(vec!["/etc".into()]).matches(&s));
        assert!(!SnapshotFilter::new().with_paths(vec!["/var".into()]).matches(&s));

        let weekly: TagList = "weekly".parse().unwrap();
        let prod_daily: TagList = "prod,daily".parse().unwrap();
        assert!(!SnapshotFilter::new().with_tags(vec![weekly.clone()]).matches(&s));
        assert!(SnapshotFilter::new().with_tags(vec![weekly, prod_daily]).matches(&s));
    }

    #[test]
    fn id_prefix_resolution() {
        let store = MemoryStore::new();
        let id = store.insert_snapshot(&snap("a", &["/"], &[], 0)).unwrap();
        let full = id.to_string();

        let by_full = SnapshotSelector::Id(full.clone()).resolve(&store).unwrap();
        let by_prefix = SnapshotSelector::Id(full[..8].to_owned()).resolve(&store).unwrap();
        assert_eq!(by_full, id);
        assert_eq!(by_prefix, id);
    }

    #[test]
    fn id_resolution_failures() {
        let store = MemoryStore::new();
        store.insert_snapshot(&snap("a", &["/"], &[], 0)).unwrap();
        store.insert_snapshot(&snap("b", &["/"], &[], 0)).unwrap();

        let invalid = SnapshotSelector::Id("not-hex".into()).resolve(&store);
        assert!(matches!(
            invalid,
            Err(EraseError::SelectorResolution { source: SelectorError::InvalidId(_), .. })
        ));

        let empty = SnapshotSelector::Id(String::new()).resolve(&store);
        assert!(matches!(
            empty,
            Err(EraseError::SelectorResolution { source: SelectorError::InvalidId(_), .. })
        ));

        let ids = store.list_snapshots().unwrap();
        let missing = (0..16u8)
            .map(|n| format!("{n:x}"))
            .find(|p| ids.iter().all(|id| !id.has_prefix(p)))
            .unwrap();
        let none = SnapshotSelector::Id(missing).resolve(&store);
        assert!(matches!(
            none,
            Err(EraseError::SelectorResolution { source: SelectorError::NoMatch, .. })
        ));
    }

    #[test]
    fn shared_prefix_is_ambiguous() {
        let store = MemoryStore::new();
        for n in 0..40 {
            store.insert_snapshot(&snap("h", &["/"], &[], n)).unwrap();
        }
        // 40 ids over 16 leading hex digits: some digit repeats
        let ids = store.list_snapshots().unwrap();
        let shared = ids
            .iter()
            .map(|id| id.to_string()[..1].to_owned())
            .find(|p| ids.iter().filter(|id| id.has_prefix(p)).count() > 1)
            .unwrap();

        let err = SnapshotSelector::Id(shared).resolve(&store).unwrap_err();
        assert!(matches!(
            err,
            EraseError::SelectorResolution { source: SelectorError::Ambiguous(n), .. } if n > 1
        ));
        assert_eq!(err.exit_code(), crate::error::EXIT_SELECTOR);
    }

    #[test]
    fn latest_picks_newest_matching() {
        let store = MemoryStore::new();
        let old_web = store.insert_snapshot(&snap("web", &["/srv"], &[], 10)).unwrap();
        let new_db = store.insert_snapshot(&snap("db", &["/srv"], &[], 30)).unwrap();
        let new_web = store.insert_snapshot(&snap("web", &["/srv"], &["x"], 20)).unwrap();

        let any = SnapshotSelector::Latest(SnapshotFilter::new());
        assert_eq!(any.resolve(&store).unwrap(), new_db);

        let web = SnapshotSelector::Latest(SnapshotFilter::new().with_host("web"));
        assert_eq!(web.resolve(&store).unwrap(), new_web);

        let untagged_web = SnapshotSelector::Latest(
            SnapshotFilter::new()
                .with_host("web")
                .with_tags(vec!["missing".parse().unwrap()]),
        );
        assert!(untagged_web.resolve(&store).is_err());
        assert_ne!(old_web, new_web);
    }

    #[test]
    fn latest_on_empty_repository() {
        let store = MemoryStore::new();
        let err = SnapshotSelector::Latest(SnapshotFilter::new())
            .resolve(&store)
            .unwrap_err();
        assert!(err.to_string().starts_with("cannot resolve snapshot latest"));
    }
}
