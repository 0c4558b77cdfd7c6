use chrono::{DateTime, Utc};
use notebridge_core::snapshot::slugify_project_name;

/// File suffix shared by every snapshot
pub const SNAPSHOT_SUFFIX: &str = ".snapshot.deepnote";

/// Slug used when a project name has no ASCII-foldable characters
const FALLBACK_SLUG: &str = "project";

const LATEST: &str = "latest";

/// Timestamps sort lexicographically in chronological order
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S";

/// Which copy of a snapshot a file holds
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SnapshotStamp {
    Timestamp(String),
    Latest,
}

impl SnapshotStamp {
    /// Stamp for a point in time
    pub fn at(time: DateTime<Utc>) -> Self {
        SnapshotStamp::Timestamp(time.format(TIMESTAMP_FORMAT).to_string())
    }

    fn as_str(&self) -> &str {
        match self {
            SnapshotStamp::Timestamp(ts) => ts,
            SnapshotStamp::Latest => LATEST,
        }
    }
}

/// Parsed components of a snapshot file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotName {
    pub slug: String,
    pub project_id: String,
    pub stamp: SnapshotStamp,
}

impl SnapshotName {
    /// Parse a file name, or `None` if it does not follow the convention
    ///
    /// Slugs never contain `_`, so the slug ends at the first underscore and
    /// the stamp starts after the last; the project id may contain either.
    pub fn parse(file_name: &str) -> Option<Self> {
        let stem = file_name.strip_suffix(SNAPSHOT_SUFFIX)?;
        let (slug, rest) = stem.split_once('_')?;
        let (project_id, stamp) = rest.rsplit_once('_')?;
        if slug.is_empty() || project_id.is_empty() || stamp.is_empty() {
            return None;
        }

        let stamp = if stamp == LATEST {
            SnapshotStamp::Latest
        } else {
            SnapshotStamp::Timestamp(stamp.to_string())
        };

        Some(Self {
            slug: slug.to_string(),
            project_id: project_id.to_string(),
            stamp,
        })
    }
}

/// File name for a snapshot of the given project
///
/// # Example
///
/// ```
/// use notebridge_store::snapshot::{snapshot_file_name, SnapshotStamp};
///
/// assert_eq!(
///     snapshot_file_name("Sales Analysis", "p-1", &SnapshotStamp::Latest),
///     "sales-analysis_p-1_latest.snapshot.deepnote"
/// );
/// ```
pub fn snapshot_file_name(project_name: &str, project_id: &str, stamp: &SnapshotStamp) -> String {
    let slug = slugify_project_name(project_name);
    let slug = if slug.is_empty() { FALLBACK_SLUG } else { slug.as_str() };
    format!("{}_{}_{}{}", slug, project_id, stamp.as_str(), SNAPSHOT_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamped_name() {
        let time = Utc.with_ymd_and_hms(2025, 3, 7, 9, 5, 1).unwrap();
        assert_eq!(
            snapshot_file_name("Demo", "p1", &SnapshotStamp::at(time)),
            "demo_p1_2025-03-07T09-05-01.snapshot.deepnote"
        );
    }

    #[test]
    fn test_empty_slug_falls_back() {
        assert_eq!(
            snapshot_file_name("日本語", "p1", &SnapshotStamp::Latest),
            "project_p1_latest.snapshot.deepnote"
        );
    }

    #[test]
    fn test_parse_with_underscored_project_id() {
        let name = SnapshotName::parse("demo_team_42_2025-03-07T09-05-01.snapshot.deepnote").unwrap();
        assert_eq!(name.slug, "demo");
        assert_eq!(name.project_id, "team_42");
        assert_eq!(name.stamp, SnapshotStamp::Timestamp("2025-03-07T09-05-01".into()));
    }

    #[test]
    fn test_parse_rejects_foreign_files() {
        assert!(SnapshotName::parse("demo.deepnote").is_none());
        assert!(SnapshotName::parse("demo_latest.snapshot.deepnote").is_none());
        assert!(SnapshotName::parse("notes.txt").is_none());
    }

    #[test]
    fn test_latest_outranks_timestamps() {
        assert!(SnapshotStamp::Latest > SnapshotStamp::Timestamp("9999-12-31T23-59-59".into()));
    }
}
