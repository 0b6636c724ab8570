//! Commit types produced by the inspector

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One commit as stored, before any rewrite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Full hex SHA
    pub sha: String,
    /// Commit message, verbatim
    pub message: String,
    /// Author name
    pub author: String,
    /// Author email
    pub author_email: String,
    /// Author timestamp
    pub timestamp: DateTime<Utc>,
    /// Parent SHAs, first parent first
    pub parents: Vec<String>,
    /// SHA of the tree the commit points at
    pub tree: String,
}

impl Commit {
    /// Abbreviated SHA for display
    #[must_use]
    pub fn short_sha(&self) -> &str {
        short_sha(&self.sha)
    }

    /// Whether the commit starts history
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Author formatted as `Name <email>`
    #[must_use]
    pub fn author_line(&self) -> String {
        format!("{} <{}>", self.author, self.author_email)
    }
}

/// Abbreviate a SHA to its first 7 characters
#[must_use]
pub fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}

/// Line and file totals for one commit's diff
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    /// Files touched
    pub files_changed: usize,
    /// Lines added
    pub insertions: usize,
    /// Lines removed
    pub deletions: usize,
}

impl std::fmt::Display for DiffSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} file(s) changed, +{} -{}",
            self.files_changed, self.insertions, self.deletions
        )
    }
}

/// Read-only view of a commit used by the review loop
///
/// Records are recomputed on demand and never reused across a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// The commit metadata
    #[serde(flatten)]
    pub commit: Commit,
    /// Unified diff against the first parent (or the empty tree for roots)
    pub diff: String,
    /// Totals for the diff
    pub summary: DiffSummary,
}

impl CommitRecord {
    /// The commit's reference
    #[must_use]
    pub fn reference(&self) -> &str {
        &self.commit.sha
    }

    /// The original message with surrounding whitespace trimmed
    #[must_use]
    pub fn original_message(&self) -> &str {
        self.commit.message.trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use similar_asserts::assert_eq;

    fn fix_commit() -> Commit {
        Commit {
            sha: "3f9d2c41be07a85e6d1f0c9b4a7e2d58c6b1a903".to_string(),
            message: "  fix\n\nbump the parser buffer\n\n".to_string(),
            author: "Ada Lovelace".to_string(),
            author_email: "ada@example.org".to_string(),
            timestamp: Utc
                .with_ymd_and_hms(2026, 3, 4, 9, 15, 0)
                .single()
                .expect("valid timestamp"),
            parents: vec!["8b1e7f0a3c92d4e6b5a70f1c2d3e4f5a6b7c8d9e".to_string()],
            tree: "4b825dc642cb6eb9a060e54bf8d69288fbee4904".to_string(),
        }
    }

    #[test]
    fn test_short_sha() {
        assert_eq!(fix_commit().short_sha(), "3f9d2c4");
        assert_eq!(short_sha("abc"), "abc");
        assert_eq!(short_sha(""), "");
    }

    #[test]
    fn test_root_detection() {
        let mut commit = fix_commit();
        assert!(!commit.is_root());
        commit.parents.clear();
        assert!(commit.is_root());
    }

    #[test]
    fn test_author_line() {
        assert_eq!(fix_commit().author_line(), "Ada Lovelace <ada@example.org>");
    }

    #[test]
    fn test_record_trims_original_message() {
        let record = CommitRecord {
            commit: fix_commit(),
            diff: String::new(),
            summary: DiffSummary::default(),
        };
        assert_eq!(record.original_message(), "fix\n\nbump the parser buffer");
        assert_eq!(record.reference(), record.commit.sha);
    }

    #[test]
    fn test_diff_summary_display() {
        let summary = DiffSummary {
            files_changed: 2,
            insertions: 10,
            deletions: 3,
        };
        assert_eq!(summary.to_string(), "2 file(s) changed, +10 -3");
    }

    #[test]
    fn test_record_json_is_flat() {
        let record = CommitRecord {
            commit: fix_commit(),
            diff: "diff --git a/x b/x".to_string(),
            summary: DiffSummary::default(),
        };
        let json = serde_json::to_string(&record).expect("serialize");
        assert!(json.contains("\"sha\":"));
        assert!(json.contains("\"diff\":"));
        assert!(!json.contains("\"commit\":"));
    }
}
