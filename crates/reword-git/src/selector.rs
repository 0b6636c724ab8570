// Copyright (c) 2026 - present reword contributors
// SPDX-License-Identifier: MIT

//! Commit selection
//!
//! Resolves a symbolic target into an ordered, duplicate-free list of commit
//! references. Selection is read-only.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::error::{GitError, SelectionError};
use crate::repo::{GitRepo, WalkOptions};

/// What part of history to process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The N most recent commits, newest first
    Last(usize),
    /// The N oldest commits, oldest first
    First(usize),
    /// Commits on the checked-out branch since it forked from the trunk
    CurrentBranch,
    /// Every commit reachable from any reference
    AllBranches,
    /// Every commit reachable from the trunk branch
    OnlyMain,
}

/// Policy applied while building a range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeOptions {
    /// Leave merge commits out of the range
    pub skip_merges: bool,
    /// Count used when no selection is given
    pub default_count: usize,
}

impl Default for ScopeOptions {
    fn default() -> Self {
        Self {
            skip_merges: true,
            default_count: 5,
        }
    }
}

/// An ordered sequence of commit references without duplicates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitRange {
    refs: Vec<String>,
}

impl CommitRange {
    /// Build a range, keeping the first occurrence of each reference
    #[must_use]
    pub fn new(refs: impl IntoIterator<Item = String>) -> Self {
        let mut seen = HashSet::new();
        let refs = refs
            .into_iter()
            .filter(|r| seen.insert(r.clone()))
            .collect();
        Self { refs }
    }

    /// Number of references in the range
    #[must_use]
    pub fn len(&self) -> usize {
        self.refs.len()
    }

    /// Whether the range is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    /// Iterate over the references in order
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.refs.iter()
    }

    /// The references as a slice
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.refs
    }
}

impl<'a> IntoIterator for &'a CommitRange {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.refs.iter()
    }
}

/// Validate a user-supplied commit count
///
/// # Errors
///
/// Returns `SelectionError::InvalidCount` when `value` is not positive.
pub fn parse_count(value: i64) -> Result<usize, SelectionError> {
    if value <= 0 {
        return Err(SelectionError::InvalidCount(value));
    }
    usize::try_from(value).map_err(|_| SelectionError::InvalidCount(value))
}

/// Resolve a selection into a commit range
///
/// With no selection, the last `scope.default_count` commits are used.
/// A count larger than the available history yields all of it.
///
/// # Errors
///
/// Returns `SelectionError` for a zero count, a missing trunk (for
/// [`Selection::OnlyMain`]), or any failure reading the repository.
pub fn select(
    repo: &GitRepo,
    selection: Option<Selection>,
    scope: &ScopeOptions,
) -> Result<CommitRange, SelectionError> {
    let selection = selection.unwrap_or(Selection::Last(scope.default_count));
    debug!(?selection, ?scope, "selecting commits");

    let options = match selection {
        Selection::Last(0) | Selection::First(0) => {
            return Err(SelectionError::InvalidCount(0));
        }
        Selection::Last(n) => WalkOptions::newest(n),
        Selection::First(n) => WalkOptions::oldest(n),
        Selection::CurrentBranch => current_branch_options(repo)?,
        Selection::AllBranches => WalkOptions::default().all_refs(),
        Selection::OnlyMain => {
            let trunk = repo.trunk_branch().ok_or(SelectionError::NoTrunk)?;
            WalkOptions::default().start_at(trunk)
        }
    }
    .skip_merges(scope.skip_merges);

    let commits = repo.walk(&options)?;
    let range = CommitRange::new(commits.into_iter().map(|c| c.sha));
    info!(count = range.len(), "selected commits");
    Ok(range)
}

/// Walk options for "everything on this branch since it left the trunk"
fn current_branch_options(repo: &GitRepo) -> Result<WalkOptions, SelectionError> {
    let tip = match repo.current_branch() {
        Ok(branch) => branch,
        Err(GitError::DetachedHead) => "HEAD".to_string(),
        Err(e) => return Err(e.into()),
    };
    let options = WalkOptions::default().start_at(&tip);

    let Some(trunk) = repo.trunk_branch() else {
        warn!("no trunk branch; using the whole branch history");
        return Ok(options);
    };

    match repo.merge_base(&tip, trunk)? {
        Some(base) => {
            debug!(%tip, %trunk, %base, "branch forked from trunk");
            if tip == trunk {
                info!(%trunk, "current branch is the trunk; nothing ahead of it");
            }
            Ok(options.hide(&base))
        }
        None => {
            warn!(%tip, %trunk, "no common ancestor with trunk; using the whole branch history");
            Ok(options)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn test_range_drops_duplicates_keeping_order() {
        let range = CommitRange::new(
            ["c", "b", "c", "a", "b"].into_iter().map(String::from),
        );
        assert_eq!(range.as_slice(), &["c", "b", "a"]);
        assert_eq!(range.len(), 3);
    }

    #[test]
    fn test_empty_range() {
        let range = CommitRange::default();
        assert!(range.is_empty());
        assert_eq!(range.iter().count(), 0);
    }

    #[test]
    fn test_parse_count_rejects_non_positive() {
        assert!(matches!(
            parse_count(0),
            Err(SelectionError::InvalidCount(0))
        ));
        assert!(matches!(
            parse_count(-3),
            Err(SelectionError::InvalidCount(-3))
        ));
        assert_eq!(parse_count(7).expect("valid"), 7);
    }

    #[test]
    fn test_default_scope() {
        let scope = ScopeOptions::default();
        assert!(scope.skip_merges);
        assert_eq!(scope.default_count, 5);
    }
}
