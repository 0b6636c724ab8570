// Copyright (c) 2026 - present reword contributors
// SPDX-License-Identifier: MIT

//! The version-control boundary used by the rewrite engine
//!
//! Every operation here may fail; the engine treats them as opaque steps and
//! never touches repository storage except through this trait.

use std::path::{Path, PathBuf};

use crate::error::GitError;

/// Namespace where history rewrites park their backup references
pub const BACKUP_REF_NAMESPACE: &str = "refs/original/";

/// The span of history an ancestor rewrite has to rebuild
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteSpan {
    /// The target has no parent: rebuild everything reachable from the tip
    FromRoot,
    /// Rebuild the commits after `parent` up to the tip
    AfterParent {
        /// Immediate parent of the target, left untouched
        parent: String,
    },
}

/// Read and mutation primitives over a repository
pub trait HistoryBackend {
    /// SHA of the commit the current branch points at
    fn head(&self) -> Result<String, GitError>;

    /// Parent SHAs of `reference`, first parent first
    fn parents(&self, reference: &str) -> Result<Vec<String>, GitError>;

    /// Whether `ancestor` is `descendant` or one of its ancestors
    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> Result<bool, GitError>;

    /// Full message of `reference`
    fn message(&self, reference: &str) -> Result<String, GitError>;

    /// Directory for transient staging artifacts
    fn staging_dir(&self) -> PathBuf;

    /// Replace the tip commit's message with the contents of `message_file`
    ///
    /// Staged changes in the index must not be folded into the commit.
    fn amend_tip_message(&self, message_file: &Path) -> Result<(), GitError>;

    /// Rebuild `span`, substituting the contents of `message_file` as the
    /// message of `target` and passing every other message through unchanged
    fn filter_messages(
        &self,
        span: &RewriteSpan,
        target: &str,
        message_file: &Path,
    ) -> Result<(), GitError>;

    /// Abandon an in-flight rewrite and point the branch back at `restore_to`
    fn abort_rewrite(&self, restore_to: &str) -> Result<(), GitError>;

    /// References currently parked under [`BACKUP_REF_NAMESPACE`]
    fn backup_refs(&self) -> Result<Vec<String>, GitError>;

    /// Delete a single reference
    fn delete_ref(&self, name: &str) -> Result<(), GitError>;

    /// Remove scratch state a previous rewrite may have left behind
    fn clear_rewrite_workspace(&self) -> Result<(), GitError>;

    /// Expire reflog entries that only point at unreachable history
    fn expire_unreachable(&self) -> Result<(), GitError>;
}
