// Copyright (c) 2026 - present reword contributors
// SPDX-License-Identifier: MIT

//! Rewrite strategy engine
//!
//! Replaces the message of one commit. The tip is amended in place; any other
//! commit is rebuilt together with all of its descendants, because each of
//! them names its parent by hash.
//!
//! ```text
//! Idle -> Classifying -> AmendingTip        -> Committed
//!                     -> RebuildingAncestor -> RolledBack
//!                                           -> Unrecoverable
//! ```
//!
//! Every exit path removes the staged message file. Ancestor rewrites start
//! and finish by clearing the backup-ref namespace so a previous interrupted
//! run can never block the next one.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, error, info, warn};

use crate::backend::{HistoryBackend, RewriteSpan};
use crate::commit::short_sha;
use crate::error::GitError;

/// Where the engine is in its state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No rewrite in progress
    Idle,
    /// Deciding between tip and ancestor rewrites
    Classifying,
    /// Amending the tip commit in place
    AmendingTip,
    /// Rebuilding the target and every descendant
    RebuildingAncestor,
    /// The branch now points at the rewritten history
    Committed,
    /// The branch pointer is unchanged and transient state is gone
    RolledBack,
    /// Rollback failed; the repository needs manual inspection
    Unrecoverable,
}

impl EngineState {
    /// Whether this is one of the three terminal states
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            EngineState::Committed | EngineState::RolledBack | EngineState::Unrecoverable
        )
    }
}

/// How a given target gets rewritten
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// The target is the tip
    AmendTip,
    /// The target is an ancestor of the tip
    RebuildAncestor {
        /// History that has to be rebuilt
        span: RewriteSpan,
    },
}

/// A single accepted message change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteRequest {
    /// Full SHA of the commit to rewrite
    pub target: String,
    /// Replacement message
    pub message: String,
}

impl RewriteRequest {
    /// Create a request
    #[must_use]
    pub fn new(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            message: message.into(),
        }
    }
}

/// Result of one rewrite attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteOutcome {
    /// The branch points at the rewritten history
    Success {
        /// Tip before the rewrite
        previous_head: String,
        /// Tip after the rewrite
        new_head: String,
        /// Strategy that was executed
        strategy: Strategy,
    },
    /// Nothing was committed
    Failure {
        /// Why the rewrite did not happen
        reason: String,
        /// Whether the in-flight mutation was cleaned up
        recovered: bool,
    },
}

impl RewriteOutcome {
    /// The terminal state this outcome corresponds to
    #[must_use]
    pub fn state(&self) -> EngineState {
        match self {
            RewriteOutcome::Success { .. } => EngineState::Committed,
            RewriteOutcome::Failure {
                recovered: true, ..
            } => EngineState::RolledBack,
            RewriteOutcome::Failure {
                recovered: false, ..
            } => EngineState::Unrecoverable,
        }
    }

    /// Whether the branch now points at new history
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, RewriteOutcome::Success { .. })
    }

    /// Whether the repository was left in an unknown state
    #[must_use]
    pub fn is_unrecoverable(&self) -> bool {
        self.state() == EngineState::Unrecoverable
    }

    fn refused(reason: impl Into<String>) -> Self {
        RewriteOutcome::Failure {
            reason: reason.into(),
            recovered: true,
        }
    }
}

/// The new message, written to a temp file inside the repository
struct StagedMessage {
    file: NamedTempFile,
}

impl StagedMessage {
    fn write(dir: &Path, message: &str) -> std::io::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("reword-msg-")
            .suffix(".txt")
            .tempfile_in(dir)?;
        file.write_all(message.trim_end().as_bytes())?;
        file.write_all(b"\n")?;
        file.flush()?;
        Ok(Self { file })
    }

    fn path(&self) -> &Path {
        self.file.path()
    }

    fn discard(self) {
        let path = self.file.path().to_path_buf();
        if let Err(e) = self.file.close() {
            warn!(path = %path.display(), error = %e, "failed to remove staged message");
        }
    }
}

/// Drives one rewrite at a time against a [`HistoryBackend`]
pub struct RewriteEngine<'a, B: HistoryBackend> {
    backend: &'a B,
    state: EngineState,
}

impl<'a, B: HistoryBackend> RewriteEngine<'a, B> {
    /// Create an idle engine
    #[must_use]
    pub fn new(backend: &'a B) -> Self {
        Self {
            backend,
            state: EngineState::Idle,
        }
    }

    /// Current state; terminal after [`rewrite`](Self::rewrite) returns
    #[must_use]
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Decide how `target` would be rewritten against the current tip
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when the target cannot be rewritten:
    /// it is a merge commit, it is not reachable from the tip, or the
    /// repository could not be read.
    pub fn classify(&self, target: &str) -> Result<Strategy, String> {
        let head = self.backend.head().map_err(|e| e.to_string())?;
        self.classify_against(target, &head)
    }

    /// Replace the message of `request.target`
    ///
    /// Always runs to a terminal state before returning.
    pub fn rewrite(&mut self, request: &RewriteRequest) -> RewriteOutcome {
        self.state = EngineState::Idle;
        let outcome = self.run(request);
        self.transition(outcome.state());
        match &outcome {
            RewriteOutcome::Success { new_head, .. } => {
                info!(target = %short_sha(&request.target), new_head = %short_sha(new_head), "rewrite committed");
            }
            RewriteOutcome::Failure {
                reason,
                recovered: true,
            } => {
                warn!(target = %short_sha(&request.target), %reason, "rewrite rolled back");
            }
            RewriteOutcome::Failure {
                reason,
                recovered: false,
            } => {
                error!(target = %short_sha(&request.target), %reason, "rewrite left the repository in an unknown state");
            }
        }
        outcome
    }

    /// Delete leftover backup refs and rewrite scratch state
    ///
    /// Idempotent; returns how many backup refs were removed.
    ///
    /// # Errors
    ///
    /// Returns `GitError` if a ref cannot be deleted or the scratch
    /// directory cannot be removed.
    pub fn cleanup_stale_backups(&self) -> Result<usize, GitError> {
        let stale = self.backend.backup_refs()?;
        for name in &stale {
            debug!(%name, "deleting backup ref");
            self.backend.delete_ref(name)?;
        }
        self.backend.clear_rewrite_workspace()?;
        if !stale.is_empty() {
            self.backend.expire_unreachable()?;
        }
        Ok(stale.len())
    }

    fn run(&mut self, request: &RewriteRequest) -> RewriteOutcome {
        self.transition(EngineState::Classifying);

        let head = match self.backend.head() {
            Ok(head) => head,
            Err(e) => return RewriteOutcome::refused(format!("cannot resolve tip: {e}")),
        };
        let strategy = match self.classify_against(&request.target, &head) {
            Ok(strategy) => strategy,
            Err(reason) => return RewriteOutcome::refused(reason),
        };

        match self.backend.message(&request.target) {
            Ok(current) if current.trim() == request.message.trim() => {
                info!(target = %short_sha(&request.target), "message already matches; nothing to do");
                return RewriteOutcome::Success {
                    previous_head: head.clone(),
                    new_head: head,
                    strategy,
                };
            }
            Ok(_) => {}
            Err(e) => return RewriteOutcome::refused(format!("cannot read target: {e}")),
        }

        let staged = match StagedMessage::write(&self.backend.staging_dir(), &request.message) {
            Ok(staged) => staged,
            Err(e) => return RewriteOutcome::refused(format!("cannot stage message: {e}")),
        };

        let outcome = match &strategy {
            Strategy::AmendTip => {
                self.transition(EngineState::AmendingTip);
                self.amend_tip(&head, request, staged.path())
            }
            Strategy::RebuildAncestor { span } => {
                self.transition(EngineState::RebuildingAncestor);
                self.rebuild_ancestor(&head, span, request, staged.path())
            }
        };

        staged.discard();

        match outcome {
            Ok(new_head) => RewriteOutcome::Success {
                previous_head: head,
                new_head,
                strategy,
            },
            Err(failure) => failure,
        }
    }

    fn classify_against(&self, target: &str, head: &str) -> Result<Strategy, String> {
        let parents = self
            .backend
            .parents(target)
            .map_err(|e| format!("cannot resolve {}: {e}", short_sha(target)))?;
        if parents.len() > 1 {
            return Err(format!(
                "{} is a merge commit; merge commits are not rewritten",
                short_sha(target)
            ));
        }

        if target == head {
            debug!(target = %short_sha(target), "target is the tip");
            return Ok(Strategy::AmendTip);
        }

        let reachable = self
            .backend
            .is_ancestor(target, head)
            .map_err(|e| e.to_string())?;
        if !reachable {
            return Err(format!(
                "{} is not reachable from the current tip",
                short_sha(target)
            ));
        }

        let span = match parents.into_iter().next() {
            Some(parent) => RewriteSpan::AfterParent { parent },
            None => RewriteSpan::FromRoot,
        };
        debug!(target = %short_sha(target), ?span, "target is an ancestor");
        Ok(Strategy::RebuildAncestor { span })
    }

    fn amend_tip(
        &self,
        head: &str,
        request: &RewriteRequest,
        message_file: &Path,
    ) -> Result<String, RewriteOutcome> {
        let parents_before = self
            .backend
            .parents(head)
            .map_err(|e| RewriteOutcome::refused(e.to_string()))?;

        if let Err(e) = self.backend.amend_tip_message(message_file) {
            return Err(self.roll_back(head, format!("amend failed: {e}"), false));
        }

        match self.verify_amend(head, &parents_before, request) {
            Ok(new_head) => Ok(new_head),
            Err(reason) => Err(self.roll_back(head, reason, false)),
        }
    }

    fn verify_amend(
        &self,
        old_head: &str,
        parents_before: &[String],
        request: &RewriteRequest,
    ) -> Result<String, String> {
        let new_head = self.backend.head().map_err(|e| e.to_string())?;
        if new_head == old_head {
            return Err("amend did not move the tip".to_string());
        }
        let parents_after = self.backend.parents(&new_head).map_err(|e| e.to_string())?;
        if parents_after != parents_before {
            return Err("amend changed the parent of the tip".to_string());
        }
        let message = self.backend.message(&new_head).map_err(|e| e.to_string())?;
        if message.trim() != request.message.trim() {
            return Err("amended message does not match the request".to_string());
        }
        Ok(new_head)
    }

    fn rebuild_ancestor(
        &self,
        head: &str,
        span: &RewriteSpan,
        request: &RewriteRequest,
        message_file: &Path,
    ) -> Result<String, RewriteOutcome> {
        match self.cleanup_stale_backups() {
            Ok(0) => {}
            Ok(n) => info!(count = n, "removed stale backup refs"),
            Err(e) => {
                return Err(RewriteOutcome::refused(format!(
                    "cannot clear stale backups: {e}"
                )));
            }
        }

        if let Err(e) = self
            .backend
            .filter_messages(span, &request.target, message_file)
        {
            return Err(self.roll_back(head, format!("history rewrite failed: {e}"), true));
        }

        let new_head = match self.backend.head() {
            Ok(new_head) if new_head != head => new_head,
            Ok(_) => {
                return Err(self.roll_back(
                    head,
                    "history rewrite left the tip unchanged".to_string(),
                    true,
                ));
            }
            Err(e) => return Err(self.roll_back(head, e.to_string(), true)),
        };

        if let Err(e) = self.cleanup_stale_backups() {
            warn!(error = %e, "rewrite committed but backup refs could not be removed");
        }
        Ok(new_head)
    }

    /// Point the branch back at `head` and clear transient state
    fn roll_back(&self, head: &str, reason: String, clear_backups: bool) -> RewriteOutcome {
        warn!(%reason, head = %short_sha(head), "rolling back");

        let aborted = self.backend.abort_rewrite(head);
        let cleaned = if clear_backups {
            self.cleanup_stale_backups().map(|_| ())
        } else {
            Ok(())
        };

        match (aborted, cleaned) {
            (Ok(()), Ok(())) => RewriteOutcome::Failure {
                reason,
                recovered: true,
            },
            (Err(e), _) => RewriteOutcome::Failure {
                reason: format!("{reason}; rollback failed: {e}"),
                recovered: false,
            },
            (Ok(()), Err(e)) => RewriteOutcome::Failure {
                reason: format!("{reason}; backup cleanup failed: {e}"),
                recovered: false,
            },
        }
    }

    fn transition(&mut self, next: EngineState) {
        debug!(from = ?self.state, to = ?next, "engine transition");
        self.state = next;
    }
}
