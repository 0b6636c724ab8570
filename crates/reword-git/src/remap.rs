// Copyright (c) 2026 - present reword contributors
// SPDX-License-Identifier: MIT

//! Tracking commits across rewrites
//!
//! Rebuilding an ancestor gives it and every descendant a new SHA, but the
//! old objects still resolve. A list of targets captured before the rewrite
//! would silently point at abandoned history, so each successful rewrite is
//! recorded here and later targets are translated before use.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::commit::short_sha;
use crate::error::GitError;
use crate::repo::{GitRepo, WalkOptions};

/// Old SHA to new SHA, accumulated over a run
#[derive(Debug, Clone, Default)]
pub struct ReferenceMap {
    map: HashMap<String, String>,
}

impl ReferenceMap {
    /// Create an empty map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded translations
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether nothing has been recorded yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Record a single translation
    pub fn insert(&mut self, old: impl Into<String>, new: impl Into<String>) {
        let (old, new) = (old.into(), new.into());
        if old != new {
            self.map.insert(old, new);
        }
    }

    /// Current name of `reference`, following chained rewrites
    #[must_use]
    pub fn resolve<'a>(&'a self, reference: &'a str) -> &'a str {
        let mut current = reference;
        // A chain can never be longer than the number of entries
        for _ in 0..=self.map.len() {
            match self.map.get(current) {
                Some(next) => current = next.as_str(),
                None => return current,
            }
        }
        warn!(reference = %short_sha(reference), "cycle in reference map");
        reference
    }

    /// Pair up the commits replaced by a rewrite from `old_head` to `new_head`
    ///
    /// Both histories are walked in the same order down to their common
    /// ancestor. A message-only rewrite keeps every tree, so commits pair up
    /// position by position; pairing stops at the first tree mismatch.
    /// Returns how many translations were added.
    ///
    /// # Errors
    ///
    /// Returns `GitError` if either history cannot be walked.
    pub fn record(
        &mut self,
        repo: &GitRepo,
        old_head: &str,
        new_head: &str,
    ) -> Result<usize, GitError> {
        if old_head == new_head {
            return Ok(0);
        }

        let base = repo.merge_base(old_head, new_head)?;
        let walk = |head: &str| {
            let options = WalkOptions::default().start_at(head);
            match &base {
                Some(base) => repo.walk(&options.hide(base)),
                None => repo.walk(&options),
            }
        };
        let old = walk(old_head)?;
        let new = walk(new_head)?;

        if old.len() != new.len() {
            warn!(
                old = old.len(),
                new = new.len(),
                "rewritten history has a different length"
            );
        }

        let mut added = 0;
        for (before, after) in old.iter().zip(&new) {
            if before.tree != after.tree {
                warn!(
                    old = %before.short_sha(),
                    new = %after.short_sha(),
                    "tree mismatch; stopping remap"
                );
                break;
            }
            if before.sha != after.sha {
                debug!(old = %before.short_sha(), new = %after.short_sha(), "remapped");
                self.insert(before.sha.clone(), after.sha.clone());
                added += 1;
            }
        }
        Ok(added)
    }
}
