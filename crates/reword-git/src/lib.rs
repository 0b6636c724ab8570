// Copyright (c) 2026 - present reword contributors
// SPDX-License-Identifier: MIT

//! reword-git: commit selection and message rewriting
//!
//! This library crate reads history through `git2` and rewrites commit
//! messages through the `git` command line, rolling back on any failure.

#![warn(missing_docs)]

//! # Example
//!
//! ```no_run
//! use reword_git::{GitRepo, RewriteEngine, RewriteRequest, Selection, ScopeOptions, select};
//!
//! let repo = GitRepo::discover(".").expect("open repo");
//! let range = select(&repo, Some(Selection::Last(1)), &ScopeOptions::default())
//!     .expect("select commits");
//!
//! let mut engine = RewriteEngine::new(&repo);
//! for target in &range {
//!     let outcome = engine.rewrite(&RewriteRequest::new(target, "Describe the change"));
//!     println!("{outcome:?}");
//! }
//! ```

pub mod backend;
pub mod commit;
pub mod error;
pub mod remap;
pub mod repo;
pub mod rewrite;
pub mod selector;

pub use backend::{BACKUP_REF_NAMESPACE, HistoryBackend, RewriteSpan};
pub use commit::{Commit, CommitRecord, DiffSummary};
pub use error::{GitError, SelectionError};
pub use remap::ReferenceMap;
pub use repo::{GitRepo, WalkOptions};
pub use rewrite::{EngineState, RewriteEngine, RewriteOutcome, RewriteRequest, Strategy};
pub use selector::{CommitRange, ScopeOptions, Selection, parse_count, select};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::commit::{Commit, CommitRecord};
    pub use crate::error::{GitError, SelectionError};
    pub use crate::repo::GitRepo;
    pub use crate::rewrite::{RewriteEngine, RewriteOutcome, RewriteRequest};
    pub use crate::selector::{CommitRange, Selection, select};
}
