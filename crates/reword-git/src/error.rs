// Copyright (c) 2026 - present reword contributors
// SPDX-License-Identifier: MIT

//! Error types for reword-git

use thiserror::Error;

/// Failures while reading or rewriting history
#[derive(Debug, Error)]
pub enum GitError {
    /// libgit2 reported a failure
    #[error(transparent)]
    Git2(#[from] git2::Error),

    /// Nothing at the path looks like a repository
    #[error("no git repository at {path}")]
    RepositoryNotFound {
        /// Where the lookup started
        path: String,
    },

    /// A revision that names no commit
    #[error("cannot resolve '{reference}' to a commit")]
    InvalidReference {
        /// Branch, tag or SHA as given
        reference: String,
    },

    /// A `git` subprocess exited unsuccessfully
    #[error("git {command} failed: {stderr}")]
    CommandFailed {
        /// The git arguments, joined with spaces
        command: String,
        /// Captured standard error of the failed process
        stderr: String,
    },

    /// Filesystem or spawn failure
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// HEAD does not point at a branch
    #[error("HEAD is detached; check out a branch first")]
    DetachedHead,
}

/// Why a commit range could not be resolved
#[derive(Debug, Error)]
pub enum SelectionError {
    /// A count-based selection was given a non-positive count
    #[error("Invalid commit count: {0} (must be a positive integer)")]
    InvalidCount(i64),

    /// The working directory is not inside a git repository
    #[error("Not a git repository: {0}")]
    NotARepository(String),

    /// Neither `main` nor `master` exists
    #[error("No trunk branch found (looked for 'main' and 'master')")]
    NoTrunk,

    /// The repository could not be read
    #[error("Failed to read history: {0}")]
    Read(#[from] GitError),
}

impl From<git2::Error> for SelectionError {
    fn from(err: git2::Error) -> Self {
        SelectionError::Read(GitError::Git2(err))
    }
}
