// Copyright (c) 2026 - present reword contributors
// SPDX-License-Identifier: MIT

//! Repository access
//!
//! Reads go through the `git2` crate. Mutations shell out to the `git`
//! command line, which is the only way to drive `commit --amend` and
//! `filter-branch` with the semantics the rewrite engine relies on.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, TimeZone, Utc};
use git2::{BranchType, DiffFormat, DiffOptions, Oid, Repository, Sort};
use tracing::debug;

use crate::backend::{BACKUP_REF_NAMESPACE, HistoryBackend, RewriteSpan};
use crate::commit::{Commit, CommitRecord, DiffSummary};
use crate::error::GitError;

/// Scratch directory `git filter-branch` creates in the work tree
const REWRITE_SCRATCH_DIR: &str = ".git-rewrite";

/// Which commits a revwalk visits, and in what order
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Stop after this many commits, counted after merges are dropped
    pub limit: Option<usize>,
    /// Start from these references (defaults to HEAD)
    pub from_refs: Vec<String>,
    /// Start from every reference in the repository
    pub all_refs: bool,
    /// Exclude this commit and everything reachable from it
    pub hide: Option<String>,
    /// Yield oldest commits first
    pub oldest_first: bool,
    /// Leave merge commits out of the result
    pub skip_merges: bool,
}

impl WalkOptions {
    /// The `n` newest commits
    #[must_use]
    pub fn newest(n: usize) -> Self {
        Self {
            limit: Some(n),
            ..Default::default()
        }
    }

    /// The `n` oldest commits, oldest first
    #[must_use]
    pub fn oldest(n: usize) -> Self {
        Self {
            limit: Some(n),
            oldest_first: true,
            ..Default::default()
        }
    }

    /// Walk from `reference` in addition to any earlier starts
    #[must_use]
    pub fn start_at(mut self, reference: &str) -> Self {
        self.from_refs.push(reference.to_string());
        self
    }

    /// Walk every reference instead of HEAD
    #[must_use]
    pub fn all_refs(mut self) -> Self {
        self.all_refs = true;
        self
    }

    /// Exclude history reachable from `reference`
    #[must_use]
    pub fn hide(mut self, reference: &str) -> Self {
        self.hide = Some(reference.to_string());
        self
    }

    /// Drop merge commits from the result
    #[must_use]
    pub fn skip_merges(mut self, skip: bool) -> Self {
        self.skip_merges = skip;
        self
    }
}

/// A git repository wrapper
pub struct GitRepo {
    repo: Repository,
}

impl GitRepo {
    /// Open the repository rooted exactly at `path`
    ///
    /// # Errors
    ///
    /// Returns `GitError::RepositoryNotFound` when `path` holds no repository.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GitError> {
        let path = path.as_ref();
        Repository::open(path)
            .map(|repo| Self { repo })
            .map_err(|_| not_found(path))
    }

    /// Open the repository containing `path`, searching parent directories
    ///
    /// # Errors
    ///
    /// Returns `GitError::RepositoryNotFound` when no enclosing repository exists.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self, GitError> {
        let path = path.as_ref();
        Repository::discover(path)
            .map(|repo| Self { repo })
            .map_err(|_| not_found(path))
    }

    /// The git directory
    #[must_use]
    pub fn path(&self) -> &Path {
        self.repo.path()
    }

    /// The work tree; `None` for bare repositories
    #[must_use]
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Walk commits according to the given options
    ///
    /// # Errors
    ///
    /// Returns `GitError` if the repository cannot be walked.
    pub fn walk(&self, options: &WalkOptions) -> Result<Vec<Commit>, GitError> {
        let mut revwalk = self.repo.revwalk()?;
        let mut sorting = Sort::TOPOLOGICAL | Sort::TIME;
        if options.oldest_first {
            sorting |= Sort::REVERSE;
        }
        revwalk.set_sorting(sorting)?;

        if options.all_refs {
            revwalk.push_glob("*")?;
            // A detached HEAD is not covered by any ref
            if self.repo.head_detached().unwrap_or(false) {
                revwalk.push_head()?;
            }
        } else if options.from_refs.is_empty() {
            revwalk.push_head()?;
        } else {
            for reference in &options.from_refs {
                let oid = self.resolve(reference)?;
                revwalk.push(oid)?;
            }
        }

        if let Some(ref hide) = options.hide {
            revwalk.hide(self.resolve(hide)?)?;
        }

        let limit = options.limit.unwrap_or(usize::MAX);
        let mut commits = Vec::new();
        for oid_result in revwalk {
            if commits.len() >= limit {
                break;
            }
            let git_commit = self.repo.find_commit(oid_result?)?;
            if options.skip_merges && git_commit.parent_count() > 1 {
                continue;
            }
            commits.push(extract_commit(&git_commit));
        }

        Ok(commits)
    }

    /// Read message, author and diff for a reference
    ///
    /// # Errors
    ///
    /// Returns `GitError::InvalidReference` if the reference no longer resolves.
    pub fn inspect(&self, reference: &str) -> Result<CommitRecord, GitError> {
        let git_commit = self.find_commit(reference)?;
        let tree = git_commit.tree()?;
        let parent_tree = if git_commit.parent_count() > 0 {
            Some(git_commit.parent(0)?.tree()?)
        } else {
            None
        };

        let mut opts = DiffOptions::new();
        let diff =
            self.repo
                .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))?;

        let stats = diff.stats()?;
        let summary = DiffSummary {
            files_changed: stats.files_changed(),
            insertions: stats.insertions(),
            deletions: stats.deletions(),
        };

        let mut text = String::new();
        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            if matches!(line.origin(), '+' | '-' | ' ') {
                text.push(line.origin());
            }
            text.push_str(&String::from_utf8_lossy(line.content()));
            true
        })?;

        Ok(CommitRecord {
            commit: extract_commit(&git_commit),
            diff: text,
            summary,
        })
    }

    /// Get the HEAD commit SHA
    ///
    /// # Errors
    ///
    /// Returns `GitError` if HEAD cannot be resolved.
    pub fn head_sha(&self) -> Result<String, GitError> {
        let head = self.repo.head()?;
        let oid = head.target().ok_or_else(|| GitError::InvalidReference {
            reference: "HEAD".to_string(),
        })?;
        Ok(oid.to_string())
    }

    /// Short name of the checked-out branch
    ///
    /// # Errors
    ///
    /// Returns `GitError::DetachedHead` when HEAD is not on a branch.
    pub fn current_branch(&self) -> Result<String, GitError> {
        let head = self.repo.head()?;
        if !head.is_branch() {
            return Err(GitError::DetachedHead);
        }
        head.shorthand()
            .map(str::to_string)
            .ok_or(GitError::DetachedHead)
    }

    /// Check whether a local branch exists
    #[must_use]
    pub fn branch_exists(&self, name: &str) -> bool {
        self.repo.find_branch(name, BranchType::Local).is_ok()
    }

    /// The canonical trunk branch: `main` if present, else `master`
    #[must_use]
    pub fn trunk_branch(&self) -> Option<&'static str> {
        ["main", "master"]
            .into_iter()
            .find(|name| self.branch_exists(name))
    }

    /// Best common ancestor of two references, if they share history
    ///
    /// # Errors
    ///
    /// Returns `GitError` if either reference cannot be resolved.
    pub fn merge_base(&self, one: &str, two: &str) -> Result<Option<String>, GitError> {
        let a = self.resolve(one)?;
        let b = self.resolve(two)?;
        match self.repo.merge_base(a, b) {
            Ok(oid) => Ok(Some(oid.to_string())),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Whether the checked-out branch has an upstream or exists on any remote
    ///
    /// # Errors
    ///
    /// Returns `GitError` if remotes cannot be listed.
    pub fn is_shared_branch(&self) -> Result<bool, GitError> {
        let branch = match self.current_branch() {
            Ok(branch) => branch,
            Err(GitError::DetachedHead) => return Ok(false),
            Err(e) => return Err(e),
        };

        match self.repo.find_branch(&branch, BranchType::Local)?.upstream() {
            Ok(upstream) if upstream.get().is_remote() => {
                let upstream = upstream.get().shorthand().unwrap_or_default().to_string();
                debug!(%branch, %upstream, "branch tracks a remote branch");
                return Ok(true);
            }
            Ok(_) => {}
            Err(e) => debug!(%branch, error = %e, "no usable upstream"),
        }

        for remote in self.repo.remotes()?.iter().flatten() {
            let tracking = format!("refs/remotes/{remote}/{branch}");
            if self.repo.find_reference(&tracking).is_ok() {
                debug!(%remote, %branch, "branch is tracked on remote");
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn resolve(&self, reference: &str) -> Result<Oid, GitError> {
        Ok(self.find_commit(reference)?.id())
    }

    fn find_commit(&self, reference: &str) -> Result<git2::Commit<'_>, GitError> {
        let invalid = || GitError::InvalidReference {
            reference: reference.to_string(),
        };
        self.repo
            .revparse_single(reference)
            .map_err(|_| invalid())?
            .peel_to_commit()
            .map_err(|_| invalid())
    }

    /// Full name of the ref HEAD points at, or `HEAD` when detached
    fn head_ref_name(&self) -> Result<String, GitError> {
        let head = self.repo.head()?;
        if head.is_branch() {
            if let Some(name) = head.name() {
                return Ok(name.to_string());
            }
        }
        Ok("HEAD".to_string())
    }

    // ========================================================================
    // git CLI
    // ========================================================================

    /// Run `git` in the work tree and return its trimmed stdout
    fn git<I, S>(&self, args: I) -> Result<String, GitError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<S> = args.into_iter().collect();
        let rendered = args
            .iter()
            .map(|a| a.as_ref().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ");
        debug!(command = %rendered, "running git");

        let dir = self.workdir().unwrap_or_else(|| self.path());
        let output = Command::new("git")
            .current_dir(dir)
            .args(&args)
            .env("FILTER_BRANCH_SQUELCH_WARNING", "1")
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()?;

        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: rendered,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl HistoryBackend for GitRepo {
    fn head(&self) -> Result<String, GitError> {
        self.head_sha()
    }

    fn parents(&self, reference: &str) -> Result<Vec<String>, GitError> {
        Ok(self
            .find_commit(reference)?
            .parent_ids()
            .map(|id| id.to_string())
            .collect())
    }

    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> Result<bool, GitError> {
        let a = self.resolve(ancestor)?;
        let d = self.resolve(descendant)?;
        Ok(a == d || self.repo.graph_descendant_of(d, a)?)
    }

    fn message(&self, reference: &str) -> Result<String, GitError> {
        Ok(self
            .find_commit(reference)?
            .message()
            .unwrap_or("")
            .to_string())
    }

    fn staging_dir(&self) -> PathBuf {
        self.path().to_path_buf()
    }

    fn amend_tip_message(&self, message_file: &Path) -> Result<(), GitError> {
        self.git([
            OsStr::new("commit"),
            OsStr::new("--amend"),
            OsStr::new("--only"),
            OsStr::new("--allow-empty"),
            OsStr::new("--no-verify"),
            OsStr::new("--cleanup=verbatim"),
            OsStr::new("--file"),
            message_file.as_os_str(),
        ])?;
        Ok(())
    }

    fn filter_messages(
        &self,
        span: &RewriteSpan,
        target: &str,
        message_file: &Path,
    ) -> Result<(), GitError> {
        let script = message_filter_script(target, message_file);
        let head_ref = self.head_ref_name()?;
        let range = match span {
            RewriteSpan::FromRoot => head_ref,
            RewriteSpan::AfterParent { parent } => format!("{parent}..{head_ref}"),
        };
        self.git([
            "filter-branch",
            "--msg-filter",
            script.as_str(),
            "--",
            range.as_str(),
        ])?;
        Ok(())
    }

    fn abort_rewrite(&self, restore_to: &str) -> Result<(), GitError> {
        let current = self.head_sha()?;
        if current != restore_to {
            debug!(from = %current, to = %restore_to, "restoring branch pointer");
            self.git(["update-ref", "-m", "reword: rollback", "HEAD", restore_to])?;
        }
        self.clear_rewrite_workspace()
    }

    fn backup_refs(&self) -> Result<Vec<String>, GitError> {
        let glob = format!("{BACKUP_REF_NAMESPACE}*");
        let mut names = Vec::new();
        for reference in self.repo.references_glob(&glob)? {
            if let Some(name) = reference?.name() {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }

    fn delete_ref(&self, name: &str) -> Result<(), GitError> {
        self.repo.find_reference(name)?.delete()?;
        Ok(())
    }

    fn clear_rewrite_workspace(&self) -> Result<(), GitError> {
        let Some(workdir) = self.workdir() else {
            return Ok(());
        };
        let scratch = workdir.join(REWRITE_SCRATCH_DIR);
        if scratch.exists() {
            debug!(path = %scratch.display(), "removing stale rewrite directory");
            fs::remove_dir_all(&scratch)?;
        }
        Ok(())
    }

    fn expire_unreachable(&self) -> Result<(), GitError> {
        self.git(["reflog", "expire", "--expire-unreachable=now", "--all"])?;
        Ok(())
    }
}

fn not_found(path: &Path) -> GitError {
    GitError::RepositoryNotFound {
        path: path.display().to_string(),
    }
}

/// Copy the fields reword needs out of a git2 commit
fn extract_commit(git_commit: &git2::Commit<'_>) -> Commit {
    let time = git_commit.author().when();
    let timestamp: DateTime<Utc> = Utc
        .timestamp_opt(time.seconds(), 0)
        .single()
        .unwrap_or_else(Utc::now);

    Commit {
        sha: git_commit.id().to_string(),
        message: git_commit.message().unwrap_or("").to_string(),
        author: git_commit.author().name().unwrap_or("Unknown").to_string(),
        author_email: git_commit.author().email().unwrap_or("").to_string(),
        timestamp,
        parents: git_commit.parent_ids().map(|id| id.to_string()).collect(),
        tree: git_commit.tree_id().to_string(),
    }
}

/// Shell snippet that swaps in the staged message for exactly one commit
fn message_filter_script(target: &str, message_file: &Path) -> String {
    format!(
        "if [ \"$GIT_COMMIT\" = {} ]; then cat {}; else cat; fi",
        shell_quote(target),
        shell_quote(&message_file.to_string_lossy())
    )
}

/// Quote a value for POSIX `sh` using single quotes
#[must_use]
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn test_open_nonexistent_repository() {
        let Err(GitError::RepositoryNotFound { path }) = GitRepo::open("/no/such/reword/repo") else {
            panic!("opened a repository that does not exist");
        };
        assert_eq!(path, "/no/such/reword/repo");
    }

    #[test]
    fn test_walk_options_chain() {
        let options = WalkOptions::newest(10).start_at("main").hide("abc").skip_merges(true);
        assert_eq!(options.limit, Some(10));
        assert_eq!(options.from_refs, vec!["main".to_string()]);
        assert_eq!(options.hide.as_deref(), Some("abc"));
        assert!(options.skip_merges);
        assert!(!options.oldest_first);

        let options = WalkOptions::oldest(3).all_refs();
        assert!(options.oldest_first);
        assert!(options.all_refs);
    }

    #[test]
    fn test_shell_quote_plain() {
        assert_eq!(shell_quote("abc"), "'abc'");
    }

    #[test]
    fn test_shell_quote_embedded_quote() {
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
    }

    #[test]
    fn test_message_filter_script_targets_one_commit() {
        let script = message_filter_script("abc123", Path::new("/repo/.git/msg file"));
        assert_eq!(
            script,
            "if [ \"$GIT_COMMIT\" = 'abc123' ]; then cat '/repo/.git/msg file'; else cat; fi"
        );
    }
}
