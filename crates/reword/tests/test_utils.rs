// Copyright (c) 2026 - present reword contributors
// SPDX-License-Identifier: MIT

//! Shared helpers for reword's integration tests: scratch directories,
//! scratch repositories driven through the `git` CLI, and environment guards.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

// ============================================================================
// Scratch directories
// ============================================================================

/// A scratch directory removed on drop
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// Create a directory whose name starts with the test name
    pub fn new(test_name: &str) -> Self {
        let dir = tempfile::Builder::new()
            .prefix(&format!("reword-{test_name}-"))
            .tempdir()
            .expect("scratch directory");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` to `relative_path`, creating parents as needed
    pub fn create_file(&self, relative_path: &str, content: &str) -> PathBuf {
        let path = self.path().join(relative_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("parent directories");
        }
        fs::write(&path, content).expect("write scratch file");
        path
    }
}

// ============================================================================
// Scratch repositories
// ============================================================================

/// A temporary git repository on branch `main`
pub struct TestGitRepo {
    scratch: ScratchDir,
}

impl TestGitRepo {
    /// Create and initialize a repository
    pub fn new(test_name: &str) -> Self {
        let repo = Self {
            scratch: ScratchDir::new(test_name),
        };
        repo.git(&["init", "--quiet"]);
        repo.git(&["symbolic-ref", "HEAD", "refs/heads/main"]);
        repo.git(&["config", "user.email", "test@example.com"]);
        repo.git(&["config", "user.name", "Test Author"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        repo
    }

    pub fn path(&self) -> &Path {
        self.scratch.path()
    }

    /// One commit per message, each adding `src/module_<i>.rs`; returns SHAs
    pub fn commit_messages(&self, messages: &[&str]) -> Vec<String> {
        let mut shas = Vec::with_capacity(messages.len());
        for (i, message) in messages.iter().enumerate() {
            let file = format!("src/module_{i}.rs");
            self.scratch.create_file(&file, &format!("pub fn f{i}() {{}}\n"));
            self.git(&["add", &file]);
            self.git(&["commit", "--quiet", "-m", message]);
            shas.push(self.head());
        }
        shas
    }

    /// Modify a tracked file without staging it
    pub fn dirty(&self, relative_path: &str) {
        self.scratch.create_file(relative_path, "uncommitted edit\n");
    }

    /// Pretend the current branch was pushed to a remote
    pub fn publish(&self) {
        self.git(&["remote", "add", "origin", "https://example.invalid/repo.git"]);
        let branch = self.git(&["rev-parse", "--abbrev-ref", "HEAD"]);
        self.git(&[
            "update-ref",
            &format!("refs/remotes/origin/{branch}"),
            "HEAD",
        ]);
    }

    /// SHA of HEAD
    pub fn head(&self) -> String {
        self.git(&["rev-parse", "HEAD"])
    }

    /// Full messages from newest to oldest
    pub fn messages(&self) -> Vec<String> {
        self.git(&["log", "--format=%B%x00"])
            .split('\0')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Number of commits reachable from HEAD
    pub fn commit_count(&self) -> usize {
        self.git(&["rev-list", "--count", "HEAD"])
            .parse()
            .unwrap_or(0)
    }

    /// Every ref under `refs/original/`
    pub fn backup_refs(&self) -> Vec<String> {
        self.git(&["for-each-ref", "--format=%(refname)", "refs/original/"])
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Run git and return trimmed stdout, panicking on failure
    pub fn git(&self, args: &[&str]) -> String {
        run_git(self.path(), args)
    }
}

fn run_git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .current_dir(dir)
        .args(args)
        .output()
        .expect("spawn git");
    assert!(
        output.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

// ============================================================================
// Environment
// ============================================================================

/// Restores one environment variable to its previous value on drop
///
/// Callers hold a per-binary lock while any guard is alive.
pub struct EnvGuard {
    key: String,
    previous: Option<String>,
}

impl EnvGuard {
    pub fn set(key: &str, value: &str) -> Self {
        let guard = Self::capture(key);
        // SAFETY: serialized by the caller's lock
        unsafe { std::env::set_var(key, value) };
        guard
    }

    pub fn remove(key: &str) -> Self {
        let guard = Self::capture(key);
        // SAFETY: serialized by the caller's lock
        unsafe { std::env::remove_var(key) };
        guard
    }

    fn capture(key: &str) -> Self {
        Self {
            key: key.to_string(),
            previous: std::env::var(key).ok(),
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        // SAFETY: serialized by the caller's lock
        unsafe {
            match self.previous.take() {
                Some(value) => std::env::set_var(&self.key, value),
                None => std::env::remove_var(&self.key),
            }
        }
    }
}
