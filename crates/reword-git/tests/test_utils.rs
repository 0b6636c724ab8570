// Copyright (c) 2026 - present reword contributors
// SPDX-License-Identifier: MIT

//! Scratch repositories for reword-git integration tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// A throwaway git repository on branch `main`
pub struct TestGitRepo {
    dir: TempDir,
}

impl TestGitRepo {
    /// Create and initialize a repository
    pub fn new(test_name: &str) -> Self {
        let dir = tempfile::Builder::new()
            .prefix(&format!("reword-git-{test_name}-"))
            .tempdir()
            .expect("scratch directory");
        let repo = Self { dir };
        repo.git(&["init", "--quiet"]);
        repo.git(&["symbolic-ref", "HEAD", "refs/heads/main"]);
        repo.git(&["config", "user.email", "test@example.com"]);
        repo.git(&["config", "user.name", "Test Author"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        repo
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file without staging it
    pub fn write_file(&self, relative_path: &str, content: &str) {
        let path = self.path().join(relative_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("parent directories");
        }
        fs::write(&path, content).expect("write file");
    }

    /// Write and stage a file
    pub fn stage_file(&self, relative_path: &str, content: &str) {
        self.write_file(relative_path, content);
        self.git(&["add", relative_path]);
    }

    /// Write, stage and commit a file; returns the new HEAD
    pub fn commit_file(&self, relative_path: &str, content: &str, message: &str) -> String {
        self.stage_file(relative_path, content);
        self.git(&["commit", "--quiet", "-m", message]);
        self.head()
    }

    /// Create `messages.len()` commits, each touching its own file
    pub fn commit_all(&self, messages: &[&str]) -> Vec<String> {
        let offset = self.commit_count();
        messages
            .iter()
            .enumerate()
            .map(|(i, message)| {
                self.commit_file(
                    &format!("file_{}.txt", offset + i),
                    &format!("content {i}\n"),
                    message,
                )
            })
            .collect()
    }

    pub fn head(&self) -> String {
        self.git(&["rev-parse", "HEAD"])
    }

    /// Subjects from newest to oldest
    pub fn subjects(&self) -> Vec<String> {
        self.git(&["log", "--format=%s"])
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Tree ids from newest to oldest
    pub fn trees(&self) -> Vec<String> {
        self.git(&["log", "--format=%T"])
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn commit_count(&self) -> usize {
        if self.git_status(&["rev-parse", "--verify", "--quiet", "HEAD"]) {
            self.git(&["rev-list", "--count", "HEAD"])
                .parse()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Every ref under `refs/original/`
    pub fn backup_refs(&self) -> Vec<String> {
        self.git(&["for-each-ref", "--format=%(refname)", "refs/original/"])
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Files left in `.git` by message staging
    pub fn staged_message_files(&self) -> Vec<PathBuf> {
        fs::read_dir(self.path().join(".git"))
            .expect("read .git")
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("reword-msg-"))
            })
            .collect()
    }

    /// Run git and return trimmed stdout, panicking on failure
    pub fn git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .current_dir(self.path())
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

    /// Run git and report only whether it succeeded
    pub fn git_status(&self, args: &[&str]) -> bool {
        Command::new("git")
            .current_dir(self.path())
            .args(args)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}
