//! Command-line surface for reword
//!
//! Parses the commit scope, review behaviour, and logging options. Values
//! given here take precedence over the settings file.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reword_git::{Selection, parse_count};

/// reword - rewrite poor commit messages from their diffs
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "reword")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Which commits to process (defaults to the last N from settings)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Process commits reachable from every branch
    #[arg(long, global = true, conflicts_with = "only_main")]
    pub all_branches: bool,

    /// Process commits reachable from the main/master branch only
    #[arg(long, global = true)]
    pub only_main: bool,

    /// Apply every generated message without asking
    #[arg(long, global = true)]
    pub just_fix_it: bool,

    /// Ask why the changes were made (once for the whole run)
    #[arg(long, global = true)]
    pub ask_why: bool,

    /// Ask why the changes were made, separately for every commit
    #[arg(long, global = true, conflicts_with = "why")]
    pub ask_why_each: bool,

    /// Reason behind the changes, shared by every commit in the run
    #[arg(long, global = true, value_name = "TEXT")]
    pub why: Option<String>,

    /// Model used to generate messages (e.g. gpt-4, anthropic/claude-3.5-sonnet)
    #[arg(long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Show what would change without rewriting anything
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Settings file to use instead of the default lookup
    #[arg(long, global = true, value_name = "PATH", env = "REWORD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Repository to operate on (defaults to the current directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub repo: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    ///
    /// Logs go to stderr so they never mix with prompts.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode - only warnings and errors are logged
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Commit scopes
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Process the last N commits, newest first
    Last {
        /// Number of commits to process
        #[arg(value_parser = parse_positive_count, allow_negative_numbers = true)]
        count: usize,
    },

    /// Process the first N commits, oldest first
    First {
        /// Number of commits to process
        #[arg(value_parser = parse_positive_count, allow_negative_numbers = true)]
        count: usize,
    },

    /// Process every commit on the current branch since it left main/master
    #[command(visible_alias = ".")]
    Branch,
}

/// Parse a commit count, rejecting zero and negative values
fn parse_positive_count(value: &str) -> Result<usize, String> {
    let parsed: i64 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a whole number"))?;
    parse_count(parsed).map_err(|e| e.to_string())
}

impl Config {
    /// Resolve the requested scope; `None` means "last N from settings"
    ///
    /// `--all-branches` and `--only-main` override the command.
    #[must_use]
    pub fn selection(&self) -> Option<Selection> {
        if self.all_branches {
            return Some(Selection::AllBranches);
        }
        if self.only_main {
            return Some(Selection::OnlyMain);
        }
        self.command.as_ref().map(|command| match command {
            Command::Last { count } => Selection::Last(*count),
            Command::First { count } => Selection::First(*count),
            Command::Branch => Selection::CurrentBranch,
        })
    }

    /// Repository path, using the current directory as default
    #[must_use]
    pub fn repo_path(&self) -> PathBuf {
        self.repo.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}
