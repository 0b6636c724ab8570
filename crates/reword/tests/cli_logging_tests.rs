// Copyright (c) 2026 - present reword contributors
// SPDX-License-Identifier: MIT

//! CLI tests for logging flags and their interaction with commit scopes
//!
//! Logging goes to stderr, so the level only decides how chatty a run is;
//! these tests pin down how `-v` and `-q` combine with everything else.

use clap::Parser;
use reword::config::{Command, Config};
use reword_git::Selection;
use tracing::Level;

fn parse(args: &[&str]) -> Config {
    Config::try_parse_from(std::iter::once("reword").chain(args.iter().copied()))
        .expect("parse should succeed")
}

// ============================================================================
// --verbose / --quiet
// ============================================================================

#[test]
fn test_verbose_flags() {
    for flag in ["-v", "--verbose"] {
        let config = parse(&[flag]);
        assert!(config.verbose);
        assert!(!config.quiet);
        assert_eq!(config.log_level(), Level::DEBUG);
    }
}

#[test]
fn test_quiet_flags() {
    for flag in ["-q", "--quiet"] {
        let config = parse(&[flag]);
        assert!(config.quiet);
        assert!(!config.verbose);
        assert_eq!(config.log_level(), Level::WARN);
    }
}

#[test]
fn test_no_flags_means_info_level() {
    let config = parse(&[]);
    assert_eq!(config.log_level(), Level::INFO);
}

#[test]
fn test_boolean_flags_take_no_value() {
    for arg in ["--verbose=true", "--quiet=false", "--dry-run=true"] {
        let result = Config::try_parse_from(["reword", arg]);
        assert!(result.is_err(), "accepted {arg}");
    }
}

#[test]
fn test_verbose_wins_over_quiet() {
    for args in [["-v", "-q"], ["-q", "-v"]] {
        let config = parse(&args);
        assert!(config.verbose);
        assert!(config.quiet);
        assert_eq!(config.log_level(), Level::DEBUG);
    }
}

#[test]
fn test_repeated_flags_rejected() {
    assert!(Config::try_parse_from(["reword", "-v", "-v"]).is_err());
    assert!(Config::try_parse_from(["reword", "-q", "-q"]).is_err());
}

// ============================================================================
// Logging flags with scopes
// ============================================================================

#[test]
fn test_verbose_before_subcommand() {
    let config = parse(&["-v", "last", "3"]);
    assert!(config.verbose);
    assert_eq!(config.command, Some(Command::Last { count: 3 }));
}

#[test]
fn test_quiet_after_subcommand() {
    // Global flags are accepted on either side of the scope
    let config = parse(&["first", "2", "--quiet"]);
    assert!(config.quiet);
    assert_eq!(config.selection(), Some(Selection::First(2)));
}

#[test]
fn test_verbose_with_branch_alias() {
    let config = parse(&[".", "-v"]);
    assert!(config.verbose);
    assert_eq!(config.selection(), Some(Selection::CurrentBranch));
}

// ============================================================================
// Combined with other flags
// ============================================================================

#[test]
fn test_all_flags_combined() {
    let config = parse(&[
        "-v",
        "--repo",
        "/tmp/project",
        "--model",
        "openai/gpt-4o",
        "--dry-run",
        "--just-fix-it",
        "--ask-why-each",
        "last",
        "4",
    ]);

    assert!(config.verbose);
    assert!(config.dry_run);
    assert!(config.just_fix_it);
    assert!(config.ask_why_each);
    assert_eq!(config.model.as_deref(), Some("openai/gpt-4o"));
    assert_eq!(config.repo_path(), std::path::PathBuf::from("/tmp/project"));
    assert_eq!(config.selection(), Some(Selection::Last(4)));
    assert_eq!(config.log_level(), Level::DEBUG);
}

#[test]
fn test_why_conflicts_with_ask_why_each() {
    let result = Config::try_parse_from(["reword", "--why", "faster CI", "--ask-why-each"]);
    assert!(result.is_err());
}

#[test]
fn test_quiet_does_not_change_scope() {
    let quiet = parse(&["-q", "--only-main"]);
    let loud = parse(&["--only-main"]);
    assert_eq!(quiet.selection(), loud.selection());
    assert_ne!(quiet.log_level(), loud.log_level());
}
