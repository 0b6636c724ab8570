//! reword library
//!
//! Wires settings, commit selection, generation, and the review loop
//! together. The binary is a thin wrapper around [`run`].

pub mod config;
pub mod display;
pub mod generate;
pub mod logging;
pub mod operator;
pub mod review;
pub mod settings;

use anyhow::Context;
use reword_git::{GitRepo, ScopeOptions, SelectionError, select};
use tracing::{debug, info};

use crate::config::Config;
use crate::display::Printer;
use crate::generate::OpenRouterClient;
use crate::operator::TerminalOperator;
use crate::review::{ReviewOptions, ReviewWorkflow, RunReport, WorkflowError};
use crate::settings::Settings;

/// Exit status for a completed run
pub const EXIT_OK: u8 = 0;
/// Exit status for selection, settings, and other ordinary errors
pub const EXIT_ERROR: u8 = 1;
/// Exit status when the repository was left in an unknown state
pub const EXIT_UNRECOVERABLE: u8 = 2;

/// Apply command-line overrides that belong in settings
pub fn apply_cli_overrides(settings: &mut Settings, config: &Config) {
    if let Some(model) = config.model.as_deref().filter(|m| !m.trim().is_empty()) {
        settings.provider.model = model.to_string();
    }
}

/// Run reword for parsed command-line options
///
/// # Errors
///
/// Returns an error for unreadable settings, a path outside a repository,
/// an invalid scope, a missing API key, or an unrecoverable rewrite.
pub fn run(config: &Config) -> anyhow::Result<RunReport> {
    let (mut settings, source) =
        Settings::load(config.config.as_deref()).context("Failed to load settings")?;
    apply_cli_overrides(&mut settings, config);
    debug!(source = ?source, model = %settings.provider.model, "settings resolved");

    let repo_path = config.repo_path();
    let repo = GitRepo::discover(&repo_path)
        .map_err(|_| SelectionError::NotARepository(repo_path.display().to_string()))?;

    let scope = ScopeOptions {
        skip_merges: settings.behavior.skip_merge_commits,
        default_count: settings.defaults.default_commit_count,
    };
    let range = select(&repo, config.selection(), &scope)?;

    let printer = Printer::new(settings.formatting.use_color, settings.behavior.show_diff);
    if range.is_empty() {
        printer.nothing_to_do();
        return Ok(RunReport {
            dry_run: config.dry_run,
            ..RunReport::default()
        });
    }

    let generator =
        OpenRouterClient::new(&settings.provider).context("Cannot set up message generation")?;
    let operator = TerminalOperator::new(settings.formatting.use_color);
    let options = ReviewOptions::new(config, &settings);
    info!(commits = range.len(), dry_run = options.dry_run, "starting review");

    let workflow = ReviewWorkflow::new(&repo, &generator, &operator, printer, options);
    let report = workflow.run(&range)?;
    if !report.aborted {
        printer.report(&report);
    }
    Ok(report)
}

/// Map an error from [`run`] to a process exit status
#[must_use]
pub fn exit_code(error: &anyhow::Error) -> u8 {
    match error.downcast_ref::<WorkflowError>() {
        Some(WorkflowError::Unrecoverable { .. }) => EXIT_UNRECOVERABLE,
        _ => EXIT_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_flag_overrides_settings() {
        let mut settings = Settings::default();
        let config = Config {
            model: Some("openai/gpt-4o".to_string()),
            ..Config::default()
        };
        apply_cli_overrides(&mut settings, &config);
        assert_eq!(settings.provider.model, "openai/gpt-4o");
    }

    #[test]
    fn test_blank_model_flag_is_ignored() {
        let mut settings = Settings::default();
        let config = Config {
            model: Some(" ".to_string()),
            ..Config::default()
        };
        apply_cli_overrides(&mut settings, &config);
        assert_eq!(settings.provider.model, "gpt-4");
    }

    #[test]
    fn test_exit_codes() {
        let unrecoverable = anyhow::Error::new(WorkflowError::Unrecoverable {
            target: "abc1234".to_string(),
            reason: "update-ref failed".to_string(),
        });
        assert_eq!(exit_code(&unrecoverable), EXIT_UNRECOVERABLE);

        let selection = anyhow::Error::new(SelectionError::InvalidCount(0));
        assert_eq!(exit_code(&selection), EXIT_ERROR);
    }
}
