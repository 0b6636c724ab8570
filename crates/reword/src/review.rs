// Copyright (c) 2026 - present reword contributors
// SPDX-License-Identifier: MIT

//! Review workflow
//!
//! Drives one commit at a time: inspect, show, ask why, generate, ask what
//! to do, rewrite. Targets are translated through every earlier rewrite
//! before they are inspected, because rebuilding an ancestor renames all of
//! its descendants.

use reword_git::{
    CommitRange, GitError, GitRepo, ReferenceMap, RewriteEngine, RewriteOutcome, RewriteRequest,
    commit::short_sha,
};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::display::Printer;
use crate::generate::{MessageGenerator, build_prompt, clean_message};
use crate::operator::{Decision, Operator, OperatorError};
use crate::settings::{MessageStyle, Settings};

/// Where the reason behind a change comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RationaleMode {
    /// Never ask
    Off,
    /// The same text for every commit
    Fixed(String),
    /// Ask once for the run; single-commit runs ask for that commit
    Once,
    /// Ask for every commit
    EachCommit,
}

impl RationaleMode {
    /// Pick the mode from command-line flags and settings
    ///
    /// An explicit `--why` wins, then per-commit prompting, then a single
    /// prompt for the run.
    #[must_use]
    pub fn resolve(config: &Config, settings: &Settings) -> Self {
        if let Some(why) = config.why.as_deref().map(str::trim).filter(|w| !w.is_empty()) {
            return RationaleMode::Fixed(why.to_string());
        }
        let asking = config.ask_why || config.ask_why_each || settings.defaults.prompt_user_for_why;
        if !asking {
            return RationaleMode::Off;
        }
        if config.ask_why_each || settings.behavior.rationale_per_commit {
            RationaleMode::EachCommit
        } else {
            RationaleMode::Once
        }
    }
}

/// Knobs for one run of the workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewOptions {
    /// Accept every candidate without asking
    pub auto_apply: bool,
    /// Go through the motions without rewriting
    pub dry_run: bool,
    /// Where rationales come from
    pub rationale: RationaleMode,
    /// Strip enclosing quotes from candidates and edits
    pub remove_quotes: bool,
    /// Confirm before rewriting a branch that exists on a remote
    pub warn_on_shared_branches: bool,
    /// Shape requested from the generator
    pub message_style: MessageStyle,
}

impl ReviewOptions {
    /// Combine settings with command-line overrides
    #[must_use]
    pub fn new(config: &Config, settings: &Settings) -> Self {
        Self {
            auto_apply: config.just_fix_it || settings.defaults.auto_apply,
            dry_run: config.dry_run,
            rationale: RationaleMode::resolve(config, settings),
            remove_quotes: settings.behavior.remove_quotes,
            warn_on_shared_branches: settings.behavior.warn_on_shared_branches,
            message_style: settings.formatting.message_style,
        }
    }
}

impl Default for ReviewOptions {
    fn default() -> Self {
        Self::new(&Config::default(), &Settings::default())
    }
}

/// What happened over a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Commits rewritten (or that would be, in a dry run)
    pub rewritten: usize,
    /// Commits whose candidate was rejected
    pub kept: usize,
    /// Commits skipped by the operator
    pub skipped: usize,
    /// Rewrites that failed and were rolled back
    pub failed: usize,
    /// Commits that could not be inspected or had no candidate
    pub unavailable: usize,
    /// The operator declined the shared-branch warning
    pub aborted: bool,
    /// Nothing was written
    pub dry_run: bool,
}

impl RunReport {
    /// Commits the run looked at
    #[must_use]
    pub fn processed(&self) -> usize {
        self.rewritten + self.kept + self.skipped + self.failed + self.unavailable
    }
}

/// Errors that end a run
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// A rewrite failed and could not be rolled back
    #[error("Rewriting {target} failed and could not be rolled back: {reason}")]
    Unrecoverable {
        /// Short SHA of the commit being rewritten
        target: String,
        /// What went wrong
        reason: String,
    },

    /// The operator could not be asked
    #[error(transparent)]
    Operator(#[from] OperatorError),

    /// The repository could not be read
    #[error(transparent)]
    Repository(#[from] GitError),
}

/// The per-commit review loop
pub struct ReviewWorkflow<'a, G: MessageGenerator, O: Operator> {
    repo: &'a GitRepo,
    generator: &'a G,
    operator: &'a O,
    printer: Printer,
    options: ReviewOptions,
}

impl<'a, G: MessageGenerator, O: Operator> ReviewWorkflow<'a, G, O> {
    /// Wire up a workflow
    #[must_use]
    pub fn new(
        repo: &'a GitRepo,
        generator: &'a G,
        operator: &'a O,
        printer: Printer,
        options: ReviewOptions,
    ) -> Self {
        Self {
            repo,
            generator,
            operator,
            printer,
            options,
        }
    }

    /// Process every commit in `range`, in order
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::Unrecoverable` as soon as a rollback fails; no
    /// further commits are touched after that. Operator and repository
    /// failures outside a single commit also end the run.
    pub fn run(&self, range: &CommitRange) -> Result<RunReport, WorkflowError> {
        let mut report = RunReport {
            dry_run: self.options.dry_run,
            ..RunReport::default()
        };

        let Some(first) = range.iter().next() else {
            self.printer.nothing_to_do();
            return Ok(report);
        };

        if !self.confirm_shared_branch()? {
            report.aborted = true;
            self.printer.aborted();
            return Ok(report);
        }

        let per_commit = match self.options.rationale {
            RationaleMode::EachCommit => true,
            RationaleMode::Once => range.len() == 1,
            RationaleMode::Off | RationaleMode::Fixed(_) => false,
        };
        let shared_rationale = match &self.options.rationale {
            RationaleMode::Fixed(text) => Some(text.clone()),
            RationaleMode::Once if range.len() > 1 => {
                self.printer
                    .rationale_header(short_sha(first), range.len() - 1);
                non_empty(self.operator.rationale("Why did you make these changes? (optional)")?)
            }
            _ => None,
        };

        let mut engine = RewriteEngine::new(self.repo);
        let mut renamed = ReferenceMap::new();

        for original in range {
            let target = renamed.resolve(original).to_string();
            if target != *original {
                debug!(from = %short_sha(original), to = %short_sha(&target), "following rewritten commit");
            }

            let record = match self.repo.inspect(&target) {
                Ok(record) => record,
                Err(e) => {
                    warn!(target = %short_sha(&target), error = %e, "cannot inspect commit");
                    self.printer.error(&format!(
                        "Could not get information for commit {}",
                        short_sha(&target)
                    ));
                    report.unavailable += 1;
                    continue;
                }
            };
            self.printer.commit(&record);

            let rationale = if per_commit {
                self.printer.rationale_header(record.commit.short_sha(), 0);
                non_empty(self.operator.rationale("Why did you make this change? (optional)")?)
            } else {
                shared_rationale.clone()
            };

            let prompt = build_prompt(
                &record.diff,
                record.original_message(),
                rationale.as_deref(),
                self.options.message_style,
            );
            self.printer.generating(self.generator.model());
            let candidate = match self.generator.generate(&prompt) {
                Ok(raw) => clean_message(&raw, self.options.remove_quotes),
                Err(e) => {
                    warn!(target = %short_sha(&target), error = %e, "generation failed");
                    self.printer
                        .error(&format!("Could not generate improved message: {e}"));
                    report.unavailable += 1;
                    continue;
                }
            };
            if candidate.is_empty() {
                self.printer.error("Generated message was empty");
                report.unavailable += 1;
                continue;
            }

            let Some(message) = self.choose(record.original_message(), candidate, &mut report)?
            else {
                continue;
            };

            self.printer.applying(&message, self.options.dry_run);
            if self.options.dry_run {
                report.rewritten += 1;
                continue;
            }

            match engine.rewrite(&RewriteRequest::new(&target, message)) {
                RewriteOutcome::Success {
                    previous_head,
                    new_head,
                    ..
                } => {
                    report.rewritten += 1;
                    self.printer.rewritten();
                    match renamed.record(self.repo, &previous_head, &new_head) {
                        Ok(count) => debug!(count, "recorded renamed commits"),
                        Err(e) => warn!(error = %e, "could not track renamed commits"),
                    }
                }
                RewriteOutcome::Failure {
                    reason,
                    recovered: true,
                } => {
                    report.failed += 1;
                    self.printer
                        .error(&format!("Failed to rewrite commit message: {reason}"));
                }
                RewriteOutcome::Failure {
                    reason,
                    recovered: false,
                } => {
                    error!(target = %short_sha(&target), %reason, "stopping after unrecoverable failure");
                    self.printer.unrecoverable(&reason);
                    return Err(WorkflowError::Unrecoverable {
                        target: short_sha(&target).to_string(),
                        reason,
                    });
                }
            }
        }

        info!(
            rewritten = report.rewritten,
            kept = report.kept,
            skipped = report.skipped,
            failed = report.failed,
            unavailable = report.unavailable,
            "review finished"
        );
        Ok(report)
    }

    /// Ask before touching a branch other people may have
    ///
    /// Returns `false` when the operator declines.
    fn confirm_shared_branch(&self) -> Result<bool, WorkflowError> {
        if !self.options.warn_on_shared_branches || self.options.dry_run {
            return Ok(true);
        }
        if !self.repo.is_shared_branch()? {
            return Ok(true);
        }

        self.printer.shared_branch();
        if self.options.auto_apply {
            warn!("rewriting a shared branch without confirmation (auto-apply)");
            return Ok(true);
        }
        Ok(self.operator.confirm("Continue?")?)
    }

    /// Turn a candidate into the message to apply, or `None` to leave the commit
    fn choose(
        &self,
        original: &str,
        candidate: String,
        report: &mut RunReport,
    ) -> Result<Option<String>, WorkflowError> {
        if self.options.auto_apply {
            return Ok(Some(candidate));
        }

        match self.operator.decide(original, &candidate)? {
            Decision::Accept => Ok(Some(candidate)),
            Decision::Edit => {
                let edited = clean_message(
                    &self.operator.edit(&candidate)?,
                    self.options.remove_quotes,
                );
                if edited.is_empty() {
                    self.printer.warning("Edited message is empty");
                    self.printer.kept();
                    report.kept += 1;
                    return Ok(None);
                }
                Ok(Some(edited))
            }
            Decision::Reject => {
                self.printer.kept();
                report.kept += 1;
                Ok(None)
            }
            Decision::Skip => {
                self.printer.skipped();
                report.skipped += 1;
                Ok(None)
            }
        }
    }
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
