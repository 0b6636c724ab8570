//! Terminal output for the review loop

use console::style;
use reword_git::CommitRecord;

use crate::review::RunReport;

/// Diff lines shown per commit before truncating
pub const MAX_DIFF_LINES: usize = 20;

/// First `max_lines` lines of `diff`, with a note about the rest
#[must_use]
pub fn truncate_diff(diff: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = diff.trim_end().lines().collect();
    if lines.len() <= max_lines {
        return lines.join("\n");
    }
    format!(
        "{}\n... {} more lines ...",
        lines[..max_lines].join("\n"),
        lines.len() - max_lines
    )
}

/// One-line summary of a run
#[must_use]
pub fn summarize(report: &RunReport) -> String {
    let verb = if report.dry_run {
        "would rewrite"
    } else {
        "rewritten"
    };
    format!(
        "{} {verb}, {} kept, {} skipped, {} failed, {} unavailable",
        report.rewritten, report.kept, report.skipped, report.failed, report.unavailable
    )
}

/// Prints progress of the review loop to stdout
#[derive(Debug, Clone, Copy)]
pub struct Printer {
    show_diff: bool,
}

impl Printer {
    /// Create a printer; colours follow `use_color`
    #[must_use]
    pub fn new(use_color: bool, show_diff: bool) -> Self {
        if !use_color {
            console::set_colors_enabled(false);
        }
        Self { show_diff }
    }

    pub fn commit(&self, record: &CommitRecord) {
        println!();
        println!("{} {}", style("Commit:").cyan(), record.commit.short_sha());
        println!("{} {}", style("Author:").cyan(), record.commit.author_line());
        println!(
            "{} {}",
            style("Original message:").cyan(),
            record.original_message()
        );
        if self.show_diff {
            println!();
            println!("{} {}", style("Diff:").cyan(), style(record.summary.to_string()).dim());
            println!("{}", truncate_diff(&record.diff, MAX_DIFF_LINES));
        }
    }

    pub fn rationale_header(&self, first: &str, remaining: usize) {
        println!();
        if remaining == 0 {
            println!("{} {first}", style("Commit:").cyan());
        } else {
            println!("{} {first} (and {remaining} more)", style("Commit:").cyan());
        }
    }

    pub fn generating(&self, model: &str) {
        println!();
        println!("Generating improved message using {}...", style(model).bold());
    }

    pub fn applying(&self, message: &str, dry_run: bool) {
        let label = if dry_run { "Would apply:" } else { "Applying:" };
        println!();
        println!("{} {message}", style(label).green());
    }

    pub fn rewritten(&self) {
        println!("{}", style("Successfully rewrote commit message").green());
    }

    pub fn kept(&self) {
        println!("{}", style("Keeping original message").yellow());
    }

    pub fn skipped(&self) {
        println!("{}", style("Skipping this commit").yellow());
    }

    pub fn error(&self, message: &str) {
        println!("{} {message}", style("Error:").red());
    }

    pub fn warning(&self, message: &str) {
        println!("{} {message}", style("Warning:").yellow());
    }

    pub fn shared_branch(&self) {
        self.warning(
            "You are about to modify commit messages on a shared branch. \
             Other developers will need to reconcile the rewritten history. \
             Consider creating a new branch first.",
        );
    }

    pub fn unrecoverable(&self, reason: &str) {
        println!();
        println!(
            "{} {reason}",
            style("The repository may be in an inconsistent state:").red().bold()
        );
        println!("Inspect it with `git status` and `git log` before running reword again.");
    }

    pub fn nothing_to_do(&self) {
        println!("No commits to process");
    }

    pub fn aborted(&self) {
        println!("Aborting.");
    }

    pub fn report(&self, report: &RunReport) {
        println!();
        println!("{} {}", style("Done!").bold(), summarize(report));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn test_short_diff_is_unchanged() {
        assert_eq!(truncate_diff("+a\n-b\n", MAX_DIFF_LINES), "+a\n-b");
    }

    #[test]
    fn test_long_diff_is_truncated() {
        let diff: String = (0..25).map(|i| format!("+line {i}\n")).collect();
        let shown = truncate_diff(&diff, MAX_DIFF_LINES);
        assert_eq!(shown.lines().count(), MAX_DIFF_LINES + 1);
        assert!(shown.starts_with("+line 0\n"));
        assert!(shown.ends_with("... 5 more lines ..."));
    }

    #[test]
    fn test_exactly_max_lines_is_not_truncated() {
        let diff: String = (0..MAX_DIFF_LINES).map(|i| format!("{i}\n")).collect();
        assert!(!truncate_diff(&diff, MAX_DIFF_LINES).contains("more lines"));
    }

    #[test]
    fn test_summary() {
        let report = RunReport {
            rewritten: 2,
            kept: 1,
            skipped: 1,
            failed: 0,
            unavailable: 1,
            ..RunReport::default()
        };
        assert_eq!(
            summarize(&report),
            "2 rewritten, 1 kept, 1 skipped, 0 failed, 1 unavailable"
        );
        let dry = RunReport {
            dry_run: true,
            ..report
        };
        assert!(summarize(&dry).starts_with("2 would rewrite"));
    }
}
