// Copyright (c) 2026 - present reword contributors
// SPDX-License-Identifier: MIT

//! Operator input
//!
//! Everything the review loop asks a human goes through [`Operator`], so the
//! loop can be driven by a script in tests.

use dialoguer::theme::{ColorfulTheme, SimpleTheme, Theme};
use dialoguer::{Confirm, Editor, Input, Select};

/// What to do with a candidate message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Rewrite the commit with the candidate
    Accept,
    /// Edit the candidate, then rewrite with the result
    Edit,
    /// Keep the original message
    Reject,
    /// Move on without touching this commit
    Skip,
}

impl Decision {
    /// Menu labels, in menu order
    pub const LABELS: [&'static str; 4] = [
        "Accept",
        "Edit before applying",
        "Keep original message",
        "Skip this commit",
    ];

    /// Decision for a menu index
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Decision::Accept),
            1 => Some(Decision::Edit),
            2 => Some(Decision::Reject),
            3 => Some(Decision::Skip),
            _ => None,
        }
    }
}

/// Operator interaction errors
#[derive(Debug, thiserror::Error)]
pub enum OperatorError {
    /// A prompt could not be shown or read
    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    /// The editor could not be launched or read back
    #[error("Editor failed: {0}")]
    Editor(#[from] std::io::Error),

    /// The menu returned an index outside the known options
    #[error("Unexpected menu selection {0}")]
    InvalidSelection(usize),
}

/// The human on the other end of the review loop
pub trait Operator {
    /// Ask for the reason behind a change; an empty answer means none
    ///
    /// # Errors
    ///
    /// Returns `OperatorError` if the answer cannot be read.
    fn rationale(&self, prompt: &str) -> Result<String, OperatorError>;

    /// Show `original` next to `candidate` and ask what to do
    ///
    /// # Errors
    ///
    /// Returns `OperatorError` if the answer cannot be read.
    fn decide(&self, original: &str, candidate: &str) -> Result<Decision, OperatorError>;

    /// Open an editing session seeded with `seed` and return the result
    ///
    /// # Errors
    ///
    /// Returns `OperatorError` if the editor cannot be run.
    fn edit(&self, seed: &str) -> Result<String, OperatorError>;

    /// Ask a yes/no question that defaults to no
    ///
    /// # Errors
    ///
    /// Returns `OperatorError` if the answer cannot be read.
    fn confirm(&self, prompt: &str) -> Result<bool, OperatorError>;
}

/// Interactive terminal prompts
pub struct TerminalOperator {
    theme: Box<dyn Theme>,
}

impl TerminalOperator {
    /// Create prompts, coloured or plain
    #[must_use]
    pub fn new(use_color: bool) -> Self {
        let theme: Box<dyn Theme> = if use_color {
            Box::new(ColorfulTheme::default())
        } else {
            Box::new(SimpleTheme)
        };
        Self { theme }
    }
}

impl Operator for TerminalOperator {
    fn rationale(&self, prompt: &str) -> Result<String, OperatorError> {
        let answer: String = Input::with_theme(self.theme.as_ref())
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(answer.trim().to_string())
    }

    fn decide(&self, original: &str, candidate: &str) -> Result<Decision, OperatorError> {
        println!();
        println!("{} {}", console::style("Original:").yellow(), original.trim());
        println!("{} {}", console::style("Improved:").green(), candidate);

        let index = Select::with_theme(self.theme.as_ref())
            .with_prompt("Apply the improved message?")
            .items(&Decision::LABELS)
            .default(0)
            .interact()?;
        Decision::from_index(index).ok_or(OperatorError::InvalidSelection(index))
    }

    fn edit(&self, seed: &str) -> Result<String, OperatorError> {
        // An editor closed without saving keeps the candidate
        let edited = Editor::new().extension(".txt").edit(seed)?;
        Ok(edited.unwrap_or_else(|| seed.to_string()))
    }

    fn confirm(&self, prompt: &str) -> Result<bool, OperatorError> {
        Ok(Confirm::with_theme(self.theme.as_ref())
            .with_prompt(prompt)
            .default(false)
            .interact()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_indices_match_labels() {
        assert_eq!(Decision::from_index(0), Some(Decision::Accept));
        assert_eq!(Decision::from_index(1), Some(Decision::Edit));
        assert_eq!(Decision::from_index(2), Some(Decision::Reject));
        assert_eq!(Decision::from_index(3), Some(Decision::Skip));
        assert_eq!(Decision::from_index(Decision::LABELS.len()), None);
    }
}
