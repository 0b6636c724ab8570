// Copyright (c) 2026 - present reword contributors
// SPDX-License-Identifier: MIT

//! Message generation
//!
//! Builds the prompt for one commit, sends it to an OpenAI-compatible chat
//! completions endpoint, and tidies the returned candidate.

use std::fmt::Write as _;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::settings::{MessageStyle, ProviderSettings};

/// System message sent with every request
pub const SYSTEM_PROMPT: &str = "You are a senior software engineer with expertise in writing clear, concise, and informative Git commit messages.";

const REFERER: &str = "https://github.com/reword-dev/reword";
const TITLE: &str = "reword";

/// Generation errors
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// No API key in settings or environment
    #[error("No API key configured (set OPENROUTER_API_KEY or provider.api_key)")]
    MissingApiKey,

    /// The API key cannot be sent as a header
    #[error("API key contains characters that are not allowed in a header")]
    InvalidApiKey,

    /// Transport failure, timeout, or undecodable body
    #[error("Request to generation service failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("Generation service returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Start of the response body
        body: String,
    },

    /// The response did not contain a candidate message
    #[error("Malformed response from generation service: {0}")]
    Malformed(String),

    /// The candidate was empty after cleaning
    #[error("Generation service returned an empty message")]
    Empty,
}

/// Something that turns a prompt into a candidate commit message
pub trait MessageGenerator {
    /// Model identifier, for display
    fn model(&self) -> &str;

    /// Produce a raw candidate for `prompt`
    ///
    /// # Errors
    ///
    /// Returns `GenerationError` when no candidate could be obtained.
    fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Build the prompt for one commit
#[must_use]
pub fn build_prompt(
    diff: &str,
    original_message: &str,
    rationale: Option<&str>,
    style: MessageStyle,
) -> String {
    let mut prompt = format!(
        "Rewrite the following Git commit message based on the diff and context.\n\n\
         Commit Diff:\n```\n{}\n```\n\n\
         Original Message:\n\"{}\"\n",
        diff.trim_end(),
        original_message.trim()
    );

    if let Some(reason) = rationale.map(str::trim).filter(|r| !r.is_empty()) {
        let _ = write!(
            prompt,
            "\nAdditional Context:\nThe developer indicated the goal of this commit was to \"{reason}\".\n"
        );
    }

    prompt.push_str(
        "\nRespond only with the improved commit message. Follow these guidelines:\n\
         1. Be concise but descriptive\n\
         2. Start with a verb in the present tense (e.g., \"Add\", \"Fix\", \"Update\")\n\
         3. Explain what changed and why, if apparent from the diff\n\
         4. Keep it under 72 characters for the first line\n",
    );
    match style {
        MessageStyle::Descriptive => prompt.push_str(
            "5. You may add a more detailed explanation after a blank line if necessary\n",
        ),
        MessageStyle::Conventional => prompt.push_str(
            "5. You may add a more detailed explanation after a blank line if necessary\n\
             6. Use the Conventional Commits format: type(optional scope): subject, \
             where type is one of feat, fix, docs, style, refactor, perf, test, build, ci, chore\n",
        ),
        MessageStyle::Concise => {
            prompt.push_str("5. Respond with the subject line only, without a body\n");
        }
    }
    prompt
}

/// Trim a candidate and optionally strip one pair of enclosing double quotes
#[must_use]
pub fn clean_message(message: &str, remove_quotes: bool) -> String {
    let trimmed = message.trim();
    if remove_quotes && trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        return trimmed[1..trimmed.len() - 1].trim().to_string();
    }
    trimmed.to_string()
}

// ============================================================================
// OpenRouter
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Blocking client for OpenRouter's chat completions API
pub struct OpenRouterClient {
    http: Client,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenRouterClient {
    /// Build a client from provider settings
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::MissingApiKey` when no key is configured.
    pub fn new(provider: &ProviderSettings) -> Result<Self, GenerationError> {
        let api_key = provider
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(GenerationError::MissingApiKey)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|_| GenerationError::InvalidApiKey)?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("http-referer", HeaderValue::from_static(REFERER));
        headers.insert("x-title", HeaderValue::from_static(TITLE));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(provider.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: provider.base_url.trim_end_matches('/').to_string(),
            model: provider.model.clone(),
            temperature: provider.temperature,
            max_tokens: provider.max_tokens,
        })
    }
}

impl MessageGenerator for OpenRouterClient {
    fn model(&self) -> &str {
        &self.model
    }

    fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let url = format!("{}/chat/completions", self.base_url);
        debug!(%url, model = %self.model, "requesting candidate message");
        let response = self.http.post(&url).json(&request).send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let text = response.text()?;
        let content = extract_content(&text)?;
        info!(model = %self.model, chars = content.len(), "generated candidate message");
        Ok(content)
    }
}

/// Pull `choices[0].message.content` out of a chat completion response body
///
/// # Errors
///
/// Returns `GenerationError::Malformed` when the body is not a completion
/// or carries no content.
pub fn extract_content(body: &str) -> Result<String, GenerationError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| GenerationError::Malformed(e.to_string()))?;
    let content = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::Malformed("no choices".to_string()))?
        .message
        .content
        .ok_or_else(|| GenerationError::Malformed("no message content".to_string()))?;

    let content = content.trim();
    if content.is_empty() {
        return Err(GenerationError::Empty);
    }
    Ok(content.to_string())
}
