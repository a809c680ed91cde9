//! OpenAI chat completions with a moderation pre-check.

use serde::{Deserialize, Serialize};
use serenity::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::{
    error::{openai::OpenAiError, AppError},
    model::chat::ChatMessage,
    util::retry::{retry, RetryPolicy},
};

const BASE_URL: &str = "https://api.openai.com/v1";
const TEMPERATURE: f64 = 0.1;

/// 3 s between attempts, at most 5 attempts or 60 s.
const CHAT_RETRY: RetryPolicy = RetryPolicy::new(Duration::from_secs(3), 5, Duration::from_secs(60));

#[derive(Debug, Serialize)]
struct ModerationRequest<'a> {
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct ModerationResponse {
    results: Vec<ModerationResult>,
}

#[derive(Debug, Deserialize)]
struct ModerationResult {
    #[serde(default)]
    categories: BTreeMap<String, bool>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    id: String,
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

/// Names of the flagged categories, in alphabetical order.
fn flagged_categories(response: ModerationResponse) -> Vec<String> {
    response
        .results
        .into_iter()
        .next()
        .map(|result| {
            result
                .categories
                .into_iter()
                .filter_map(|(name, flagged)| flagged.then_some(name))
                .collect()
        })
        .unwrap_or_default()
}

fn completion_text(response: ChatResponse) -> Result<String, AppError> {
    if let Some(usage) = &response.usage {
        tracing::info!(
            "Used {} tokens for request {}",
            usage.total_tokens,
            response.id
        );
    }

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| OpenAiError::EmptyCompletion.into())
}

fn is_retryable(err: &AppError) -> bool {
    !matches!(err, AppError::OpenAiErr(OpenAiError::ModerationFlagged(_)))
}

/// Something that can continue a chat conversation.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Answer to the last message of `messages`.
    async fn complete(&self, messages: &[ChatMessage], user: Option<&str>) -> Result<String, AppError>;
}

/// Minimal OpenAI API client.
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(http: reqwest::Client, api_key: String, model: String) -> Self {
        Self {
            http,
            api_key,
            model,
        }
    }

    /// Categories the moderation endpoint flags `text` for; empty if it's fine.
    pub async fn moderation(&self, text: &str) -> Result<Vec<String>, AppError> {
        let response = self
            .http
            .post(format!("{}/moderations", BASE_URL))
            .bearer_auth(&self.api_key)
            .json(&ModerationRequest { input: text })
            .send()
            .await?
            .error_for_status()?
            .json::<ModerationResponse>()
            .await?;

        Ok(flagged_categories(response))
    }

    /// Completes a conversation.
    ///
    /// The latest message is checked by the moderation endpoint first. Transient
    /// failures are retried; a moderation rejection is not.
    ///
    /// # Arguments
    /// - `messages` - Whole conversation, oldest first
    /// - `user` - End-user identifier forwarded to OpenAI
    ///
    /// # Returns
    /// - `Ok(String)` - Assistant answer
    /// - `Err(AppError::OpenAiErr(OpenAiError::ModerationFlagged))` - Latest message was flagged
    /// - `Err(AppError)` - Request failed on every attempt
    pub async fn chat(&self, messages: &[ChatMessage], user: Option<&str>) -> Result<String, AppError> {
        retry("OpenAI chat", CHAT_RETRY, is_retryable, || {
            self.chat_once(messages, user)
        })
        .await
    }

    async fn chat_once(&self, messages: &[ChatMessage], user: Option<&str>) -> Result<String, AppError> {
        let latest = messages
            .last()
            .map(|message| message.content.text())
            .unwrap_or_default();

        let flags = self.moderation(&latest).await?;
        if !flags.is_empty() {
            tracing::warn!(
                "Chat message prevented because of policy violations ({}), message: {}",
                flags.join(", "),
                latest
            );
            return Err(OpenAiError::ModerationFlagged(flags).into());
        }

        tracing::debug!("Sending OpenAI chat request with {} messages", messages.len());

        let response = self
            .http
            .post(format!("{}/chat/completions", BASE_URL))
            .bearer_auth(&self.api_key)
            .json(&ChatRequest {
                model: &self.model,
                messages,
                temperature: TEMPERATURE,
                user,
            })
            .send()
            .await?
            .error_for_status()?
            .json::<ChatResponse>()
            .await?;

        completion_text(response)
    }
}

#[async_trait]
impl ChatBackend for OpenAiClient {
    async fn complete(&self, messages: &[ChatMessage], user: Option<&str>) -> Result<String, AppError> {
        self.chat(messages, user).await
    }
}
