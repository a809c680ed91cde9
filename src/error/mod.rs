//! Error types shared across the bot.
//!
//! `AppError` is the top-level error type returned by handlers, tasks, repositories
//! and API clients. Errors never cross the dispatch or task-wrapper boundary: they
//! are logged there and dropped, so the variants exist for `?` propagation and for
//! readable log lines rather than for mapping to user-facing responses.

pub mod cache;
pub mod config;
pub mod openai;

use std::sync::Arc;
use thiserror::Error;

use crate::error::{cache::CacheError, config::ConfigError, openai::OpenAiError};

/// Top-level application error type.
///
/// Aggregates every error that can occur while handling an event or running a
/// background task. Most variants use `#[from]` so `?` converts automatically.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error during startup or environment variable loading.
    #[error(transparent)]
    ConfigErr(#[from] ConfigError),

    /// Database operation error from SeaORM.
    #[error(transparent)]
    DbErr(#[from] sea_orm::DbErr),

    /// HTTP client request error from reqwest.
    ///
    /// Covers every third-party API the bot talks to as well as webhook posts.
    #[error(transparent)]
    ReqwestErr(#[from] reqwest::Error),

    /// Discord API error from Serenity.
    ///
    /// Boxed due to large size.
    #[error(transparent)]
    DiscordErr(#[from] Box<serenity::Error>),

    /// Cron scheduler error.
    #[error(transparent)]
    SchedulerErr(#[from] tokio_cron_scheduler::JobSchedulerError),

    /// JSON (de)serialization error, mostly from stored key-value markers.
    #[error(transparent)]
    JsonErr(#[from] serde_json::Error),

    /// Failure inside the single-flight cache machinery.
    #[error(transparent)]
    CacheErr(#[from] CacheError),

    /// OpenAI specific failure that isn't a transport error.
    #[error(transparent)]
    OpenAiErr(#[from] OpenAiError),

    /// A failure shared between every caller of a single-flight cached fetch.
    ///
    /// All waiters on the same promise receive the same `Arc`.
    #[error(transparent)]
    SharedErr(#[from] Arc<AppError>),

    /// A handler or task panicked; caught at the dispatch/task boundary.
    ///
    /// # Fields
    /// - Name of the handler or task that panicked
    #[error("{0} panicked")]
    Panicked(String),

    /// Internal error with custom message.
    ///
    /// # Fields
    /// - Detailed error message for logging
    #[error("{0}")]
    InternalError(String),
}

/// Manual conversion from serenity::Error to AppError.
///
/// Boxes the error to reduce the size of the AppError enum, as serenity::Error
/// is very large and would make all AppError variants larger if not boxed.
impl From<serenity::Error> for AppError {
    fn from(err: serenity::Error) -> Self {
        AppError::DiscordErr(Box::new(err))
    }
}
