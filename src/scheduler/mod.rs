//! Background work on cron and interval schedules.
//!
//! A [`Task`] is a unit of work; [`periodic::PeriodicTask`] binds it to a
//! schedule and an error policy, and [`runner::TaskRunner`] starts it once the
//! Discord gateway is ready. The concrete tasks live in the submodules below.

pub mod chat_cleanup;
pub mod hacker_news;
pub mod new_movies;
pub mod periodic;
pub mod player_presence;
pub mod runner;
pub mod schedule;

use serenity::async_trait;

use crate::error::AppError;

/// A unit of periodic work.
#[async_trait]
pub trait Task: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    async fn work(&self) -> Result<(), AppError>;
}
