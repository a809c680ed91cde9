//! Expiry of old chat conversations.

use chrono::{TimeDelta, Utc};
use chrono_tz::Tz;
use serenity::async_trait;
use std::sync::Arc;

use crate::{
    command::chat::ConversationStore,
    error::AppError,
    scheduler::{schedule::CronSchedule, Task},
};

pub fn schedule(timezone: Tz) -> CronSchedule {
    CronSchedule::new("*/30 * * * * *", timezone).run_on_start()
}

pub struct ChatCleanupTask {
    conversations: Arc<ConversationStore>,
    max_age: TimeDelta,
}

impl ChatCleanupTask {
    pub fn new(conversations: Arc<ConversationStore>) -> Self {
        Self {
            conversations,
            max_age: TimeDelta::hours(24),
        }
    }
}

#[async_trait]
impl Task for ChatCleanupTask {
    fn name(&self) -> &str {
        "chat_cleanup"
    }

    async fn work(&self) -> Result<(), AppError> {
        let removed = self
            .conversations
            .remove_older_than(self.max_age, Utc::now())
            .await;

        if removed > 0 {
            tracing::info!("Deleted {} old chat conversations", removed);
        }

        Ok(())
    }
}
