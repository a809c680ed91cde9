//! Hacker News digest posted to a webhook.

use chrono_tz::Tz;
use sea_orm::DatabaseConnection;
use serenity::async_trait;
use std::collections::HashSet;
use std::time::Duration;

use crate::{
    error::AppError,
    model::hacker_news::HackerNewsItem,
    scheduler::{schedule::CronSchedule, Task},
    service::{
        hacker_news::{story_embed, HackerNewsClient},
        seen::SeenItems,
        webhook::Webhook,
    },
};

const SEEN_KEY: &str = "hacker_news_seen_items";
const SEEN_MAX_LEN: usize = 200;
const PAGES: u32 = 5;
const POST_INTERVAL: Duration = Duration::from_secs(1);

pub const WEBHOOK_USERNAME: &str = "HackerNews";
pub const WEBHOOK_AVATAR_URL: &str = "https://news.ycombinator.com/y18.gif";

pub fn schedule(timezone: Tz) -> CronSchedule {
    CronSchedule::new("*/5 * * * *", timezone)
}

/// Stories not announced before, oldest first, each id at most once.
///
/// Their ids are recorded as seen before anything is posted, so a failing
/// webhook never causes the same story to be posted twice.
async fn claim_new_stories(
    seen: &SeenItems<'_>,
    stories: Vec<HackerNewsItem>,
) -> Result<Vec<HackerNewsItem>, AppError> {
    let mut ids = HashSet::new();
    let stories: Vec<HackerNewsItem> = stories
        .into_iter()
        .filter(|story| ids.insert(story.id.clone()))
        .collect();

    let new_stories = seen.filter_unseen(stories, |story| story.id.clone()).await?;
    seen.mark_seen(new_stories.iter().map(|story| story.id.clone()))
        .await?;

    Ok(new_stories)
}

pub struct HackerNewsTask {
    db: DatabaseConnection,
    client: HackerNewsClient,
    webhook: Webhook,
}

impl HackerNewsTask {
    pub fn new(db: DatabaseConnection, client: HackerNewsClient, webhook: Webhook) -> Self {
        Self {
            db,
            client,
            webhook,
        }
    }
}

#[async_trait]
impl Task for HackerNewsTask {
    fn name(&self) -> &str {
        "hacker_news"
    }

    async fn work(&self) -> Result<(), AppError> {
        let stories = self.client.popular_stories(PAGES).await?;
        let seen = SeenItems::new(&self.db, SEEN_KEY, SEEN_MAX_LEN);
        let new_stories = claim_new_stories(&seen, stories).await?;

        tracing::info!("Found {} new Hacker News stories", new_stories.len());

        for story in &new_stories {
            if let Err(e) = self.webhook.post_embed(&story_embed(story)).await {
                tracing::error!("Failed to post Hacker News story {}: {}", story.id, e);
            }
            tokio::time::sleep(POST_INTERVAL).await;
        }

        Ok(())
    }
}
