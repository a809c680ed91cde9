//! Popular Hacker News stories through the Algolia search API.

use serde_json::{json, Value};

use crate::{
    error::AppError,
    model::hacker_news::{HackerNewsItem, HackerNewsPage},
};

const SEARCH_URL: &str = "https://hn.algolia.com/api/v1/search_by_date";
const MIN_POINTS: u32 = 300;
const EMBED_COLOR: u32 = 15560749;

pub struct HackerNewsClient {
    http: reqwest::Client,
}

impl HackerNewsClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Stories with at least 300 points from the first `pages` result pages,
    /// oldest first.
    pub async fn popular_stories(&self, pages: u32) -> Result<Vec<HackerNewsItem>, AppError> {
        let mut items = Vec::new();

        for page in 0..pages {
            let result = self
                .http
                .get(SEARCH_URL)
                .query(&[
                    ("numericFilters", format!("points>={}", MIN_POINTS)),
                    ("page", page.to_string()),
                ])
                .send()
                .await?
                .error_for_status()?
                .json::<HackerNewsPage>()
                .await?;

            items.extend(result.hits);
        }

        items.reverse();
        Ok(items)
    }
}

/// Host part of `url`, or `None` if it can't be parsed.
fn domain(url: &str) -> Option<String> {
    reqwest::Url::parse(url)
        .ok()?
        .host_str()
        .map(str::to_string)
}

/// Discord embed announcing a story.
pub fn story_embed(item: &HackerNewsItem) -> Value {
    let link = match (&item.url, item.url.as_deref().and_then(domain)) {
        (Some(url), Some(domain)) => format!(" [({})]({})", domain, url),
        _ => String::new(),
    };

    json!({
        "description": format!(
            "### {}{}\n[{} comments]({})",
            item.title,
            link,
            item.num_comments,
            item.discussion_url()
        ),
        "color": EMBED_COLOR,
    })
}
