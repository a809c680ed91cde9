use serde::Deserialize;

/// A story returned by the Algolia Hacker News search API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HackerNewsItem {
    #[serde(rename = "objectID")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub url: Option<String>,
    #[serde(default)]
    pub num_comments: u32,
    #[serde(default)]
    pub points: u32,
}

impl HackerNewsItem {
    pub fn discussion_url(&self) -> String {
        format!("https://news.ycombinator.com/item?id={}", self.id)
    }
}

/// One page of search results.
#[derive(Debug, Deserialize)]
pub struct HackerNewsPage {
    #[serde(default)]
    pub hits: Vec<HackerNewsItem>,
}
