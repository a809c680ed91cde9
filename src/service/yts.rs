//! Movie listings from the YTS API.

use crate::{
    error::AppError,
    model::movie::{YtsListResponse, YtsMovie},
};

const LIST_URL: &str = "https://yts.mx/api/v2/list_movies.json";
const PAGE_SIZE: u32 = 50;

pub struct YtsClient {
    http: reqwest::Client,
}

impl YtsClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Every movie matching `query` that has a torrent of `quality`, walking
    /// pages until one comes back empty.
    pub async fn list_all_movies(&self, query: &str, quality: &str) -> Result<Vec<YtsMovie>, AppError> {
        let mut movies = Vec::new();
        let mut page = 1;

        loop {
            tracing::debug!("Listing YTS movies for {} page {}", query, page);

            let response = self
                .http
                .get(LIST_URL)
                .query(&[
                    ("limit", PAGE_SIZE.to_string()),
                    ("quality", quality.to_string()),
                    ("query_term", query.to_string()),
                    ("page", page.to_string()),
                ])
                .send()
                .await?
                .error_for_status()?
                .json::<YtsListResponse>()
                .await?;

            if response.data.movies.is_empty() {
                break;
            }

            movies.extend(response.data.movies);
            page += 1;
        }

        Ok(movies)
    }
}
