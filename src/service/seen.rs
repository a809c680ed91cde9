//! Bounded record of item ids that have already been announced.

use sea_orm::DatabaseConnection;

use crate::{data::key_value::KeyValueRepository, error::AppError};

/// FIFO list of seen ids stored as a JSON array under one key.
///
/// Once the list grows past `max_len` the oldest ids are dropped, so an item
/// that was seen long ago may be reported again.
pub struct SeenItems<'a> {
    repo: KeyValueRepository<'a>,
    key: &'static str,
    max_len: usize,
}

impl<'a> SeenItems<'a> {
    pub fn new(db: &'a DatabaseConnection, key: &'static str, max_len: usize) -> Self {
        Self {
            repo: KeyValueRepository::new(db),
            key,
            max_len,
        }
    }

    /// Stored ids, oldest first. Empty if nothing was stored yet.
    pub async fn load(&self) -> Result<Vec<String>, AppError> {
        Ok(self
            .repo
            .get_json::<Vec<String>>(self.key)
            .await?
            .unwrap_or_default())
    }

    /// Keeps only the items whose id hasn't been seen, preserving order.
    pub async fn filter_unseen<T, F>(&self, items: Vec<T>, id: F) -> Result<Vec<T>, AppError>
    where
        F: Fn(&T) -> String,
    {
        let seen = self.load().await?;

        Ok(items
            .into_iter()
            .filter(|item| !seen.contains(&id(item)))
            .collect())
    }

    /// Appends `ids` to the list and trims it to `max_len`, oldest first.
    pub async fn mark_seen<I>(&self, ids: I) -> Result<(), AppError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut seen = self.load().await?;
        for id in ids {
            if !seen.contains(&id) {
                seen.push(id);
            }
        }

        if seen.len() > self.max_len {
            let excess = seen.len() - self.max_len;
            seen.drain(..excess);
        }

        self.repo.set_json(self.key, &seen).await
    }
}
