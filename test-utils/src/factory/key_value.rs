//! Key-value factory for seeding stored markers.

use crate::factory::helpers::next_id;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for creating key-value rows with customizable fields.
///
/// # Example
///
/// ```rust,ignore
/// use test_utils::factory::key_value::KeyValueFactory;
///
/// let row = KeyValueFactory::new(&db)
///     .key("new_movie:42")
///     .value("true")
///     .build()
///     .await?;
/// ```
pub struct KeyValueFactory<'a> {
    db: &'a DatabaseConnection,
    key: String,
    value: String,
    updated_at: DateTime<Utc>,
}

impl<'a> KeyValueFactory<'a> {
    /// Creates a new KeyValueFactory with default values.
    ///
    /// Defaults:
    /// - key: `"key_{id}"` where id is auto-incremented
    /// - value: `"null"`
    /// - updated_at: now
    pub fn new(db: &'a DatabaseConnection) -> Self {
        let id = next_id();
        Self {
            db,
            key: format!("key_{}", id),
            value: "null".to_string(),
            updated_at: Utc::now(),
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Sets the raw stored value. It must be valid JSON to be readable through
    /// the repository's JSON accessors.
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Sets the stored value to the JSON encoding of `value`.
    pub fn json(mut self, value: &serde_json::Value) -> Self {
        self.value = value.to_string();
        self
    }

    pub fn updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = updated_at;
        self
    }

    /// Builds and inserts the row into the database.
    ///
    /// # Returns
    /// - `Ok(entity::key_value::Model)` - Created row
    /// - `Err(DbErr)` - Database error during insert
    pub async fn build(self) -> Result<entity::key_value::Model, DbErr> {
        entity::key_value::ActiveModel {
            key: ActiveValue::Set(self.key),
            value: ActiveValue::Set(self.value),
            updated_at: ActiveValue::Set(self.updated_at),
        }
        .insert(self.db)
        .await
    }
}

/// Creates a key-value row with the given key and raw JSON value.
///
/// Shorthand for `KeyValueFactory::new(db).key(key).value(value).build().await`.
pub async fn create_key_value(
    db: &DatabaseConnection,
    key: impl Into<String>,
    value: impl Into<String>,
) -> Result<entity::key_value::Model, DbErr> {
    KeyValueFactory::new(db).key(key).value(value).build().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TestBuilder;
    use entity::prelude::*;

    #[tokio::test]
    async fn creates_row_with_defaults() -> Result<(), DbErr> {
        let test = TestBuilder::new().with_table(KeyValue).build().await.unwrap();
        let db = test.db.as_ref().unwrap();

        let row = KeyValueFactory::new(db).build().await?;

        assert!(row.key.starts_with("key_"));
        assert_eq!(row.value, "null");

        Ok(())
    }

    #[tokio::test]
    async fn creates_row_with_json_value() -> Result<(), DbErr> {
        let test = TestBuilder::new().with_table(KeyValue).build().await.unwrap();
        let db = test.db.as_ref().unwrap();

        let row = KeyValueFactory::new(db)
            .key("seen")
            .json(&serde_json::json!([1, 2]))
            .build()
            .await?;

        assert_eq!(row.key, "seen");
        assert_eq!(row.value, "[1,2]");

        Ok(())
    }
}
