use chrono::Utc;
use migration::OnConflict;
use sea_orm::{ActiveValue, DatabaseConnection, DbErr, EntityTrait};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::AppError;

/// Durable string markers keyed by name.
///
/// Values are stored as text; the `*_json` accessors encode and decode them with
/// serde_json.
pub struct KeyValueRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> KeyValueRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Gets the raw value stored under `key`.
    ///
    /// # Returns
    /// - `Ok(Some(String))` - Stored value
    /// - `Ok(None)` - Nothing stored under this key
    /// - `Err(DbErr)` - Database error during query
    pub async fn get(&self, key: &str) -> Result<Option<String>, DbErr> {
        let row = entity::prelude::KeyValue::find_by_id(key.to_string())
            .one(self.db)
            .await?;

        Ok(row.map(|row| row.value))
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub async fn set(&self, key: &str, value: String) -> Result<(), DbErr> {
        entity::prelude::KeyValue::insert(entity::key_value::ActiveModel {
            key: ActiveValue::Set(key.to_string()),
            value: ActiveValue::Set(value),
            updated_at: ActiveValue::Set(Utc::now()),
        })
        .on_conflict(
            OnConflict::column(entity::key_value::Column::Key)
                .update_columns([
                    entity::key_value::Column::Value,
                    entity::key_value::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(self.db)
        .await?;

        Ok(())
    }

    /// Gets and decodes the JSON value stored under `key`.
    ///
    /// # Returns
    /// - `Ok(Some(T))` - Decoded value
    /// - `Ok(None)` - Nothing stored under this key
    /// - `Err(AppError::DbErr)` - Database error during query
    /// - `Err(AppError::JsonErr)` - Stored value isn't valid JSON for `T`
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        match self.get(key).await? {
            Some(value) => Ok(Some(serde_json::from_str(&value)?)),
            None => Ok(None),
        }
    }

    /// Encodes `value` as JSON and stores it under `key`.
    pub async fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), AppError> {
        let value = serde_json::to_string(value)?;
        self.set(key, value).await?;
        Ok(())
    }
}
