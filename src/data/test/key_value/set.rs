use super::*;
use sea_orm::{EntityTrait, PaginatorTrait};

/// Tests storing a value under a new key.
///
/// Expected: value readable afterwards
#[tokio::test]
async fn inserts_new_key() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::KeyValue)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = KeyValueRepository::new(db);
    repo.set("greeting", "\"hello\"".to_string()).await?;

    assert_eq!(repo.get("greeting").await?.as_deref(), Some("\"hello\""));

    Ok(())
}

/// Tests that storing under an existing key replaces the value.
///
/// Expected: only the newest value is stored, in a single row
#[tokio::test]
async fn replaces_existing_value() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::KeyValue)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    factory::create_key_value(db, "counter", "1").await?;

    let repo = KeyValueRepository::new(db);
    repo.set("counter", "2".to_string()).await?;

    assert_eq!(repo.get("counter").await?.as_deref(), Some("2"));

    let rows = entity::prelude::KeyValue::find().count(db).await?;
    assert_eq!(rows, 1);

    Ok(())
}
