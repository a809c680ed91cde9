use super::*;

/// Tests reading a stored value.
///
/// Expected: Ok(Some(value))
#[tokio::test]
async fn returns_stored_value() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::KeyValue)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    factory::create_key_value(db, "movies", "[\"tt01\"]").await?;

    let repo = KeyValueRepository::new(db);
    let result = repo.get("movies").await?;

    assert_eq!(result.as_deref(), Some("[\"tt01\"]"));

    Ok(())
}

/// Tests reading a key that was never stored.
///
/// Expected: Ok(None)
#[tokio::test]
async fn returns_none_for_missing_key() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::KeyValue)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = KeyValueRepository::new(db);

    assert!(repo.get("missing").await?.is_none());

    Ok(())
}
