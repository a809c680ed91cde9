use super::*;

/// Tests storing and reading back a JSON list.
///
/// Expected: the same list is decoded
#[tokio::test]
async fn stores_and_decodes_json() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::KeyValue)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = KeyValueRepository::new(db);
    repo.set_json("ids", &vec![3_u64, 1, 2]).await?;

    let ids: Option<Vec<u64>> = repo.get_json("ids").await?;

    assert_eq!(ids, Some(vec![3, 1, 2]));

    Ok(())
}

/// Tests reading a value that isn't valid JSON for the requested type.
///
/// Expected: Err(AppError::JsonErr)
#[tokio::test]
async fn rejects_malformed_json() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::KeyValue)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    factory::create_key_value(db, "ids", "not json").await?;

    let repo = KeyValueRepository::new(db);
    let result = repo.get_json::<Vec<u64>>("ids").await;

    assert!(matches!(result, Err(AppError::JsonErr(_))));

    Ok(())
}
