mod common;

use cloudant::{ClientError, Document, RawDocument};
use common::{spawn_database, Automobile, DB_NAME};
use uuid::Uuid;

#[tokio::test]
async fn test_create_document_without_id() {
    let client = spawn_database().await;
    let db = client.database(DB_NAME);

    let auto = Automobile::new(1960, "Cadillac", "Eldorado", "");
    let created = db.create_document(&auto, false).await.unwrap();

    assert!(created.ok);
    assert!(!created.id.is_empty());
    assert!(created.rev.starts_with("1-"));

    let fetched: Automobile = db.get_document(&created.id).await.unwrap();
    assert_eq!(fetched.id(), Some(created.id.as_str()));
    assert_eq!(fetched.revision(), Some(created.rev.as_str()));
    assert_eq!(fetched.model, "Eldorado");
}

#[tokio::test]
async fn test_create_document_with_id() {
    let client = spawn_database().await;
    let db = client.database(DB_NAME);

    let id = format!("eldorado-{}", Uuid::new_v4().simple());
    let mut auto = Automobile::new(1960, "Cadillac", "Eldorado", "");
    auto.set_id(id.clone());

    let created = db.create_document(&auto, false).await.unwrap();
    assert_eq!(created.id, id);

    let err = db.create_document(&auto, false).await.unwrap_err();
    assert!(err.as_service().unwrap().is_conflict());
}

#[tokio::test]
async fn test_create_document_in_batch_mode() {
    let client = spawn_database().await;
    let db = client.database(DB_NAME);

    let doc = RawDocument::with_id("batched").field("Year", 1999);
    let created = db.create_document(&doc, true).await.unwrap();

    assert!(created.ok);
    assert_eq!(created.id, "batched");

    let fetched: RawDocument = db.get_document("batched").await.unwrap();
    assert_eq!(fetched.get("Year"), Some(&serde_json::json!(1999)));
}

#[tokio::test]
async fn test_get_missing_document() {
    let client = spawn_database().await;
    let db = client.database(DB_NAME);

    let err = db.get_document::<RawDocument>("nope").await.unwrap_err();
    let service = err.as_service().unwrap();
    assert_eq!(service.status_code, 404);
    assert_eq!(service.status, "404 Not Found");
    assert_eq!(service.code, "not_found");
    assert_eq!(service.detail, "missing");
}

#[tokio::test]
async fn test_update_document_bumps_revision() {
    let client = spawn_database().await;
    let db = client.database(DB_NAME);

    let created = db
        .create_document(&Automobile::new(1960, "Cadillac", "Eldorado", ""), false)
        .await
        .unwrap();

    let mut auto: Automobile = db.get_document(&created.id).await.unwrap();
    auto.trim = "Biarritz".to_string();
    let first = db.update_document(&auto, false).await.unwrap();
    assert_eq!(first.id, created.id);
    assert!(first.rev.starts_with("2-"));
    assert_ne!(first.rev, created.rev);

    auto.set_revision(first.rev.clone());
    auto.year = 1961;
    let second = db.update_document(&auto, false).await.unwrap();
    assert!(second.rev.starts_with("3-"));
    assert_ne!(second.rev, first.rev);

    let fetched: Automobile = db.get_document(&created.id).await.unwrap();
    assert_eq!(fetched.year, 1961);
    assert_eq!(fetched.trim, "Biarritz");
}

#[tokio::test]
async fn test_update_with_stale_revision_conflicts() {
    let client = spawn_database().await;
    let db = client.database(DB_NAME);

    let created = db
        .create_document(&Automobile::new(1960, "Cadillac", "Eldorado", ""), false)
        .await
        .unwrap();

    let mut auto: Automobile = db.get_document(&created.id).await.unwrap();
    db.update_document(&auto, false).await.unwrap();

    // Still holding the first revision
    auto.year = 1970;
    let err = db.update_document(&auto, false).await.unwrap_err();
    let service = err.as_service().unwrap();
    assert_eq!(service.status_code, 409);
    assert_eq!(service.code, "conflict");
    assert_eq!(service.detail, "Document update conflict.");
}

#[tokio::test]
async fn test_update_in_batch_mode() {
    let client = spawn_database().await;
    let db = client.database(DB_NAME);

    let created = db
        .create_document(&Automobile::new(1960, "Cadillac", "Eldorado", ""), false)
        .await
        .unwrap();

    let mut auto: Automobile = db.get_document(&created.id).await.unwrap();
    auto.year = 1962;
    let updated = db.update_document(&auto, true).await.unwrap();
    assert!(updated.ok);
    assert_eq!(updated.id, created.id);

    let fetched: Automobile = db.get_document(&created.id).await.unwrap();
    assert_eq!(fetched.year, 1962);
}

#[tokio::test]
async fn test_delete_document() {
    let client = spawn_database().await;
    let db = client.database(DB_NAME);

    let created = db
        .create_document(&Automobile::new(1960, "Cadillac", "Eldorado", ""), false)
        .await
        .unwrap();

    let err = db.delete_document(&created.id, "1-stale").await.unwrap_err();
    assert_eq!(err.status_code(), Some(409));

    let deleted = db.delete_document(&created.id, &created.rev).await.unwrap();
    assert!(deleted.ok);
    assert_ne!(deleted.rev, created.rev);

    let err = db.get_document::<Automobile>(&created.id).await.unwrap_err();
    let service = err.as_service().unwrap();
    assert_eq!(service.status_code, 404);
    assert_eq!(service.detail, "deleted");
}

#[tokio::test]
async fn test_decode_mismatch_is_reported() {
    let client = spawn_database().await;
    let db = client.database(DB_NAME);

    let doc = RawDocument::with_id("odd").field("Year", "nineteen sixty");
    db.create_document(&doc, false).await.unwrap();

    let err = db.get_document::<Automobile>("odd").await.unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));
}

#[tokio::test]
async fn test_missing_database() {
    let client = spawn_database().await;
    let db = client.database("elsewhere");

    let err = db
        .create_document(&RawDocument::new().field("Year", 1960), false)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(404));
}

#[tokio::test]
async fn test_ids_with_reserved_characters() {
    let client = spawn_database().await;
    let db = client.database(DB_NAME);

    let plain = RawDocument::with_id("car").field("Model", "Diablo");
    db.create_document(&plain, false).await.unwrap();

    let odd_id = "car#1/x?y";
    let odd = RawDocument::with_id(odd_id).field("Model", "F430");
    let created = db.create_document(&odd, false).await.unwrap();
    assert_eq!(created.id, odd_id);

    let mut fetched: RawDocument = db.get_document(odd_id).await.unwrap();
    assert_eq!(fetched.id(), Some(odd_id));
    assert_eq!(fetched.get("Model"), Some(&serde_json::json!("F430")));

    fetched.fields.insert("Trim".to_string(), serde_json::json!("sport"));
    let updated = db.update_document(&fetched, false).await.unwrap();
    assert_eq!(updated.id, odd_id);

    db.delete_document(odd_id, &updated.rev).await.unwrap();

    // The neighbouring document is untouched
    let plain: RawDocument = db.get_document("car").await.unwrap();
    assert_eq!(plain.get("Model"), Some(&serde_json::json!("Diablo")));
    assert!(plain.get("Trim").is_none());
}
