mod common;

use cloudant::{IndexOptions, SortDirection};
use common::{spawn_database, DB_NAME};

#[tokio::test]
async fn test_create_index_with_generated_names() {
    let client = spawn_database().await;
    let db = client.database(DB_NAME);

    let created = db.create_index(&["Year"], &IndexOptions::new()).await.unwrap();
    assert_eq!(created.result, "created");
    assert!(created.id.starts_with("_design/"));

    let again = db.create_index(&["Year"], &IndexOptions::new()).await.unwrap();
    assert_eq!(again.result, "exists");
    assert_eq!(again.id, created.id);
}

#[tokio::test]
async fn test_create_named_index_twice() {
    let client = spawn_database().await;
    let db = client.database(DB_NAME);

    let options = IndexOptions::new().index_name("get-minute-second");
    let fields = ["GetMinute", "GetSecond"];

    let created = db.create_index(&fields, &options).await.unwrap();
    assert_eq!(created.result, "created");

    let again = db.create_index(&fields, &options).await.unwrap();
    assert_eq!(again.result, "exists");
    assert_eq!(again.id, created.id);
}

#[tokio::test]
async fn test_list_indexes() {
    let client = spawn_database().await;
    let db = client.database(DB_NAME);

    let indexes = db.indices().await.unwrap();
    assert_eq!(indexes.len(), 1);
    assert_eq!(indexes[0].name, "_all_docs");
    assert!(indexes[0].ddoc.is_none());

    let options = IndexOptions::new()
        .index_name("year-make")
        .design_document_name("autos");
    db.create_index(&["Year", "Make"], &options).await.unwrap();

    let indexes = db.indices().await.unwrap();
    assert_eq!(indexes.len(), 2);
    assert_eq!(indexes[1].name, "year-make");
    assert_eq!(indexes[1].ddoc.as_deref(), Some("_design/autos"));
    assert_eq!(indexes[1].index_type, "json");
    assert_eq!(indexes[1].definition.field_names(), vec!["Year", "Make"]);
}

#[tokio::test]
async fn test_index_by_name() {
    let client = spawn_database().await;
    let db = client.database(DB_NAME);

    let options = IndexOptions::new().index_name("by-model");
    db.create_index(&["Model"], &options).await.unwrap();

    let index = db.index_by_name("by-model").await.unwrap();
    assert_eq!(index.name, "by-model");
    assert_eq!(index.definition.field_names(), vec!["Model"]);

    let err = db.index_by_name("does_not_exist").await.unwrap_err();
    let service = err.as_service().unwrap();
    assert!(service.is_synthesized_not_found());
    assert_eq!(err.to_string(), "(404) Not Found (404): not_found missing");
}

#[tokio::test]
async fn test_index_design_document() {
    let client = spawn_database().await;
    let db = client.database(DB_NAME);

    let options = IndexOptions::new()
        .index_name("by-year")
        .design_document_name("autos");
    db.create_index(&["Year"], &options).await.unwrap();

    let ddoc = db.index_design_document("autos").await.unwrap();
    assert_eq!(ddoc.meta.id.as_deref(), Some("_design/autos"));
    assert_eq!(ddoc.language, "query");
    assert_eq!(ddoc.view_keys(), vec!["by-year"]);

    let view = &ddoc.views["by-year"];
    assert_eq!(view.map.fields.get("Year"), Some(&SortDirection::Asc));
    assert_eq!(view.reduce, "_count");
    assert_eq!(view.options.definition.fields, vec!["Year".to_string()]);

    // Same document through the prefixed id
    let same = db.get_design_document("_design/autos").await.unwrap();
    assert_eq!(same, ddoc);
}

#[tokio::test]
async fn test_delete_index_by_name() {
    let client = spawn_database().await;
    let db = client.database(DB_NAME);

    let options = IndexOptions::new().index_name("by-make");
    db.create_index(&["Make"], &options).await.unwrap();

    let deleted = db.delete_index_by_name("by-make").await.unwrap();
    assert!(deleted.ok);

    let err = db.index_by_name("by-make").await.unwrap_err();
    assert!(err.as_service().unwrap().is_synthesized_not_found());

    let err = db.delete_index_by_name("by-make").await.unwrap_err();
    assert_eq!(err.status_code(), Some(404));
}

#[tokio::test]
async fn test_builtin_index_cannot_be_deleted() {
    let client = spawn_database().await;
    let db = client.database(DB_NAME);

    let err = db.delete_index_by_name("_all_docs").await.unwrap_err();
    assert!(err.as_service().unwrap().is_synthesized_not_found());
}
