//! Most of these run against a live server at `mongodb://localhost:27017/`.
//!
//! `docker run --name mongodb -d -p 27017:27017 mongo:latest`, then
//! `cargo test -p scholar --test mongo -- --ignored`.

use scholar::{Backend, DocumentStore, Filter, MongoStore, ScholarError, Session, StoreConfig, Update};

fn config(collection: &str) -> StoreConfig {
    StoreConfig {
        collection: collection.to_owned(),
        ..StoreConfig::default()
    }
}

#[tokio::test]
#[ignore = "requires a running MongoDB server"]
async fn walkthrough_against_server() {
    let session = Session::connect(&config("students_walkthrough_test")).await.unwrap();
    let report = session.run().await.unwrap();

    assert_eq!(report.count, 6);
    assert_eq!(report.inserted_ids.len(), 5);
    assert!(report.listing.iter().all(|d| !d.contains_key("_id")));
    assert_eq!(report.deleted_many.deleted, 3);
    assert_eq!(report.count_after, 2);
    assert!(report.found_after.is_none());
}

#[tokio::test]
#[ignore = "requires a running MongoDB server"]
async fn upsert_against_server() {
    let store = MongoStore::connect(&config("students_upsert_test")).await.unwrap();
    store.clear().await.unwrap();

    let outcome = store
        .update_one(&Filter::equals("name", "Hans"), &Update::set("age", 52), true)
        .await
        .unwrap();
    assert!(outcome.upserted_id.is_some());

    let created = store
        .find_one(&Filter::equals("name", "Hans"), None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(created.get_i32("age").unwrap(), 52);
    assert_eq!(store.count(&Filter::All).await.unwrap(), 1);

    store.clear().await.unwrap();
    store.close().await.unwrap();
}

#[tokio::test]
async fn unreachable_server_is_a_connection_error() {
    let config = StoreConfig {
        uri: "mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=200".to_owned(),
        backend: Backend::Mongo,
        ..StoreConfig::default()
    };
    let err = Session::connect(&config).await.unwrap_err();
    assert!(matches!(err, ScholarError::Connection { .. }));
}
