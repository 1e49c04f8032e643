//! PostgreSQL document store tests
//! Runs the in-memory store scenarios against a real database
//!
//! Run with: DATABASE_URL=postgres://... cargo test --test postgres_store_tests
//! Note: Skipped when DATABASE_URL is unset

use std::sync::Arc;

use serde_json::{json, Value};
use shelter_guru::store::{Collection, Document, DocumentStore, Filter, MemoryStore, PostgresStore};

/// Connect to the database named by DATABASE_URL, if any
async fn connect() -> Option<PostgresStore> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) if !url.is_empty() => url,
        _ => {
            println!("⚠ Skipping test: DATABASE_URL not set");
            return None;
        }
    };

    match PostgresStore::connect(&url).await {
        Ok(store) => Some(store),
        Err(e) => panic!("✗ Failed to connect to PostgreSQL: {}", e),
    }
}

fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

/// Tables persist between runs, so every test works under its own marker
fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4())
}

#[tokio::test]
async fn test_dotted_filter_matches_like_memory_store() {
    let Some(pg) = connect().await else { return };
    let memory = MemoryStore::new();
    let host = format!("{}@x.com", unique("host"));

    let homes = [
        json!({ "title": "Cabin", "host": { "email": host, "name": "H" } }),
        json!({ "title": "Loft", "host": { "email": "someone@else.com" } }),
        json!({ "title": "Barn", "host": { "email": host } }),
    ];
    for home in homes {
        pg.insert_one(Collection::Homes, doc(home.clone())).await.unwrap();
        memory.insert_one(Collection::Homes, doc(home)).await.unwrap();
    }

    let filter = Filter::eq("host.email", host.as_str());
    let titles = |docs: Vec<Document>| -> Vec<Value> {
        docs.into_iter().map(|d| d["title"].clone()).collect()
    };

    let from_pg = titles(pg.find(Collection::Homes, &filter).await.unwrap());
    let from_memory = titles(memory.find(Collection::Homes, &filter).await.unwrap());
    assert_eq!(from_pg, vec![json!("Cabin"), json!("Barn")]);
    assert_eq!(from_pg, from_memory);
}

#[tokio::test]
async fn test_upsert_inserts_then_updates() {
    let Some(store) = connect().await else { return };
    let email = format!("{}@x.com", unique("user"));
    let filter = Filter::eq("email", email.as_str());

    let first = store
        .upsert_one(Collection::Users, &filter, doc(json!({ "role": "guest" })))
        .await
        .unwrap();
    assert_eq!(first.upserted_count, 1);
    assert!(first.upserted_id.is_some());

    let second = store
        .upsert_one(Collection::Users, &filter, doc(json!({ "role": "host" })))
        .await
        .unwrap();
    assert_eq!(second.matched_count, 1);
    assert_eq!(second.modified_count, 1);

    let unchanged = store
        .upsert_one(Collection::Users, &filter, doc(json!({ "role": "host" })))
        .await
        .unwrap();
    assert_eq!(unchanged.matched_count, 1);
    assert_eq!(unchanged.modified_count, 0);

    let users = store.find(Collection::Users, &filter).await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["email"], json!(email));
    assert_eq!(users[0]["role"], "host");
}

#[tokio::test]
async fn test_concurrent_upserts_keep_one_document() {
    let Some(store) = connect().await else { return };
    let store = Arc::new(store);
    let email = format!("{}@x.com", unique("racer"));

    let mut handles = Vec::new();
    for i in 0..20 {
        let store = Arc::clone(&store);
        let email = email.clone();
        handles.push(tokio::spawn(async move {
            store
                .upsert_one(
                    Collection::Users,
                    &Filter::eq("email", email.as_str()),
                    doc(json!({ "visits": i })),
                )
                .await
                .unwrap()
        }));
    }

    let mut inserted = 0;
    for handle in handles {
        inserted += handle.await.unwrap().upserted_count;
    }

    let users = store
        .find(Collection::Users, &Filter::eq("email", email.as_str()))
        .await
        .unwrap();
    assert_eq!(inserted, 1);
    assert_eq!(users.len(), 1);
}

#[tokio::test]
async fn test_delete_removes_first_match_only() {
    let Some(store) = connect().await else { return };
    let city = unique("city");

    for title in ["A", "B"] {
        store
            .insert_one(Collection::Homes, doc(json!({ "title": title, "city": city })))
            .await
            .unwrap();
    }

    let filter = Filter::eq("city", city.as_str());
    let outcome = store.delete_one(Collection::Homes, &filter).await.unwrap();
    assert_eq!(outcome.deleted_count, 1);

    let left = store.find(Collection::Homes, &filter).await.unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0]["title"], "B");

    let missing = store
        .delete_one(Collection::Homes, &Filter::eq("city", unique("nowhere")))
        .await
        .unwrap();
    assert_eq!(missing.deleted_count, 0);
}

#[tokio::test]
async fn test_find_by_id_and_missing() {
    let Some(store) = connect().await else { return };
    let id = unique("booking");

    let outcome = store
        .insert_one(Collection::Bookings, doc(json!({ "_id": id, "guestEmail": "g@x.com" })))
        .await
        .unwrap();
    assert_eq!(outcome.inserted_id, id);

    let found = store
        .find_one(Collection::Bookings, &Filter::by_id(&id))
        .await
        .unwrap()
        .expect("booking should exist");
    assert_eq!(found["guestEmail"], "g@x.com");

    assert!(store
        .find_one(Collection::Bookings, &Filter::by_id(&unique("missing")))
        .await
        .unwrap()
        .is_none());
}
