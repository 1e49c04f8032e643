//! PostgreSQL document store
//!
//! Each collection is a table of JSONB documents. Filters are evaluated with
//! JSONB containment (`doc @> filter`), which is equality for scalar fields.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio_postgres::{Client, NoTls};

use super::{
    assign_id, into_document, Collection, DeleteOutcome, Document, DocumentStore, Filter,
    InsertOutcome, UpdateOutcome, ID_FIELD,
};
use crate::error::Result;

pub struct PostgresStore {
    client: Client,
    /// Upserts run as a transaction, which needs a connection to itself
    upserts: Mutex<Client>,
}

impl PostgresStore {
    /// Connect and make sure the collection tables exist
    pub async fn connect(url: &str) -> Result<Self> {
        let store = Self {
            client: open(url).await?,
            upserts: Mutex::new(open(url).await?),
        };
        store.migrate().await?;
        tracing::info!("Connected to PostgreSQL document store");
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        for collection in Collection::ALL {
            // Table names come from a closed enum, never from input
            let table = collection.name();
            self.client
                .batch_execute(&format!(
                    "CREATE TABLE IF NOT EXISTS {table} (
                        id TEXT PRIMARY KEY,
                        doc JSONB NOT NULL,
                        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
                    );
                    CREATE INDEX IF NOT EXISTS {table}_doc_idx ON {table} USING GIN (doc jsonb_path_ops);"
                ))
                .await?;
            tracing::debug!("Ensured table {}", table);
        }
        Ok(())
    }
}

async fn open(url: &str) -> Result<Client> {
    let (client, connection) = tokio_postgres::connect(url, NoTls).await?;

    // Spawn the connection handler
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("PostgreSQL connection error: {}", e);
        }
    });

    Ok(client)
}

fn containment(filter: &Filter) -> Value {
    Value::Object(filter.to_document())
}

/// Advisory lock name shared by every upsert on the same collection and filter
fn lock_key(collection: Collection, filter: &Filter) -> String {
    format!("{}:{}", collection.name(), containment(filter))
}

#[async_trait]
impl DocumentStore for PostgresStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>> {
        let sql = format!(
            "SELECT doc FROM {} WHERE doc @> $1::jsonb ORDER BY created_at, id",
            collection.name()
        );
        let rows = self.client.query(&sql, &[&containment(filter)]).await?;

        rows.into_iter()
            .map(|row| into_document(row.get::<_, Value>(0)))
            .collect()
    }

    async fn find_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Document>> {
        let sql = format!(
            "SELECT doc FROM {} WHERE doc @> $1::jsonb ORDER BY created_at, id LIMIT 1",
            collection.name()
        );
        let row = self.client.query_opt(&sql, &[&containment(filter)]).await?;

        row.map(|row| into_document(row.get::<_, Value>(0)))
            .transpose()
    }

    async fn insert_one(&self, collection: Collection, mut doc: Document) -> Result<InsertOutcome> {
        let id = assign_id(&mut doc);
        let sql = format!(
            "INSERT INTO {} (id, doc) VALUES ($1, $2::jsonb)",
            collection.name()
        );
        self.client
            .execute(&sql, &[&id, &Value::Object(doc)])
            .await?;
        Ok(InsertOutcome::new(id))
    }

    async fn upsert_one(
        &self,
        collection: Collection,
        filter: &Filter,
        mut set: Document,
    ) -> Result<UpdateOutcome> {
        set.remove(ID_FIELD);
        let table = collection.name();

        let mut client = self.upserts.lock().await;
        let tx = client.transaction().await?;

        // Held until commit, so a concurrent upsert on the same filter in any
        // process sees this one's insert instead of adding its own
        tx.execute(
            "SELECT pg_advisory_xact_lock(hashtext($1))",
            &[&lock_key(collection, filter)],
        )
        .await?;

        // `||` replaces top-level keys; the subquery still sees the old row
        let sql = format!(
            "UPDATE {table} AS t SET doc = t.doc || $2::jsonb
             FROM (SELECT id, doc FROM {table} WHERE doc @> $1::jsonb ORDER BY created_at, id LIMIT 1) AS m
             WHERE t.id = m.id
             RETURNING m.doc IS DISTINCT FROM t.doc"
        );
        let updated = tx
            .query_opt(&sql, &[&containment(filter), &Value::Object(set.clone())])
            .await?;

        let outcome = match updated {
            Some(row) => UpdateOutcome::matched(row.get::<_, bool>(0)),
            None => {
                let mut doc = filter.to_document();
                doc.remove(ID_FIELD);
                doc.extend(set);
                let id = assign_id(&mut doc);
                let sql = format!("INSERT INTO {table} (id, doc) VALUES ($1, $2::jsonb)");
                tx.execute(&sql, &[&id, &Value::Object(doc)]).await?;
                UpdateOutcome::upserted(id)
            }
        };

        tx.commit().await?;
        Ok(outcome)
    }

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<DeleteOutcome> {
        let table = collection.name();
        let sql = format!(
            "DELETE FROM {table} WHERE id = (
                SELECT id FROM {table} WHERE doc @> $1::jsonb ORDER BY created_at, id LIMIT 1
            )"
        );
        let deleted = self.client.execute(&sql, &[&containment(filter)]).await?;
        Ok(DeleteOutcome::new(deleted))
    }
}
