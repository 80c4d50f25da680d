//! SQLite-backed document store.
//!
//! # Responsibility
//! - Persist both collections as JSON bodies in the `documents` table.
//! - Translate field filters into `json_extract` predicates.
//!
//! # Invariants
//! - The wrapped connection has been migrated (`open_db`/`open_db_in_memory`).
//! - Field names are validated before they are spliced into SQL paths.
//! - Read paths reject bodies that are not JSON objects.
//! - Reads return documents in insertion (`rowid`) order.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::store::{
    new_document_id, validate_filters, Collection, Document, DocumentStore, FieldEquals,
    StoreError, StoreResult, StoredDocument,
};
use async_trait::async_trait;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, TransactionBehavior};
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

const DOCUMENT_SELECT_SQL: &str = "SELECT id, body FROM documents";

/// Document store over one SQLite connection.
///
/// Every call runs on tokio's blocking pool and holds the connection for
/// its whole duration, so calls are serialized. A tokio runtime must be
/// running.
pub struct SqliteDocumentStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDocumentStore {
    /// Wraps an already migrated connection.
    pub fn try_new(conn: Connection) -> StoreResult<Self> {
        let db_version = current_user_version(&conn)?;
        if db_version != latest_version() {
            return Err(DbError::SchemaNotReady { db_version }.into());
        }
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::try_new(open_db(path)?)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    async fn with_conn<T, F>(&self, work: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> StoreResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().unwrap_or_else(PoisonError::into_inner);
            work(&mut *conn)
        })
        .await
        .map_err(|err| StoreError::Unavailable(format!("sqlite worker failed: {err}")))?
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn insert(&self, collection: Collection, fields: Document) -> StoreResult<String> {
        let id = new_document_id();
        let body = serde_json::to_string(&fields)?;
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO documents (collection, id, body) VALUES (?1, ?2, ?3);",
                params![collection.as_str(), id.as_str(), body],
            )?;
            Ok(id)
        })
        .await
    }

    async fn get_all(&self, collection: Collection) -> StoreResult<Vec<StoredDocument>> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{DOCUMENT_SELECT_SQL}
                 WHERE collection = ?1
                 ORDER BY rowid ASC;"
            ))?;
            let mut rows = stmt.query([collection.as_str()])?;
            collect_documents(&mut rows)
        })
        .await
    }

    async fn get_by_id(
        &self,
        collection: Collection,
        id: &str,
    ) -> StoreResult<Option<StoredDocument>> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{DOCUMENT_SELECT_SQL}
                 WHERE collection = ?1
                   AND id = ?2;"
            ))?;
            let mut rows = stmt.query(params![collection.as_str(), id])?;
            let document = match rows.next()? {
                Some(row) => Some(parse_document_row(row)?),
                None => None,
            };
            Ok(document)
        })
        .await
    }

    async fn update_by_id(
        &self,
        collection: Collection,
        id: &str,
        partial: Document,
    ) -> StoreResult<()> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let body: Option<String> = tx
                .query_row(
                    "SELECT body FROM documents WHERE collection = ?1 AND id = ?2;",
                    params![collection.as_str(), id],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(body) = body else {
                return Err(StoreError::DocumentNotFound { collection, id });
            };

            let mut fields = parse_body(&id, &body)?;
            fields.extend(partial);
            tx.execute(
                "UPDATE documents
                 SET
                    body = ?3,
                    updated_at = CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER)
                 WHERE collection = ?1
                   AND id = ?2;",
                params![collection.as_str(), id, serde_json::to_string(&fields)?],
            )?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn delete_by_id(&self, collection: Collection, id: &str) -> StoreResult<bool> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            let changed = conn.execute(
                "DELETE FROM documents WHERE collection = ?1 AND id = ?2;",
                params![collection.as_str(), id],
            )?;
            Ok(changed > 0)
        })
        .await
    }

    async fn scan_where(
        &self,
        collection: Collection,
        filters: &[FieldEquals],
    ) -> StoreResult<Vec<StoredDocument>> {
        validate_filters(filters)?;
        let (sql, bind_values) = scan_query(collection, filters);

        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(bind_values))?;
            collect_documents(&mut rows)
        })
        .await
    }
}

/// Builds the scan statement for already validated filters.
///
/// JSON paths are written as literals: an expression index only applies
/// when the query repeats its exact `json_extract(body, '$.field')` term.
fn scan_query(collection: Collection, filters: &[FieldEquals]) -> (String, Vec<SqlValue>) {
    let mut sql = format!("{DOCUMENT_SELECT_SQL} WHERE collection = ?");
    let mut bind_values = vec![SqlValue::Text(collection.as_str().to_string())];
    for filter in filters {
        let path = format!("'$.{}'", filter.field);
        sql.push_str(&format!(
            " AND json_extract(body, {path}) = ? AND json_type(body, {path}) = 'text'"
        ));
        bind_values.push(SqlValue::Text(filter.value.clone()));
    }
    sql.push_str(" ORDER BY rowid ASC;");
    (sql, bind_values)
}

fn collect_documents(rows: &mut rusqlite::Rows<'_>) -> StoreResult<Vec<StoredDocument>> {
    let mut documents = Vec::new();
    while let Some(row) = rows.next()? {
        documents.push(parse_document_row(row)?);
    }
    Ok(documents)
}

fn parse_document_row(row: &Row<'_>) -> StoreResult<StoredDocument> {
    let id: String = row.get("id")?;
    let body: String = row.get("body")?;
    let fields = parse_body(&id, &body)?;
    Ok(StoredDocument { id, fields })
}

fn parse_body(id: &str, body: &str) -> StoreResult<Document> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(StoreError::InvalidData(format!(
            "document `{id}` body is not a json object"
        ))),
        Err(err) => Err(StoreError::InvalidData(format!(
            "document `{id}` body is not valid json: {err}"
        ))),
    }
}
