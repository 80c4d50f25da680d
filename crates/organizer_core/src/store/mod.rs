//! Document store contract consumed by the domain services.
//!
//! # Responsibility
//! - Describe the schemaless, collection-oriented store the services run on.
//! - Provide typed conversion helpers between records and documents.
//!
//! # Invariants
//! - The store offers no joins and no cross-collection transactions.
//! - Ids are assigned by the store on insert and are opaque to callers.
//! - `update_by_id` merges top-level keys; it never removes keys.
//!
//! Implementations: [`memory::InMemoryDocumentStore`] and
//! [`sqlite::SqliteDocumentStore`].

use crate::db::DbError;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;
pub mod sqlite;

static FIELD_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid field name regex"));

/// Top-level document body.
pub type Document = serde_json::Map<String, Value>;

pub type StoreResult<T> = Result<T, StoreError>;

/// Named document collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    Events,
    Favorites,
}

impl Collection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Events => "events",
            Self::Favorites => "favorites",
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One document together with its store-assigned id.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub fields: Document,
}

impl StoredDocument {
    /// Returns whether every filter matches a string field of this document.
    pub fn matches(&self, filters: &[FieldEquals]) -> bool {
        filters.iter().all(|filter| {
            matches!(
                self.fields.get(filter.field.as_str()),
                Some(Value::String(value)) if *value == filter.value
            )
        })
    }
}

/// Equality filter on a top-level string field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEquals {
    pub field: String,
    pub value: String,
}

impl FieldEquals {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Storage failure surfaced unchanged to domain callers.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    Serialization(serde_json::Error),
    /// Persisted document does not have the expected shape.
    InvalidData(String),
    /// Filter names a field that cannot be addressed.
    InvalidField(String),
    DocumentNotFound {
        collection: Collection,
        id: String,
    },
    /// Backend could not be reached or refused the call.
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "document serialization failed: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted document: {message}"),
            Self::InvalidField(field) => write!(f, "invalid document field name: `{field}`"),
            Self::DocumentNotFound { collection, id } => {
                write!(f, "document not found: {collection}/{id}")
            }
            Self::Unavailable(message) => write!(f, "document store unavailable: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Schemaless collection store.
///
/// Every call is independent: nothing here spans two writes atomically.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts a new document and returns its assigned id.
    async fn insert(&self, collection: Collection, fields: Document) -> StoreResult<String>;

    /// Returns every document in the collection, in no guaranteed order.
    async fn get_all(&self, collection: Collection) -> StoreResult<Vec<StoredDocument>>;

    async fn get_by_id(
        &self,
        collection: Collection,
        id: &str,
    ) -> StoreResult<Option<StoredDocument>>;

    /// Merges `partial` into the document.
    ///
    /// Fails with `StoreError::DocumentNotFound` when the id is absent.
    async fn update_by_id(
        &self,
        collection: Collection,
        id: &str,
        partial: Document,
    ) -> StoreResult<()>;

    /// Deletes one document. Returns `false` when nothing was deleted.
    async fn delete_by_id(&self, collection: Collection, id: &str) -> StoreResult<bool>;

    /// Returns documents whose string fields equal every filter.
    async fn scan_where(
        &self,
        collection: Collection,
        filters: &[FieldEquals],
    ) -> StoreResult<Vec<StoredDocument>>;
}

/// Serializes a record into a document body.
pub fn to_document<T: Serialize>(record: &T) -> StoreResult<Document> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::InvalidData(format!(
            "record serialized to non-object json `{other}`"
        ))),
    }
}

/// Parses a document body into a typed record.
pub fn from_document<T: DeserializeOwned>(
    collection: Collection,
    document: &StoredDocument,
) -> StoreResult<T> {
    serde_json::from_value(Value::Object(document.fields.clone())).map_err(|err| {
        StoreError::InvalidData(format!("{collection}/{}: {err}", document.id))
    })
}

pub(crate) fn validate_filters(filters: &[FieldEquals]) -> StoreResult<()> {
    for filter in filters {
        if !FIELD_NAME_RE.is_match(&filter.field) {
            return Err(StoreError::InvalidField(filter.field.clone()));
        }
    }
    Ok(())
}

pub(crate) fn new_document_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::{
        from_document, to_document, validate_filters, Collection, FieldEquals, StoreError,
        StoredDocument,
    };
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Sample {
        user_id: String,
        event_id: String,
    }

    fn doc(value: serde_json::Value) -> StoredDocument {
        StoredDocument {
            id: "d1".to_string(),
            fields: value.as_object().cloned().unwrap(),
        }
    }

    #[test]
    fn matches_requires_all_filters_on_string_fields() {
        let document = doc(json!({ "userId": "u1", "eventId": "e1", "count": 3 }));

        assert!(document.matches(&[]));
        assert!(document.matches(&[FieldEquals::new("userId", "u1")]));
        assert!(document.matches(&[
            FieldEquals::new("userId", "u1"),
            FieldEquals::new("eventId", "e1"),
        ]));
        assert!(!document.matches(&[
            FieldEquals::new("userId", "u1"),
            FieldEquals::new("eventId", "e2"),
        ]));
        assert!(!document.matches(&[FieldEquals::new("count", "3")]));
        assert!(!document.matches(&[FieldEquals::new("missing", "")]));
    }

    #[test]
    fn typed_records_convert_through_documents() {
        let sample = Sample {
            user_id: "u1".to_string(),
            event_id: "e1".to_string(),
        };
        let fields = to_document(&sample).unwrap();
        assert_eq!(fields.get("userId"), Some(&json!("u1")));

        let stored = StoredDocument {
            id: "d1".to_string(),
            fields,
        };
        let parsed: Sample = from_document(Collection::Favorites, &stored).unwrap();
        assert_eq!(parsed, sample);
    }

    #[test]
    fn malformed_documents_are_rejected_with_location() {
        let stored = doc(json!({ "userId": 7 }));
        let err = from_document::<Sample>(Collection::Favorites, &stored).unwrap_err();
        match err {
            StoreError::InvalidData(message) => assert!(message.starts_with("favorites/d1")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn filter_field_names_must_be_identifiers() {
        validate_filters(&[FieldEquals::new("userId", "x")]).unwrap();
        let err = validate_filters(&[FieldEquals::new("a.b')--", "x")]).unwrap_err();
        assert!(matches!(err, StoreError::InvalidField(_)));
    }
}
