#![allow(dead_code)]

use async_trait::async_trait;
use organizer_core::{
    Collection, Document, DocumentStore, EventFields, FieldEquals, InMemoryDocumentStore,
    StoreError, StoreResult, StoredDocument,
};
use std::sync::atomic::{AtomicBool, Ordering};

pub fn standup() -> EventFields {
    EventFields::new("Standup", "daily", "2024-01-05")
}

/// Store operation that `FlakyStore` can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Nothing,
    Insert,
    Delete,
    Scan,
    GetAll,
}

/// In-memory store that fails one kind of call on demand, or repeats every
/// document returned by `get_all`.
pub struct FlakyStore {
    inner: InMemoryDocumentStore,
    fail_on: std::sync::Mutex<FailOn>,
    tripped: AtomicBool,
    repeat_get_all: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: InMemoryDocumentStore::new(),
            fail_on: std::sync::Mutex::new(FailOn::Nothing),
            tripped: AtomicBool::new(false),
            repeat_get_all: AtomicBool::new(false),
        }
    }

    pub fn repeat_get_all(&self, enabled: bool) {
        self.repeat_get_all.store(enabled, Ordering::SeqCst);
    }

    pub fn fail_on(&self, operation: FailOn) {
        *self.fail_on.lock().unwrap() = operation;
    }

    pub fn tripped(&self) -> bool {
        self.tripped.load(Ordering::SeqCst)
    }

    fn check(&self, operation: FailOn) -> StoreResult<()> {
        if *self.fail_on.lock().unwrap() == operation {
            self.tripped.store(true, Ordering::SeqCst);
            return Err(StoreError::Unavailable(format!("{operation:?} refused")));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn insert(&self, collection: Collection, fields: Document) -> StoreResult<String> {
        self.check(FailOn::Insert)?;
        self.inner.insert(collection, fields).await
    }

    async fn get_all(&self, collection: Collection) -> StoreResult<Vec<StoredDocument>> {
        self.check(FailOn::GetAll)?;
        let documents = self.inner.get_all(collection).await?;
        if !self.repeat_get_all.load(Ordering::SeqCst) {
            return Ok(documents);
        }
        Ok(documents
            .iter()
            .chain(documents.iter())
            .cloned()
            .collect())
    }

    async fn get_by_id(
        &self,
        collection: Collection,
        id: &str,
    ) -> StoreResult<Option<StoredDocument>> {
        self.inner.get_by_id(collection, id).await
    }

    async fn update_by_id(
        &self,
        collection: Collection,
        id: &str,
        partial: Document,
    ) -> StoreResult<()> {
        self.inner.update_by_id(collection, id, partial).await
    }

    async fn delete_by_id(&self, collection: Collection, id: &str) -> StoreResult<bool> {
        self.check(FailOn::Delete)?;
        self.inner.delete_by_id(collection, id).await
    }

    async fn scan_where(
        &self,
        collection: Collection,
        filters: &[FieldEquals],
    ) -> StoreResult<Vec<StoredDocument>> {
        self.check(FailOn::Scan)?;
        self.inner.scan_where(collection, filters).await
    }
}
