//! In-process document store.

use crate::store::{
    new_document_id, validate_filters, Collection, Document, DocumentStore, FieldEquals,
    StoreError, StoreResult, StoredDocument,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::Mutex;

/// Document store kept entirely in memory.
///
/// Used by tests and by the CLI when no database path is configured.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    collections: Mutex<HashMap<Collection, BTreeMap<String, Document>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert(&self, collection: Collection, fields: Document) -> StoreResult<String> {
        let id = new_document_id();
        let mut collections = self.collections.lock().await;
        collections
            .entry(collection)
            .or_default()
            .insert(id.clone(), fields);
        Ok(id)
    }

    async fn get_all(&self, collection: Collection) -> StoreResult<Vec<StoredDocument>> {
        let collections = self.collections.lock().await;
        Ok(collections
            .get(&collection)
            .map(|documents| {
                documents
                    .iter()
                    .map(|(id, fields)| StoredDocument {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_by_id(
        &self,
        collection: Collection,
        id: &str,
    ) -> StoreResult<Option<StoredDocument>> {
        let collections = self.collections.lock().await;
        Ok(collections
            .get(&collection)
            .and_then(|documents| documents.get(id))
            .map(|fields| StoredDocument {
                id: id.to_string(),
                fields: fields.clone(),
            }))
    }

    async fn update_by_id(
        &self,
        collection: Collection,
        id: &str,
        partial: Document,
    ) -> StoreResult<()> {
        let mut collections = self.collections.lock().await;
        let fields = collections
            .get_mut(&collection)
            .and_then(|documents| documents.get_mut(id))
            .ok_or_else(|| StoreError::DocumentNotFound {
                collection,
                id: id.to_string(),
            })?;
        fields.extend(partial);
        Ok(())
    }

    async fn delete_by_id(&self, collection: Collection, id: &str) -> StoreResult<bool> {
        let mut collections = self.collections.lock().await;
        Ok(collections
            .get_mut(&collection)
            .map(|documents| documents.remove(id).is_some())
            .unwrap_or(false))
    }

    async fn scan_where(
        &self,
        collection: Collection,
        filters: &[FieldEquals],
    ) -> StoreResult<Vec<StoredDocument>> {
        validate_filters(filters)?;
        let documents = self.get_all(collection).await?;
        Ok(documents
            .into_iter()
            .filter(|document| document.matches(filters))
            .collect())
    }
}
