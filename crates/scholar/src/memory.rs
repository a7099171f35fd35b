//! In-process document store.
//!
//! Evaluates the filter, projection, `$set` and pipeline subset the
//! walkthrough issues over an insertion-ordered `Vec`. Used for offline runs
//! and as the store behind the test suite.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use bson::{oid::ObjectId, Bson, Document};
use tokio::sync::RwLock;
use tracing::trace;

use crate::{
    constants::ID_FIELD,
    error::{Result, ScholarError},
    filter::Filter,
    pipeline::Pipeline,
    projection::Projection,
    store::{DeleteOutcome, DocumentStore, InsertManyOutcome, InsertOneOutcome, UpdateOutcome},
    update::Update,
};

/// Shared state behind every clone of a `MemoryStore`.
#[derive(Debug, Default)]
struct Inner {
    /// Documents in insertion order
    docs:     RwLock<Vec<Document>>,
    /// How many times `close` ran
    releases: AtomicUsize,
}

/// An in-memory collection. Clones share the same documents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self { Self::default() }

    /// How many times the store has been released.
    pub fn release_count(&self) -> usize { self.inner.releases.load(Ordering::SeqCst) }

    /// Snapshot of every stored document, keys included.
    pub async fn snapshot(&self) -> Vec<Document> { self.inner.docs.read().await.clone() }
}

/// Puts a fresh key first when the document has none, as the server does.
fn with_id(doc: Document) -> (Bson, Document) {
    if let Some(id) = doc.get(ID_FIELD) {
        return (id.clone(), doc);
    }
    let id = Bson::ObjectId(ObjectId::new());
    let mut keyed = Document::new();
    keyed.insert(ID_FIELD, id.clone());
    for (key, value) in doc {
        keyed.insert(key, value);
    }
    (id, keyed)
}

/// Fails when a document with the same key is already stored.
fn ensure_unique(docs: &[Document], id: &Bson) -> Result<()> {
    if docs.iter().any(|d| d.get(ID_FIELD) == Some(id)) {
        return Err(ScholarError::Internal {
            message: format!("duplicate key: {}", id),
        });
    }
    Ok(())
}

/// Applies an optional projection.
fn project(doc: &Document, projection: Option<&Projection>) -> Document {
    projection.map_or_else(|| doc.clone(), |p| p.apply(doc))
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend_name(&self) -> &'static str { "memory" }

    async fn insert_one(&self, doc: Document) -> Result<InsertOneOutcome> {
        let mut docs = self.inner.docs.write().await;
        let (id, doc) = with_id(doc);
        ensure_unique(&docs, &id)?;
        trace!("Inserting document with key {}", id);
        docs.push(doc);
        Ok(InsertOneOutcome {
            id,
        })
    }

    async fn insert_many(&self, batch: Vec<Document>) -> Result<InsertManyOutcome> {
        let mut docs = self.inner.docs.write().await;
        let mut keyed = Vec::with_capacity(batch.len());
        for doc in batch {
            let (id, doc) = with_id(doc);
            ensure_unique(&docs, &id)?;
            if keyed.iter().any(|&(ref other, _)| *other == id) {
                return Err(ScholarError::Internal {
                    message: format!("duplicate key in batch: {}", id),
                });
            }
            keyed.push((id, doc));
        }
        let mut ids = Vec::with_capacity(keyed.len());
        for (id, doc) in keyed {
            ids.push(id);
            docs.push(doc);
        }
        Ok(InsertManyOutcome {
            ids,
        })
    }

    async fn find_one(&self, filter: &Filter, projection: Option<&Projection>) -> Result<Option<Document>> {
        let docs = self.inner.docs.read().await;
        Ok(docs
            .iter()
            .find(|doc| filter.matches(doc))
            .map(|doc| project(doc, projection)))
    }

    async fn find_many(&self, filter: &Filter, projection: Option<&Projection>) -> Result<Vec<Document>> {
        let docs = self.inner.docs.read().await;
        Ok(docs
            .iter()
            .filter(|doc| filter.matches(doc))
            .map(|doc| project(doc, projection))
            .collect())
    }

    async fn count(&self, filter: &Filter) -> Result<u64> {
        let docs = self.inner.docs.read().await;
        Ok(docs.iter().filter(|doc| filter.matches(doc)).count() as u64)
    }

    async fn update_one(&self, filter: &Filter, update: &Update, upsert: bool) -> Result<UpdateOutcome> {
        let mut docs = self.inner.docs.write().await;
        if let Some(doc) = docs.iter_mut().find(|doc| filter.matches(doc)) {
            let modified = u64::from(update.apply(doc));
            return Ok(UpdateOutcome {
                matched: 1,
                modified,
                upserted_id: None,
            });
        }
        if !upsert {
            return Ok(UpdateOutcome::default());
        }

        let mut seed = filter.equality_fields();
        update.apply(&mut seed);
        let (id, doc) = with_id(seed);
        ensure_unique(&docs, &id)?;
        trace!("Upserting document with key {}", id);
        docs.push(doc);
        Ok(UpdateOutcome {
            matched:     0,
            modified:    0,
            upserted_id: Some(id),
        })
    }

    async fn aggregate(&self, pipeline: &Pipeline) -> Result<Vec<Document>> {
        let docs = self.inner.docs.read().await.clone();
        pipeline.evaluate(docs)
    }

    async fn delete_one(&self, filter: &Filter) -> Result<DeleteOutcome> {
        let mut docs = self.inner.docs.write().await;
        let deleted = match docs.iter().position(|doc| filter.matches(doc)) {
            Some(index) => {
                docs.remove(index);
                1
            },
            None => 0,
        };
        Ok(DeleteOutcome {
            deleted,
        })
    }

    async fn delete_many(&self, filter: &Filter) -> Result<DeleteOutcome> {
        let mut docs = self.inner.docs.write().await;
        let before = docs.len();
        docs.retain(|doc| !filter.matches(doc));
        Ok(DeleteOutcome {
            deleted: before.saturating_sub(docs.len()) as u64,
        })
    }

    async fn close(&self) -> Result<()> {
        self.inner.releases.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
