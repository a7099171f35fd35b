use async_trait::async_trait;
use bson::{Bson, Document};

use crate::{error::Result, filter::Filter, pipeline::Pipeline, projection::Projection, update::Update};

/// Result of inserting one document.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertOneOutcome {
    /// Key of the inserted document
    pub id: Bson,
}

/// Result of inserting several documents in one call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InsertManyOutcome {
    /// Keys of the inserted documents, in input order
    pub ids: Vec<Bson>,
}

/// Result of an update.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdateOutcome {
    /// Documents matched by the filter
    pub matched:     u64,
    /// Documents actually changed
    pub modified:    u64,
    /// Key of the document created by an upsert, if one was
    pub upserted_id: Option<Bson>,
}

/// Result of a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeleteOutcome {
    /// Documents removed
    pub deleted: u64,
}

/// The logical operations the walkthrough issues against one collection.
///
/// Implementations own the connection to their backend; `close` releases it
/// and is called exactly once per session.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name for log output.
    fn backend_name(&self) -> &'static str;

    /// Removes every document in the collection, returning how many went.
    async fn clear(&self) -> Result<DeleteOutcome> { self.delete_many(&Filter::All).await }

    /// Inserts one document; a key is assigned if the document has none.
    async fn insert_one(&self, doc: Document) -> Result<InsertOneOutcome>;

    /// Inserts several documents in order.
    async fn insert_many(&self, docs: Vec<Document>) -> Result<InsertManyOutcome>;

    /// First document matching `filter` in natural order.
    async fn find_one(&self, filter: &Filter, projection: Option<&Projection>) -> Result<Option<Document>>;

    /// Every document matching `filter` in natural order.
    async fn find_many(&self, filter: &Filter, projection: Option<&Projection>) -> Result<Vec<Document>>;

    /// Number of documents matching `filter`.
    async fn count(&self, filter: &Filter) -> Result<u64>;

    /// Applies `update` to the first match; with `upsert`, inserts when
    /// nothing matches.
    async fn update_one(&self, filter: &Filter, update: &Update, upsert: bool) -> Result<UpdateOutcome>;

    /// Runs an aggregation pipeline over the whole collection.
    async fn aggregate(&self, pipeline: &Pipeline) -> Result<Vec<Document>>;

    /// Removes the first document matching `filter`.
    async fn delete_one(&self, filter: &Filter) -> Result<DeleteOutcome>;

    /// Removes every document matching `filter`.
    async fn delete_many(&self, filter: &Filter) -> Result<DeleteOutcome>;

    /// Releases the connection.
    async fn close(&self) -> Result<()>;
}
