//! Document store backed by a MongoDB server through the official driver.

use async_trait::async_trait;
use bson::{doc, Document};
use futures::TryStreamExt as _;
use mongodb::{options::ClientOptions, Client, Collection};
use tracing::{debug, info, trace};

use crate::{
    config::StoreConfig,
    constants::APP_NAME,
    error::{Result, ScholarError},
    filter::Filter,
    pipeline::Pipeline,
    projection::Projection,
    store::{DeleteOutcome, DocumentStore, InsertManyOutcome, InsertOneOutcome, UpdateOutcome},
    update::Update,
};

/// One driver client and the collection the walkthrough works on.
#[derive(Debug, Clone)]
pub struct MongoStore {
    /// Driver client, released on close
    client:     Client,
    /// Target collection
    collection: Collection<Document>,
}

impl MongoStore {
    /// Connects to the server and verifies it answers.
    ///
    /// Building a driver client does not touch the network, so a `ping` to
    /// the `admin` database is issued before the store is handed out.
    ///
    /// # Errors
    ///
    /// Returns `ScholarError::Connection` if the URI cannot be parsed or the
    /// server does not answer the ping.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let connection_error = |e: mongodb::error::Error| {
            ScholarError::Connection {
                uri:    config.uri.clone(),
                reason: e.to_string(),
            }
        };

        let mut options = ClientOptions::parse(config.uri.as_str())
            .await
            .map_err(connection_error)?;
        options.app_name = Some(APP_NAME.to_owned());

        let client = Client::with_options(options).map_err(connection_error)?;
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(connection_error)?;

        info!("Connected successfully to server at {}", config.uri);

        let collection = client
            .database(&config.database)
            .collection::<Document>(&config.collection);
        Ok(Self {
            client,
            collection,
        })
    }

    /// The underlying driver collection.
    pub const fn collection(&self) -> &Collection<Document> { &self.collection }
}

#[async_trait]
impl DocumentStore for MongoStore {
    fn backend_name(&self) -> &'static str { "mongo" }

    async fn insert_one(&self, doc: Document) -> Result<InsertOneOutcome> {
        let result = self.collection.insert_one(doc).await?;
        trace!("insert_one acknowledged: {:?}", result.inserted_id);
        Ok(InsertOneOutcome {
            id: result.inserted_id,
        })
    }

    async fn insert_many(&self, docs: Vec<Document>) -> Result<InsertManyOutcome> {
        if docs.is_empty() {
            return Ok(InsertManyOutcome::default());
        }
        let result = self.collection.insert_many(docs).await?;
        let mut ids: Vec<_> = result.inserted_ids.into_iter().collect();
        ids.sort_by_key(|&(index, _)| index);
        Ok(InsertManyOutcome {
            ids: ids.into_iter().map(|(_, id)| id).collect(),
        })
    }

    async fn find_one(&self, filter: &Filter, projection: Option<&Projection>) -> Result<Option<Document>> {
        let filter = filter.to_document();
        debug!("find_one filter: {}", filter);
        let mut action = self.collection.find_one(filter);
        if let Some(projection) = projection {
            action = action.projection(projection.to_document());
        }
        Ok(action.await?)
    }

    async fn find_many(&self, filter: &Filter, projection: Option<&Projection>) -> Result<Vec<Document>> {
        let filter = filter.to_document();
        debug!("find filter: {}", filter);
        let mut action = self.collection.find(filter);
        if let Some(projection) = projection {
            action = action.projection(projection.to_document());
        }
        let cursor = action.await?;
        Ok(cursor.try_collect().await?)
    }

    async fn count(&self, filter: &Filter) -> Result<u64> { Ok(self.collection.count_documents(filter.to_document()).await?) }

    async fn update_one(&self, filter: &Filter, update: &Update, upsert: bool) -> Result<UpdateOutcome> {
        let filter = filter.to_document();
        let update = update.to_document();
        debug!("update_one filter: {}, update: {}, upsert: {}", filter, update, upsert);
        let result = self
            .collection
            .update_one(filter, update)
            .upsert(upsert)
            .await?;
        Ok(UpdateOutcome {
            matched:     result.matched_count,
            modified:    result.modified_count,
            upserted_id: result.upserted_id,
        })
    }

    async fn aggregate(&self, pipeline: &Pipeline) -> Result<Vec<Document>> {
        let stages = pipeline.to_documents();
        debug!("aggregate pipeline: {:?}", stages);
        let cursor = self.collection.aggregate(stages).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn delete_one(&self, filter: &Filter) -> Result<DeleteOutcome> {
        let result = self.collection.delete_one(filter.to_document()).await?;
        Ok(DeleteOutcome {
            deleted: result.deleted_count,
        })
    }

    async fn delete_many(&self, filter: &Filter) -> Result<DeleteOutcome> {
        let result = self.collection.delete_many(filter.to_document()).await?;
        Ok(DeleteOutcome {
            deleted: result.deleted_count,
        })
    }

    async fn close(&self) -> Result<()> {
        self.client.clone().shutdown().await;
        Ok(())
    }
}
