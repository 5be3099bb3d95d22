//! MongoDB implementation of [`RecordStore`]

use async_trait::async_trait;
use bson::{doc, Document};
use futures::TryStreamExt;
use mongodb::error::ErrorKind;
use mongodb::options::{AggregateOptions, ClientOptions, IndexOptions, InsertManyOptions};
use mongodb::{Client, Collection, Database, IndexModel};
use tracing::{debug, warn};

use super::{bson_number, CollectionStats, IndexSpec, InsertReport, RecordStore};
use crate::config::AppConfig;
use crate::Result;

/// Pooled client bound to the configured database and collection
#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    database: Database,
    collection: Collection<Document>,
    collection_name: String,
}

impl MongoStore {
    /// Connect and verify the server answers a `ping`
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        let mut options = ClientOptions::parse(&config.mongodb_uri).await?;
        if options.app_name.is_none() {
            options.app_name = Some("ora".to_string());
        }

        let client = Client::with_options(options)?;
        client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await?;
        debug!("MongoDB ping ok ({})", config.redacted_uri());

        let database = client.database(&config.database_name);
        let collection = database.collection::<Document>(&config.collection_name);

        Ok(Self {
            client,
            database,
            collection,
            collection_name: config.collection_name.clone(),
        })
    }

    /// Close pooled connections
    pub async fn shutdown(self) {
        self.client.shutdown().await;
    }
}

#[async_trait]
impl RecordStore for MongoStore {
    fn namespace(&self) -> String {
        format!("{}.{}", self.database.name(), self.collection_name)
    }

    async fn insert_many(&self, docs: Vec<Document>) -> Result<InsertReport> {
        if docs.is_empty() {
            return Ok(InsertReport::default());
        }

        let total = docs.len() as u64;
        let options = InsertManyOptions::builder().ordered(false).build();

        match self.collection.insert_many(docs, options).await {
            Ok(result) => Ok(InsertReport {
                inserted: result.inserted_ids.len() as u64,
                failed: 0,
            }),
            Err(e) => {
                // Unordered inserts keep going past rejected documents
                let failed = match e.kind.as_ref() {
                    ErrorKind::BulkWrite(failure) => failure
                        .write_errors
                        .as_ref()
                        .map(|errors| errors.len() as u64)
                        .unwrap_or(0),
                    _ => 0,
                };

                if failed == 0 {
                    return Err(e.into());
                }

                warn!(failed, total, "Batch partially rejected by server");
                Ok(InsertReport {
                    inserted: total.saturating_sub(failed),
                    failed,
                })
            }
        }
    }

    async fn aggregate(&self, pipeline: Vec<Document>) -> Result<Vec<Document>> {
        let options = AggregateOptions::builder().allow_disk_use(true).build();
        let cursor = self.collection.aggregate(pipeline, options).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn count_documents(&self, filter: Document) -> Result<u64> {
        Ok(self.collection.count_documents(filter, None).await?)
    }

    async fn find_one(&self, filter: Document) -> Result<Option<Document>> {
        Ok(self.collection.find_one(filter, None).await?)
    }

    async fn create_index(&self, index: &IndexSpec) -> Result<()> {
        let options = IndexOptions::builder()
            .name(index.name.clone())
            .background(true)
            .build();
        let model = IndexModel::builder()
            .keys(index.keys.clone())
            .options(options)
            .build();

        self.collection.create_index(model, None).await?;
        Ok(())
    }

    async fn list_index_names(&self) -> Result<Vec<String>> {
        Ok(self.collection.list_index_names().await?)
    }

    async fn stats(&self) -> Result<CollectionStats> {
        let reply = self
            .database
            .run_command(doc! { "collStats": self.collection_name.as_str() }, None)
            .await?;

        Ok(CollectionStats {
            count: bson_number(reply.get("count")).unwrap_or(0.0) as u64,
            size_bytes: bson_number(reply.get("size")).unwrap_or(0.0),
        })
    }

    async fn drop_collection(&self) -> Result<()> {
        self.collection.drop(None).await?;
        Ok(())
    }
}
