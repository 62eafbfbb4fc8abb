//! MongoDB-backed document source

use super::{DocumentSource, SourceConnector};
use crate::connection::ConnectionParams;
use crate::error::{Error, Result};
use async_trait::async_trait;
use bson::{doc, Bson, Document};
use futures::TryStreamExt;
use mongodb::{Client, Collection};

/// Connector that opens a fresh MongoDB client per call
#[derive(Debug, Clone, Default)]
pub struct MongoConnector {
    app_name: Option<String>,
}

impl MongoConnector {
    /// Create a new connector
    pub fn new() -> Self {
        Self::default()
    }

    /// Report an application name to the server
    #[must_use]
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }
}

#[async_trait]
impl SourceConnector for MongoConnector {
    async fn open(&self, params: &ConnectionParams) -> Result<Box<dyn DocumentSource>> {
        let uri = params.connection_uri()?;
        tracing::debug!(uri = %params.redacted_uri()?, "Connecting to MongoDB");

        let mut options = mongodb::options::ClientOptions::parse(&uri)
            .await
            .map_err(|e| Error::connection(format!("Invalid connection string: {e}")))?;
        if let Some(app_name) = &self.app_name {
            options.app_name = Some(app_name.clone());
        }

        let client = Client::with_options(options)
            .map_err(|e| Error::connection(format!("Failed to create client: {e}")))?;
        let database = client.database(&params.database_name);

        // The driver connects lazily
        if let Err(e) = database.run_command(doc! { "ping": 1 }).await {
            client.shutdown().await;
            return Err(Error::connection(e.to_string()));
        }

        let collection = database.collection::<Document>(&params.table_name);
        Ok(Box::new(MongoSource { client, collection }))
    }

    fn connector_type(&self) -> &'static str {
        "mongodb"
    }
}

/// One open client scoped to a single collection
struct MongoSource {
    client: Client,
    collection: Collection<Document>,
}

#[async_trait]
impl DocumentSource for MongoSource {
    async fn sample(&self, limit: usize) -> Result<Vec<Document>> {
        let cursor = self
            .collection
            .find(doc! {})
            .limit(driver_limit(limit))
            .await
            .map_err(query_error)?;

        cursor.try_collect().await.map_err(query_error)
    }

    async fn find_after(
        &self,
        id_field: &str,
        after: &[Bson],
        limit: usize,
    ) -> Result<Vec<Document>> {
        let filter = after_filter(id_field, after);

        let cursor = self
            .collection
            .find(filter)
            .sort(doc! { id_field: 1 })
            .limit(driver_limit(limit))
            .await
            .map_err(query_error)?;

        cursor.try_collect().await.map_err(query_error)
    }

    async fn close(&self) -> Result<()> {
        self.client.clone().shutdown().await;
        Ok(())
    }
}

/// `{id_field: {$gt: c}}` for one candidate, an `$or` of those for several
fn after_filter(id_field: &str, after: &[Bson]) -> Document {
    match after {
        [] => doc! {},
        [token] => doc! { id_field: { "$gt": token.clone() } },
        candidates => {
            let branches: Vec<Document> = candidates
                .iter()
                .map(|token| doc! { id_field: { "$gt": token.clone() } })
                .collect();
            doc! { "$or": branches }
        }
    }
}

/// Limits above `i64::MAX` saturate; the driver reads negative limits as single-batch
fn driver_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// Driver failures after a successful ping, keeping connection-level causes distinct
fn query_error(err: mongodb::error::Error) -> Error {
    match Error::from(err) {
        Error::Config { message } => Error::query(message),
        other => other,
    }
}
