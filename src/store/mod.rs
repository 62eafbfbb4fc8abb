//! Document store access
//!
//! A [`SourceConnector`] opens one [`DocumentSource`] per call. The source
//! performs a single bounded read and is closed before the operation
//! returns, on success and on failure alike.
//!
//! - [`MongoConnector`]: production connector backed by the MongoDB driver
//! - [`MemoryConnector`]: ordered in-memory collections for tests and demos

mod memory;
mod mongo;
pub mod value;

pub use memory::MemoryConnector;
pub use mongo::MongoConnector;

use crate::connection::ConnectionParams;
use crate::error::{Error, Result};
use async_trait::async_trait;
use bson::{Bson, Document};

/// An open handle to one collection
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Read up to `limit` documents with no filter, in natural order
    async fn sample(&self, limit: usize) -> Result<Vec<Document>>;

    /// Read up to `limit` documents whose `id_field` is strictly greater than
    /// any of the `after` candidates (all documents when `after` is empty),
    /// ascending by `id_field`
    async fn find_after(
        &self,
        id_field: &str,
        after: &[Bson],
        limit: usize,
    ) -> Result<Vec<Document>>;

    /// Release the underlying connection
    async fn close(&self) -> Result<()>;
}

/// Opens a [`DocumentSource`] from connection parameters
#[async_trait]
pub trait SourceConnector: Send + Sync {
    /// Connect to the collection named by `params`
    async fn open(&self, params: &ConnectionParams) -> Result<Box<dyn DocumentSource>>;

    /// Connector type name
    fn connector_type(&self) -> &'static str;
}

/// Close `source` and combine the outcome with the operation's `result`.
///
/// Callers open a source, run their read, then hand both here so the
/// connection is released on every exit path. A close failure is reported
/// only when the operation itself succeeded.
pub async fn release<T>(source: Box<dyn DocumentSource>, result: Result<T>) -> Result<T> {
    let closed = source.close().await;

    match (result, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(Error::connection(format!(
            "Failed to close connection: {}",
            e.message()
        ))),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(close_err)) => {
            tracing::warn!(error = %close_err, "Failed to close connection after error");
            Err(e)
        }
    }
}
