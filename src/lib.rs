//! # MongoDB Table Connector
//!
//! Exposes a MongoDB collection as a table: infer its schema from a sample
//! of documents, and read it page by page with field mappings that coerce
//! raw values into UI-facing field types.
//!
//! ## Features
//!
//! - **Schema Inference**: Samples documents and unifies observed value types per field
//! - **Field Mapping**: Projects documents through caller-declared mappings with type coercion
//! - **Cursor Pagination**: Resumes strictly after the last identity value returned
//! - **HTTP Server**: Thin axum transport with a uniform `{code, message, data}` envelope
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mongo_table_connector::{fetch_records, infer_table_meta, MongoConnector, RecordsRequest};
//!
//! #[tokio::main]
//! async fn main() -> mongo_table_connector::Result<()> {
//!     let connector = MongoConnector::new();
//!
//!     let params = mongo_table_connector::ConnectionParams::new("localhost", 27017, "test", "users");
//!     let schema = infer_table_meta(&connector, &params).await?;
//!
//!     let request: RecordsRequest = serde_json::from_value(serde_json::json!({
//!         "datasourceConfig": { "dbConfig": { /* ... */ }, "fieldMappings": [] },
//!         "maxPageSize": 50
//!     }))?;
//!     let page = fetch_records(&connector, &request).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │            HTTP server / CLI (cli::serve, cli::Runner)       │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │
//!          ┌─────────────────────┴─────────────────────┐
//!          │                                           │
//! ┌────────┴─────────┐                      ┌──────────┴─────────┐
//! │ schema           │                      │ records            │
//! │ sample → unify   │                      │ cursor → project   │
//! │ → descriptors    │                      │ → coerce           │
//! └────────┬─────────┘                      └──────────┬─────────┘
//!          │                                           │
//! ┌────────┴───────────────────────────────────────────┴─────────┐
//! │  store: SourceConnector → DocumentSource (MongoDB / memory)  │
//! │  connection: ConnectionParams → mongodb:// URI               │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and the field-type enumeration
pub mod types;

/// Connection parameters and URI construction
pub mod connection;

/// Document store access
pub mod store;

/// Schema inference from sampled documents
pub mod schema;

/// Paginated record fetch and field mapping
pub mod records;

/// Command-line interface and HTTP server
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{ConnectionParams, IdType};
pub use error::{Error, ErrorKind, Result};
pub use records::{fetch_records, FieldMapping, Record, RecordPage, RecordsRequest};
pub use schema::{infer_table_meta, FieldDescriptor, SchemaDescriptor};
pub use store::{DocumentSource, MemoryConnector, MongoConnector, SourceConnector};
pub use types::{FieldTypeCode, ValueCategory};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
