//! Schema inference from sampled documents

use super::types::{FieldDescriptor, SchemaDescriptor};
use crate::connection::ConnectionParams;
use crate::error::{Result, ResultExt};
use crate::store::{self, value::classify, DocumentSource, SourceConnector};
use crate::types::ValueCategory;
use bson::Document;
use indexmap::IndexMap;

/// Number of documents read to infer a schema
pub const SAMPLE_SIZE: usize = 10;

/// Field name flagged as primary regardless of the identity key
const CONVENTIONAL_ID: &str = "id";

/// Reduces observed documents into a per-field category map
#[derive(Debug, Clone)]
pub struct SchemaInferrer {
    /// Identity key, skipped as a regular field
    id_field: String,
    /// Resolved category per field, in first-seen order
    categories: IndexMap<String, ValueCategory>,
    /// Documents observed so far
    document_count: usize,
}

impl SchemaInferrer {
    /// Create an inferrer that skips `id_field`
    pub fn new(id_field: impl Into<String>) -> Self {
        Self {
            id_field: id_field.into(),
            categories: IndexMap::new(),
            document_count: 0,
        }
    }

    /// Fold one document into the field map
    pub fn observe(&mut self, document: &Document) {
        self.document_count += 1;

        for (name, value) in document {
            if *name == self.id_field {
                continue;
            }

            let observed = classify(value);
            self.categories
                .entry(name.clone())
                .and_modify(|current| *current = current.unify(observed))
                .or_insert(observed);
        }
    }

    /// Fold every document of a sample
    pub fn observe_all<'a>(&mut self, documents: impl IntoIterator<Item = &'a Document>) {
        for document in documents {
            self.observe(document);
        }
    }

    /// Number of documents observed
    pub fn document_count(&self) -> usize {
        self.document_count
    }

    /// Current category of a field
    pub fn category(&self, field: &str) -> Option<ValueCategory> {
        self.categories.get(field).copied()
    }

    /// Build the schema descriptor
    pub fn finish(&self, table_name: &str) -> SchemaDescriptor {
        let fields = self
            .categories
            .iter()
            .enumerate()
            .map(|(index, (name, category))| {
                FieldDescriptor::new(index + 1, name.clone(), category.field_type())
                    .primary(name == CONVENTIONAL_ID || *name == self.id_field)
            })
            .collect();

        SchemaDescriptor {
            table_name: table_name.to_string(),
            fields,
        }
    }
}

/// Infer the schema of the collection named by `params`
pub async fn infer_table_meta(
    connector: &dyn SourceConnector,
    params: &ConnectionParams,
) -> Result<SchemaDescriptor> {
    tracing::info!(
        table = %params.table_name,
        database = %params.database_name,
        "Inferring table schema"
    );

    let result = async {
        let source = connector.open(params).await?;
        let sampled = sample_schema(source.as_ref(), params).await;
        store::release(source, sampled).await
    }
    .await
    .context("Failed to get table metadata from MongoDB");

    if let Err(e) = &result {
        tracing::warn!(table = %params.table_name, error = %e, "Schema inference failed");
    }
    result
}

async fn sample_schema(
    source: &dyn DocumentSource,
    params: &ConnectionParams,
) -> Result<SchemaDescriptor> {
    let documents = source.sample(SAMPLE_SIZE).await?;
    tracing::debug!(
        table = %params.table_name,
        sampled = documents.len(),
        "Sampled documents"
    );

    if documents.is_empty() {
        return Ok(SchemaDescriptor::empty(&params.table_name));
    }

    let mut inferrer = SchemaInferrer::new(&params.id_field);
    inferrer.observe_all(&documents);
    Ok(inferrer.finish(&params.table_name))
}
