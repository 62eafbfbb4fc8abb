//! Paginated record fetch and projection

use super::coerce::{coerce, lookup};
use super::cursor::{decode_token, CursorWindow};
use super::types::{DatasourceConfig, FieldMapping, Record, RecordPage, RecordsRequest};
use crate::connection::ConnectionParams;
use crate::error::{Result, ResultExt};
use crate::store::{self, value::stringify_id, DocumentSource, SourceConnector};
use crate::types::JsonObject;
use bson::{Bson, Document};

/// Fetch one page of records and project them through the field mappings
pub async fn fetch_records(
    connector: &dyn SourceConnector,
    request: &RecordsRequest,
) -> Result<RecordPage> {
    let config = DatasourceConfig::resolve(&request.datasource_config)?;
    let page_size = request
        .page_size()
        .context("Failed to get table records from MongoDB")?;
    let after = decode_token(request.page_token(), config.db_config.id_type)
        .context("Failed to get table records from MongoDB")?;

    let params = &config.db_config;
    tracing::info!(
        table = %params.table_name,
        page_size,
        has_token = !after.is_empty(),
        mappings = config.field_mappings.len(),
        "Fetching table records"
    );

    let result = async {
        let source = connector.open(params).await?;
        let page = read_page(source.as_ref(), params, &after, page_size).await;
        store::release(source, page).await
    }
    .await
    .context("Failed to get table records from MongoDB");

    match result {
        Ok(window) => Ok(project_page(window, &config)),
        Err(e) => {
            tracing::warn!(table = %params.table_name, error = %e, "Record fetch failed");
            Err(e)
        }
    }
}

async fn read_page(
    source: &dyn DocumentSource,
    params: &ConnectionParams,
    after: &[Bson],
    page_size: usize,
) -> Result<CursorWindow> {
    let fetched = source
        .find_after(&params.id_field, after, page_size.saturating_add(1))
        .await?;
    tracing::debug!(
        table = %params.table_name,
        fetched = fetched.len(),
        "Fetched documents"
    );

    CursorWindow::from_lookahead(fetched, page_size, &params.id_field)
}

fn project_page(window: CursorWindow, config: &DatasourceConfig) -> RecordPage {
    let id_field = &config.db_config.id_field;
    let mappings: Vec<&FieldMapping> = config.enabled_mappings().collect();

    let records = window
        .documents
        .iter()
        .map(|document| project_record(document, id_field, &mappings))
        .collect();

    RecordPage {
        next_page_token: window.next_token,
        has_more: window.has_more,
        records,
    }
}

/// Build a record from a document using enabled mappings only
pub fn project_record(document: &Document, id_field: &str, mappings: &[&FieldMapping]) -> Record {
    let primary_id = document.get(id_field).map(stringify_id).unwrap_or_default();

    let mut data = JsonObject::new();
    for mapping in mappings {
        let value = lookup(document, &mapping.source_field_name, &mapping.source_field_id);
        data.insert(
            mapping.source_field_id.clone(),
            coerce(value, mapping.target_type()),
        );
    }

    Record { primary_id, data }
}
