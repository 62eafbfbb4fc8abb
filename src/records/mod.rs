//! Record fetch module
//!
//! Reads one page of a collection with identity-cursor pagination and
//! projects each document through caller-supplied field mappings.
//!
//! # Overview
//!
//! 1. Resolve `datasourceConfig` (object or JSON string) into connection
//!    parameters and field mappings
//! 2. Read `maxPageSize + 1` documents after the page token, ordered by identity
//! 3. Return at most `maxPageSize` records; the lookahead decides `hasMore`
//! 4. Coerce each enabled mapping's value by its target field type

mod coerce;
mod cursor;
mod fetcher;
mod types;

pub use coerce::{coerce, lookup, to_number, to_text, truthy};
pub use cursor::{decode_token, CursorWindow};
pub use fetcher::{fetch_records, project_record};
pub use types::{
    DatasourceConfig, FieldMapping, Record, RecordPage, RecordsRequest, DEFAULT_PAGE_SIZE,
};

#[cfg(test)]
mod tests;
