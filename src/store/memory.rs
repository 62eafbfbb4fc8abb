//! In-memory document source
//!
//! Collections are plain vectors kept in insertion order. Identity
//! comparison follows MongoDB's rule that `$gt` only matches values of the
//! same type bracket (numbers with numbers, strings with strings, ...).

use super::{DocumentSource, SourceConnector};
use crate::connection::ConnectionParams;
use crate::error::{Error, Result};
use async_trait::async_trait;
use bson::{Bson, Document};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;

/// Connector serving collections from memory
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    collections: Arc<HashMap<String, Vec<Document>>>,
    fail_open: Option<String>,
    fail_query: Option<String>,
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl MemoryConnector {
    /// Create an empty connector
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a collection
    #[must_use]
    pub fn with_collection(
        mut self,
        name: impl Into<String>,
        documents: impl IntoIterator<Item = Document>,
    ) -> Self {
        Arc::make_mut(&mut self.collections).insert(name.into(), documents.into_iter().collect());
        self
    }

    /// Fail every `open` with a connection error
    #[must_use]
    pub fn failing_open(mut self, message: impl Into<String>) -> Self {
        self.fail_open = Some(message.into());
        self
    }

    /// Fail every read with a query error
    #[must_use]
    pub fn failing_query(mut self, message: impl Into<String>) -> Self {
        self.fail_query = Some(message.into());
        self
    }

    /// Number of sources opened so far
    pub fn opened(&self) -> usize {
        self.opened.load(AtomicOrdering::SeqCst)
    }

    /// Number of sources closed so far
    pub fn closed(&self) -> usize {
        self.closed.load(AtomicOrdering::SeqCst)
    }
}

#[async_trait]
impl SourceConnector for MemoryConnector {
    async fn open(&self, params: &ConnectionParams) -> Result<Box<dyn DocumentSource>> {
        params.validate()?;

        if let Some(message) = &self.fail_open {
            return Err(Error::connection(message.clone()));
        }
        self.opened.fetch_add(1, AtomicOrdering::SeqCst);

        let documents = self
            .collections
            .get(&params.table_name)
            .cloned()
            .unwrap_or_default();

        Ok(Box::new(MemorySource {
            documents,
            fail_query: self.fail_query.clone(),
            closed: Arc::clone(&self.closed),
        }))
    }

    fn connector_type(&self) -> &'static str {
        "memory"
    }
}

struct MemorySource {
    documents: Vec<Document>,
    fail_query: Option<String>,
    closed: Arc<AtomicUsize>,
}

impl MemorySource {
    fn check(&self) -> Result<()> {
        match &self.fail_query {
            Some(message) => Err(Error::query(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DocumentSource for MemorySource {
    async fn sample(&self, limit: usize) -> Result<Vec<Document>> {
        self.check()?;
        Ok(self.documents.iter().take(limit).cloned().collect())
    }

    async fn find_after(
        &self,
        id_field: &str,
        after: &[Bson],
        limit: usize,
    ) -> Result<Vec<Document>> {
        self.check()?;

        let mut matching: Vec<&Document> = self
            .documents
            .iter()
            .filter(|doc| {
                after.is_empty()
                    || doc.get(id_field).is_some_and(|id| {
                        after
                            .iter()
                            .any(|token| compare_ids(id, token).is_some_and(Ordering::is_gt))
                    })
            })
            .collect();

        matching.sort_by(|a, b| match (a.get(id_field), b.get(id_field)) {
            (Some(x), Some(y)) => compare_ids(x, y).unwrap_or(Ordering::Equal),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });

        Ok(matching.into_iter().take(limit).cloned().collect())
    }

    async fn close(&self) -> Result<()> {
        self.closed.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(())
    }
}

/// Order two identity values of the same type bracket
fn compare_ids(a: &Bson, b: &Bson) -> Option<Ordering> {
    match (a, b) {
        (Bson::ObjectId(x), Bson::ObjectId(y)) => Some(x.bytes().cmp(&y.bytes())),
        (Bson::String(x), Bson::String(y)) => Some(x.cmp(y)),
        (Bson::DateTime(x), Bson::DateTime(y)) => Some(x.cmp(y)),
        (Bson::Boolean(x), Bson::Boolean(y)) => Some(x.cmp(y)),
        _ => match (as_i64(a), as_i64(b)) {
            (Some(x), Some(y)) => Some(x.cmp(&y)),
            _ => as_f64(a)?.partial_cmp(&as_f64(b)?),
        },
    }
}

fn as_i64(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(n) => Some(i64::from(*n)),
        Bson::Int64(n) => Some(*n),
        _ => None,
    }
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(f64::from(*n)),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(f) => Some(*f),
        _ => None,
    }
}
