//! Identity-cursor pagination
//!
//! A page is read with one lookahead document: `limit + 1` documents are
//! requested, the extra one only signals that another page exists and is
//! never returned. The token handed back is the identity of the last
//! returned document, and the next call resumes strictly after it.

use crate::connection::IdType;
use crate::error::{Error, Result};
use crate::store::value::{is_absent, stringify_id};
use bson::{oid::ObjectId, Bson, Document};

/// Decode a page token into the identity values to resume after.
///
/// An empty token means "from the beginning" and yields no candidates.
/// Explicit id types yield exactly one value. `Auto` yields the token as a
/// string plus every other native type it parses as (integer, finite
/// double, ObjectId), so the next read matches whichever type the
/// identities actually have.
pub fn decode_token(token: &str, id_type: IdType) -> Result<Vec<Bson>> {
    if token.is_empty() {
        return Ok(Vec::new());
    }

    let candidates = match id_type {
        IdType::String => vec![Bson::String(token.to_string())],
        IdType::ObjectId => vec![Bson::ObjectId(
            ObjectId::parse_str(token)
                .map_err(|e| Error::invalid_value("pageToken", format!("not an ObjectId: {e}")))?,
        )],
        IdType::Int => vec![Bson::Int64(
            token
                .parse()
                .map_err(|e| Error::invalid_value("pageToken", format!("not an integer: {e}")))?,
        )],
        IdType::Auto => auto_candidates(token),
    };

    Ok(candidates)
}

fn auto_candidates(token: &str) -> Vec<Bson> {
    let mut candidates = vec![Bson::String(token.to_string())];

    if let Ok(n) = token.parse::<i64>() {
        candidates.push(Bson::Int64(n));
    } else if let Some(f) = token.parse::<f64>().ok().filter(|f| f.is_finite()) {
        candidates.push(Bson::Double(f));
    }
    if let Ok(oid) = ObjectId::parse_str(token) {
        candidates.push(Bson::ObjectId(oid));
    }

    candidates
}

/// A page cut from a lookahead read
#[derive(Debug, Clone, PartialEq)]
pub struct CursorWindow {
    /// Documents to return
    pub documents: Vec<Document>,
    /// Whether the lookahead document was present
    pub has_more: bool,
    /// Token for the next call, empty on the last page
    pub next_token: String,
}

impl CursorWindow {
    /// Cut `fetched` (read with a limit of `page_size + 1`) down to one page.
    ///
    /// Fails when another page exists but the last returned document has no
    /// identity value to resume after.
    pub fn from_lookahead(
        mut fetched: Vec<Document>,
        page_size: usize,
        id_field: &str,
    ) -> Result<Self> {
        let has_more = fetched.len() > page_size;
        fetched.truncate(page_size);

        let next_token = if has_more {
            fetched
                .last()
                .and_then(|doc| doc.get(id_field))
                .filter(|id| !is_absent(id))
                .map(stringify_id)
                .ok_or_else(|| {
                    Error::query(format!(
                        "Cannot continue pagination: last document has no '{id_field}' value"
                    ))
                })?
        } else {
            String::new()
        };

        Ok(Self {
            documents: fetched,
            has_more,
            next_token,
        })
    }
}
