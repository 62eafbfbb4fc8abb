//! Schema inference module
//!
//! Derives a table's field list by sampling documents from a collection.
//!
//! # Features
//!
//! - **Type Classification**: Maps each observed value to a [`ValueCategory`](crate::types::ValueCategory)
//! - **Type Unification**: Null never overrides a concrete type; conflicting types collapse to object
//! - **Stable Ordering**: Fields are emitted in first-seen order across the sample
//! - **Primary Detection**: Flags the `id` field or the configured identity key

mod inference;
mod types;

pub use inference::{infer_table_meta, SchemaInferrer, SAMPLE_SIZE};
pub use types::{FieldDescriptor, SchemaDescriptor};
