//! CLI module
//!
//! Command-line interface for the connector.
//!
//! # Commands
//!
//! - `meta` - Infer a table's schema
//! - `records` - Fetch one page of records
//! - `serve` - Start HTTP server mode

mod commands;
mod runner;
mod server;

pub use commands::{Cli, Commands};
pub use runner::Runner;
pub use server::{router, serve, ServerConfig};
