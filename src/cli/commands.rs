//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// MongoDB table connector CLI
#[derive(Parser, Debug)]
#[command(name = "mongo-table-connector")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input file (JSON): connection parameters for `meta`, a records request for `records`
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Infer the schema of a table by sampling documents
    Meta {
        /// Inline connection parameters JSON
        #[arg(long)]
        config_json: Option<String>,
    },

    /// Fetch one page of records
    Records {
        /// Inline records request JSON ({"datasourceConfig": ..., "pageToken": ..., "maxPageSize": ...})
        #[arg(long)]
        config_json: Option<String>,

        /// Page token from a previous call (overrides the request's)
        #[arg(long)]
        page_token: Option<String>,

        /// Maximum records per page (overrides the request's)
        #[arg(long)]
        max_page_size: Option<usize>,
    },

    /// Start HTTP server mode
    Serve {
        /// Server configuration file (YAML or JSON)
        #[arg(long)]
        server_config: Option<PathBuf>,

        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Allowed CORS origin (repeatable, `*` for any)
        #[arg(long = "cors-origin")]
        cors_origins: Vec<String>,

        /// Static file served at /meta.json
        #[arg(long)]
        meta_file: Option<PathBuf>,
    },
}
