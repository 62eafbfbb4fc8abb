//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::cli::server::{serve, ServerConfig};
use crate::connection::ConnectionParams;
use crate::error::{Error, Result};
use crate::records::{fetch_records, RecordsRequest};
use crate::schema::infer_table_meta;
use crate::store::{MongoConnector, SourceConnector};
use crate::types::NumberOrString;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// CLI runner
pub struct Runner {
    cli: Cli,
    connector: Arc<dyn SourceConnector>,
}

impl Runner {
    /// Create a runner backed by MongoDB
    pub fn new(cli: Cli) -> Self {
        Self::with_connector(cli, Arc::new(MongoConnector::new().with_app_name(crate::NAME)))
    }

    /// Create a runner with a custom connector
    pub fn with_connector(cli: Cli, connector: Arc<dyn SourceConnector>) -> Self {
        Self { cli, connector }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Meta { config_json } => self.meta(config_json.as_deref()).await,
            Commands::Records {
                config_json,
                page_token,
                max_page_size,
            } => {
                self.records(config_json.as_deref(), page_token.clone(), *max_page_size)
                    .await
            }
            Commands::Serve {
                server_config,
                host,
                port,
                cors_origins,
                meta_file,
            } => {
                let config = Self::server_config(
                    server_config.as_ref(),
                    host.clone(),
                    *port,
                    cors_origins,
                    meta_file.clone(),
                )?;
                serve(config, Arc::clone(&self.connector)).await
            }
        }
    }

    /// Load the input JSON
    fn load_input(&self, inline: Option<&str>) -> Result<Value> {
        // Inline input takes precedence
        if let Some(json_str) = inline {
            return serde_json::from_str(json_str)
                .map_err(|e| Error::config(format!("Invalid input JSON: {e}")));
        }

        if let Some(path) = &self.cli.config {
            let content = fs::read_to_string(path)
                .map_err(|e| Error::config(format!("Failed to read input file: {e}")))?;
            return serde_json::from_str(&content)
                .map_err(|e| Error::config(format!("Invalid input JSON: {e}")));
        }

        Err(Error::config(
            "No input given (use --config-json or --config <file>)",
        ))
    }

    /// Infer table metadata
    async fn meta(&self, config_json: Option<&str>) -> Result<()> {
        let params = ConnectionParams::from_value(self.load_input(config_json)?)?;
        let schema = infer_table_meta(self.connector.as_ref(), &params).await?;
        self.output(&schema)
    }

    /// Fetch one page of records
    async fn records(
        &self,
        config_json: Option<&str>,
        page_token: Option<String>,
        max_page_size: Option<usize>,
    ) -> Result<()> {
        let mut request: RecordsRequest = serde_json::from_value(self.load_input(config_json)?)?;
        if page_token.is_some() {
            request.page_token = page_token;
        }
        if let Some(size) = max_page_size {
            request.max_page_size = Some(NumberOrString::Number(size.into()));
        }

        let page = fetch_records(self.connector.as_ref(), &request).await?;
        self.output(&page)
    }

    /// Merge the server config file with command-line overrides
    fn server_config(
        file: Option<&PathBuf>,
        host: Option<String>,
        port: Option<u16>,
        cors_origins: &[String],
        meta_file: Option<PathBuf>,
    ) -> Result<ServerConfig> {
        let mut config = match file {
            Some(path) => ServerConfig::from_file(path)?,
            None => ServerConfig::default(),
        };

        if let Some(host) = host {
            config.host = host;
        }
        if let Some(port) = port {
            config.port = port;
        }
        if !cors_origins.is_empty() {
            config.cors_origins = cors_origins.to_vec();
        }
        if meta_file.is_some() {
            config.meta_file = meta_file;
        }

        Ok(config)
    }

    /// Write a result to stdout
    fn output<T: Serialize>(&self, value: &T) -> Result<()> {
        let text = if self.cli.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        println!("{text}");
        Ok(())
    }
}
