//! Error types for the MongoDB table connector
//!
//! Every public operation returns `Result<T, Error>`. Failures fall into
//! three caller-visible kinds (configuration, connection, query) so the
//! transport layer can map them to response codes without inspecting
//! messages.

use thiserror::Error;

/// The main error type for the connector
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Store Errors
    // ============================================================================
    #[error("Connection error: {message}")]
    Connection { message: String },

    #[error("Query error: {message}")]
    Query { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or incomplete input
    Config,
    /// Store unreachable or authentication failed
    Connection,
    /// Read failed after the connection succeeded
    Query,
    /// Anything else
    Internal,
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config { .. }
            | Error::MissingConfigField { .. }
            | Error::InvalidConfigValue { .. }
            | Error::YamlParse(_)
            | Error::JsonParse(_) => ErrorKind::Config,
            Error::Connection { .. } => ErrorKind::Connection,
            Error::Query { .. } => ErrorKind::Query,
            Error::Io(_) | Error::Other(_) => ErrorKind::Internal,
        }
    }

    /// Stable numeric code reported in the response envelope
    pub fn code(&self) -> i32 {
        match self.kind() {
            ErrorKind::Config => 1001,
            ErrorKind::Connection => 1002,
            ErrorKind::Query => 1003,
            ErrorKind::Internal => 1000,
        }
    }

    /// Message without the kind label
    pub fn message(&self) -> String {
        match self {
            Error::Config { message }
            | Error::Connection { message }
            | Error::Query { message } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Rebuild this error with a message prefix, keeping its kind
    fn prefixed(self, prefix: &str) -> Self {
        let message = format!("{prefix}: {}", self.message());
        match self.kind() {
            ErrorKind::Config => Error::config(message),
            ErrorKind::Connection => Error::connection(message),
            ErrorKind::Query => Error::query(message),
            ErrorKind::Internal => Error::Other(message),
        }
    }
}

impl From<mongodb::error::Error> for Error {
    fn from(err: mongodb::error::Error) -> Self {
        use mongodb::error::ErrorKind as MongoKind;

        match *err.kind {
            MongoKind::InvalidArgument { .. } => Error::config(err.to_string()),
            MongoKind::Authentication { .. }
            | MongoKind::ServerSelection { .. }
            | MongoKind::DnsResolve { .. }
            | MongoKind::Io(_)
            | MongoKind::ConnectionPoolCleared { .. }
            | MongoKind::InvalidTlsConfig { .. } => Error::connection(err.to_string()),
            _ => Error::query(err.to_string()),
        }
    }
}

/// Result type alias for the connector
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().prefixed(&message.into()))
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| e.into().prefixed(&f()))
    }
}
