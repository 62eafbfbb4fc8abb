//! Connection parameters and MongoDB connection-string construction
//!
//! Parameters arrive per call from the caller, are turned into a
//! `mongodb://` URI once and then discarded. Credentials are embedded only
//! when both the username and the password are non-empty, percent-encoded
//! and placed before the host.

use crate::error::{Error, Result};
use crate::types::NumberOrString;
use serde::{Deserialize, Deserializer};
use url::Url;

/// Authentication database used when none is configured
pub const DEFAULT_AUTH_SOURCE: &str = "admin";

/// Identity field of a MongoDB collection
pub const DEFAULT_ID_FIELD: &str = "_id";

/// Port used when the caller omits one
pub const DEFAULT_PORT: u16 = 27017;

/// Native type of the identity field, used to decode page tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IdType {
    /// ObjectId when the token is 24 hex digits, integer when it parses as one, else string
    #[default]
    Auto,
    ObjectId,
    String,
    Int,
}

/// Discrete connection fields for one collection
#[derive(Clone, Deserialize)]
pub struct ConnectionParams {
    #[serde(rename = "MONGODB_HOST", alias = "host", default)]
    pub host: String,

    #[serde(
        rename = "MONGODB_PORT",
        alias = "port",
        default = "default_port",
        deserialize_with = "deserialize_port"
    )]
    pub port: u16,

    #[serde(rename = "MONGODB_USERNAME", alias = "username", default)]
    pub username: Option<String>,

    #[serde(rename = "MONGODB_PASSWORD", alias = "password", default)]
    pub password: Option<String>,

    #[serde(rename = "MONGODB_NAME", alias = "databaseName", default)]
    pub database_name: String,

    #[serde(rename = "TABLE_NAME", alias = "tableName", default)]
    pub table_name: String,

    #[serde(rename = "MONGODB_AUTH_SOURCE", alias = "authSource", default)]
    pub auth_source: Option<String>,

    #[serde(rename = "ID_FIELD", alias = "idField", default = "default_id_field")]
    pub id_field: String,

    #[serde(rename = "ID_TYPE", alias = "idType", default)]
    pub id_type: IdType,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_id_field() -> String {
    DEFAULT_ID_FIELD.to_string()
}

fn deserialize_port<'de, D>(deserializer: D) -> std::result::Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;

    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(DEFAULT_PORT),
        Some(NumberOrString::Text(s)) if s.trim().is_empty() => Ok(DEFAULT_PORT),
        Some(raw) => raw
            .as_i64()
            .and_then(|p| u16::try_from(p).ok())
            .filter(|p| *p != 0)
            .ok_or_else(|| D::Error::custom(format!("invalid port '{raw}'"))),
    }
}

impl std::fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .field("database_name", &self.database_name)
            .field("table_name", &self.table_name)
            .field("auth_source", &self.auth_source)
            .field("id_field", &self.id_field)
            .field("id_type", &self.id_type)
            .finish()
    }
}

impl ConnectionParams {
    /// Create parameters for an unauthenticated connection
    pub fn new(
        host: impl Into<String>,
        port: u16,
        database_name: impl Into<String>,
        table_name: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: None,
            password: None,
            database_name: database_name.into(),
            table_name: table_name.into(),
            auth_source: None,
            id_field: default_id_field(),
            id_type: IdType::Auto,
        }
    }

    /// Set credentials
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Override the authentication database
    #[must_use]
    pub fn with_auth_source(mut self, auth_source: impl Into<String>) -> Self {
        self.auth_source = Some(auth_source.into());
        self
    }

    /// Override the identity field
    #[must_use]
    pub fn with_id_field(mut self, id_field: impl Into<String>, id_type: IdType) -> Self {
        self.id_field = id_field.into();
        self.id_type = id_type;
        self
    }

    /// Parse from a JSON value
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let params: Self = serde_json::from_value(value)?;
        params.validate()?;
        Ok(params)
    }

    /// Check that every required field is present
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::missing_field("MONGODB_HOST"));
        }
        if self.database_name.trim().is_empty() {
            return Err(Error::missing_field("MONGODB_NAME"));
        }
        if self.table_name.trim().is_empty() {
            return Err(Error::missing_field("TABLE_NAME"));
        }
        if self.id_field.is_empty() {
            return Err(Error::invalid_value("ID_FIELD", "must not be empty"));
        }
        Ok(())
    }

    /// Username and password, when both are non-empty
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
            _ => None,
        }
    }

    /// Authentication database
    pub fn auth_source(&self) -> &str {
        self.auth_source
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_AUTH_SOURCE)
    }

    /// Build the `mongodb://` connection string
    pub fn connection_uri(&self) -> Result<String> {
        self.build_uri(self.credentials()).map(String::from)
    }

    /// Connection string with the password masked, for logs
    pub fn redacted_uri(&self) -> Result<String> {
        self.build_uri(self.credentials().map(|(user, _)| (user, "****")))
            .map(String::from)
    }

    fn build_uri(&self, credentials: Option<(&str, &str)>) -> Result<Url> {
        self.validate()?;

        let base = format!(
            "mongodb://{}:{}/{}",
            self.host.trim(),
            self.port,
            self.database_name.trim()
        );
        let mut url = Url::parse(&base)
            .map_err(|e| Error::invalid_value("MONGODB_HOST", format!("{base}: {e}")))?;

        if let Some((user, pass)) = credentials {
            url.set_username(user)
                .map_err(|()| Error::invalid_value("MONGODB_USERNAME", "cannot be set on this host"))?;
            url.set_password(Some(pass))
                .map_err(|()| Error::invalid_value("MONGODB_PASSWORD", "cannot be set on this host"))?;
        }

        url.query_pairs_mut()
            .append_pair("authSource", self.auth_source());

        Ok(url)
    }
}
