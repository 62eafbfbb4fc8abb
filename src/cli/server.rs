//! HTTP server mode exposing table metadata and records

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::connection::ConnectionParams;
use crate::error::{Error, ErrorKind, Result};
use crate::records::{fetch_records, RecordsRequest};
use crate::schema::infer_table_meta;
use crate::store::SourceConnector;

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,
    /// Static file served at `/meta.json`
    pub meta_file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_origins: vec!["*".to_string()],
            meta_file: None,
        }
    }
}

impl ServerConfig {
    /// Load from a YAML or JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read {}: {e}", path.display())))?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(serde_yaml::from_str(&content)?)
        }
    }

    fn cors_layer(&self) -> Result<CorsLayer> {
        let origin = if self.cors_origins.is_empty() || self.cors_origins.iter().any(|o| o == "*") {
            AllowOrigin::from(Any)
        } else {
            let origins = self
                .cors_origins
                .iter()
                .map(|o| {
                    HeaderValue::from_str(o)
                        .map_err(|e| Error::invalid_value("cors_origins", format!("{o}: {e}")))
                })
                .collect::<Result<Vec<_>>>()?;
            AllowOrigin::list(origins)
        };

        Ok(CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
    }
}

/// App state shared across handlers
#[derive(Clone)]
struct AppState {
    config: ServerConfig,
    connector: Arc<dyn SourceConnector>,
}

/// Uniform response envelope
#[derive(Debug, Serialize)]
struct ApiResponse<T> {
    code: i32,
    message: String,
    data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            code: 0,
            message: "success".to_string(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    fn error(err: &Error) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
            data: None,
        }
    }
}

fn status_for(err: &Error) -> StatusCode {
    match err.kind() {
        ErrorKind::Config => StatusCode::BAD_REQUEST,
        ErrorKind::Connection => StatusCode::BAD_GATEWAY,
        ErrorKind::Query | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn respond<T: Serialize>(result: Result<T>) -> Response {
    match result {
        Ok(data) => (StatusCode::OK, Json(ApiResponse::success(data))).into_response(),
        Err(err) => (status_for(&err), Json(ApiResponse::error(&err))).into_response(),
    }
}

fn body_value(body: std::result::Result<Json<Value>, JsonRejection>) -> Result<Value> {
    body.map(|Json(value)| value)
        .map_err(|rejection| Error::config(format!("Invalid request body: {}", rejection.body_text())))
}

/// Build the router
pub fn router(config: ServerConfig, connector: Arc<dyn SourceConnector>) -> Result<Router> {
    let cors = config.cors_layer()?;
    let state = AppState { config, connector };

    Ok(Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/meta.json", get(meta_json))
        .route("/api/table_meta", post(table_meta))
        .route("/api/records", post(records))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state)))
}

/// Start the HTTP server
pub async fn serve(config: ServerConfig, connector: Arc<dyn SourceConnector>) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| Error::invalid_value("host", format!("{}: {e}", config.host)))?;
    let app = router(config, connector)?;

    tracing::info!("Starting HTTP server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to {addr}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::Other(format!("Server error: {e}")))?;

    Ok(())
}

async fn index() -> &'static str {
    "hello world"
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({ "status": "ok", "connector": state.connector.connector_type() }))
}

/// Serve the configured static connector description
async fn meta_json(State(state): State<Arc<AppState>>) -> Response {
    let Some(path) = &state.config.meta_file else {
        let err = Error::config("meta.json is not configured");
        return (StatusCode::NOT_FOUND, Json(ApiResponse::error(&err))).into_response();
    };

    match tokio::fs::read_to_string(path).await {
        Ok(content) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            content,
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read meta file");
            let err = Error::Io(e);
            (StatusCode::NOT_FOUND, Json(ApiResponse::error(&err))).into_response()
        }
    }
}

/// Infer table metadata
async fn table_meta(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Response {
    tracing::info!("table_meta request");

    let result = async {
        let params = table_meta_params(body_value(body)?)?;
        infer_table_meta(state.connector.as_ref(), &params).await
    }
    .await;

    respond(result)
}

/// Fetch one page of records
async fn records(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Response {
    tracing::info!("records request");

    let result = async {
        let request: RecordsRequest = serde_json::from_value(body_value(body)?)?;
        fetch_records(state.connector.as_ref(), &request).await
    }
    .await;

    respond(result)
}

/// Connection parameters from a bare object or a `datasourceConfig` wrapper
fn table_meta_params(body: Value) -> Result<ConnectionParams> {
    let Some(wrapped) = body.get("datasourceConfig") else {
        return ConnectionParams::from_value(body);
    };

    let config = match wrapped {
        Value::String(text) => serde_json::from_str(text)?,
        other => other.clone(),
    };

    match config.get("dbConfig") {
        Some(db_config) if !db_config.is_null() => ConnectionParams::from_value(db_config.clone()),
        _ => Err(Error::missing_field("dbConfig")),
    }
}
