//! Realtime Database REST client.
//!
//! Production-grade client with:
//! - Token refresh on expired credentials
//! - HTTP client tuning (pooling, timeouts)
//! - ETag conditional writes
//! - Observability (tracing spans, metrics)

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ETAG, IF_MATCH};
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::Value;
use swirl_auth::TokenSource;
use swirl_models::JsonMap;
use tracing::{debug, info_span, Instrument};

use crate::database::{Database, Versioned};
use crate::error::{DatabaseError, DatabaseResult};
use crate::metrics::record_request;
use crate::path::DatabasePath;

const ETAG_REQUEST_HEADER: &str = "x-firebase-etag";

// =============================================================================
// Configuration
// =============================================================================

/// Realtime Database client configuration.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database URL, e.g. `https://<project>-default-rtdb.firebaseio.com`
    pub database_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
}

impl DatabaseConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> DatabaseResult<Self> {
        let database_url = std::env::var("FIREBASE_DATABASE_URL").map_err(|_| {
            DatabaseError::config_error("FIREBASE_DATABASE_URL must be set to access the database")
        })?;

        if database_url.trim().is_empty() {
            return Err(DatabaseError::config_error("FIREBASE_DATABASE_URL cannot be empty"));
        }

        let timeout_secs: u64 = std::env::var("RTDB_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        let connect_timeout_secs: u64 = std::env::var("RTDB_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        Ok(Self {
            timeout: Duration::from_secs(timeout_secs),
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            ..Self::new(database_url.trim())
        })
    }
}

// =============================================================================
// Client
// =============================================================================

/// A single REST call, replayable after a token refresh.
struct RtdbRequest<'a> {
    method: Method,
    path: &'a DatabasePath,
    query: &'a [(&'static str, &'static str)],
    headers: HeaderMap,
    body: Option<&'a Value>,
}

impl<'a> RtdbRequest<'a> {
    fn new(method: Method, path: &'a DatabasePath) -> Self {
        Self {
            method,
            path,
            query: &[],
            headers: HeaderMap::new(),
            body: None,
        }
    }

    fn query(mut self, query: &'a [(&'static str, &'static str)]) -> Self {
        self.query = query;
        self
    }

    fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    fn body(mut self, body: &'a Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Realtime Database REST client.
#[derive(Clone)]
pub struct RealtimeDatabaseClient {
    http: Client,
    config: DatabaseConfig,
    tokens: Arc<dyn TokenSource>,
}

impl RealtimeDatabaseClient {
    /// Create a new client authorized by `tokens`.
    pub fn new(config: DatabaseConfig, tokens: Arc<dyn TokenSource>) -> DatabaseResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("swirl-database/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(DatabaseError::Network)?;

        Ok(Self { http, config, tokens })
    }

    /// Create from environment variables.
    pub fn from_env(tokens: Arc<dyn TokenSource>) -> DatabaseResult<Self> {
        let config = DatabaseConfig::from_env()?;
        Self::new(config, tokens)
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    fn node_url(&self, path: &DatabasePath) -> String {
        format!("{}/{}.json", self.config.database_url, path.to_url_path())
    }

    fn is_access_token_expired(body: &str) -> bool {
        body.to_ascii_lowercase().contains("expired")
    }

    async fn send_once(&self, request: &RtdbRequest<'_>) -> DatabaseResult<Response> {
        let token = self.tokens.access_token().await?;
        let mut builder = self
            .http
            .request(request.method.clone(), self.node_url(request.path))
            .query(request.query)
            .query(&[(token.kind.query_param(), token.value.as_str())])
            .headers(request.headers.clone());

        if let Some(body) = request.body {
            builder = builder.json(body);
        }

        Ok(builder.send().await?)
    }

    /// Send a request, refreshing the credential once if the backend reports it expired.
    async fn send(&self, request: RtdbRequest<'_>) -> DatabaseResult<Response> {
        let response = self.send_once(&request).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if !Self::is_access_token_expired(&body) {
            return Err(Self::status_error(StatusCode::UNAUTHORIZED, request.path, &body));
        }

        debug!("Credential expired for {}, refreshing", request.path);
        self.tokens.invalidate().await;
        self.send_once(&request).await
    }

    async fn execute_request<T, F>(
        &self,
        operation: &str,
        path: &DatabasePath,
        fut: F,
    ) -> DatabaseResult<T>
    where
        F: std::future::Future<Output = DatabaseResult<T>>,
    {
        let span = info_span!("rtdb_request", operation = %operation, path = %path);

        let start = Instant::now();
        let result = fut.instrument(span).await;
        let latency_ms = start.elapsed().as_millis() as f64;

        let status = match &result {
            Ok(_) => 200,
            Err(e) => e.http_status().unwrap_or(500),
        };
        record_request(operation, status, latency_ms);

        result
    }

    /// Pull the message out of an RTDB `{"error": "..."}` body.
    fn error_message(body: &str) -> String {
        serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| body.to_string())
    }

    fn status_error(status: StatusCode, path: &DatabasePath, body: &str) -> DatabaseError {
        DatabaseError::from_http_status(
            status.as_u16(),
            format!("{} failed: {}", path, Self::error_message(body)),
        )
    }

    async fn handle_error_response(path: &DatabasePath, response: Response) -> DatabaseError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Self::status_error(status, path, &body)
    }

    async fn read_value(response: Response) -> DatabaseResult<Option<Value>> {
        let value: Value = response.json().await?;
        Ok(match value {
            Value::Null => None,
            other => Some(other),
        })
    }
}

#[async_trait]
impl Database for RealtimeDatabaseClient {
    async fn get(&self, path: &DatabasePath) -> DatabaseResult<Option<Value>> {
        self.execute_request("get", path, async {
            let response = self.send(RtdbRequest::new(Method::GET, path)).await?;
            match response.status() {
                StatusCode::OK => Self::read_value(response).await,
                _ => Err(Self::handle_error_response(path, response).await),
            }
        })
        .await
    }

    async fn exists(&self, path: &DatabasePath) -> DatabaseResult<bool> {
        self.execute_request("exists", path, async {
            let request = RtdbRequest::new(Method::GET, path).query(&[("shallow", "true")]);
            let response = self.send(request).await?;
            match response.status() {
                StatusCode::OK => Ok(Self::read_value(response).await?.is_some()),
                _ => Err(Self::handle_error_response(path, response).await),
            }
        })
        .await
    }

    async fn set(&self, path: &DatabasePath, value: &Value) -> DatabaseResult<()> {
        self.execute_request("set", path, async {
            let request = RtdbRequest::new(Method::PUT, path)
                .query(&[("print", "silent")])
                .body(value);
            let response = self.send(request).await?;
            match response.status() {
                StatusCode::OK | StatusCode::NO_CONTENT => Ok(()),
                _ => Err(Self::handle_error_response(path, response).await),
            }
        })
        .await
    }

    async fn update(&self, path: &DatabasePath, children: &JsonMap) -> DatabaseResult<()> {
        let body = Value::Object(children.clone());
        self.execute_request("update", path, async {
            let request = RtdbRequest::new(Method::PATCH, path)
                .query(&[("print", "silent")])
                .body(&body);
            let response = self.send(request).await?;
            match response.status() {
                StatusCode::OK | StatusCode::NO_CONTENT => Ok(()),
                _ => Err(Self::handle_error_response(path, response).await),
            }
        })
        .await
    }

    async fn get_versioned(&self, path: &DatabasePath) -> DatabaseResult<Versioned> {
        self.execute_request("get_versioned", path, async {
            let request = RtdbRequest::new(Method::GET, path).header(
                HeaderName::from_static(ETAG_REQUEST_HEADER),
                HeaderValue::from_static("true"),
            );
            let response = self.send(request).await?;
            match response.status() {
                StatusCode::OK => {
                    let etag = response
                        .headers()
                        .get(ETAG)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string)
                        .ok_or_else(|| {
                            DatabaseError::invalid_response(format!(
                                "{}: response carried no ETag",
                                path
                            ))
                        })?;
                    let value = Self::read_value(response).await?;
                    Ok(Versioned { value, etag })
                }
                _ => Err(Self::handle_error_response(path, response).await),
            }
        })
        .await
    }

    async fn set_if_match(
        &self,
        path: &DatabasePath,
        value: &Value,
        etag: &str,
    ) -> DatabaseResult<()> {
        let etag = HeaderValue::from_str(etag)
            .map_err(|e| DatabaseError::request_failed(format!("invalid ETag {:?}: {}", etag, e)))?;

        self.execute_request("set_if_match", path, async {
            let request = RtdbRequest::new(Method::PUT, path)
                .query(&[("print", "silent")])
                .header(IF_MATCH, etag.clone())
                .body(value);
            let response = self.send(request).await?;
            match response.status() {
                StatusCode::OK | StatusCode::NO_CONTENT => Ok(()),
                StatusCode::PRECONDITION_FAILED => {
                    debug!("ETag mismatch on {}", path);
                    Err(DatabaseError::PreconditionFailed(format!("{} changed since read", path)))
                }
                _ => Err(Self::handle_error_response(path, response).await),
            }
        })
        .await
    }
}

// =============================================================================
// Tests
// =============================================================================
