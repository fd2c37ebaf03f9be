//! HTTP client for the calorie log server.
//!
//! Every operation either succeeds or fails uniformly: timeouts, transport
//! errors, and non-success responses all surface as
//! [`ApiError::NetworkUnavailable`]. The one exception is create, where the
//! server may report a validation problem in the response body.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::models::{LogRecord, NewLogRequest};

/// Caller-side timeout applied to every request; an expired timer is treated
/// the same as an unreachable server.
pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(3000);

/// Errors reported by the remote source.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Timeout, transport failure, or non-success response.
    #[error("server unreachable: {0}")]
    NetworkUnavailable(String),
    /// Server rejected a create request (bad field values).
    #[error("server rejected log: {0}")]
    Validation(String),
}

/// The five remote operations, injectable so the sync layer can be exercised
/// against a test double.
pub trait RemoteApi {
    fn list_logs(&self) -> impl Future<Output = Result<Vec<LogRecord>, ApiError>> + Send;
    fn get_log(&self, id: i64) -> impl Future<Output = Result<LogRecord, ApiError>> + Send;
    fn create_log(
        &self,
        new: &NewLogRequest,
    ) -> impl Future<Output = Result<LogRecord, ApiError>> + Send;
    fn delete_log(&self, id: i64) -> impl Future<Output = Result<LogRecord, ApiError>> + Send;
    fn list_all_logs(&self) -> impl Future<Output = Result<Vec<LogRecord>, ApiError>> + Send;
}

/// Error body shape the server uses for rejected creates.
#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// reqwest-backed implementation of [`RemoteApi`].
#[derive(Debug, Clone)]
pub struct HttpApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpApi {
    pub fn new(server_url: impl Into<String>) -> Self {
        let mut base_url = server_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn network_err(err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::NetworkUnavailable("request timed out".to_string())
        } else {
            ApiError::NetworkUnavailable(err.to_string())
        }
    }

    async fn fetch_json<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(Self::network_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::NetworkUnavailable(format!(
                "server returned status {}",
                status
            )));
        }

        response.json().await.map_err(Self::network_err)
    }
}

impl RemoteApi for HttpApi {
    async fn list_logs(&self) -> Result<Vec<LogRecord>, ApiError> {
        tracing::debug!("GET /logs");
        self.fetch_json(self.client.get(self.endpoint("/logs"))).await
    }

    async fn get_log(&self, id: i64) -> Result<LogRecord, ApiError> {
        tracing::debug!(id, "GET /log");
        self.fetch_json(self.client.get(self.endpoint(&format!("/log/{}", id))))
            .await
    }

    async fn create_log(&self, new: &NewLogRequest) -> Result<LogRecord, ApiError> {
        tracing::debug!(category = %new.category, "POST /log");
        let response = self
            .client
            .post(self.endpoint("/log"))
            .json(new)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(Self::network_err)?;

        let status = response.status();
        if !status.is_success() {
            // The server reports field-level problems as {"error": "..."}.
            if let Ok(body) = response.json::<ErrorBody>().await {
                if let Some(message) = body.error {
                    return Err(ApiError::Validation(message));
                }
            }
            return Err(ApiError::NetworkUnavailable(format!(
                "server returned status {}",
                status
            )));
        }

        response.json().await.map_err(Self::network_err)
    }

    async fn delete_log(&self, id: i64) -> Result<LogRecord, ApiError> {
        tracing::debug!(id, "DELETE /log");
        self.fetch_json(self.client.delete(self.endpoint(&format!("/log/{}", id))))
            .await
    }

    async fn list_all_logs(&self) -> Result<Vec<LogRecord>, ApiError> {
        tracing::debug!("GET /allLogs");
        self.fetch_json(self.client.get(self.endpoint("/allLogs")))
            .await
    }
}
