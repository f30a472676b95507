use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE};
use serde_json::Value;
use tracing::{debug, error, warn};
use uuid::Uuid;

use super::config::RpcConfigStore;
use crate::error::RpcError;
use crate::logging::RpcLogger;

/// `Authorization` header value for the daemon's basic auth
pub fn basic_auth_header(user: &str, pass: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", user, pass)))
}

/// Map a complete daemon response onto the RPC result
pub fn classify_response(status: u16, body: String) -> Result<Value, RpcError> {
    match status {
        401 => Err(RpcError::Unauthorized),
        403 => Err(RpcError::Forbidden),
        500 => Err(RpcError::Daemon(body)),
        200..=299 => serde_json::from_str(&body)
            .map_err(|source| RpcError::MalformedResponse { status, body, source }),
        _ => Err(RpcError::UnexpectedStatus { status, body }),
    }
}

/// JSON-RPC client for the coin daemon.
///
/// Every call is a single POST with no timeout and no retry. The settings are read
/// from the shared store at the moment the call starts.
#[derive(Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    config: RpcConfigStore,
    logger: Option<Arc<RpcLogger>>,
}

impl RpcClient {
    pub fn new(config: RpcConfigStore) -> Result<Self, RpcError> {
        let http = reqwest::Client::builder()
            // one connection per request, nothing kept around between calls
            .pool_max_idle_per_host(0)
            .build()?;
        Ok(Self {
            http,
            config,
            logger: None,
        })
    }

    /// Also record traffic in the dated RPC communication log
    pub fn with_logger(mut self, logger: Arc<RpcLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn config(&self) -> &RpcConfigStore {
        &self.config
    }

    pub async fn execute(&self, command: &Value) -> Result<Value, RpcError> {
        let config = self.config.snapshot();
        let request_id = Uuid::new_v4().to_string();
        let method = command.get("method").and_then(Value::as_str).unwrap_or("<none>");
        let body = command.to_string();

        debug!("RPC {} -> {} ({} bytes) [{}]", method, config.endpoint(), body.len(), request_id);
        if let Some(logger) = &self.logger {
            if let Err(e) = logger.log_request(&request_id, method, &config.endpoint()).await {
                warn!("Failed to write RPC request log: {}", e);
            }
        }

        let result = self.round_trip(&config.endpoint(), &config.user, &config.pass, body).await;

        if let Err(RpcError::MalformedResponse { status, body, source }) = &result {
            error!(
                "Malformed daemon response (HTTP {}): {}\n{:?}\nbody: {}",
                status,
                source,
                std::backtrace::Backtrace::force_capture(),
                body
            );
            if let Some(logger) = &self.logger {
                if let Err(e) = logger
                    .log_malformed(&request_id, *status, body, &source.to_string())
                    .await
                {
                    warn!("Failed to write RPC malformed-response log: {}", e);
                }
            }
        }

        if let Some(logger) = &self.logger {
            let logged = match &result {
                Ok(value) => logger.log_response(&request_id, true, Some(value), None).await,
                Err(e) => logger.log_response(&request_id, false, None, Some(&e.to_string())).await,
            };
            if let Err(e) = logged {
                warn!("Failed to write RPC response log: {}", e);
            }
        }

        result
    }

    async fn round_trip(
        &self,
        endpoint: &str,
        user: &str,
        pass: &str,
        body: String,
    ) -> Result<Value, RpcError> {
        let response = self
            .http
            .post(endpoint)
            .header(CONTENT_LENGTH, body.len())
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, basic_auth_header(user, pass))
            .body(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        // Whole body first; only then decide what it means
        let bytes = response.bytes().await?;
        let text = String::from_utf8_lossy(&bytes).into_owned();
        debug!("RPC response: HTTP {} ({} bytes)", status, text.len());

        classify_response(status, text)
    }
}
