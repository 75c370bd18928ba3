//! GraphQL request handling.
//!
//! Every request goes parse → depth check → execute → respond. Validation runs
//! synchronously and the parsed document is dropped before execution starts.

use crate::config::SettingsConfig;
use crate::depth::measure_depth;
use crate::error::{graphql_error_response, ErrorType, RequestError};
use crate::executor::Executor;
use crate::parser::{parse_query, parse_request, GraphQLRequest};
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Transport-independent response produced for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceResponse {
    /// HTTP status code
    pub status: u16,
    /// JSON response body
    pub body: Value,
    /// Measured depth, for accepted requests
    pub depth: Option<usize>,
}

impl ServiceResponse {
    fn error(status: u16, error: RequestError) -> Self {
        Self {
            status,
            body: graphql_error_response(&[error]),
            depth: None,
        }
    }
}

/// Request counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ServiceStats {
    pub requests_total: u64,
    pub requests_rejected: u64,
    pub requests_executed: u64,
}

struct ValidatedRequest {
    request: GraphQLRequest,
    depth: usize,
}

/// Depth-guarded GraphQL endpoint.
pub struct GraphQLService {
    settings: SettingsConfig,
    executor: Arc<dyn Executor>,
    requests_total: AtomicU64,
    /// Requests turned away by the depth guard
    requests_rejected: AtomicU64,
    requests_executed: AtomicU64,
}

impl GraphQLService {
    pub fn new(settings: SettingsConfig, executor: Arc<dyn Executor>) -> Self {
        Self {
            settings,
            executor,
            requests_total: AtomicU64::new(0),
            requests_rejected: AtomicU64::new(0),
            requests_executed: AtomicU64::new(0),
        }
    }

    pub fn settings(&self) -> &SettingsConfig {
        &self.settings
    }

    /// Handle one raw request body.
    pub async fn handle(&self, body: &[u8], correlation_id: &str) -> ServiceResponse {
        self.requests_total.fetch_add(1, Ordering::Relaxed);

        let validated = match Self::validate_request(body, self.settings.max_body_size) {
            Ok(validated) => validated,
            Err((status, err)) => {
                if err.error_type == ErrorType::DepthLimitExceeded {
                    self.requests_rejected.fetch_add(1, Ordering::Relaxed);
                }
                warn!(
                    correlation_id = %correlation_id,
                    error_type = %err.error_type,
                    message = %err.message,
                    "GraphQL request rejected"
                );
                return ServiceResponse::error(status, err);
            }
        };

        debug!(
            correlation_id = %correlation_id,
            depth = validated.depth,
            "GraphQL request passed depth check"
        );

        match self.executor.execute(&validated.request).await {
            Ok(body) => {
                self.requests_executed.fetch_add(1, Ordering::Relaxed);
                ServiceResponse {
                    status: 200,
                    body,
                    depth: Some(validated.depth),
                }
            }
            Err(e) => {
                error!(correlation_id = %correlation_id, error = %e, "Execution failed");
                ServiceResponse::error(
                    502,
                    RequestError::execution_error("Failed to execute the request"),
                )
            }
        }
    }

    /// Synchronous validation; returns the HTTP status to use on failure.
    fn validate_request(
        body: &[u8],
        max_body_size: usize,
    ) -> Result<ValidatedRequest, (u16, RequestError)> {
        if body.len() > max_body_size {
            return Err((
                413,
                RequestError::invalid_request(&format!(
                    "Request body too large: {} bytes (max: {})",
                    body.len(),
                    max_body_size
                )),
            ));
        }

        let request = parse_request(body).map_err(|e| (400, e))?;
        let document = parse_query(&request.query).map_err(|e| (200, e))?;

        let depth = measure_depth(&document).map_err(|exceeded| {
            debug!(
                field = %exceeded.field,
                line = exceeded.line,
                column = exceeded.column,
                "Depth limit crossed"
            );
            (200, RequestError::from(exceeded))
        })?;

        Ok(ValidatedRequest { request, depth })
    }

    pub fn stats(&self) -> ServiceStats {
        ServiceStats {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            requests_rejected: self.requests_rejected.load(Ordering::Relaxed),
            requests_executed: self.requests_executed.load(Ordering::Relaxed),
        }
    }
}
