//! Execution engine that accepted requests are handed to.

use crate::config::UpstreamConfig;
use crate::error::ServiceError;
use crate::parser::GraphQLRequest;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Executes a GraphQL request that already passed validation.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Run the request and return the complete GraphQL response body.
    async fn execute(&self, request: &GraphQLRequest) -> Result<Value, ServiceError>;
}

/// Forwards requests to a GraphQL engine over HTTP.
pub struct UpstreamExecutor {
    client: reqwest::Client,
    url: String,
}

impl UpstreamExecutor {
    pub fn new(config: &UpstreamConfig) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Executor for UpstreamExecutor {
    async fn execute(&self, request: &GraphQLRequest) -> Result<Value, ServiceError> {
        debug!(url = %self.url, operation = ?request.operation_name, "Forwarding request upstream");

        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<Value>().await?)
    }
}
