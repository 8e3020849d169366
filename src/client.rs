//! Agent service client
//!
//! One request/response exchange per call; no retries.

mod error;
mod http;
mod types;

pub use error::{ClientError, ClientErrorKind};
pub use http::HttpAgentClient;
pub use types::{AgentReply, ChatRequest};

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for the remote conversational agent
#[async_trait]
pub trait AgentClient: Send + Sync {
    /// POST `request` to `endpoint` and decode the reply
    async fn send(&self, endpoint: &str, request: &ChatRequest) -> Result<AgentReply, ClientError>;
}

#[async_trait]
impl<T: AgentClient + ?Sized> AgentClient for Arc<T> {
    async fn send(&self, endpoint: &str, request: &ChatRequest) -> Result<AgentReply, ClientError> {
        (**self).send(endpoint, request).await
    }
}

/// Logging wrapper for agent clients
pub struct LoggingClient<C> {
    inner: C,
}

impl<C: AgentClient> LoggingClient<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<C: AgentClient> AgentClient for LoggingClient<C> {
    async fn send(&self, endpoint: &str, request: &ChatRequest) -> Result<AgentReply, ClientError> {
        let start = std::time::Instant::now();
        let result = self.inner.send(endpoint, request).await;
        let duration = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::info!(
                    endpoint = %endpoint,
                    duration_ms = %duration.as_millis(),
                    has_session = !request.session_id.is_empty(),
                    reply_chars = reply.response.chars().count(),
                    "Agent exchange completed"
                );
            }
            Err(e) => {
                tracing::warn!(
                    endpoint = %endpoint,
                    duration_ms = %duration.as_millis(),
                    error = %e,
                    kind = ?e.kind,
                    "Agent exchange failed"
                );
            }
        }

        result
    }
}
