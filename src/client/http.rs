//! HTTP implementation of the agent client

use super::{AgentClient, AgentReply, ChatRequest, ClientError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// JSON-over-HTTP agent client
#[derive(Clone)]
pub struct HttpAgentClient {
    client: Client,
}

impl HttpAgentClient {
    pub fn new(timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::network(format!("No se pudo crear el cliente HTTP: {e}")))?;
        Ok(Self { client })
    }

    fn classify_transport(e: &reqwest::Error) -> ClientError {
        if e.is_timeout() {
            ClientError::timeout()
        } else if e.is_connect() {
            ClientError::network(format!("No se pudo conectar con el agente: {e}"))
        } else {
            ClientError::network(format!("Se produjo un error al enviar tu mensaje: {e}"))
        }
    }
}

#[async_trait]
impl AgentClient for HttpAgentClient {
    async fn send(&self, endpoint: &str, request: &ChatRequest) -> Result<AgentReply, ClientError> {
        let response = self
            .client
            .post(endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| Self::classify_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "Agent returned non-success status");
            return Err(ClientError::status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Self::classify_transport(&e))?;

        serde_json::from_str(&body).map_err(|e| {
            tracing::debug!(error = %e, body = %body, "Undecodable agent reply");
            ClientError::decode("La respuesta del agente no es válida.")
        })
    }
}
