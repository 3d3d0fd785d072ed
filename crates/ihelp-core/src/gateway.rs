use anyhow::Result;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::GatewaySettings;
use crate::document::DocumentRef;
use crate::error::GatewayError;
use crate::response::{parse_documents, parse_error, parse_reply, EMPTY_REPLY};

/// Body of a chat request. `document_name` is left out when no document is active.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_name: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>, document_name: Option<String>) -> Self {
        Self {
            message: message.into(),
            document_name,
        }
    }
}

/// Talks to the chat backend. One request per call, no retries.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    settings: GatewaySettings,
}

impl BackendClient {
    pub fn new(settings: GatewaySettings) -> Result<Self> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    /// Send a message and return the reply text, or a readable description of
    /// what went wrong. Never fails.
    pub async fn send_chat(&self, request: &ChatRequest) -> String {
        match self.try_send_chat(request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "chat request failed");
                e.user_message()
            }
        }
    }

    pub async fn try_send_chat(&self, request: &ChatRequest) -> Result<String, GatewayError> {
        let url = self.settings.chat_url();
        debug!(%url, document = ?request.document_name, "sending chat message");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await?;

        let body = read_body(response).await?;

        if let Ok(reply) = parse_reply(&body) {
            return Ok(reply);
        }
        if let Ok(error) = parse_error(&body) {
            return Err(GatewayError::Server(error));
        }

        debug!("chat response carried no reply text");
        Ok(EMPTY_REPLY.to_string())
    }

    pub async fn list_documents(&self) -> Result<Vec<DocumentRef>, GatewayError> {
        let url = self.settings.documents_url();
        debug!(%url, "listing documents");

        let response = self.client.get(&url).send().await?;
        let body = read_body(response).await?;

        let documents = parse_documents(&body).map_err(|_| {
            GatewayError::MalformedResponse("missing `documents` list".to_string())
        })?;

        debug!(count = documents.len(), "received documents");
        Ok(documents)
    }
}

/// Read a JSON body, turning non-2xx statuses into server errors
async fn read_body(response: reqwest::Response) -> Result<Value, GatewayError> {
    let status = response.status();
    let text = response.text().await?;
    let body: Option<Value> = serde_json::from_str(&text).ok();

    if !status.is_success() {
        let detail = body
            .as_ref()
            .and_then(|b| parse_error(b).ok())
            .unwrap_or_else(|| format!("HTTP {}", status));
        return Err(GatewayError::Server(detail));
    }

    body.ok_or_else(|| GatewayError::MalformedResponse("response body is not JSON".to_string()))
}
