//! Relay client
//!
//! Caller-side counterpart of the relay endpoint. Validates prompts locally,
//! makes one request per call, and turns the response envelope into either
//! an inline image or a readable error.

mod session;

pub use session::{GeneratorSession, SessionBusy, SessionState};

use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::debug;

use crate::api::{ErrorResponse, GenerateRequest, GenerateResponse};
use crate::relay::{ErrorKind, InlineImage, InlineImageError};

/// Message shown when the prompt is blank
pub const EMPTY_PROMPT_MESSAGE: &str = "Please enter a prompt before generating";

/// Relay client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{}", EMPTY_PROMPT_MESSAGE)]
    EmptyPrompt,

    #[error("Error generating image: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{}", relay_message(.error, .details.as_ref()))]
    Relay {
        status: StatusCode,
        kind: ErrorKind,
        error: String,
        details: Option<serde_json::Value>,
    },

    #[error("Invalid image in relay response: {0}")]
    InvalidImage(#[from] InlineImageError),
}

impl ClientError {
    /// Failure classification, where one applies
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ClientError::EmptyPrompt => Some(ErrorKind::InvalidInput),
            ClientError::Relay { kind, .. } => Some(*kind),
            ClientError::Transport(_) | ClientError::InvalidImage(_) => None,
        }
    }
}

/// `error` followed by `: <details as JSON>` when details are present
fn relay_message(error: &str, details: Option<&serde_json::Value>) -> String {
    match details {
        Some(details) => format!("{}: {}", error, details),
        None => error.to_string(),
    }
}

/// Fallback classification when the envelope carries no kind
fn kind_for_status(status: StatusCode) -> ErrorKind {
    match status {
        StatusCode::BAD_REQUEST => ErrorKind::InvalidInput,
        StatusCode::BAD_GATEWAY => ErrorKind::ProviderRejected,
        _ => ErrorKind::InternalError,
    }
}

/// HTTP client for the relay endpoint
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: Client,
    base_url: String,
}

impl RelayClient {
    /// Create a client for a relay at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http_client(Client::new(), base_url)
    }

    /// Create a client reusing an existing HTTP client
    pub fn with_http_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Request an image for `prompt`
    pub async fn generate(&self, prompt: &str) -> Result<InlineImage, ClientError> {
        if prompt.trim().is_empty() {
            return Err(ClientError::EmptyPrompt);
        }

        debug!("Sending prompt: {}", prompt);
        let response = self
            .client
            .post(format!("{}/api/generate-image", self.base_url))
            .json(&GenerateRequest {
                prompt: Some(prompt.to_string()),
            })
            .send()
            .await?;

        let status = response.status();
        debug!("Response status: {}", status);

        if !status.is_success() {
            let body = response.text().await?;
            let envelope: ErrorResponse =
                serde_json::from_str(&body).unwrap_or_else(|_| ErrorResponse {
                    error: if body.is_empty() {
                        format!("Relay returned {}", status)
                    } else {
                        body
                    },
                    kind: None,
                    details: None,
                });
            return Err(ClientError::Relay {
                status,
                kind: envelope.kind.unwrap_or_else(|| kind_for_status(status)),
                error: envelope.error,
                details: envelope.details,
            });
        }

        let body: GenerateResponse = response.json().await?;
        Ok(InlineImage::parse_data_uri(&body.image)?)
    }
}
