//! Prompt-to-image relay
//!
//! Validates a prompt, makes exactly one provider call with fixed generation
//! settings and a fresh seed, and normalizes the outcome into either an
//! inline image or a classified error.

mod inline;

pub use inline::{InlineImage, InlineImageError, DEFAULT_MEDIA_TYPE};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn, Instrument};
use uuid::Uuid;

use crate::venice::{GenerationParams, ProviderError, VeniceClient};

/// Failure classification shared by the service and its clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Empty or whitespace-only prompt
    InvalidInput,
    /// The provider could not be reached or answered with garbage
    ProviderUnreachable,
    /// The provider answered with a non-success status
    ProviderRejected,
    /// The provider succeeded but returned no usable image
    EmptyResult,
    /// Anything else that went wrong while handling the request
    InternalError,
}

impl ErrorKind {
    /// Human-readable message for this kind
    pub fn message(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "Prompt is required",
            ErrorKind::ProviderUnreachable => "Failed to generate image",
            ErrorKind::ProviderRejected => "Image provider error",
            ErrorKind::EmptyResult => "No image data returned from provider",
            ErrorKind::InternalError => "Failed to generate image",
        }
    }
}

/// Relay errors
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("prompt is required")]
    InvalidInput,

    #[error("provider unreachable: {0}")]
    ProviderUnreachable(String),

    #[error("provider rejected request with status {status}")]
    ProviderRejected {
        status: u16,
        body: serde_json::Value,
    },

    #[error("provider returned no image data")]
    EmptyResult,

    #[error("internal error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            RelayError::InvalidInput => ErrorKind::InvalidInput,
            RelayError::ProviderUnreachable(_) => ErrorKind::ProviderUnreachable,
            RelayError::ProviderRejected { .. } => ErrorKind::ProviderRejected,
            RelayError::EmptyResult => ErrorKind::EmptyResult,
            RelayError::Internal(_) => ErrorKind::InternalError,
        }
    }

    /// Diagnostic payload for the client, if any
    pub fn provider_detail(&self) -> Option<serde_json::Value> {
        match self {
            RelayError::ProviderUnreachable(detail) | RelayError::Internal(detail) => {
                Some(serde_json::Value::String(detail.clone()))
            }
            RelayError::ProviderRejected { status, body } => Some(serde_json::json!({
                "status": status,
                "body": body,
            })),
            RelayError::InvalidInput | RelayError::EmptyResult => None,
        }
    }
}

impl From<ProviderError> for RelayError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotConfigured => RelayError::Internal(err.to_string()),
            ProviderError::Transport(e) => RelayError::ProviderUnreachable(e.to_string()),
            ProviderError::Decode(e) => RelayError::ProviderUnreachable(e),
            ProviderError::Rejected { status, body } => RelayError::ProviderRejected {
                status: status.as_u16(),
                body,
            },
        }
    }
}

/// Reject a missing or whitespace-only prompt
///
/// The prompt is returned as given; trimming is only used for the check.
pub fn validate_prompt(prompt: Option<&str>) -> Result<&str, RelayError> {
    match prompt {
        Some(p) if !p.trim().is_empty() => Ok(p),
        _ => Err(RelayError::InvalidInput),
    }
}

/// Stateless relay between callers and the image provider
#[derive(Debug)]
pub struct Relay {
    provider: VeniceClient,
    params: GenerationParams,
}

impl Relay {
    /// Create a relay using the default generation settings
    pub fn new(provider: VeniceClient) -> Self {
        Self {
            provider,
            params: GenerationParams::default(),
        }
    }

    /// Check if the provider has credentials
    pub fn is_configured(&self) -> bool {
        self.provider.is_configured()
    }

    /// Generate an image from a prompt
    pub async fn generate(&self, prompt: Option<&str>) -> Result<InlineImage, RelayError> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("generate", %request_id);
        self.generate_inner(prompt).instrument(span).await
    }

    async fn generate_inner(&self, prompt: Option<&str>) -> Result<InlineImage, RelayError> {
        debug!("Received prompt: {:?}", prompt);
        let prompt = validate_prompt(prompt)?;

        let request = self.params.request(prompt);
        let response = self.provider.generate_image(&request).await.map_err(|e| {
            let err = RelayError::from(e);
            match err.kind() {
                ErrorKind::InternalError => error!("Image generation failed: {}", err),
                _ => warn!("Image generation failed: {}", err),
            }
            err
        })?;

        // Extra images are ignored
        let image = response
            .images
            .into_iter()
            .next()
            .flatten()
            .filter(|data| !data.trim().is_empty())
            .map(InlineImage::from_base64)
            .filter(|image| image.decode().is_ok())
            .ok_or_else(|| {
                warn!("Provider returned no usable image data");
                RelayError::EmptyResult
            })?;

        info!(
            "Generated {} image ({} base64 chars, seed {})",
            image.media_type(),
            image.data().len(),
            request.seed
        );
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_validate_prompt() {
        assert!(matches!(validate_prompt(None), Err(RelayError::InvalidInput)));
        assert!(matches!(validate_prompt(Some("")), Err(RelayError::InvalidInput)));
        assert!(matches!(
            validate_prompt(Some(" \t\n ")),
            Err(RelayError::InvalidInput)
        ));
        assert_eq!(validate_prompt(Some("  a cat ")).unwrap(), "  a cat ");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(RelayError::InvalidInput.kind(), ErrorKind::InvalidInput);
        assert_eq!(RelayError::EmptyResult.kind(), ErrorKind::EmptyResult);
        assert_eq!(
            RelayError::ProviderUnreachable("timeout".into()).kind(),
            ErrorKind::ProviderUnreachable
        );
        assert_eq!(
            RelayError::Internal("boom".into()).kind(),
            ErrorKind::InternalError
        );
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(ErrorKind::ProviderRejected).unwrap(),
            "provider_rejected"
        );
        let kind: ErrorKind = serde_json::from_str(r#""empty_result""#).unwrap();
        assert_eq!(kind, ErrorKind::EmptyResult);
    }

    #[test]
    fn test_provider_error_mapping() {
        let err = RelayError::from(ProviderError::Rejected {
            status: StatusCode::UNAUTHORIZED,
            body: serde_json::json!({"error": "bad key"}),
        });
        assert_eq!(err.kind(), ErrorKind::ProviderRejected);
        assert_eq!(
            err.provider_detail(),
            Some(serde_json::json!({"status": 401, "body": {"error": "bad key"}}))
        );

        let err = RelayError::from(ProviderError::Decode("expected value".into()));
        assert_eq!(err.kind(), ErrorKind::ProviderUnreachable);

        let err = RelayError::from(ProviderError::NotConfigured);
        assert_eq!(err.kind(), ErrorKind::InternalError);
    }

    #[test]
    fn test_no_detail_for_input_and_empty_result() {
        assert!(RelayError::InvalidInput.provider_detail().is_none());
        assert!(RelayError::EmptyResult.provider_detail().is_none());
    }
}
