//! Venice AI integration
//!
//! Provides the single outbound call the relay needs: text-to-image
//! generation via `POST /image/generate`.

use std::time::Duration;

use rand::Rng;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::ProviderConfig;

/// Seeds are drawn from `0..SEED_RANGE_END`
pub const SEED_RANGE_END: u64 = 1_000_000;

/// Provider call errors
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Venice API key not configured")]
    NotConfigured,

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error: {status}")]
    Rejected {
        status: StatusCode,
        body: serde_json::Value,
    },

    #[error("failed to parse response: {0}")]
    Decode(String),
}

/// Fixed generation settings sent with every request
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub model: String,
    pub width: u32,
    pub height: u32,
    pub steps: u32,
    pub cfg_scale: f32,
    pub negative_prompt: String,
    pub hide_watermark: bool,
    pub return_binary: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            model: "fluently-xl".to_string(),
            width: 512,
            height: 512,
            steps: 30,
            cfg_scale: 7.5,
            negative_prompt: String::new(),
            hide_watermark: false,
            return_binary: false,
        }
    }
}

impl GenerationParams {
    /// Build a provider request for `prompt` with a fresh random seed
    pub fn request(&self, prompt: &str) -> ImageGenerateRequest {
        self.request_with_seed(prompt, random_seed())
    }

    /// Build a provider request with an explicit seed
    pub fn request_with_seed(&self, prompt: &str, seed: u64) -> ImageGenerateRequest {
        ImageGenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            width: self.width,
            height: self.height,
            steps: self.steps,
            seed,
            cfg_scale: self.cfg_scale,
            negative_prompt: self.negative_prompt.clone(),
            hide_watermark: self.hide_watermark,
            return_binary: self.return_binary,
        }
    }
}

/// Draw a seed uniformly from the provider's accepted range
pub fn random_seed() -> u64 {
    rand::rng().random_range(0..SEED_RANGE_END)
}

/// Image generation request
#[derive(Debug, Clone, Serialize)]
pub struct ImageGenerateRequest {
    pub model: String,
    pub prompt: String,
    pub width: u32,
    pub height: u32,
    pub steps: u32,
    pub seed: u64,
    pub cfg_scale: f32,
    pub negative_prompt: String,
    pub hide_watermark: bool,
    pub return_binary: bool,
}

/// Image generation response
#[derive(Debug, Deserialize)]
pub struct ImageGenerateResponse {
    /// Base64-encoded images, first one is used
    #[serde(default, deserialize_with = "null_as_empty")]
    pub images: Vec<Option<String>>,
}

/// `"images": null` means the same as no images
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

/// Venice AI client
#[derive(Debug)]
pub struct VeniceClient {
    /// HTTP client
    client: Client,
    /// API key
    api_key: Option<String>,
    /// API base URL
    base_url: String,
}

impl VeniceClient {
    /// Create a new Venice client from provider settings
    pub fn new(config: &ProviderConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Check if API key is configured
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate an image
    ///
    /// Issues exactly one HTTP request, no retries.
    pub async fn generate_image(
        &self,
        request: &ImageGenerateRequest,
    ) -> Result<ImageGenerateResponse, ProviderError> {
        let api_key = self.api_key.as_ref().ok_or(ProviderError::NotConfigured)?;

        debug!("Sending payload to Venice: {:?}", request);

        let response = self
            .client
            .post(format!("{}/image/generate", self.base_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        info!("Venice response status: {}", status);

        if !status.is_success() {
            let text = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    warn!("Failed to read Venice error body: {}", e);
                    format!("<unreadable body: {}>", e)
                }
            };
            warn!("Venice API error: {} - {}", status, text);
            let body = serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text));
            return Err(ProviderError::Rejected { status, body });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ProviderError::Decode(e.to_string()))
    }
}
