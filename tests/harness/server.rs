//! TestServer - end-to-end test harness
//!
//! Runs a themisd server in-process on a random port, wired to its own
//! `MockProvider` so every test is isolated.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use themis::client::RelayClient;
use themis::{Config, ProviderConfig, Server};
use tokio::task::JoinHandle;

use super::provider::{MockProvider, TEST_API_KEY};

/// Origin the test server allows
pub const TEST_ORIGIN: &str = "http://localhost:5174";

/// Test harness that runs a real themisd server on a random port
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub provider: MockProvider,
    server: Arc<Server>,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server instance
    pub async fn start() -> Result<Self> {
        Self::start_with(|_| {}).await
    }

    /// Start a test server, adjusting the config before launch
    pub async fn start_with(configure: impl FnOnce(&mut Config)) -> Result<Self> {
        let provider = MockProvider::start().await;

        // Find a random available port
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        drop(listener);

        let mut config = Config {
            bind_addr: addr,
            allowed_origins: vec![TEST_ORIGIN.to_string()],
            expose_error_details: true,
            provider: ProviderConfig {
                base_url: provider.uri(),
                api_key: Some(TEST_API_KEY.to_string()),
                timeout_secs: 5,
            },
        };
        configure(&mut config);

        let server = Arc::new(Server::new(config)?);
        let server_clone = server.clone();

        // Spawn the server in a background task
        let handle = tokio::spawn(async move {
            if let Err(e) = server_clone.run().await {
                eprintln!("Server error: {}", e);
            }
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        // Poll until server is ready (max 2 seconds)
        let mut ready = false;
        for _ in 0..20 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            if client
                .get(format!("http://{}/health", addr))
                .send()
                .await
                .is_ok()
            {
                ready = true;
                break;
            }
        }

        if !ready {
            panic!("Server failed to start within 2 seconds");
        }

        Ok(Self {
            addr,
            client,
            provider,
            server,
            _handle: handle,
        })
    }

    /// Get the base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .get(format!("{}{}", self.base_url(), path))
            .send()
            .await?)
    }

    /// Make a POST request with JSON body
    pub async fn post<T: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(format!("{}{}", self.base_url(), path))
            .json(body)
            .send()
            .await?)
    }

    /// POST a prompt to the generation endpoint
    pub async fn generate(&self, prompt: &str) -> Result<reqwest::Response> {
        self.post("/api/generate-image", &serde_json::json!({ "prompt": prompt }))
            .await
    }

    /// A relay client pointed at this server
    pub fn relay_client(&self) -> RelayClient {
        RelayClient::with_http_client(self.client.clone(), self.base_url())
    }

    /// Shutdown the server gracefully
    pub fn shutdown(&self) {
        self.server.shutdown();
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.server.shutdown();
    }
}
