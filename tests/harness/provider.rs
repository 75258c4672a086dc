//! MockProvider - wiremock stand-in for the Venice image API
//!
//! Mounted expectations are verified when the provider is dropped, so a test
//! that declares `expected_calls` fails if the relay calls it more or fewer
//! times.

use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// API key the test server is configured with
pub const TEST_API_KEY: &str = "test-key";

/// A 1x1 transparent PNG
pub const PNG_B64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

/// Mock image provider
pub struct MockProvider {
    server: MockServer,
}

impl MockProvider {
    /// Start a mock provider on a random port
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL to configure the relay with
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    fn generate_mock(template: ResponseTemplate, expected_calls: u64) -> Mock {
        Mock::given(method("POST"))
            .and(path("/image/generate"))
            .and(header("authorization", format!("Bearer {}", TEST_API_KEY).as_str()))
            .respond_with(template)
            .expect(expected_calls)
    }

    /// Answer with a successful response carrying `images`
    pub async fn respond_with_images(&self, images: &[&str], expected_calls: u64) {
        Self::generate_mock(
            ResponseTemplate::new(200).set_body_json(json!({ "images": images })),
            expected_calls,
        )
        .mount(&self.server)
        .await;
    }

    /// Answer successfully after a delay
    pub async fn respond_slowly(&self, images: &[&str], delay: Duration, expected_calls: u64) {
        Self::generate_mock(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "images": images }))
                .set_delay(delay),
            expected_calls,
        )
        .mount(&self.server)
        .await;
    }

    /// Answer with an arbitrary status and JSON body
    pub async fn respond_with_status(&self, status: u16, body: Value, expected_calls: u64) {
        Self::generate_mock(
            ResponseTemplate::new(status).set_body_json(body),
            expected_calls,
        )
        .mount(&self.server)
        .await;
    }

    /// Answer with a raw body
    pub async fn respond_with_raw(&self, status: u16, body: &str, expected_calls: u64) {
        Self::generate_mock(
            ResponseTemplate::new(status).set_body_string(body),
            expected_calls,
        )
        .mount(&self.server)
        .await;
    }

    /// Bodies of every request received so far
    pub async fn received_bodies(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|r| r.body_json::<Value>().expect("provider request was not JSON"))
            .collect()
    }

    /// Number of requests received so far
    pub async fn call_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|r| r.len())
            .unwrap_or(0)
    }
}
