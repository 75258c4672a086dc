//! Integration Test Harness
//!
//! - `TestServer` - Runs a real themisd server on a random port
//! - `MockProvider` - wiremock stand-in for the Venice image API
//!
//! # Example
//!
//! ```rust,ignore
//! use harness::TestServer;
//!
//! #[tokio::test]
//! async fn test_generate() {
//!     let server = TestServer::start().await.unwrap();
//!     server.provider.respond_with_images(&[PNG_B64], 1).await;
//!
//!     let resp = server.generate("a cat").await.unwrap();
//!     assert_eq!(resp.status(), 200);
//! }
//! ```

#![allow(dead_code)]

mod provider;
mod server;

pub use provider::{MockProvider, PNG_B64, TEST_API_KEY};
pub use server::{TestServer, TEST_ORIGIN};
