//! Integration Test Harness
//!
//! End-to-end test infrastructure for imgd:
//! - `TestServer` - Spawns the real imgd binary on a random port
//! - `MockUpstream` - In-process stand-in for the generative language API
//!   with scripted per-model outcomes and a request log
//!
//! # Example
//!
//! ```rust,ignore
//! use harness::{MockUpstream, ModelScript, TestServer};
//!
//! #[tokio::test]
//! async fn test_generate() {
//!     let upstream = MockUpstream::start(vec![
//!         ("gemini-2.5-flash-image", ModelScript::image("QUFB", Some("image/png"))),
//!     ]).await;
//!     let imgd = TestServer::start(&upstream.base_url()).await.unwrap();
//!
//!     let resp = imgd.post("/api/generate", &body).await.unwrap();
//!     assert_eq!(resp.status(), 200);
//! }
//! ```

mod upstream;

pub use server::TestServer;
pub use upstream::{MockUpstream, ModelScript};
