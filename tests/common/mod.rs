// Common test utilities: an in-process mock API and client helpers

#![allow(dead_code)]

use std::time::Duration;
use tempfile::TempDir;

use pinprobe::api::{ApiClientConfig, RetryPolicy};

include!("mock_api_app.rs");

pub struct MockApi {
    pub base_url: String,
    pub state: AppState,
}

/// Start a fresh mock API on an ephemeral port.
///
/// Every call gets its own server and hit counters.
pub async fn spawn_mock_api() -> MockApi {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock API");
    let addr = listener.local_addr().unwrap();
    let state = AppState::default();
    let app = create_app(state.clone());

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Mock API failed");
    });

    MockApi {
        base_url: format!("http://{}", addr),
        state,
    }
}

/// Client config with millisecond backoff so retry tests stay fast
pub fn fast_config() -> ApiClientConfig {
    ApiClientConfig {
        timeout: Duration::from_secs(5),
        retry: RetryPolicy {
            backoff_factor: Duration::from_millis(10),
            ..RetryPolicy::default()
        },
        ..ApiClientConfig::default()
    }
}

/// An address nothing listens on
pub fn refused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Scratch directory for downloads
pub fn download_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}
