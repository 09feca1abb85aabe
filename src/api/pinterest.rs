use anyhow::Result;
use std::path::Path;
use tracing::info;

use super::client::{ApiClient, ApiClientConfig};
use super::response::ApiResponse;
use crate::config::Settings;

/// Pinterest endpoints and image downloads
#[derive(Debug)]
pub struct PinterestApi {
    client: ApiClient,
}

impl PinterestApi {
    /// Client for the environment's API base URL
    pub fn new(settings: &Settings) -> Result<Self> {
        Self::with_base_url(&settings.urls.base_api, ApiClientConfig::from_settings(settings))
    }

    /// Client for an explicit base URL, e.g. a mock server
    pub fn with_base_url(base_url: &str, config: ApiClientConfig) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(base_url, config)?,
        })
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn search_pins(&self, keyword: &str) -> ApiResponse {
        info!("[Pinterest] Searching: '{}'", keyword);
        self.client
            .get("/search/pins/", Some(&[("q", keyword)][..]))
            .await
    }

    pub async fn user_profile(&self, username: &str) -> ApiResponse {
        self.client.get(&format!("/users/{}/", username), None).await
    }

    pub async fn download_file(&self, url: &str, destination: &Path) -> bool {
        self.client.download_file(url, destination).await
    }

    pub fn close(self) {
        self.client.close();
    }
}
