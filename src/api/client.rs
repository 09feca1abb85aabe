//! Session-based HTTP client with retry, response normalization and
//! streaming downloads

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, warn};

use super::response::ApiResponse;
use super::retry::{HttpMethod, RetryPolicy, TransportFailure};
use crate::config::{Settings, default_headers};
use crate::wait::WaitBudget;

/// Longest a download may wait for response headers or for its next chunk
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Per-request timeout
    pub timeout: Duration,
    /// Idle limit for downloads, not a cap on the whole transfer
    pub download_timeout: Duration,
    pub retry: RetryPolicy,
    /// Sent with every request
    pub headers: Vec<(String, String)>,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            download_timeout: DOWNLOAD_TIMEOUT,
            retry: RetryPolicy::default(),
            headers: default_headers(),
        }
    }
}

impl ApiClientConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            timeout: settings.timeouts.get(WaitBudget::Default),
            headers: settings.default_headers(),
            ..Self::default()
        }
    }
}

/// HTTP client bound to one base URL.
///
/// Holds one connection pool for its lifetime; [`ApiClient::close`] consumes
/// the client. Not `Clone`: each flow builds its own.
#[derive(Debug)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
    config: ApiClientConfig,
}

impl ApiClient {
    pub fn new(base_url: &str, config: ApiClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .with_context(|| format!("Invalid header name: {}", name))?;
            let value = HeaderValue::from_str(value)
                .with_context(|| format!("Invalid value for header {}", name))?;
            headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        let base_url = base_url.trim_end_matches('/').to_string();
        debug!("API client initialized. Endpoint: {}", base_url);
        Ok(Self {
            base_url,
            client,
            config,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn config(&self) -> &ApiClientConfig {
        &self.config
    }

    /// `{base_url}{endpoint}`
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    pub async fn get(&self, endpoint: &str, query: Option<&[(&str, &str)]>) -> ApiResponse {
        self.request(HttpMethod::Get, endpoint, None, query).await
    }

    pub async fn post(&self, endpoint: &str, json: &Value) -> ApiResponse {
        self.request(HttpMethod::Post, endpoint, Some(json), None)
            .await
    }

    pub async fn put(&self, endpoint: &str, json: &Value) -> ApiResponse {
        self.request(HttpMethod::Put, endpoint, Some(json), None).await
    }

    pub async fn patch(&self, endpoint: &str, json: &Value) -> ApiResponse {
        self.request(HttpMethod::Patch, endpoint, Some(json), None)
            .await
    }

    pub async fn delete(&self, endpoint: &str) -> ApiResponse {
        self.request(HttpMethod::Delete, endpoint, None, None).await
    }

    /// Send a request, retrying per the policy.
    ///
    /// Never fails: transport errors come back as synthetic responses and
    /// only the final attempt's outcome is returned.
    pub async fn request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&Value>,
        query: Option<&[(&str, &str)]>,
    ) -> ApiResponse {
        let url = self.url(endpoint);
        let policy = &self.config.retry;
        debug!("[{}] {}", method, url);
        if let Some(body) = body {
            debug!("Payload: {}", body);
        }

        let mut retries = 0;
        loop {
            match self.send_once(method, &url, body, query).await {
                Ok(response) => {
                    let status = response.status_code();
                    if retries < policy.max_retries && policy.should_retry_status(status) {
                        retries += 1;
                        let delay = policy.delay_for(retries, response.header("retry-after"));
                        warn!(
                            "[{}] {} returned {}, retry {}/{} in {:?}",
                            method, url, status, retries, policy.max_retries, delay
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    if response.success() {
                        debug!("Status: {}", status);
                    } else {
                        debug!("Status: {} {}", status, response.error_message());
                    }
                    return response;
                }
                Err(e) => {
                    let failure = classify(&e);
                    if retries < policy.max_retries && policy.should_retry_failure(method, failure) {
                        retries += 1;
                        let delay = policy.delay_for(retries, None);
                        warn!(
                            "[{}] {} failed ({:?}), retry {}/{} in {:?}",
                            method, url, failure, retries, policy.max_retries, delay
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    return match failure {
                        TransportFailure::Timeout => {
                            error!("[API] Timeout: {}", url);
                            ApiResponse::timed_out()
                        }
                        TransportFailure::Connect => {
                            error!("[API] Connection error: {}", e);
                            ApiResponse::connection_failed(&e.to_string())
                        }
                        TransportFailure::Other => {
                            error!("[API] Request error: {}", e);
                            ApiResponse::transport_error(&e.to_string())
                        }
                    };
                }
            }
        }
    }

    async fn send_once(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<&Value>,
        query: Option<&[(&str, &str)]>,
    ) -> reqwest::Result<ApiResponse> {
        let mut builder = self
            .client
            .request(method.into(), url)
            .timeout(self.config.timeout);
        if let Some(query) = query {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let text = response.text().await?;

        Ok(ApiResponse::from_parts(
            status.as_u16(),
            status.canonical_reason().unwrap_or(""),
            &text,
            headers,
        ))
    }

    /// Stream `url` into `destination`.
    ///
    /// The body goes to `{destination}.part` and is renamed into place only
    /// once fully written. Any failure is logged, the partial file removed,
    /// and `false` returned. No retries.
    pub async fn download_file(&self, url: &str, destination: &Path) -> bool {
        let partial = partial_path(destination);

        let result = async {
            let written = self.stream_to(url, &partial).await?;
            tokio::fs::rename(&partial, destination)
                .await
                .with_context(|| format!("Failed to move download to {}", destination.display()))?;
            Ok::<_, anyhow::Error>(written)
        }
        .await;

        match result {
            Ok(written) => {
                info!(
                    "Downloaded: {} ({} bytes)",
                    destination
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_default(),
                    written
                );
                true
            }
            Err(e) => {
                error!("Download failed for {}: {:#}", url, e);
                if let Err(e) = tokio::fs::remove_file(&partial).await
                    && e.kind() != std::io::ErrorKind::NotFound
                {
                    warn!("Could not remove {}: {}", partial.display(), e);
                }
                false
            }
        }
    }

    async fn stream_to(&self, url: &str, partial: &Path) -> Result<u64> {
        let idle = self.config.download_timeout;
        let mut response = tokio::time::timeout(idle, self.client.get(url).send())
            .await
            .with_context(|| format!("No response within {:?}", idle))?
            .context("Request failed")?
            .error_for_status()?;

        if let Some(parent) = partial.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let mut file = tokio::fs::File::create(partial)
            .await
            .with_context(|| format!("Failed to create {}", partial.display()))?;

        let mut written = 0u64;
        while let Some(chunk) = tokio::time::timeout(idle, response.chunk())
            .await
            .with_context(|| format!("Transfer stalled for {:?}", idle))?
            .context("Transfer interrupted")?
        {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        Ok(written)
    }

    /// Release the connection pool
    pub fn close(self) {
        debug!("API client session closed: {}", self.base_url);
    }
}

fn classify(err: &reqwest::Error) -> TransportFailure {
    if err.is_timeout() {
        TransportFailure::Timeout
    } else if err.is_connect() {
        TransportFailure::Connect
    } else {
        TransportFailure::Other
    }
}

/// `{destination}.part`
pub fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}
