use anyhow::Result;
use serde_json::{Value, json};

use super::client::{ApiClient, ApiClientConfig};
use super::response::ApiResponse;

pub const JSONPLACEHOLDER_URL: &str = "https://jsonplaceholder.typicode.com";

/// CRUD client for the JSONPlaceholder fake REST API
#[derive(Debug)]
pub struct JsonPlaceholderApi {
    client: ApiClient,
}

impl JsonPlaceholderApi {
    pub fn new(config: ApiClientConfig) -> Result<Self> {
        Self::with_base_url(JSONPLACEHOLDER_URL, config)
    }

    pub fn with_base_url(base_url: &str, config: ApiClientConfig) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(base_url, config)?,
        })
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// All 100 posts
    pub async fn all_posts(&self) -> ApiResponse {
        self.client.get("/posts", None).await
    }

    pub async fn post(&self, post_id: u32) -> ApiResponse {
        self.client.get(&format!("/posts/{}", post_id), None).await
    }

    pub async fn create_post(&self, title: &str, body: &str, user_id: u32) -> ApiResponse {
        let payload = json!({ "title": title, "body": body, "userId": user_id });
        self.client.post("/posts", &payload).await
    }

    /// Full replacement; the owner is always user 1
    pub async fn update_post(&self, post_id: u32, title: &str, body: &str) -> ApiResponse {
        let payload = json!({ "id": post_id, "title": title, "body": body, "userId": 1 });
        self.client
            .put(&format!("/posts/{}", post_id), &payload)
            .await
    }

    pub async fn patch_post(&self, post_id: u32, fields: &Value) -> ApiResponse {
        self.client
            .patch(&format!("/posts/{}", post_id), fields)
            .await
    }

    pub async fn delete_post(&self, post_id: u32) -> ApiResponse {
        self.client.delete(&format!("/posts/{}", post_id)).await
    }

    /// All 10 users
    pub async fn all_users(&self) -> ApiResponse {
        self.client.get("/users", None).await
    }

    pub async fn user(&self, user_id: u32) -> ApiResponse {
        self.client.get(&format!("/users/{}", user_id), None).await
    }

    pub async fn user_posts(&self, user_id: u32) -> ApiResponse {
        self.client
            .get(&format!("/users/{}/posts", user_id), None)
            .await
    }

    pub async fn post_comments(&self, post_id: u32) -> ApiResponse {
        self.client
            .get(&format!("/posts/{}/comments", post_id), None)
            .await
    }

    pub fn close(self) {
        self.client.close();
    }
}
