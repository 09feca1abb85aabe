//! HTTP side of the harness: a retrying client plus the business clients
//! built on top of it

pub mod client;
pub mod jsonplaceholder;
pub mod pinterest;
pub mod response;
pub mod retry;

pub use client::{ApiClient, ApiClientConfig};
pub use jsonplaceholder::JsonPlaceholderApi;
pub use pinterest::PinterestApi;
pub use response::ApiResponse;
pub use retry::{HttpMethod, RetryPolicy};
