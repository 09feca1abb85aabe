//! # pinprobe
#![allow(clippy::uninlined_format_args)]
//!
//! Browser-driven end-to-end harness for Pinterest, backed by a retrying
//! HTTP client for auxiliary API calls and image downloads.
//!
//! ## CLI Usage
//!
//! ```bash
//! # Log in (when PINTEREST_EMAIL / PINTEREST_PASSWORD are set) and search
//! pinprobe search "Cyberpunk Art"
//!
//! # Search and download the first 5 full-size images into downloads/
//! pinprobe download "4K Wallpaper" --count 5
//!
//! # Call the JSONPlaceholder API
//! pinprobe api post 1
//! pinprobe api create-post "title" "body" --user-id 1
//!
//! # Point the Pinterest client at a local mock server
//! pinprobe api search-pins cats --base-url http://localhost:8000
//!
//! # Print the resolved configuration (password masked)
//! TEST_ENV=staging pinprobe config
//! ```
//!
//! A WebDriver server must already be running: geckodriver on
//! `http://localhost:4444` or chromedriver on `http://localhost:9515`, or
//! wherever `WEBDRIVER_URL` points.
//!
//! Errors are printed to stdout as `{"error": true, "message", "exit_code"}`
//! with exit codes 2 (element not found), 3 (interaction failed),
//! 4 (WebDriver unavailable), 5 (timeout) and 1 (anything else).
//!
//! ## Library Usage
//!
//! ```no_run
//! use pinprobe::{RunContext, Settings, WebDriverPage};
//! use pinprobe::pages::HomePage;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let ctx = RunContext::new(Settings::from_env());
//! let page = WebDriverPage::connect(&ctx.settings).await?;
//!
//! let home = HomePage::new(&page, &ctx);
//! home.navigate().await?;
//! home.search_for("Minimalist Decor").await?;
//!
//! page.close().await?;
//! # Ok(())
//! # }
//! ```

/// Retrying HTTP client and the Pinterest / JSONPlaceholder clients
pub mod api;

/// Screenshot and video artifacts
pub mod artifacts;

/// The page capability everything above the driver is written against
pub mod browser;

/// Environment-driven run configuration
pub mod config;

/// Per-run context passed to page objects
pub mod context;

/// Error taxonomy and exit codes
pub mod errors;

/// End-to-end search and download scenarios
pub mod flows;

/// Logged element actions
pub mod interaction;

/// Locator strategies and fallback chains
pub mod locator;

/// Tracing subscriber setup
pub mod logging;

/// Page objects
pub mod pages;

/// Fallback-chain element resolution
pub mod resolver;

/// Wait budgets and bounded visibility checks
pub mod wait;

/// WebDriver-backed page
pub mod webdriver;

#[cfg(test)]
mod fake_page;

pub use api::{ApiClient, ApiClientConfig, ApiResponse, JsonPlaceholderApi, PinterestApi, RetryPolicy};
pub use artifacts::{ArtifactManager, Outcome};
pub use browser::PageDriver;
pub use config::{BrowserType, Environment, Settings};
pub use context::RunContext;
pub use errors::{ProbeError, ProbeResult};
pub use locator::{LocatorCandidate, LocatorChain};
pub use wait::{Timeouts, WaitBudget};
pub use webdriver::WebDriverPage;
