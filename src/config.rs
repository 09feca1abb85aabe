//! Run configuration resolved from the process environment and `.env` files

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::wait::Timeouts;

/// Default desktop User-Agent sent with every API request
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36";

pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Timestamp format used in artifact and log file names
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Target environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Local,
    Staging,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(Environment::Local),
            "staging" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => anyhow::bail!("Unknown environment: {}", s),
        }
    }
}

impl Environment {
    /// UI and API base URLs for this environment
    pub fn urls(&self) -> UrlConfig {
        let (base_ui, base_api) = match self {
            Environment::Local => ("http://localhost:3000", "http://localhost:8000/v3"),
            Environment::Staging => (
                "https://staging.pinterest.com",
                "https://api-staging.pinterest.com/v3",
            ),
            Environment::Production => {
                ("https://www.pinterest.com", "https://api.pinterest.com/v3")
            }
        };
        UrlConfig {
            base_ui: base_ui.to_string(),
            base_api: base_api.to_string(),
            login_path: "/login/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UrlConfig {
    pub base_ui: String,
    pub base_api: String,
    pub login_path: String,
}

impl UrlConfig {
    pub fn login_url(&self) -> String {
        format!("{}{}", self.base_ui, self.login_path)
    }
}

/// Supported browser types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BrowserType {
    /// Mozilla Firefox
    Firefox,
    /// Google Chrome/Chromium
    Chrome,
}

impl std::str::FromStr for BrowserType {
    type Err = anyhow::Error;

    /// Parse browser type from string (case-insensitive)
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "firefox" => Ok(BrowserType::Firefox),
            "chrome" | "chromium" => Ok(BrowserType::Chrome),
            _ => anyhow::bail!("Unsupported browser: {}", s),
        }
    }
}

impl BrowserType {
    /// Default WebDriver URL when `WEBDRIVER_URL` is not set
    pub fn default_webdriver_url(&self) -> &'static str {
        match self {
            BrowserType::Firefox => "http://localhost:4444",
            BrowserType::Chrome => "http://localhost:9515",
        }
    }
}

/// Browser viewport dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct BrowserSettings {
    pub browser: BrowserType,
    pub webdriver_url: String,
    pub headless: bool,
    /// Delay inserted before every browser action, in milliseconds
    pub slow_mo_ms: u64,
    pub viewport: ViewportSize,
    pub locale: String,
    pub record_video: bool,
}

/// Test account credentials
#[derive(Clone, Default)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn is_valid(&self) -> bool {
        !self.email.is_empty() && !self.password.is_empty()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

impl Serialize for Credentials {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("Credentials", 2)?;
        state.serialize_field("email", &self.email)?;
        state.serialize_field("password_set", &!self.password.is_empty())?;
        state.end()
    }
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    pub environment: Environment,
    pub project_root: PathBuf,
    pub urls: UrlConfig,
    pub timeouts: Timeouts,
    pub browser: BrowserSettings,
    pub credentials: Credentials,
}

impl Settings {
    /// Resolve settings from process environment variables, after loading a
    /// `.env` file if present. Variables already set in the process win.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings from the dotenv file at `path`, with `lookup` taking
    /// precedence over the file
    pub fn from_env_file<F>(path: &Path, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file_vars = dotenv_vars(path)?;
        Ok(Self::from_lookup(|key| {
            lookup(key).or_else(|| file_vars.get(key).cloned())
        }))
    }

    /// Resolve settings from an arbitrary key lookup.
    ///
    /// Randomized wait budgets are drawn here, once, and never again for
    /// the lifetime of the returned value.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("TEST_ENV") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("Unknown env '{}', falling back to production", raw);
                Environment::Production
            }),
            None => Environment::Production,
        };

        let flag = |key: &str| {
            lookup(key)
                .map(|v| v.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(false)
        };

        let browser = match lookup("BROWSER") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("Unsupported browser '{}', using firefox", raw);
                BrowserType::Firefox
            }),
            None => BrowserType::Firefox,
        };

        let slow_mo_ms = lookup("SLOW_MO")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(0);

        let project_root = lookup("PINPROBE_ROOT")
            .map(PathBuf::from)
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));

        Settings {
            environment,
            project_root,
            urls: environment.urls(),
            timeouts: Timeouts::seeded(),
            browser: BrowserSettings {
                browser,
                webdriver_url: lookup("WEBDRIVER_URL")
                    .unwrap_or_else(|| browser.default_webdriver_url().to_string()),
                headless: flag("HEADLESS"),
                slow_mo_ms,
                viewport: ViewportSize {
                    width: 1080,
                    height: 720,
                },
                locale: "en-US".to_string(),
                record_video: flag("RECORD_VIDEO"),
            },
            credentials: Credentials {
                email: lookup("PINTEREST_EMAIL").unwrap_or_default(),
                password: lookup("PINTEREST_PASSWORD").unwrap_or_default(),
            },
        }
    }

    /// Switch environment, keeping the URL table in step
    pub fn set_environment(&mut self, environment: Environment) {
        self.environment = environment;
        self.urls = environment.urls();
    }

    /// Switch browser; a WebDriver URL that was the old default follows along
    pub fn set_browser(&mut self, browser: BrowserType) {
        if self.browser.webdriver_url == self.browser.browser.default_webdriver_url() {
            self.browser.webdriver_url = browser.default_webdriver_url().to_string();
        }
        self.browser.browser = browser;
    }

    /// Default HTTP headers for API requests
    pub fn default_headers(&self) -> Vec<(String, String)> {
        default_headers()
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.project_root.join("logs")
    }

    pub fn screenshots_dir(&self) -> PathBuf {
        self.project_root.join("screenshots")
    }

    pub fn videos_dir(&self) -> PathBuf {
        self.logs_dir().join("videos")
    }

    pub fn downloads_dir(&self) -> PathBuf {
        self.project_root.join("downloads")
    }
}

/// Key/value pairs of a dotenv file
pub fn dotenv_vars(path: &Path) -> Result<HashMap<String, String>> {
    let iter = dotenvy::from_path_iter(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    iter.collect::<std::result::Result<HashMap<_, _>, _>>()
        .with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn default_headers() -> Vec<(String, String)> {
    vec![
        ("User-Agent".to_string(), USER_AGENT.to_string()),
        ("Accept-Language".to_string(), ACCEPT_LANGUAGE.to_string()),
    ]
}

/// Current local time formatted for file names
pub fn current_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
