use anyhow::{Context, Result};
use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

use crate::browser::PageDriver;
use crate::config::{BrowserSettings, BrowserType, Settings};
use crate::errors::ProbeError;
use crate::locator::LocatorCandidate;
use crate::wait::{self, POLL_INTERVAL};

/// A page backed by a WebDriver session
pub struct WebDriverPage {
    client: Client,
    browser_type: BrowserType,
    slow_mo: Duration,
    page_load_timeout: Duration,
}

impl WebDriverPage {
    /// Open a new WebDriver session using the run settings
    pub async fn connect(settings: &Settings) -> Result<Self, ProbeError> {
        let browser = &settings.browser;
        info!("Connecting to {:?} WebDriver", browser.browser);

        if !Self::is_webdriver_running(&browser.webdriver_url).await {
            let driver_name = match browser.browser {
                BrowserType::Firefox => "geckodriver",
                BrowserType::Chrome => "chromedriver",
            };
            return Err(ProbeError::WebDriverFailed(format!(
                "Cannot reach {} at {}.\n\
                Start it first:\n\
                  For Firefox: geckodriver --port 4444\n\
                  For Chrome: chromedriver --port 9515\n\
                or point WEBDRIVER_URL at a running driver",
                driver_name, browser.webdriver_url
            )));
        }

        debug!("Connecting to WebDriver at {}", browser.webdriver_url);
        let client = ClientBuilder::rustls()
            .capabilities(Self::capabilities(browser))
            .connect(&browser.webdriver_url)
            .await
            .map_err(|e| ProbeError::WebDriverFailed(e.to_string()))?;

        let vp = browser.viewport;
        debug!("Setting viewport to {}x{}", vp.width, vp.height);
        if let Err(e) = client.set_window_size(vp.width, vp.height).await {
            // Best effort, some drivers refuse resizing in headless mode
            debug!("Note: Could not set window size: {}", e);
        }

        Ok(WebDriverPage {
            client,
            browser_type: browser.browser,
            slow_mo: Duration::from_millis(browser.slow_mo_ms),
            page_load_timeout: settings.timeouts.get(wait::WaitBudget::PageLoad),
        })
    }

    async fn is_webdriver_running(url: &str) -> bool {
        let status_url = format!("{}/status", url.trim_end_matches('/'));

        match reqwest::get(&status_url).await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// Session capabilities for the configured browser
    fn capabilities(browser: &BrowserSettings) -> serde_json::Map<String, serde_json::Value> {
        let mut caps = serde_json::Map::new();
        let vp = browser.viewport;

        match browser.browser {
            BrowserType::Firefox => {
                let mut args = Vec::new();
                if browser.headless {
                    args.push("--headless".to_string());
                }
                args.push(format!("--width={}", vp.width));
                args.push(format!("--height={}", vp.height));

                caps.insert(
                    "moz:firefoxOptions".to_string(),
                    json!({
                        "args": args,
                        "prefs": { "intl.accept_languages": browser.locale },
                    }),
                );
            }
            BrowserType::Chrome => {
                let mut args = vec!["--no-sandbox".to_string()];
                if browser.headless {
                    args.push("--headless=new".to_string());
                    args.push("--disable-gpu".to_string());
                    args.push("--disable-dev-shm-usage".to_string());
                }
                args.push(format!("--window-size={},{}", vp.width, vp.height));
                args.push(format!("--lang={}", browser.locale));

                caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
            }
        }

        caps.insert("acceptInsecureCerts".to_string(), json!(true));
        caps
    }

    pub fn browser_type(&self) -> BrowserType {
        self.browser_type
    }

    async fn slow_down(&self) {
        wait::pause(self.slow_mo).await;
    }

    async fn wait_for_dom(&self) {
        let client = &self.client;
        let ready = wait::poll_until(self.page_load_timeout, POLL_INTERVAL, move || async move {
            matches!(
                client
                    .execute("return document.readyState !== 'loading';", vec![])
                    .await,
                Ok(value) if value.as_bool().unwrap_or(false)
            )
        })
        .await;

        if !ready {
            debug!(
                "DOM not interactive after {}ms, continuing",
                self.page_load_timeout.as_millis()
            );
        }
    }

    /// End the WebDriver session
    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }
}

#[async_trait]
impl PageDriver for WebDriverPage {
    type Element = Element;

    async fn navigate(&self, url: &str) -> Result<()> {
        self.slow_down().await;
        self.client
            .goto(url)
            .await
            .with_context(|| format!("Failed to navigate to {}", url))?;
        self.wait_for_dom().await;
        Ok(())
    }

    async fn reload(&self) -> Result<()> {
        self.slow_down().await;
        self.client.refresh().await.context("Failed to reload")?;
        self.wait_for_dom().await;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.client.current_url().await?.to_string())
    }

    async fn locate_all(&self, candidate: &LocatorCandidate) -> Result<Vec<Element>> {
        let query = candidate.css_query();
        let elements = self
            .client
            .find_all(Locator::Css(&query))
            .await
            .with_context(|| format!("Failed to query {}", candidate))?;

        if !candidate.needs_match() {
            return Ok(elements);
        }

        let mut matched = Vec::new();
        for element in elements {
            let haystack = match candidate.match_attribute() {
                Some(attr) => element.attr(attr).await?.unwrap_or_default(),
                None => element.text().await?,
            };
            if candidate.matches(&haystack)? {
                matched.push(element);
            }
        }
        Ok(matched)
    }

    async fn is_displayed(&self, element: &Element) -> Result<bool> {
        Ok(element.is_displayed().await?)
    }

    async fn click(&self, element: &Element) -> Result<()> {
        self.slow_down().await;
        element.click().await?;
        Ok(())
    }

    async fn clear(&self, element: &Element) -> Result<()> {
        self.slow_down().await;
        element.clear().await?;
        Ok(())
    }

    async fn send_keys(&self, element: &Element, text: &str) -> Result<()> {
        element.send_keys(text).await?;
        Ok(())
    }

    async fn press_global(&self, key: &str) -> Result<()> {
        let focused = self.client.active_element().await?;
        focused.send_keys(key).await?;
        Ok(())
    }

    async fn text(&self, element: &Element) -> Result<String> {
        Ok(element.text().await?)
    }

    async fn attribute(&self, element: &Element, name: &str) -> Result<Option<String>> {
        Ok(element.attr(name).await?)
    }

    async fn scroll_by(&self, dx: i64, dy: i64) -> Result<()> {
        self.client
            .execute(
                "window.scrollBy(arguments[0], arguments[1]);",
                vec![json!(dx), json!(dy)],
            )
            .await
            .context("Failed to scroll")?;
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        Ok(self.client.screenshot().await?)
    }
}
