use anyhow::anyhow;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::base::BasePage;
use super::locators::search_results as loc;
use crate::browser::PageDriver;
use crate::context::RunContext;
use crate::errors::{ProbeError, ProbeResult};
use crate::locator::LocatorCandidate;
use crate::wait::{self, POLL_INTERVAL, WaitBudget};

/// Budget for the feed grid before a search counts as empty
pub const NO_RESULTS_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Pixels scrolled per infinite-load step
const SCROLL_STEP: i64 = 5_000;

pub struct SearchResultPage<'a, P: PageDriver> {
    base: BasePage<'a, P>,
}

impl<'a, P: PageDriver> SearchResultPage<'a, P> {
    pub fn new(page: &'a P, ctx: &'a RunContext) -> Self {
        Self {
            base: BasePage::new(page, ctx),
        }
    }

    pub fn base(&self) -> &BasePage<'a, P> {
        &self.base
    }

    pub async fn click_pin(&self, index: usize) -> ProbeResult<()> {
        info!("Clicking pin at index {}", index);
        let pins = self.base.page.locate_all(&pin_item()).await?;
        let Some(pin) = pins.get(index) else {
            return Err(ProbeError::Other(anyhow!(
                "Cannot click pin #{}, only found {} pins.",
                index,
                pins.len()
            )));
        };
        self.base
            .interactor()
            .click(pin, &format!("Pin #{}", index))
            .await
    }

    /// Scroll down `scrolls` times to trigger infinite loading
    pub async fn load_more_by_scrolling(&self, scrolls: usize) -> ProbeResult<()> {
        info!("Scrolling {} times to load more pins...", scrolls);
        for _ in 0..scrolls {
            self.base.page.scroll_by(0, SCROLL_STEP).await?;
            self.base.pause(WaitBudget::ShortNetwork).await;
        }
        Ok(())
    }

    /// Highest-resolution URLs of up to `limit` loaded pin images
    pub async fn image_urls(&self, limit: usize) -> ProbeResult<Vec<String>> {
        info!("Extracting top {} image URLs...", limit);
        self.wait_for_results(limit, self.base.ctx.budget(WaitBudget::Element))
            .await?;

        let page = self.base.page;
        let images = page
            .locate_all(&LocatorCandidate::css(loc::PIN_IMAGE_LOADED))
            .await?;
        let count = images.len().min(limit);
        debug!("Found {} loaded images, extracting {}", images.len(), count);

        let mut urls = Vec::with_capacity(count);
        for (i, img) in images.iter().take(count).enumerate() {
            let srcset = page.attribute(img, "srcset").await?;
            let src = page.attribute(img, "src").await?;
            if let Some(url) = best_image_url(srcset.as_deref(), src.as_deref()) {
                debug!("Image {}: {}", i + 1, url);
                urls.push(url);
            }
        }
        info!("Extracted {} URLs", urls.len());
        Ok(urls)
    }

    pub async fn loaded_pins_count(&self) -> ProbeResult<usize> {
        let count = self.base.page.locate_all(&pin_item()).await?.len();
        debug!("Found {} pins on screen", count);
        Ok(count)
    }

    /// Wait until at least `min_count` pins are present.
    ///
    /// Times out with a warning rather than an error and returns whatever
    /// count was reached.
    pub async fn wait_for_results(&self, min_count: usize, timeout: Duration) -> ProbeResult<usize> {
        info!("Waiting for at least {} pins to load...", min_count);
        let page = self.base.page;
        let pins = &pin_item();
        let reached = wait::poll_until(timeout, POLL_INTERVAL, move || async move {
            page.locate_all(pins)
                .await
                .map(|found| found.len() >= min_count)
                .unwrap_or(false)
        })
        .await;
        if !reached {
            warn!("Timeout waiting for {} pins.", min_count);
        }
        self.loaded_pins_count().await
    }

    pub async fn pin_titles(&self) -> ProbeResult<Vec<String>> {
        let page = self.base.page;
        let titles = page
            .locate_all(&LocatorCandidate::css(loc::PIN_TITLE))
            .await?;
        let mut texts = Vec::with_capacity(titles.len());
        for title in &titles {
            texts.push(page.text(title).await?);
        }
        Ok(texts)
    }

    /// True when the feed grid never shows up
    pub async fn is_no_results(&self) -> bool {
        let has_grid = self
            .base
            .is_visible_within(&LocatorCandidate::css(loc::FEED_GRID), NO_RESULTS_TIMEOUT)
            .await;
        if !has_grid {
            info!("No search results - feed grid not found");
        }
        !has_grid
    }
}

fn pin_item() -> LocatorCandidate {
    LocatorCandidate::css(loc::PIN_ITEM)
}

/// Pick the last (largest) `srcset` entry, falling back to `src`.
///
/// `srcset` looks like `"url_1x 1x, url_2x 2x, url_4x 4x"`.
pub fn best_image_url(srcset: Option<&str>, src: Option<&str>) -> Option<String> {
    let from_srcset = srcset
        .and_then(|set| set.rsplit(',').next())
        .and_then(|entry| entry.split_whitespace().next())
        .filter(|url| !url.is_empty());

    from_srcset
        .or(src.filter(|s| !s.is_empty()))
        .map(str::to_string)
}
