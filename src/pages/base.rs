use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use crate::browser::PageDriver;
use crate::context::RunContext;
use crate::errors::ProbeResult;
use crate::interaction::Interactor;
use crate::locator::{LocatorCandidate, LocatorChain};
use crate::resolver::ElementResolver;
use crate::wait::{self, POLL_INTERVAL, WaitBudget};

/// Shared navigation, waits and state checks for every page object
pub struct BasePage<'a, P: PageDriver> {
    pub(crate) page: &'a P,
    pub(crate) ctx: &'a RunContext,
}

impl<'a, P: PageDriver> BasePage<'a, P> {
    pub fn new(page: &'a P, ctx: &'a RunContext) -> Self {
        Self { page, ctx }
    }

    pub fn driver(&self) -> &'a P {
        self.page
    }

    pub fn resolver(&self) -> ElementResolver<'a, P> {
        ElementResolver::new(self.page, &self.ctx.artifacts)
    }

    pub fn interactor(&self) -> Interactor<'a, P> {
        Interactor::new(
            self.page,
            &self.ctx.artifacts,
            self.ctx.budget(WaitBudget::Typing),
        )
    }

    pub async fn open(&self, url: &str) -> ProbeResult<()> {
        info!("Navigating to: {}", url);
        self.page.navigate(url).await?;
        Ok(())
    }

    pub async fn refresh(&self) -> ProbeResult<()> {
        info!("Refreshing page...");
        self.page.reload().await?;
        Ok(())
    }

    pub async fn current_url(&self) -> ProbeResult<String> {
        Ok(self.page.current_url().await?)
    }

    /// Resolve a fallback chain with the per-candidate fallback budget
    pub async fn find(&self, chain: &LocatorChain) -> ProbeResult<P::Element> {
        self.resolver()
            .resolve(chain, self.ctx.budget(WaitBudget::FallbackCheck))
            .await
    }

    /// Pause for a named budget
    pub async fn pause(&self, budget: WaitBudget) {
        wait::pause(self.ctx.budget(budget)).await;
    }

    /// Instant check, no waiting
    pub async fn is_visible(&self, candidate: &LocatorCandidate) -> bool {
        wait::is_visible(self.page, candidate).await
    }

    /// Wait a little to see whether a slow element shows up
    pub async fn is_visible_within(&self, candidate: &LocatorCandidate, timeout: Duration) -> bool {
        wait::is_visible_within(self.page, candidate, timeout).await
    }

    /// Wait for the URL to contain `fragment`
    pub async fn wait_for_url_containing(&self, fragment: &str, timeout: Duration) -> bool {
        info!("Waiting for URL containing: '{}'", fragment);
        self.wait_for_url(timeout, |url| url.contains(fragment)).await
    }

    /// Wait for the URL to stop containing `fragment`
    pub async fn wait_for_url_leaving(&self, fragment: &str, timeout: Duration) -> bool {
        debug!("Waiting for URL to leave: '{}'", fragment);
        self.wait_for_url(timeout, |url| !url.contains(fragment)).await
    }

    async fn wait_for_url<F>(&self, timeout: Duration, accept: F) -> bool
    where
        F: Fn(&str) -> bool,
    {
        let page = self.page;
        let accept = &accept;
        wait::poll_until(timeout, POLL_INTERVAL, move || async move {
            match page.current_url().await {
                Ok(url) => accept(&url),
                Err(_) => false,
            }
        })
        .await
    }

    /// Best-effort screenshot named `{name}{timestamp}.png`
    pub async fn screenshot(&self, name: &str) -> Option<PathBuf> {
        self.ctx.artifacts.capture(self.page, name).await
    }
}
