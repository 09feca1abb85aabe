//! Wait budgets and bounded visibility checks

use rand::Rng;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::browser::PageDriver;
use crate::locator::LocatorCandidate;

/// Interval between visibility probes
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Named timeout categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitBudget {
    /// No wait at all, a single state read
    Instant,
    /// Per-candidate budget inside a fallback chain
    FallbackCheck,
    /// Optional elements such as popups
    OptionalPresence,
    /// Delay between keystrokes
    Typing,
    /// Short pause after an interaction (1-3s)
    ShortNetwork,
    /// Pause after a navigation (2-4s)
    MediumNetwork,
    /// Waiting for a required element
    Element,
    /// HTTP request timeout
    Default,
    PageLoad,
    Long,
}

/// Timeout values in milliseconds for one run.
///
/// `typing_ms`, `short_network_ms` and `medium_network_ms` are randomized
/// once by [`Timeouts::seeded`] and stay fixed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Timeouts {
    pub fallback_check_ms: u64,
    pub optional_presence_ms: u64,
    pub typing_ms: u64,
    pub short_network_ms: u64,
    pub medium_network_ms: u64,
    pub element_ms: u64,
    pub default_ms: u64,
    pub page_load_ms: u64,
    pub long_ms: u64,
}

impl Timeouts {
    /// Draw the randomized budgets from the thread RNG
    pub fn seeded() -> Self {
        Self::seeded_with(&mut rand::thread_rng())
    }

    pub fn seeded_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Timeouts {
            fallback_check_ms: 2_000,
            optional_presence_ms: 3_000,
            typing_ms: rng.gen_range(300..=500),
            short_network_ms: rng.gen_range(1_000..=3_000),
            medium_network_ms: rng.gen_range(2_000..=4_000),
            element_ms: 10_000,
            default_ms: 30_000,
            page_load_ms: 45_000,
            long_ms: 60_000,
        }
    }

    pub fn ms(&self, budget: WaitBudget) -> u64 {
        match budget {
            WaitBudget::Instant => 0,
            WaitBudget::FallbackCheck => self.fallback_check_ms,
            WaitBudget::OptionalPresence => self.optional_presence_ms,
            WaitBudget::Typing => self.typing_ms,
            WaitBudget::ShortNetwork => self.short_network_ms,
            WaitBudget::MediumNetwork => self.medium_network_ms,
            WaitBudget::Element => self.element_ms,
            WaitBudget::Default => self.default_ms,
            WaitBudget::PageLoad => self.page_load_ms,
            WaitBudget::Long => self.long_ms,
        }
    }

    pub fn get(&self, budget: WaitBudget) -> Duration {
        Duration::from_millis(self.ms(budget))
    }
}

/// Sleep for a fixed budget
pub async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

/// Poll `probe` until it returns true or `timeout` elapses.
///
/// The probe always runs at least once, so a zero timeout is an instant check.
pub async fn poll_until<F, Fut>(timeout: Duration, interval: Duration, mut probe: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if probe().await {
            return true;
        }
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        tokio::time::sleep(interval.min(deadline - now)).await;
    }
}

/// First displayed element matching the candidate right now
pub async fn visible_element<P: PageDriver>(
    page: &P,
    candidate: &LocatorCandidate,
) -> Option<P::Element> {
    let elements = match page.locate_all(candidate).await {
        Ok(elements) => elements,
        Err(e) => {
            debug!("Locating {} failed: {:#}", candidate, e);
            return None;
        }
    };

    for element in elements {
        match page.is_displayed(&element).await {
            Ok(true) => return Some(element),
            Ok(false) => {}
            Err(e) => debug!("Visibility check on {} failed: {:#}", candidate, e),
        }
    }
    None
}

/// Wait until an element matching the candidate becomes visible.
///
/// Re-locates on every probe so elements rendered after the first probe are
/// picked up. Returns `None` when the budget runs out.
pub async fn wait_for_visible<P: PageDriver>(
    page: &P,
    candidate: &LocatorCandidate,
    timeout: Duration,
) -> Option<P::Element> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(element) = visible_element(page, candidate).await {
            return Some(element);
        }
        let now = Instant::now();
        if now >= deadline {
            return None;
        }
        tokio::time::sleep(POLL_INTERVAL.min(deadline - now)).await;
    }
}

/// Instant check, no waiting
pub async fn is_visible<P: PageDriver>(page: &P, candidate: &LocatorCandidate) -> bool {
    visible_element(page, candidate).await.is_some()
}

/// Bounded check; an expired budget reads as `false`
pub async fn is_visible_within<P: PageDriver>(
    page: &P,
    candidate: &LocatorCandidate,
    timeout: Duration,
) -> bool {
    wait_for_visible(page, candidate, timeout).await.is_some()
}

#[cfg(test)]
#[path = "wait_test.rs"]
mod wait_test;
