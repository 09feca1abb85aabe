//! The browser capability the harness drives.
//!
//! Everything above this trait (wait policy, resolver, interactions, page
//! objects) is written against [`PageDriver`], so the WebDriver session in
//! [`crate::webdriver`] can be swapped for an in-memory page in tests.

use anyhow::Result;
use async_trait::async_trait;

use crate::locator::LocatorCandidate;

/// WebDriver code point for the Enter key
pub const KEY_ENTER: &str = "\u{E007}";
/// WebDriver code point for the Escape key
pub const KEY_ESCAPE: &str = "\u{E00C}";

#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Live element handle
    type Element: Clone + Send + Sync;

    /// Navigate and wait for the DOM to be interactive
    async fn navigate(&self, url: &str) -> Result<()>;

    async fn reload(&self) -> Result<()>;

    async fn current_url(&self) -> Result<String>;

    /// Every element currently matching the candidate, in document order
    async fn locate_all(&self, candidate: &LocatorCandidate) -> Result<Vec<Self::Element>>;

    async fn is_displayed(&self, element: &Self::Element) -> Result<bool>;

    async fn click(&self, element: &Self::Element) -> Result<()>;

    async fn clear(&self, element: &Self::Element) -> Result<()>;

    /// Send keystrokes to an element; special keys use the `KEY_*` code points
    async fn send_keys(&self, element: &Self::Element, text: &str) -> Result<()>;

    /// Send keystrokes to whatever has focus
    async fn press_global(&self, key: &str) -> Result<()>;

    async fn text(&self, element: &Self::Element) -> Result<String>;

    async fn attribute(&self, element: &Self::Element, name: &str) -> Result<Option<String>>;

    async fn scroll_by(&self, dx: i64, dy: i64) -> Result<()>;

    /// PNG of the current viewport
    async fn screenshot(&self) -> Result<Vec<u8>>;
}
