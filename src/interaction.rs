//! Logged element actions.
//!
//! Only `click` captures a diagnostic screenshot on failure; `fill` and
//! `get_text` just propagate, as the page objects rely on that split.

use std::time::Duration;
use tracing::{debug, error, info};

use crate::artifacts::ArtifactManager;
use crate::browser::PageDriver;
use crate::errors::{ProbeError, ProbeResult};
use crate::wait;

pub struct Interactor<'a, P: PageDriver> {
    page: &'a P,
    artifacts: &'a ArtifactManager,
    typing_delay: Duration,
}

impl<'a, P: PageDriver> Interactor<'a, P> {
    pub fn new(page: &'a P, artifacts: &'a ArtifactManager, typing_delay: Duration) -> Self {
        Self {
            page,
            artifacts,
            typing_delay,
        }
    }

    /// Click, capturing `fail_click_{description}` before re-raising a failure
    pub async fn click(&self, element: &P::Element, description: &str) -> ProbeResult<()> {
        info!("Clicking on '{}'", description);
        if let Err(e) = self.page.click(element).await {
            error!("Failed to click '{}': {:#}", description, e);
            self.artifacts
                .capture(self.page, &format!("fail_click_{}", description))
                .await;
            return Err(ProbeError::InteractionFailed {
                action: "click",
                description: description.to_string(),
                source: e,
            });
        }
        Ok(())
    }

    /// Replace the field's content
    pub async fn fill(&self, element: &P::Element, text: &str, description: &str) -> ProbeResult<()> {
        info!("Typing '{}' into '{}'", text, description);
        self.page.clear(element).await?;
        self.page.send_keys(element, text).await?;
        Ok(())
    }

    /// Trimmed text content
    pub async fn get_text(&self, element: &P::Element, description: &str) -> ProbeResult<String> {
        let text = self.page.text(element).await?;
        let text = text.trim().to_string();
        debug!("Read text from '{}': '{}'", description, text);
        Ok(text)
    }

    /// Click into the field, then type one keystroke at a time with the
    /// run's fixed typing delay between keystrokes
    pub async fn type_slowly(
        &self,
        element: &P::Element,
        text: &str,
        description: &str,
    ) -> ProbeResult<()> {
        self.click(element, description).await?;
        wait::pause(self.typing_delay).await;

        let mut chars = text.chars().peekable();
        while let Some(ch) = chars.next() {
            let mut buf = [0u8; 4];
            self.page.send_keys(element, ch.encode_utf8(&mut buf)).await?;
            if chars.peek().is_some() {
                wait::pause(self.typing_delay).await;
            }
        }
        info!("Typed {} characters into '{}'", text.chars().count(), description);
        Ok(())
    }

    /// Send a special key (see `browser::KEY_*`)
    pub async fn press(&self, element: &P::Element, key: &str) -> ProbeResult<()> {
        debug!("Pressing key {:?}", key);
        self.page.send_keys(element, key).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "interaction_test.rs"]
mod interaction_test;
