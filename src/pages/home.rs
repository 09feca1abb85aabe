use tracing::{debug, info};

use super::base::BasePage;
use super::locators::home as loc;
use crate::browser::{KEY_ENTER, PageDriver};
use crate::context::RunContext;
use crate::errors::ProbeResult;
use crate::wait::{self, WaitBudget};

/// Landing page with the search box
pub struct HomePage<'a, P: PageDriver> {
    base: BasePage<'a, P>,
}

impl<'a, P: PageDriver> HomePage<'a, P> {
    pub fn new(page: &'a P, ctx: &'a RunContext) -> Self {
        Self {
            base: BasePage::new(page, ctx),
        }
    }

    pub fn base(&self) -> &BasePage<'a, P> {
        &self.base
    }

    /// Open the home page and dismiss the signup popup if one shows up
    pub async fn navigate(&self) -> ProbeResult<()> {
        let url = self.base.ctx.settings.urls.base_ui.clone();
        self.base.open(&url).await?;
        self.dismiss_popup_if_present().await;
        Ok(())
    }

    /// Type `keyword` into the search box and submit with Enter
    pub async fn search_for(&self, keyword: &str) -> ProbeResult<()> {
        info!("Searching for: '{}'", keyword);

        let search_box = self.base.find(&loc::search_box()).await?;
        let interactor = self.base.interactor();
        interactor
            .type_slowly(&search_box, keyword, "Search Box")
            .await?;
        info!("Typed '{}' into Search Box", keyword);

        self.base.pause(WaitBudget::ShortNetwork).await;
        interactor.press(&search_box, KEY_ENTER).await
    }

    async fn dismiss_popup_if_present(&self) {
        let close = loc::popup_close();
        let budget = self.base.ctx.budget(WaitBudget::OptionalPresence);
        let Some(button) = wait::wait_for_visible(self.base.page, &close, budget).await else {
            return;
        };

        info!("Dismissing popup...");
        // The popup sometimes closes itself between the check and the click
        if let Err(e) = self.base.page.click(&button).await {
            debug!("Popup close click ignored: {:#}", e);
        }
    }
}
