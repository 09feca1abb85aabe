use std::time::Duration;
use tracing::{debug, info, warn};

use super::base::BasePage;
use super::locators::login as loc;
use crate::browser::{KEY_ESCAPE, PageDriver};
use crate::context::RunContext;
use crate::errors::ProbeResult;
use crate::locator::{LocatorCandidate, LocatorChain};
use crate::wait::{self, POLL_INTERVAL, WaitBudget};

/// Budget for leaving `/login` after submitting the form
pub const LOGIN_REDIRECT_TIMEOUT: Duration = Duration::from_secs(15);

pub struct LoginPage<'a, P: PageDriver> {
    base: BasePage<'a, P>,
}

impl<'a, P: PageDriver> LoginPage<'a, P> {
    pub fn new(page: &'a P, ctx: &'a RunContext) -> Self {
        Self {
            base: BasePage::new(page, ctx),
        }
    }

    pub fn base(&self) -> &BasePage<'a, P> {
        &self.base
    }

    pub async fn navigate(&self) -> ProbeResult<()> {
        let url = format!("{}/login/", self.base.ctx.settings.urls.base_ui);
        self.base.open(&url).await?;
        self.base.pause(WaitBudget::MediumNetwork).await;
        Ok(())
    }

    /// Fill the form, submit, and wait for the redirect away from `/login`.
    ///
    /// A missing redirect is only logged; callers check the URL or
    /// [`LoginPage::error_message`] themselves.
    pub async fn login(&self, email: &str, password: &str) -> ProbeResult<bool> {
        self.dismiss_google_popup().await;
        info!("Logging in as: {}", email);

        self.type_into(&loc::email_input(), email, "Email Input").await?;
        self.base.pause(WaitBudget::ShortNetwork).await;
        self.type_into(&loc::password_input(), password, "Password Input")
            .await?;
        self.base.pause(WaitBudget::ShortNetwork).await;

        let submit = self.base.find(&loc::submit_button()).await?;
        self.base.interactor().click(&submit, "Login Button").await?;

        let redirected = self
            .base
            .wait_for_url_leaving("/login", LOGIN_REDIRECT_TIMEOUT)
            .await;
        if redirected {
            info!("Login redirect successful");
            self.base.pause(WaitBudget::MediumNetwork).await;
        } else {
            warn!("Login timeout or failed to redirect");
        }
        Ok(redirected)
    }

    /// Visible login error text, or an empty string
    pub async fn error_message(&self) -> ProbeResult<String> {
        let candidate = LocatorCandidate::css(loc::ERROR_MESSAGE);
        let budget = self.base.ctx.budget(WaitBudget::FallbackCheck);
        match wait::wait_for_visible(self.base.page, &candidate, budget).await {
            Some(el) => {
                self.base
                    .interactor()
                    .get_text(&el, "Error Message")
                    .await
            }
            None => Ok(String::new()),
        }
    }

    async fn type_into(&self, chain: &LocatorChain, text: &str, description: &str) -> ProbeResult<()> {
        info!("Typing into '{}'", description);
        let field = self.base.find(chain).await?;
        self.base
            .interactor()
            .type_slowly(&field, text, description)
            .await
    }

    /// Close the Google One Tap popup, or press Escape when it is not there
    /// or does not go away. Returns whether the popup was closed.
    async fn dismiss_google_popup(&self) -> bool {
        let budget = self.base.ctx.budget(WaitBudget::FallbackCheck);
        let page = self.base.page;
        let container = LocatorCandidate::css(loc::GOOGLE_POPUP_CONTAINER);

        let dismissed = if wait::is_visible_within(page, &container, budget).await {
            info!("Google One Tap popup detected, dismissing...");
            let close = LocatorCandidate::css(loc::GOOGLE_POPUP_CLOSE);
            let clicked = match wait::wait_for_visible(page, &close, budget).await {
                Some(button) => match page.click(&button).await {
                    Ok(()) => true,
                    Err(e) => {
                        debug!("Google popup close failed: {:#}", e);
                        false
                    }
                },
                None => false,
            };
            clicked && self.wait_for_popup_hidden(&container).await
        } else {
            false
        };

        if dismissed {
            info!("Google popup dismissed");
            return true;
        }
        if let Err(e) = page.press_global(KEY_ESCAPE).await {
            debug!("Escape ignored: {:#}", e);
        }
        false
    }

    /// The popup can re-render after its close button was clicked
    async fn wait_for_popup_hidden(&self, container: &LocatorCandidate) -> bool {
        let page = self.base.page;
        let timeout = self.base.ctx.budget(WaitBudget::OptionalPresence);
        let hidden = wait::poll_until(timeout, POLL_INTERVAL, move || async move {
            !wait::is_visible(page, container).await
        })
        .await;
        if !hidden {
            debug!(
                "Google popup still visible after {}ms",
                timeout.as_millis()
            );
        }
        hidden
    }
}
