//! Selectors for the pages the harness drives.
//!
//! Technical `data-test-id` selectors come first; attribute and
//! locale-dependent text patterns are fallbacks only.

use crate::locator::{LocatorCandidate, LocatorChain};

pub mod home {
    use super::*;

    pub const SEARCH_INPUT: &str = "[data-test-id='search-box-input']";
    pub const SEARCH_INPUT_NAME: &str = "searchBoxInput";
    /// "Search" in the locales the site is tested under
    pub const SEARCH_PLACEHOLDER_PATTERN: &str = "Search|Tìm kiếm|搜索|検索|Rechercher";
    pub const POPUP_CLOSE_LABEL: &str = "^Close$";

    pub fn search_box() -> LocatorChain {
        LocatorChain::new("search box", LocatorCandidate::css(SEARCH_INPUT))
            .then(LocatorCandidate::attribute("name", SEARCH_INPUT_NAME))
            .then(LocatorCandidate::placeholder(SEARCH_PLACEHOLDER_PATTERN))
    }

    pub fn popup_close() -> LocatorCandidate {
        LocatorCandidate::aria_label(POPUP_CLOSE_LABEL)
    }
}

pub mod login {
    use super::*;

    /// Google One Tap popup
    pub const GOOGLE_POPUP_CONTAINER: &str = "#credentials-picker-container";
    pub const GOOGLE_POPUP_CLOSE: &str = "#credentials-picker-container #close";
    pub const EMAIL_INPUT: &str = "[data-test-id='emailInputField']";
    pub const PASSWORD_INPUT: &str = "[data-test-id='passwordInputField']";
    pub const SUBMIT_BUTTON: &str = "[data-test-id='registerFormSubmitButton']";
    pub const ERROR_MESSAGE: &str = "[data-test-id='login-error']";

    pub fn email_input() -> LocatorChain {
        LocatorChain::new("email input", LocatorCandidate::css(EMAIL_INPUT))
            .then(LocatorCandidate::attribute("type", "email"))
    }

    pub fn password_input() -> LocatorChain {
        LocatorChain::new("password input", LocatorCandidate::css(PASSWORD_INPUT))
            .then(LocatorCandidate::attribute("type", "password"))
    }

    pub fn submit_button() -> LocatorChain {
        LocatorChain::new("login submit button", LocatorCandidate::css(SUBMIT_BUTTON))
            .then(LocatorCandidate::css("button[type='submit']"))
    }
}

pub mod search_results {
    /// Container holding every pin
    pub const FEED_GRID: &str = "[data-test-id='max-width-container']";
    pub const PIN_ITEM: &str = "[data-test-id='pin']";
    /// Images whose `src` already points at the CDN
    pub const PIN_IMAGE_LOADED: &str =
        "[data-test-id='non-story-pin-image'] img[src*='pinimg.com']";
    pub const PIN_TITLE: &str = "[data-test-id='pinrep-footer-organic-title']";
}
