//! Page objects for the screens the harness drives.
//!
//! Each page wraps a [`base::BasePage`] and expresses its flow in terms of
//! locator chains from [`locators`].

pub mod base;
pub mod home;
pub mod locators;
pub mod login;
pub mod search_results;

pub use base::BasePage;
pub use home::HomePage;
pub use login::LoginPage;
pub use search_results::SearchResultPage;

#[cfg(test)]
pub(crate) mod test_support {
    use tempfile::TempDir;

    use crate::config::Settings;
    use crate::context::RunContext;
    use crate::wait::Timeouts;

    /// Run context rooted in a scratch directory with millisecond budgets
    pub fn test_context() -> (TempDir, RunContext) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_string_lossy().to_string();
        let mut settings = Settings::from_lookup(|key| match key {
            "PINPROBE_ROOT" => Some(root.clone()),
            _ => None,
        });
        settings.timeouts = Timeouts {
            fallback_check_ms: 30,
            optional_presence_ms: 30,
            typing_ms: 2,
            short_network_ms: 5,
            medium_network_ms: 5,
            element_ms: 100,
            default_ms: 200,
            page_load_ms: 100,
            long_ms: 200,
        };
        (dir, RunContext::new(settings))
    }
}
