use crate::artifacts::ArtifactManager;
use crate::config::Settings;
use crate::wait::{Timeouts, WaitBudget};

/// Everything a page object or client needs from the run, built once in
/// `main` and passed down by reference.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub settings: Settings,
    pub artifacts: ArtifactManager,
}

impl RunContext {
    pub fn new(settings: Settings) -> Self {
        let artifacts = ArtifactManager::new(settings.screenshots_dir(), settings.videos_dir());
        Self {
            settings,
            artifacts,
        }
    }

    pub fn timeouts(&self) -> &Timeouts {
        &self.settings.timeouts
    }

    pub fn budget(&self, budget: WaitBudget) -> std::time::Duration {
        self.settings.timeouts.get(budget)
    }
}
