//! Screenshot and video artifacts.
//!
//! Capturing diagnostics must never fail a run: every error in this module is
//! logged at WARN and swallowed.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::browser::PageDriver;
use crate::config::current_timestamp;

/// Final state of a scenario, used to prefix artifact names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed,
}

impl Outcome {
    pub fn prefix(&self) -> &'static str {
        match self {
            Outcome::Passed => "PASS",
            Outcome::Failed => "FAIL",
        }
    }
}

/// Names and writes screenshots and recorded videos
#[derive(Debug, Clone)]
pub struct ArtifactManager {
    screenshot_dir: PathBuf,
    video_dir: PathBuf,
}

impl ArtifactManager {
    pub fn new(screenshot_dir: impl Into<PathBuf>, video_dir: impl Into<PathBuf>) -> Self {
        Self {
            screenshot_dir: screenshot_dir.into(),
            video_dir: video_dir.into(),
        }
    }

    pub fn screenshot_dir(&self) -> &Path {
        &self.screenshot_dir
    }

    pub fn video_dir(&self) -> &Path {
        &self.video_dir
    }

    /// `{dir}/{name}{timestamp}.png`
    pub fn screenshot_path(&self, name: &str) -> PathBuf {
        self.screenshot_dir
            .join(format!("{}{}.png", safe_name(name), current_timestamp()))
    }

    /// `{dir}/{PASS|FAIL}_{test}_{timestamp}.png`
    pub fn outcome_screenshot_path(&self, test_name: &str, outcome: Outcome) -> PathBuf {
        self.screenshot_dir.join(format!(
            "{}_{}_{}.png",
            outcome.prefix(),
            safe_name(test_name),
            current_timestamp()
        ))
    }

    /// Best-effort diagnostic screenshot; returns the written path on success
    pub async fn capture<P: PageDriver>(&self, page: &P, name: &str) -> Option<PathBuf> {
        let path = self.screenshot_path(name);
        self.write_screenshot(page, path).await
    }

    /// Screenshot named after a scenario and its outcome
    pub async fn capture_outcome<P: PageDriver>(
        &self,
        page: &P,
        test_name: &str,
        outcome: Outcome,
    ) -> Option<PathBuf> {
        let path = self.outcome_screenshot_path(test_name, outcome);
        self.write_screenshot(page, path).await
    }

    async fn write_screenshot<P: PageDriver>(&self, page: &P, path: PathBuf) -> Option<PathBuf> {
        let result: Result<()> = async {
            let png = page.screenshot().await?;
            fs::create_dir_all(&self.screenshot_dir).with_context(|| {
                format!("Failed to create {}", self.screenshot_dir.display())
            })?;
            fs::write(&path, png)?;
            Ok(())
        }
        .await;

        match result {
            Ok(()) => {
                info!("Screenshot saved: {}", path.display());
                Some(path)
            }
            Err(e) => {
                warn!("Could not take screenshot: {:#}", e);
                None
            }
        }
    }

    /// Rename recorded videos after the scenario outcome.
    ///
    /// Every `.webm` in the video directory that has not been claimed yet
    /// (no `PASS_`/`FAIL_` prefix) becomes `{PASS|FAIL}_{test}_{timestamp}.webm`,
    /// with a numeric suffix when a run recorded several pages.
    pub fn finalize_videos(&self, test_name: &str, outcome: Outcome) -> Vec<PathBuf> {
        let entries = match fs::read_dir(&self.video_dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    "Video directory {} not readable: {}",
                    self.video_dir.display(),
                    e
                );
                return Vec::new();
            }
        };

        let mut pending: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_unclaimed_video(path))
            .collect();
        pending.sort();

        let timestamp = current_timestamp();
        pending
            .iter()
            .enumerate()
            .filter_map(|(i, original)| {
                let suffix = if i == 0 { String::new() } else { format!("_{}", i) };
                self.rename_video(original, test_name, outcome, &format!("{}{}", timestamp, suffix))
            })
            .collect()
    }

    /// Rename one recorded video to `{PASS|FAIL}_{test}_{timestamp}.webm`
    /// next to the original
    pub fn finalize_video(&self, original: &Path, test_name: &str, outcome: Outcome) -> Option<PathBuf> {
        self.rename_video(original, test_name, outcome, &current_timestamp())
    }

    fn rename_video(
        &self,
        original: &Path,
        test_name: &str,
        outcome: Outcome,
        stamp: &str,
    ) -> Option<PathBuf> {
        let dir = original.parent().unwrap_or(&self.video_dir);
        let target = dir.join(format!(
            "{}_{}_{}.webm",
            outcome.prefix(),
            safe_name(test_name),
            stamp
        ));
        match fs::rename(original, &target) {
            Ok(()) => {
                info!("Video saved: {}", target.display());
                Some(target)
            }
            Err(e) => {
                warn!("Video rename failed for {}: {}", original.display(), e);
                None
            }
        }
    }
}

fn is_unclaimed_video(path: &Path) -> bool {
    let is_webm = path.extension().and_then(|e| e.to_str()) == Some("webm");
    let claimed = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with("PASS_") || n.starts_with("FAIL_"))
        .unwrap_or(true);
    is_webm && !claimed
}

/// File-system safe version of a scenario or element name
pub fn safe_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            ' ' | '[' | ']' | '/' | '\\' | ':' | '\'' | '"' => '_',
            c => c,
        })
        .collect()
}
