//! Fallback-chain element resolution.
//!
//! Candidates are tried strictly in order, each with its own bounded
//! visibility wait. The first visible match wins and later candidates are
//! never evaluated. Exhausting the chain costs exactly one diagnostic
//! screenshot attempt before [`ProbeError::ElementNotFound`] is returned.

use std::time::Duration;
use tracing::{debug, warn};

use crate::artifacts::{ArtifactManager, safe_name};
use crate::browser::PageDriver;
use crate::errors::{ProbeError, ProbeResult};
use crate::locator::LocatorChain;
use crate::wait;

pub struct ElementResolver<'a, P: PageDriver> {
    page: &'a P,
    artifacts: &'a ArtifactManager,
}

impl<'a, P: PageDriver> ElementResolver<'a, P> {
    pub fn new(page: &'a P, artifacts: &'a ArtifactManager) -> Self {
        Self { page, artifacts }
    }

    pub async fn resolve(
        &self,
        chain: &LocatorChain,
        per_candidate_timeout: Duration,
    ) -> ProbeResult<P::Element> {
        for (index, candidate) in chain.candidates().iter().enumerate() {
            debug!(
                "Resolving '{}' via {} ({}ms)",
                chain.name(),
                candidate,
                per_candidate_timeout.as_millis()
            );

            if let Some(element) =
                wait::wait_for_visible(self.page, candidate, per_candidate_timeout).await
            {
                if index > 0 {
                    warn!(
                        "Primary selector for '{}' failed. Using fallback #{}: {}",
                        chain.name(),
                        index,
                        candidate
                    );
                }
                return Ok(element);
            }
        }

        self.artifacts
            .capture(self.page, &format!("{}_missing", safe_name(chain.name())))
            .await;

        Err(ProbeError::ElementNotFound {
            element: chain.name().to_string(),
            timeout_ms: per_candidate_timeout.as_millis() as u64,
            attempted: chain.describe(),
        })
    }
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod resolver_test;
