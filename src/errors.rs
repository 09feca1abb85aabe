use thiserror::Error;

/// Errors raised by the UI path, carrying process exit codes
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Every locator candidate was tried and none became visible (exit code 2)
    #[error("'{element}' not found with any strategy after {timeout_ms}ms per candidate (tried: {attempted})")]
    ElementNotFound {
        element: String,
        timeout_ms: u64,
        attempted: String,
    },
    /// An action failed after the element was found (exit code 3)
    #[error("Failed to {action} '{description}': {source}")]
    InteractionFailed {
        action: &'static str,
        description: String,
        #[source]
        source: anyhow::Error,
    },
    /// WebDriver connection failed (exit code 4)
    #[error("WebDriver connection failed: {0}")]
    WebDriverFailed(String),
    /// A required wait expired (exit code 5)
    #[error("Operation timed out: {0}")]
    Timeout(String),
    /// Generic error (exit code 1)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ProbeError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            ProbeError::ElementNotFound { .. } => 2,
            ProbeError::InteractionFailed { .. } => 3,
            ProbeError::WebDriverFailed(_) => 4,
            ProbeError::Timeout(_) => 5,
            ProbeError::Other(_) => 1,
        }
    }

    /// Classify an error that reached the binary boundary.
    ///
    /// Errors that were raised as `ProbeError` and later wrapped in `anyhow`
    /// context keep their variant; anything else becomes `Other`.
    pub fn classify(err: anyhow::Error) -> Self {
        match err.downcast::<ProbeError>() {
            Ok(probe) => probe,
            Err(err) => {
                let msg = err.to_string();
                if msg.contains("WebDriver")
                    || msg.contains("geckodriver")
                    || msg.contains("chromedriver")
                {
                    ProbeError::WebDriverFailed(format!("{:#}", err))
                } else {
                    ProbeError::Other(err)
                }
            }
        }
    }
}

pub type ProbeResult<T> = std::result::Result<T, ProbeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let not_found = ProbeError::ElementNotFound {
            element: "search box".to_string(),
            timeout_ms: 2000,
            attempted: "css [data-test-id='search-box-input']".to_string(),
        };
        assert_eq!(not_found.exit_code(), 2);
        assert_eq!(ProbeError::WebDriverFailed("down".into()).exit_code(), 4);
        assert_eq!(ProbeError::Timeout("url".into()).exit_code(), 5);
        assert_eq!(ProbeError::Other(anyhow::anyhow!("boom")).exit_code(), 1);
    }

    #[test]
    fn test_element_not_found_message_names_element_and_budget() {
        let err = ProbeError::ElementNotFound {
            element: "search box".to_string(),
            timeout_ms: 2000,
            attempted: "a, b".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("search box"));
        assert!(msg.contains("2000ms"));
    }

    #[test]
    fn test_classify_keeps_probe_variant_through_anyhow() {
        let err = anyhow::Error::new(ProbeError::Timeout("login redirect".into()));
        assert!(matches!(ProbeError::classify(err), ProbeError::Timeout(_)));

        let err = anyhow::anyhow!("Failed to connect to WebDriver at http://localhost:4444");
        assert_eq!(ProbeError::classify(err).exit_code(), 4);

        let err = anyhow::anyhow!("disk full");
        assert_eq!(ProbeError::classify(err).exit_code(), 1);
    }

    #[test]
    fn test_interaction_failure_keeps_source() {
        let err = ProbeError::InteractionFailed {
            action: "click",
            description: "Login Button".to_string(),
            source: anyhow::anyhow!("element click intercepted"),
        };
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("Login Button"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
