//! Normalized HTTP outcome returned by every API call

use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::HashMap;

/// Status reported when a request timed out
pub const STATUS_TIMEOUT: u16 = 408;
/// Status reported when no connection could be made
pub const STATUS_CONNECTION_FAILED: u16 = 503;
/// Status reported for any other transport failure
pub const STATUS_TRANSPORT_ERROR: u16 = 500;

/// Characters of a non-JSON body kept in `raw_text`
pub const RAW_TEXT_LIMIT: usize = 500;

/// Status, body and headers of one API call.
///
/// Transport failures are folded in as synthetic statuses (408, 503, 500)
/// with a `null` body. `success` is always derived from the status.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status_code: u16,
    data: Value,
    success: bool,
    error_message: String,
    headers: HashMap<String, String>,
}

impl ApiResponse {
    /// Build from a real HTTP exchange; the body is normalized here
    pub fn from_parts(
        status_code: u16,
        reason: &str,
        body: &str,
        headers: HashMap<String, String>,
    ) -> Self {
        let success = is_success(status_code);
        Self {
            status_code,
            data: normalize_body(body),
            success,
            error_message: if success {
                String::new()
            } else {
                reason.to_string()
            },
            headers,
        }
    }

    pub fn timed_out() -> Self {
        Self::synthetic(STATUS_TIMEOUT, "Request timed out".to_string())
    }

    pub fn connection_failed(detail: &str) -> Self {
        Self::synthetic(
            STATUS_CONNECTION_FAILED,
            format!("Connection failed: {}", detail),
        )
    }

    pub fn transport_error(detail: &str) -> Self {
        Self::synthetic(STATUS_TRANSPORT_ERROR, detail.to_string())
    }

    fn synthetic(status_code: u16, error_message: String) -> Self {
        Self {
            status_code,
            data: Value::Null,
            success: is_success(status_code),
            error_message,
            headers: HashMap::new(),
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn into_data(self) -> Value {
        self.data
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Header lookup, case-insensitive
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_ok(&self) -> bool {
        self.success
    }

    pub fn is_created(&self) -> bool {
        self.status_code == 201
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code == 404
    }

    /// Deserialize the body into a typed value
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        T::deserialize(&self.data)
    }
}

fn is_success(status_code: u16) -> bool {
    (200..300).contains(&status_code)
}

/// `{}` for an empty body, the parsed JSON when it parses, otherwise the
/// first [`RAW_TEXT_LIMIT`] characters under `raw_text`
pub fn normalize_body(body: &str) -> Value {
    if body.is_empty() {
        return json!({});
    }
    match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => {
            let truncated: String = body.chars().take(RAW_TEXT_LIMIT).collect();
            json!({ "raw_text": truncated })
        }
    }
}
