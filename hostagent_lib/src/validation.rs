use std::time::Duration;

use crate::error::HostAgentError;

pub const MAX_PATH_LENGTH: usize = 2048;
pub const MAX_LOCALE_LENGTH: usize = 35;
pub const MAX_TIMEOUT_MS: u64 = 120_000;
pub const MAX_API_KEY_LENGTH: usize = 256;

/// Validate an API key. Control characters and surrounding whitespace are
/// dropped; what remains must be visible ASCII so it fits in a header.
pub fn validate_api_key(input: &str) -> Result<String, HostAgentError> {
    let cleaned: String = input.chars().filter(|c| !c.is_control()).collect();
    let key = cleaned.trim();
    if key.is_empty() {
        return Err(HostAgentError::InvalidInput("API key is empty".to_string()));
    }
    if key.len() > MAX_API_KEY_LENGTH {
        return Err(HostAgentError::InvalidInput(format!(
            "API key exceeds maximum length of {} bytes",
            MAX_API_KEY_LENGTH
        )));
    }
    if !key.chars().all(|c| c.is_ascii_graphic()) {
        return Err(HostAgentError::InvalidInput(
            "API key must be printable ASCII without spaces".to_string(),
        ));
    }
    Ok(key.to_string())
}

/// Validate a base path: must be rooted and free of whitespace, control
/// characters, query and fragment markers. An empty input means the root.
pub fn validate_base_path(input: &str) -> Result<String, HostAgentError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok("/".to_string());
    }
    if trimmed.len() > MAX_PATH_LENGTH {
        return Err(HostAgentError::InvalidInput(format!(
            "base path exceeds maximum length of {} bytes",
            MAX_PATH_LENGTH
        )));
    }
    if !trimmed.starts_with('/') {
        return Err(HostAgentError::InvalidInput(format!(
            "base path '{}' must start with '/'",
            trimmed
        )));
    }
    if trimmed.starts_with("//") {
        return Err(HostAgentError::InvalidInput(format!(
            "base path '{}' must not start with '//'",
            trimmed
        )));
    }
    let invalid = |c: &char| c.is_whitespace() || c.is_control() || matches!(*c, '?' | '#' | '\\');
    if let Some(bad) = trimmed.chars().find(invalid) {
        return Err(HostAgentError::InvalidInput(format!(
            "base path contains invalid character {:?}",
            bad
        )));
    }
    Ok(trimmed.to_string())
}

/// Validate a locale tag such as `en`, `pt-BR` or `zh_Hans`.
pub fn validate_locale(input: &str) -> Result<String, HostAgentError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_LOCALE_LENGTH {
        return Err(HostAgentError::InvalidInput(format!(
            "locale must be 1-{} characters",
            MAX_LOCALE_LENGTH
        )));
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(HostAgentError::InvalidInput(format!(
            "unknown locale '{}'. Use a tag like en, de or pt-BR",
            trimmed
        )));
    }
    Ok(trimmed.to_string())
}

/// Validate a timeout in milliseconds (must be 1..=120000).
pub fn validate_timeout_ms(ms: u64) -> Result<Duration, HostAgentError> {
    if !(1..=MAX_TIMEOUT_MS).contains(&ms) {
        return Err(HostAgentError::InvalidInput(format!(
            "timeout must be between 1 and {} ms",
            MAX_TIMEOUT_MS
        )));
    }
    Ok(Duration::from_millis(ms))
}

/// Validate a backend route: relative, no scheme, no whitespace or control
/// characters.
pub fn validate_api_path(input: &str) -> Result<String, HostAgentError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(HostAgentError::InvalidInput("path is empty".to_string()));
    }
    if trimmed.len() > MAX_PATH_LENGTH {
        return Err(HostAgentError::InvalidInput(format!(
            "path exceeds maximum length of {} bytes",
            MAX_PATH_LENGTH
        )));
    }
    if trimmed.contains("://") {
        return Err(HostAgentError::InvalidInput(format!(
            "path '{}' must be relative to the base path",
            trimmed
        )));
    }
    if trimmed.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(HostAgentError::InvalidInput(
            "path contains whitespace or control characters".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Validate that a request body is well-formed JSON. Returns it compacted.
pub fn validate_json_body(input: &str) -> Result<String, HostAgentError> {
    let value: serde_json::Value = serde_json::from_str(input).map_err(|e| {
        HostAgentError::InvalidInput(format!("body is not valid JSON: {}", e))
    })?;
    Ok(value.to_string())
}
