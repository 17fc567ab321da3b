#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

use crate::core::probe::{BackoffPolicy, ProbeSettings};
use crate::domain::model::Credentials;
use crate::utils::error::{AppError, Result};
use crate::utils::validation::{validate_positive_number, validate_range};
use std::time::Duration;

pub const DEFAULT_HEALTH_PATH: &str = "/health";
pub const DEFAULT_ENVIRONMENT: &str = "development";
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_BASE_DELAY_MS: u64 = 500;
pub const DEFAULT_MAX_DELAY_MS: u64 = 8_000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const MAX_PROBE_ATTEMPTS: u32 = 10;

/// 將路徑接到後端網址；`path` 本身是完整網址時直接使用
pub fn join_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

pub fn build_probe_settings(
    max_attempts: u32,
    timeout_ms: u64,
    backoff: &str,
    base_delay_ms: u64,
    max_delay_ms: u64,
) -> Result<ProbeSettings> {
    let policy = BackoffPolicy::from_config(
        backoff,
        Duration::from_millis(base_delay_ms),
        Duration::from_millis(max_delay_ms),
    )?;
    Ok(ProbeSettings::new(
        max_attempts,
        Duration::from_millis(timeout_ms),
        policy,
    ))
}

/// 帳號密碼必須同時提供或同時省略
pub fn pair_credentials(
    email: Option<&str>,
    password: Option<&str>,
) -> Result<Option<Credentials>> {
    match (email, password) {
        (Some(email), Some(password)) => Ok(Some(Credentials::new(email, password))),
        (None, None) => Ok(None),
        (Some(_), None) => Err(AppError::MissingConfigError {
            field: "password".to_string(),
        }),
        (None, Some(_)) => Err(AppError::MissingConfigError {
            field: "email".to_string(),
        }),
    }
}

fn validate_probe_fields(
    prefix: &str,
    max_attempts: u32,
    timeout_ms: u64,
    backoff: &str,
    base_delay_ms: u64,
    max_delay_ms: u64,
) -> Result<()> {
    validate_range(
        &format!("{}max_attempts", prefix),
        max_attempts,
        1,
        MAX_PROBE_ATTEMPTS,
    )?;
    validate_positive_number(&format!("{}timeout_ms", prefix), timeout_ms, 1)?;
    build_probe_settings(max_attempts, timeout_ms, backoff, base_delay_ms, max_delay_ms)?;
    Ok(())
}
