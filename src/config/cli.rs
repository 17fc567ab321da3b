use super::{
    build_probe_settings, join_url, pair_credentials, validate_probe_fields,
    DEFAULT_BASE_DELAY_MS, DEFAULT_ENVIRONMENT, DEFAULT_HEALTH_PATH, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_MAX_DELAY_MS, DEFAULT_PROBE_TIMEOUT_MS, DEFAULT_REQUEST_TIMEOUT_SECS,
};
use crate::core::probe::ProbeSettings;
use crate::core::ConfigProvider;
use crate::domain::model::Credentials;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_url, Validate,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "foodie-app")]
#[command(about = "Restaurant dashboard client with a backend connectivity probe")]
pub struct CliConfig {
    /// Path to a TOML configuration file; replaces the options below
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long, default_value = "http://localhost:1111")]
    pub backend_url: String,

    #[arg(long, default_value = DEFAULT_HEALTH_PATH)]
    pub health_path: String,

    /// Sent to the health endpoint as X-App-ID
    #[arg(long, default_value = "foodie-app")]
    pub app_id: String,

    #[arg(long, default_value = DEFAULT_ENVIRONMENT)]
    pub environment: String,

    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,

    /// Per-attempt probe timeout in milliseconds
    #[arg(long, default_value_t = DEFAULT_PROBE_TIMEOUT_MS)]
    pub timeout_ms: u64,

    /// Backoff policy: linear or exponential
    #[arg(long, default_value = "exponential")]
    pub backoff: String,

    #[arg(long, default_value_t = DEFAULT_BASE_DELAY_MS)]
    pub base_delay_ms: u64,

    #[arg(long, default_value_t = DEFAULT_MAX_DELAY_MS)]
    pub max_delay_ms: u64,

    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub password: Option<String>,

    /// Only run the connectivity probe
    #[arg(long)]
    pub probe_only: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl ConfigProvider for CliConfig {
    fn backend_url(&self) -> &str {
        &self.backend_url
    }

    fn health_url(&self) -> String {
        join_url(&self.backend_url, &self.health_path)
    }

    fn app_id(&self) -> &str {
        &self.app_id
    }

    fn environment(&self) -> &str {
        &self.environment
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn probe_settings(&self) -> Result<ProbeSettings> {
        build_probe_settings(
            self.max_attempts,
            self.timeout_ms,
            &self.backoff,
            self.base_delay_ms,
            self.max_delay_ms,
        )
    }

    fn credentials(&self) -> Option<Credentials> {
        pair_credentials(self.email.as_deref(), self.password.as_deref())
            .ok()
            .flatten()
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_url("backend_url", &self.backend_url)?;
        validate_url("health_path", &self.health_url())?;
        validate_non_empty_string("app_id", &self.app_id)?;
        validate_positive_number("request_timeout_secs", self.request_timeout_secs, 1)?;
        validate_probe_fields(
            "",
            self.max_attempts,
            self.timeout_ms,
            &self.backoff,
            self.base_delay_ms,
            self.max_delay_ms,
        )?;
        pair_credentials(self.email.as_deref(), self.password.as_deref())?;
        Ok(())
    }
}
