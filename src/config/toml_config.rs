use super::{
    build_probe_settings, join_url, pair_credentials, validate_probe_fields, DEFAULT_BASE_DELAY_MS,
    DEFAULT_ENVIRONMENT, DEFAULT_HEALTH_PATH, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY_MS,
    DEFAULT_PROBE_TIMEOUT_MS, DEFAULT_REQUEST_TIMEOUT_SECS,
};
use crate::core::probe::ProbeSettings;
use crate::core::ConfigProvider;
use crate::domain::model::Credentials;
use crate::utils::error::{AppError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_SERVER_BIND: &str = "0.0.0.0:3000";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub app: AppConfig,
    pub backend: BackendConfig,
    pub probe: Option<ProbeConfig>,
    pub auth: Option<AuthConfig>,
    pub server: Option<ServerConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub name: String,
    pub app_id: String,
    pub environment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub url: String,
    pub health_path: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeConfig {
    pub max_attempts: Option<u32>,
    pub timeout_ms: Option<u64>,
    pub backoff: Option<String>,
    pub base_delay_ms: Option<u64>,
    pub max_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: Option<String>,
    pub version: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AppError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AppError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${FOODIE_PASSWORD})，找不到的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AppError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    fn probe_section(&self) -> ProbeConfig {
        self.probe.clone().unwrap_or_default()
    }

    fn auth_pair(&self) -> Result<Option<Credentials>> {
        let Some(auth) = &self.auth else {
            return Ok(None);
        };
        pair_credentials(auth.email.as_deref(), auth.password.as_deref())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("app.app_id", &self.app.app_id)?;
        validate_url("backend.url", &self.backend.url)?;
        validate_url("backend.health_path", &self.health_url())?;

        if let Some(timeout) = self.backend.timeout_seconds {
            validate_positive_number("backend.timeout_seconds", timeout, 1)?;
        }

        let probe = self.probe_section();
        validate_probe_fields(
            "probe.",
            probe.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
            probe.timeout_ms.unwrap_or(DEFAULT_PROBE_TIMEOUT_MS),
            probe.backoff.as_deref().unwrap_or("exponential"),
            probe.base_delay_ms.unwrap_or(DEFAULT_BASE_DELAY_MS),
            probe.max_delay_ms.unwrap_or(DEFAULT_MAX_DELAY_MS),
        )?;

        // 未替換的 ${VAR} 代表環境變數沒有設定
        if let Some(credentials) = self.auth_pair()? {
            for (field, value) in [
                ("auth.email", &credentials.email),
                ("auth.password", &credentials.password),
            ] {
                if value.starts_with("${") {
                    return Err(AppError::MissingConfigError {
                        field: format!("{} ({})", field, value),
                    });
                }
            }
        }

        if let Some(bind) = self.server.as_ref().and_then(|s| s.bind.as_deref()) {
            bind.parse::<std::net::SocketAddr>()
                .map_err(|e| AppError::InvalidConfigValueError {
                    field: "server.bind".to_string(),
                    value: bind.to_string(),
                    reason: e.to_string(),
                })?;
        }

        Ok(())
    }

    pub fn server_bind(&self) -> &str {
        self.server
            .as_ref()
            .and_then(|s| s.bind.as_deref())
            .unwrap_or(DEFAULT_SERVER_BIND)
    }

    pub fn server_version(&self) -> &str {
        self.server
            .as_ref()
            .and_then(|s| s.version.as_deref())
            .unwrap_or(env!("CARGO_PKG_VERSION"))
    }
}

impl ConfigProvider for TomlConfig {
    fn backend_url(&self) -> &str {
        &self.backend.url
    }

    fn health_url(&self) -> String {
        join_url(
            &self.backend.url,
            self.backend
                .health_path
                .as_deref()
                .unwrap_or(DEFAULT_HEALTH_PATH),
        )
    }

    fn app_id(&self) -> &str {
        &self.app.app_id
    }

    fn environment(&self) -> &str {
        self.app.environment.as_deref().unwrap_or(DEFAULT_ENVIRONMENT)
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.backend
                .timeout_seconds
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    fn probe_settings(&self) -> Result<ProbeSettings> {
        let probe = self.probe_section();
        build_probe_settings(
            probe.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
            probe.timeout_ms.unwrap_or(DEFAULT_PROBE_TIMEOUT_MS),
            probe.backoff.as_deref().unwrap_or("exponential"),
            probe.base_delay_ms.unwrap_or(DEFAULT_BASE_DELAY_MS),
            probe.max_delay_ms.unwrap_or(DEFAULT_MAX_DELAY_MS),
        )
    }

    fn credentials(&self) -> Option<Credentials> {
        self.auth_pair().ok().flatten()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
