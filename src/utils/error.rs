use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error on '{field}': {message}")]
    ValidationError { field: String, message: String },

    #[error("Authentication failed: {message}")]
    AuthenticationError { message: String },

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Backend returned HTTP {status}: {message}")]
    BackendError { status: u16, message: String },

    #[error("Failed to decode {entity}: {message}")]
    DecodeError { entity: String, message: String },

    #[error("Diagnostics unavailable: {message}")]
    DiagnosticsError { message: String },
}

/// 錯誤分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Authentication,
    Data,
    Configuration,
    Validation,
    System,
}

/// 錯誤嚴重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AppError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::HttpError(_) => ErrorCategory::Network,
            AppError::BackendError { status, .. } if *status == 401 || *status == 403 => {
                ErrorCategory::Authentication
            }
            AppError::BackendError { .. } => ErrorCategory::Data,
            AppError::AuthenticationError { .. } | AppError::NotAuthenticated => {
                ErrorCategory::Authentication
            }
            AppError::SerializationError(_) | AppError::DecodeError { .. } => ErrorCategory::Data,
            AppError::ConfigError { .. }
            | AppError::ConfigValidationError { .. }
            | AppError::InvalidConfigValueError { .. }
            | AppError::MissingConfigError { .. } => ErrorCategory::Configuration,
            AppError::ValidationError { .. } => ErrorCategory::Validation,
            AppError::IoError(_) | AppError::DiagnosticsError { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation => ErrorSeverity::Low,
            ErrorCategory::Network | ErrorCategory::Authentication => ErrorSeverity::Medium,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 是否屬於暫時性錯誤（可重試）
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::HttpError(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            AppError::BackendError { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// 給終端使用者看的訊息
    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => "Could not reach the backend service.".to_string(),
            ErrorCategory::Authentication => {
                "Login failed. Please check your credentials.".to_string()
            }
            ErrorCategory::Data => format!("The backend request could not be completed: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Validation => format!("Please check the form: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check the backend URL and your network connection, then retry",
            ErrorCategory::Authentication => "Verify the email and password, or log in again",
            ErrorCategory::Data => "Reload the dashboard; the backend state is unchanged",
            ErrorCategory::Configuration => "Fix the configuration file or command line arguments",
            ErrorCategory::Validation => "Fill in the required fields and submit again",
            ErrorCategory::System => "Check system resources and restart the process",
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_and_severity() {
        let auth = AppError::AuthenticationError {
            message: "bad credentials".to_string(),
        };
        assert_eq!(auth.category(), ErrorCategory::Authentication);
        assert_eq!(auth.severity(), ErrorSeverity::Medium);
        assert!(!auth.is_retryable());

        let missing = AppError::MissingConfigError {
            field: "backend.url".to_string(),
        };
        assert_eq!(missing.severity(), ErrorSeverity::Critical);

        let form = AppError::ValidationError {
            field: "name".to_string(),
            message: "required".to_string(),
        };
        assert_eq!(form.severity(), ErrorSeverity::Low);
    }

    #[test]
    fn test_backend_status_classification() {
        let unauthorized = AppError::BackendError {
            status: 401,
            message: "Unauthorized".to_string(),
        };
        assert_eq!(unauthorized.category(), ErrorCategory::Authentication);
        assert!(!unauthorized.is_retryable());

        let unavailable = AppError::BackendError {
            status: 503,
            message: "Service Unavailable".to_string(),
        };
        assert_eq!(unavailable.category(), ErrorCategory::Data);
        assert!(unavailable.is_retryable());
    }

    #[test]
    fn test_login_failure_message() {
        let err = AppError::NotAuthenticated;
        assert_eq!(
            err.user_friendly_message(),
            "Login failed. Please check your credentials."
        );
    }
}
