use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommerceError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

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

    #[error("Malformed data: {message}")]
    MalformedDataError { message: String },

    #[error("Session error: {message}")]
    SessionError { message: String },

    #[error("Upgrade flow error: {message}")]
    UpgradeError { message: String },

    #[error("Commerce library error: {message}")]
    LibraryError { message: String },

    #[error("Worker error: {message}")]
    WorkerError { message: String },

    /// 快取中共享的錯誤 (同一個 fetch 結果被多個呼叫者取得)
    #[error(transparent)]
    Shared(#[from] Arc<CommerceError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    Collaborator,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CommerceError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ApiError(_) => ErrorCategory::Network,
            Self::IoError(_) | Self::WorkerError { .. } => ErrorCategory::System,
            Self::SerializationError(_) | Self::MalformedDataError { .. } => ErrorCategory::Data,
            Self::UrlError(_)
            | Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::SessionError { .. } | Self::UpgradeError { .. } | Self::LibraryError { .. } => {
                ErrorCategory::Collaborator
            }
            Self::Shared(inner) => inner.category(),
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ApiError(_) | Self::SessionError { .. } => ErrorSeverity::Medium,
            Self::SerializationError(_)
            | Self::MalformedDataError { .. }
            | Self::UpgradeError { .. }
            | Self::LibraryError { .. }
            | Self::WorkerError { .. } => ErrorSeverity::High,
            Self::UrlError(_)
            | Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorSeverity::High,
            Self::IoError(_) => ErrorSeverity::Critical,
            Self::Shared(inner) => inner.severity(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check network connectivity and the remote endpoint, then retry",
            ErrorCategory::Configuration => "Review the TOML configuration and command line arguments",
            ErrorCategory::Data => "Inspect the remote JSON document; every product family needs a default row",
            ErrorCategory::Collaborator => "Check the sign-in state and the external commerce collaborators",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not reach a commerce data source: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Data => format!("Commerce data could not be used: {}", self),
            ErrorCategory::Collaborator => format!("A commerce collaborator failed: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, CommerceError>;
