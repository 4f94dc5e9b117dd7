use crate::error::*;
use std::time::Duration;
use tracing::{error, warn};

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn log_warn(&self) -> &Self;
    fn is_retryable(&self) -> bool;
    fn retry_after(&self) -> Option<Duration>;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("CoreError: {}", self);
        match self {
            CoreError::GraphApi(e) => {
                error!("Graph API error details: {:?}", e);
            }
            CoreError::Store(e) => {
                error!("Store error details: {:?}", e);
            }
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            _ => {}
        }
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("CoreError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        match self {
            CoreError::GraphApi(e) => e.is_retryable(),
            CoreError::Store(e) => e.is_retryable(),
            CoreError::Network(_) => true,
            CoreError::Timeout { .. } => true,
            _ => false,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            CoreError::GraphApi(e) => e.retry_after(),
            CoreError::Timeout { seconds } => Some(Duration::from_secs(*seconds)),
            _ if self.is_retryable() => Some(Duration::from_secs(5)),
            _ => None,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::GraphApi(e) => e.user_friendly_message(),
            CoreError::Store(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Validation(e) => e.user_friendly_message(),
            CoreError::Network(_) => {
                "Network connection error. Please check your internet connection.".to_string()
            }
            CoreError::InvalidInput { .. } => {
                "Invalid input provided. Please check your input and try again.".to_string()
            }
            CoreError::Timeout { .. } => {
                "The operation took too long to complete. Please try again.".to_string()
            }
            _ => "An unexpected error occurred. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::GraphApi(_) => "GRAPH_API".to_string(),
            CoreError::Store(_) => "STORE".to_string(),
            CoreError::Config(_) => "CONFIG".to_string(),
            CoreError::Validation(_) => "VALIDATION".to_string(),
            CoreError::Io(_) => "IO".to_string(),
            CoreError::Serialization(_) => "SERIALIZATION".to_string(),
            CoreError::Network(_) => "NETWORK".to_string(),
            CoreError::InvalidInput { .. } => "INVALID_INPUT".to_string(),
            CoreError::Timeout { .. } => "TIMEOUT".to_string(),
            CoreError::Internal { .. } => "INTERNAL".to_string(),
        }
    }
}

impl ErrorExt for GraphApiError {
    fn log_error(&self) -> &Self {
        error!("GraphApiError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("GraphApiError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        match self {
            GraphApiError::RateLimitExceeded { .. } => true,
            GraphApiError::RequestTimeout => true,
            GraphApiError::ServerError { status_code } => *status_code >= 500,
            _ => false,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            GraphApiError::RateLimitExceeded { retry_after } => {
                Some(Duration::from_secs(*retry_after))
            }
            _ if self.is_retryable() => Some(Duration::from_secs(30)),
            _ => None,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            GraphApiError::InvalidToken => {
                "Your Instagram session has expired. Please reconnect your account.".to_string()
            }
            GraphApiError::RateLimitExceeded { retry_after } => format!(
                "Too many requests. Please wait {} seconds before trying again.",
                retry_after
            ),
            GraphApiError::Forbidden { resource } => {
                format!("Access denied to {}.", resource)
            }
            GraphApiError::RequestTimeout => {
                "Request to Instagram timed out. Please try again.".to_string()
            }
            _ => "Instagram API error occurred. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            GraphApiError::InvalidToken => "GRAPH_INVALID_TOKEN".to_string(),
            GraphApiError::RateLimitExceeded { .. } => "GRAPH_RATE_LIMIT".to_string(),
            GraphApiError::Forbidden { .. } => "GRAPH_FORBIDDEN".to_string(),
            GraphApiError::RequestTimeout => "GRAPH_TIMEOUT".to_string(),
            GraphApiError::InvalidResponse { .. } => "GRAPH_INVALID_RESPONSE".to_string(),
            GraphApiError::ServerError { .. } => "GRAPH_SERVER_ERROR".to_string(),
        }
    }
}

impl ErrorExt for StoreError {
    fn log_error(&self) -> &Self {
        error!("StoreError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("StoreError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        match self {
            StoreError::ConnectionFailed { .. } => true,
            StoreError::Rejected { status_code, .. } => *status_code >= 500,
            StoreError::Sql(sqlx::Error::PoolTimedOut) => true,
            _ => false,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        if self.is_retryable() {
            Some(Duration::from_secs(1))
        } else {
            None
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            StoreError::ConnectionFailed { .. } => {
                "Could not reach the database. Please try again.".to_string()
            }
            StoreError::ConstraintViolation { .. } => {
                "This autoresponder conflicts with an existing one.".to_string()
            }
            _ => "Failed to save data. Please try again.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            StoreError::ConnectionFailed { .. } => "STORE_CONNECTION_FAILED".to_string(),
            StoreError::MigrationFailed { .. } => "STORE_MIGRATION_FAILED".to_string(),
            StoreError::QueryFailed { .. } => "STORE_QUERY_FAILED".to_string(),
            StoreError::ConstraintViolation { .. } => "STORE_CONSTRAINT".to_string(),
            StoreError::EmptyResponse { .. } => "STORE_EMPTY_RESPONSE".to_string(),
            StoreError::MalformedResponse { .. } => "STORE_MALFORMED_RESPONSE".to_string(),
            StoreError::Rejected { .. } => "STORE_REJECTED".to_string(),
            StoreError::Sql(_) => "STORE_SQL".to_string(),
        }
    }
}

impl ErrorExt for ValidationError {
    fn log_error(&self) -> &Self {
        error!("ValidationError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ValidationError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        false
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ValidationError::MissingName => "Please enter a name for the autoresponder",
            ValidationError::EmptyKeywords => "Please add at least one keyword",
            ValidationError::MissingMessage => "Please enter the direct message to send",
        }
        .to_string()
    }

    fn error_code(&self) -> String {
        match self {
            ValidationError::MissingName => "VALIDATION_MISSING_NAME".to_string(),
            ValidationError::EmptyKeywords => "VALIDATION_EMPTY_KEYWORDS".to_string(),
            ValidationError::MissingMessage => "VALIDATION_MISSING_MESSAGE".to_string(),
        }
    }
}

impl ErrorExt for ConfigError {
    fn log_error(&self) -> &Self {
        error!("ConfigError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ConfigError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        false
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::MissingField { field } => {
                format!("Configuration is missing the '{}' setting.", field)
            }
            ConfigError::InvalidValue { field, value } => {
                format!("Configuration value '{}' is not valid for '{}'.", value, field)
            }
            ConfigError::PermissionDenied { path } => {
                format!("Permission denied reading configuration '{}'.", path)
            }
            ConfigError::InvalidFormat { .. } | ConfigError::Parse(_) => {
                "Configuration file could not be parsed.".to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            ConfigError::InvalidFormat { .. } => "CONFIG_INVALID_FORMAT".to_string(),
            ConfigError::MissingField { .. } => "CONFIG_MISSING_FIELD".to_string(),
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE".to_string(),
            ConfigError::PermissionDenied { .. } => "CONFIG_PERMISSION_DENIED".to_string(),
            ConfigError::Parse(_) => "CONFIG_PARSE".to_string(),
        }
    }
}
