use thiserror::Error;

/// Failures raised by an F1 data provider adapter.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider transport failure: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Provider request timed out: {url}")]
    Timeout { url: String },

    #[error("Provider returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Invalid provider payload, field `{field}`: {reason}")]
    InvalidPayload { field: String, reason: String },

    #[error("Provider call failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<ProviderError>,
    },
}

impl ProviderError {
    /// 暫時性錯誤才值得重試
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Transport(_) | ProviderError::Timeout { .. } => true,
            ProviderError::Status { status, .. } => *status >= 500 || *status == 429,
            ProviderError::InvalidPayload { .. } | ProviderError::RetriesExhausted { .. } => false,
        }
    }

    pub fn from_reqwest(err: reqwest::Error, url: &str) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout {
                url: url.to_string(),
            }
        } else if err.is_decode() {
            ProviderError::InvalidPayload {
                field: "body".to_string(),
                reason: err.to_string(),
            }
        } else if let Some(status) = err.status() {
            ProviderError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            }
        } else {
            ProviderError::Transport(err)
        }
    }
}

#[derive(Error, Debug)]
pub enum F1BetError {
    #[error("{message}")]
    InvalidArgument { message: String },

    #[error("Validation failed for `{field}`: {reason}")]
    ValidationError { field: String, reason: String },

    #[error("{message}")]
    InvalidBet { message: String },

    #[error("{message}")]
    InsufficientBalance { message: String },

    #[error("{message}")]
    IllegalEventState { message: String },

    #[error("{entity} version mismatch: expected={expected}, actual={actual}")]
    OptimisticLock {
        entity: &'static str,
        expected: u64,
        actual: u64,
    },

    #[error("{message}")]
    NotFound { message: String },

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Configuration error in `{field}`: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value `{value}` for `{field}`: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration `{field}`")]
    MissingConfigError { field: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Coarse classification used by the web layer to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    BadRequest,
    Domain,
    Conflict,
    NotFound,
    Upstream,
    Internal,
}

impl F1BetError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        F1BetError::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn invalid_bet(message: impl Into<String>) -> Self {
        F1BetError::InvalidBet {
            message: message.into(),
        }
    }

    pub fn insufficient_balance(message: impl Into<String>) -> Self {
        F1BetError::InsufficientBalance {
            message: message.into(),
        }
    }

    pub fn illegal_event_state(message: impl Into<String>) -> Self {
        F1BetError::IllegalEventState {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            F1BetError::ValidationError { .. } => ErrorCategory::Validation,
            F1BetError::InvalidArgument { .. } => ErrorCategory::BadRequest,
            F1BetError::InvalidBet { .. }
            | F1BetError::InsufficientBalance { .. }
            | F1BetError::IllegalEventState { .. } => ErrorCategory::Domain,
            F1BetError::OptimisticLock { .. } => ErrorCategory::Conflict,
            F1BetError::NotFound { .. } => ErrorCategory::NotFound,
            F1BetError::Provider(_) => ErrorCategory::Upstream,
            F1BetError::ConfigValidationError { .. }
            | F1BetError::InvalidConfigValueError { .. }
            | F1BetError::MissingConfigError { .. }
            | F1BetError::IoError(_) => ErrorCategory::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, F1BetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        let server_error = ProviderError::Status {
            status: 503,
            url: "http://x".to_string(),
        };
        let client_error = ProviderError::Status {
            status: 404,
            url: "http://x".to_string(),
        };
        let throttled = ProviderError::Status {
            status: 429,
            url: "http://x".to_string(),
        };

        assert!(server_error.is_retryable());
        assert!(throttled.is_retryable());
        assert!(!client_error.is_retryable());
        assert!(!ProviderError::InvalidPayload {
            field: "id".to_string(),
            reason: "missing".to_string(),
        }
        .is_retryable());
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(
            F1BetError::invalid_bet("x").category(),
            ErrorCategory::Domain
        );
        assert_eq!(
            F1BetError::OptimisticLock {
                entity: "User",
                expected: 0,
                actual: 1
            }
            .category(),
            ErrorCategory::Conflict
        );
        assert_eq!(
            F1BetError::from(ProviderError::Timeout {
                url: "http://x".to_string()
            })
            .category(),
            ErrorCategory::Upstream
        );
    }
}
