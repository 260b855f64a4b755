//! Error handling for domain-scanner

use thiserror::Error;

/// Main error type for domain-scanner
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScannerError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Domain checking error for '{domain}': {message}")]
    DomainCheck {
        domain: String,
        message: String,
        method: Option<String>,
    },

    #[error("Network error: {message}")]
    Network {
        message: String,
        target: Option<String>,
    },

    #[error("Timeout error: {operation} timed out after {timeout_secs}s")]
    Timeout {
        operation: String,
        timeout_secs: u64,
    },

    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<String>,
    },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ScannerError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a domain checking error
    pub fn domain_check(
        domain: impl Into<String>,
        message: impl Into<String>,
        method: Option<String>,
    ) -> Self {
        Self::DomainCheck {
            domain: domain.into(),
            message: message.into(),
            method,
        }
    }

    /// Create a network error
    pub fn network(message: impl Into<String>, target: Option<String>) -> Self {
        Self::Network {
            message: message.into(),
            target,
        }
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, timeout_secs: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_secs,
        }
    }

    /// Create an IO error
    pub fn io(message: impl Into<String>, path: Option<String>) -> Self {
        Self::Io {
            message: message.into(),
            path,
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether repeating the same request could succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Timeout { .. })
    }

    /// Get user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            Self::Config { message } => {
                format!("❌ Configuration problem: {}\n💡 Check your config file", message)
            }
            Self::Validation { message } => {
                format!("❌ Invalid input: {}\n💡 Use -h for usage information", message)
            }
            Self::DomainCheck { domain, message, .. } => {
                format!("⚠️  Could not check domain '{}': {}", domain, message)
            }
            Self::Network { message, target } => {
                let target = target.as_ref().map_or(String::new(), |t| format!(" ({})", t));
                format!("❌ Network error{}: {}\n💡 Check your internet connection", target, message)
            }
            Self::Timeout { operation, timeout_secs } => {
                format!("⏱️  Operation '{}' timed out after {}s\n💡 Try fewer workers or a longer delay", operation, timeout_secs)
            }
            Self::Io { message, path } => {
                let path_info = path.as_ref().map_or(String::new(), |p| format!(" ({})", p));
                format!("❌ File error{}: {}\n💡 Check file permissions and paths", path_info, message)
            }
            Self::Internal { message } => {
                format!("❌ Internal error: {}\n💡 This is a bug, please report it", message)
            }
        }
    }
}

impl From<std::io::Error> for ScannerError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string(), None)
    }
}

impl From<toml::de::Error> for ScannerError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(err.to_string())
    }
}

impl From<regex::Error> for ScannerError {
    fn from(err: regex::Error) -> Self {
        Self::validation(format!("invalid regex filter: {}", err))
    }
}

impl From<reqwest::Error> for ScannerError {
    fn from(err: reqwest::Error) -> Self {
        let target = err.url().map(|u| u.to_string());

        if err.is_timeout() {
            Self::timeout("HTTP request", 5)
        } else if err.is_connect() {
            Self::network("Connection failed", target)
        } else {
            Self::network(err.to_string(), target)
        }
    }
}

impl From<tokio::time::error::Elapsed> for ScannerError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        Self::timeout("Operation", 10)
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ScannerError>;

/// Helper macros for common error patterns
#[macro_export]
macro_rules! config_error {
    ($msg:expr) => {
        $crate::error::ScannerError::config($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::ScannerError::config(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! validation_error {
    ($msg:expr) => {
        $crate::error::ScannerError::validation($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::ScannerError::validation(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! internal_error {
    ($msg:expr) => {
        $crate::error::ScannerError::internal($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::ScannerError::internal(format!($fmt, $($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_errors() {
        assert!(ScannerError::network("reset", None).is_transient());
        assert!(ScannerError::timeout("WHOIS read", 10).is_transient());
        assert!(!ScannerError::internal("worker panicked").is_transient());
        assert!(!ScannerError::validation("bad name").is_transient());
    }

    #[test]
    fn test_macros_format() {
        let err = validation_error!("pattern {} is not supported", "x");
        assert_eq!(err, ScannerError::validation("pattern x is not supported"));

        let err = config_error!("workers");
        assert!(err.to_string().contains("workers"));
    }

    #[test]
    fn test_regex_conversion() {
        let err: ScannerError = regex::Regex::new("(").unwrap_err().into();
        assert!(matches!(err, ScannerError::Validation { .. }));
        assert!(err.user_message().contains("Invalid input"));
    }
}
