//! The flat error taxonomy every provider operation resolves to.

use std::fmt;
use thiserror::Error;

/// One kind per error, never more than one. Determines whether the
/// resilience layer is allowed to retry the call that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidSpec,
    Unauthorized,
    NotSupported,
    Retryable,
    Unavailable,
    RateLimit,
    Timeout,
    QuotaExceeded,
    Conflict,
}

impl ErrorKind {
    /// Whether the resilience layer should attempt this call again.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            ErrorKind::Retryable | ErrorKind::Unavailable | ErrorKind::RateLimit | ErrorKind::Timeout
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NotFound",
            ErrorKind::InvalidSpec => "InvalidSpec",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::NotSupported => "NotSupported",
            ErrorKind::Retryable => "Retryable",
            ErrorKind::Unavailable => "Unavailable",
            ErrorKind::RateLimit => "RateLimit",
            ErrorKind::Timeout => "Timeout",
            ErrorKind::QuotaExceeded => "QuotaExceeded",
            ErrorKind::Conflict => "Conflict",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error carrying exactly one [`ErrorKind`], as every operation in the
/// core must return.
#[derive(Error, Debug, Clone)]
#[error("{kind}: {message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Error {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn invalid_spec(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidSpec, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    pub fn not_supported(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotSupported, message)
    }

    pub fn retryable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Retryable, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unavailable, message)
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RateLimit, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    pub fn quota_exceeded(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::QuotaExceeded, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }
}

impl From<crate::error::Error> for Error {
    fn from(err: crate::error::Error) -> Self {
        match &err {
            crate::error::Error::Io(_) | crate::error::Error::Http(_) => {
                Error::unavailable(err.to_string())
            }
            _ => Error::retryable(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Maps a vSphere/tonic deadline-style condition onto the taxonomy. Exposed
/// so transport layers can classify timeouts consistently.
pub fn classify_timeout(message: impl Into<String>) -> Error {
    Error::timeout(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_kinds_match_spec() {
        assert!(ErrorKind::Retryable.is_retryable());
        assert!(ErrorKind::Unavailable.is_retryable());
        assert!(ErrorKind::RateLimit.is_retryable());
        assert!(ErrorKind::Timeout.is_retryable());
        assert!(!ErrorKind::NotFound.is_retryable());
        assert!(!ErrorKind::InvalidSpec.is_retryable());
        assert!(!ErrorKind::Unauthorized.is_retryable());
        assert!(!ErrorKind::NotSupported.is_retryable());
        assert!(!ErrorKind::QuotaExceeded.is_retryable());
        assert!(!ErrorKind::Conflict.is_retryable());
    }
}
