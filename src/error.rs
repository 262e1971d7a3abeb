//! Crate-level error type.
//!
//! Covers startup and config-loading failures that never cross the RPC
//! boundary. RPC-facing failures are classified into
//! [`crate::resilience::Error`] instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("credential error: {0}")]
    Credentials(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("conversion error: {0}")]
    Conversion(#[from] crate::conversion::ConversionError),

    #[error("{component}: {details}")]
    Component { component: String, details: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn component(component: impl Into<String>, details: impl Into<String>) -> Self {
        Error::Component {
            component: component.into(),
            details: details.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
