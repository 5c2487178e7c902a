use thiserror::Error;

/// The primary error type for the `mip-lib` library.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MipError {
    #[error("Connection to MiP failed: {0}")]
    Connect(String),

    #[error("Invalid parameter `{name}` = {value}: {reason}")]
    InvalidParam {
        name: &'static str,
        value: i64,
        reason: &'static str,
    },

    #[error("Out of memory")]
    Memory,

    #[error("No MiP robot connected")]
    NotConnected,

    #[error("Not waiting for a response from a request")]
    NoRequest,

    #[error("Timed out waiting for response")]
    Timeout,

    #[error("The queue was empty")]
    Empty,

    #[error("Bad response: {0}")]
    BadResponse(String),
}

impl MipError {
    pub(crate) fn param(name: &'static str, value: impl Into<i64>, reason: &'static str) -> Self {
        MipError::InvalidParam {
            name,
            value: value.into(),
            reason,
        }
    }
}

impl From<tokio::time::error::Elapsed> for MipError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        MipError::Timeout
    }
}

pub type Result<T> = std::result::Result<T, MipError>;
