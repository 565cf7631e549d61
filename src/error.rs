//! Error types for the Cabal CLI

use crate::api::AppError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The remote API (or the envelope codec) rejected the call.
    #[error("{}", .error.message)]
    Api { status: u16, error: AppError },

    /// Caller input failed the request schema before any network I/O.
    #[error("{}", .0.message)]
    Validation(AppError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CABAL_API_KEY not set. Run `cabal-cli init` or set the env var.")]
    MissingApiKey,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("MCP server error: {0}")]
    Mcp(String),
}

impl Error {
    /// The structured error carried by API and validation failures.
    pub fn app_error(&self) -> Option<&AppError> {
        match self {
            Error::Api { error, .. } => Some(error),
            Error::Validation(error) => Some(error),
            _ => None,
        }
    }

    /// HTTP status attached to the failure, if it came from the transport.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<inquire::InquireError> for Error {
    fn from(err: inquire::InquireError) -> Self {
        Error::Prompt(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
