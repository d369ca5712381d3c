//! Backend client errors

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while talking to the marketplace backend
#[derive(Debug, Error, Diagnostic)]
pub enum ApiError {
    #[error("Your session has expired. Please log in again.")]
    #[diagnostic(
        code(innkeeper::api::session_expired),
        help("Run `innkeeper login` to start a new session")
    )]
    SessionExpired,

    #[error("You are not logged in")]
    #[diagnostic(
        code(innkeeper::api::not_authenticated),
        help("Run `innkeeper login` first")
    )]
    NotAuthenticated,

    #[error("Request to {endpoint} failed: {message}")]
    #[diagnostic(
        code(innkeeper::api::network),
        help("Check the api_url setting (`innkeeper config show`) and your connection")
    )]
    Network { endpoint: String, message: String },

    #[error("{message}")]
    #[diagnostic(code(innkeeper::api::rejected))]
    Rejected { status: Option<u16>, message: String },

    #[error("Unexpected response from {endpoint}: {message}")]
    #[diagnostic(code(innkeeper::api::decode))]
    Decode { endpoint: String, message: String },

    #[error("Invalid API URL {url}: {message}")]
    #[diagnostic(code(innkeeper::api::url))]
    InvalidUrl { url: String, message: String },

    #[error("Failed to read {path}: {source}")]
    #[diagnostic(code(innkeeper::api::file))]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    /// Whether the user has to log in again before retrying
    pub fn requires_login(&self) -> bool {
        matches!(self, ApiError::SessionExpired | ApiError::NotAuthenticated)
    }

    pub(crate) fn decode(endpoint: &str, message: impl Into<String>) -> Self {
        ApiError::Decode {
            endpoint: endpoint.to_string(),
            message: message.into(),
        }
    }
}
