//! Error types for the profile-auth client.

use profile_auth_shared::token::TokenError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Form input rejected before anything was sent
    #[error("{0}")]
    Validation(String),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// Server answered 401
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// The presigned upload was refused by the object store
    #[error("Upload failed ({status})")]
    UploadFailed { status: u16 },

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Stored session is invalid: {0}")]
    Session(String),

    #[error("Stored token is invalid: {0}")]
    Token(#[from] TokenError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<profile_auth_shared::error::ApiError> for ClientError {
    fn from(err: profile_auth_shared::error::ApiError) -> Self {
        Self::Validation(err.to_string())
    }
}
