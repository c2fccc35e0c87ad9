use lambda_http::http::StatusCode;
use thiserror::Error;

/// Everything a handler can fail with.
///
/// The `Display` text is what callers see. Store failures carry the SDK
/// detail for logging only; it never reaches a response body.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request body: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Validation(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account with this email already exists")]
    UserExists,

    #[error("User not found")]
    UserNotFound,

    #[error("Object store request failed")]
    ObjectStore(String),

    #[error("Record store request failed")]
    RecordStore(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::UserExists => StatusCode::CONFLICT,
            Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::ObjectStore(_) | Self::RecordStore(_) | Self::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// JSON body for the error response. Auth and lookup failures use the
    /// `message` key like the success bodies, everything else uses `error`.
    pub fn body(&self) -> serde_json::Value {
        match self {
            Self::InvalidCredentials | Self::UserNotFound => {
                serde_json::json!({ "message": self.to_string() })
            }
            _ => serde_json::json!({ "error": self.to_string() }),
        }
    }
}
