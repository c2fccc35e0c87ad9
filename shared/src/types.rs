use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;

use crate::error::ApiError;

// ========== USER ==========
/// One row of the users table, keyed by email.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub email: String,
    pub name: String,
    pub password_hash: String, // hex PBKDF2 output
    pub salt: String,          // hex, used as-is as the KDF salt
    pub profile_image_url: String,
    pub created_at: String,
}

// ========== REQUESTS ==========
#[derive(Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub filename: String,
    pub content_type: String,
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// Passwords stay out of logs
impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileImageRequest {
    pub email: String,
    pub old_image_key: String,
    pub new_filename: String,
    pub new_content_type: String,
}

// ========== RESPONSES ==========
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UploadUrlResponse {
    #[serde(rename = "uploadURL")]
    pub upload_url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub email: String,
    pub profile_image_url: String,
    pub token: String,
}

/// Current time as RFC 3339 UTC with millisecond precision, e.g.
/// `2024-05-01T12:00:00.000Z`.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Parse a JSON request body into one of the request schemas above.
pub fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    if body.is_empty() {
        return Err(ApiError::InvalidRequest("request body is empty".to_string()));
    }
    serde_json::from_slice(body).map_err(|e| {
        tracing::warn!("Failed to parse request body: {}", e);
        ApiError::InvalidRequest(e.to_string())
    })
}
