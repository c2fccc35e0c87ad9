//! Bearer token handed out on login.
//!
//! The token is plain base64 of `email:issued_at`. It is NOT signed: anyone
//! can decode it, anyone can forge one, and nothing can revoke it. Clients use
//! it only to remember who logged in; the server never trusts it.

use base64::{engine::general_purpose, Engine as _};
use thiserror::Error;

use crate::types::now_rfc3339;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is not valid base64")]
    Encoding,
    #[error("token is not valid UTF-8")]
    Utf8,
    #[error("token has no email:timestamp separator")]
    Format,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub email: String,
    pub issued_at: String,
}

impl Token {
    /// Token for `email`, stamped with the current time
    pub fn issue(email: &str) -> Self {
        Self {
            email: email.to_string(),
            issued_at: now_rfc3339(),
        }
    }

    pub fn encode(&self) -> String {
        general_purpose::STANDARD.encode(format!("{}:{}", self.email, self.issued_at))
    }

    /// Splits on the first `:`; the timestamp itself contains colons.
    pub fn decode(token: &str) -> Result<Self, TokenError> {
        let bytes = general_purpose::STANDARD
            .decode(token.trim())
            .map_err(|_| TokenError::Encoding)?;
        let text = String::from_utf8(bytes).map_err(|_| TokenError::Utf8)?;
        let (email, issued_at) = text.split_once(':').ok_or(TokenError::Format)?;
        Ok(Self {
            email: email.to_string(),
            issued_at: issued_at.to_string(),
        })
    }
}
