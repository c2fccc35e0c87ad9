//! Local session persistence: the bearer token and profile image URL from
//! the last login. No expiry; it lasts until `logout` removes the file.

use crate::error::{ClientError, Result};
use profile_auth_shared::token::Token;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub auth_token: String,
    pub profile_image_url: String,
}

impl Session {
    pub fn token(&self) -> Result<Token> {
        Ok(Token::decode(&self.auth_token)?)
    }
}

pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$HOME/.profile-auth/session.json`, or the working directory without a home.
    pub fn default_path() -> PathBuf {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".profile-auth")
            .join("session.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<Option<Session>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| ClientError::Session(e.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn require(&self) -> Result<Session> {
        self.load().await?.ok_or(ClientError::NotLoggedIn)
    }

    pub async fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(session)
            .map_err(|e| ClientError::Session(e.to_string()))?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }

    /// Remove the session. Clearing an absent session is not an error.
    pub async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
