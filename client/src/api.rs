//! HTTP calls against the profile-auth endpoints and presigned upload URLs.

use crate::error::{ClientError, Result};
use profile_auth_shared::types::{
    LoginRequest, LoginResponse, SignupRequest, UpdateProfileImageRequest, UploadUrlResponse,
};
use reqwest::{header::CONTENT_TYPE, Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the API at `base_url` (scheme required, trailing slash ignored).
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ClientError::InvalidUrl("URL cannot be empty".into()));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("profile-auth/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn signup(&self, request: &SignupRequest) -> Result<UploadUrlResponse> {
        let url = format!("{}/signup", self.base_url);
        debug!(url = %url, email = %request.email, "Signing up");

        let response = self.http.post(&url).json(request).send().await?;
        read_json(response).await
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        let url = format!("{}/login", self.base_url);
        debug!(url = %url, email = %request.email, "Attempting login");

        let response = self.http.post(&url).json(request).send().await?;
        let login: LoginResponse = read_json(response).await?;
        info!(email = %login.email, "Login successful");
        Ok(login)
    }

    pub async fn update_profile_image(
        &self,
        request: &UpdateProfileImageRequest,
    ) -> Result<UploadUrlResponse> {
        let url = format!("{}/updateProfileImage", self.base_url);
        debug!(url = %url, new_filename = %request.new_filename, "Replacing profile image");

        let response = self.http.put(&url).json(request).send().await?;
        read_json(response).await
    }

    /// PUT the file bytes to a presigned URL. The content type must match the
    /// one the URL was signed for.
    pub async fn upload(&self, upload_url: &str, content_type: &str, bytes: Vec<u8>) -> Result<()> {
        let response = self
            .http
            .put(upload_url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Presigned upload rejected");
            Err(ClientError::UploadFailed {
                status: status.as_u16(),
            })
        }
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();

    if status.is_success() {
        return Ok(response.json().await?);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or(text);

    if status.as_u16() == 401 {
        warn!(status = %status, "Request rejected: {}", message);
        Err(ClientError::AuthFailed(message))
    } else {
        Err(ClientError::ServerError {
            status: status.as_u16(),
            message,
        })
    }
}
