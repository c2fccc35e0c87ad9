//! Signup, login and profile flows: validate, call the API, upload, persist.

use crate::api::ApiClient;
use crate::error::{ClientError, Result};
use crate::session::{Session, SessionStore};
use profile_auth_shared::types::{LoginRequest, SignupRequest, UpdateProfileImageRequest};
use profile_auth_shared::validation;
use std::path::{Path, PathBuf};
use tracing::info;

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// An image read from disk, ready to upload.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

pub fn content_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

/// Read an image, rejecting non-images and files over 5 MiB.
pub async fn load_image(path: &Path) -> Result<ImageFile> {
    let content_type = content_type_for(path)
        .ok_or_else(|| ClientError::Validation("Please select an image file.".into()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| ClientError::Validation("Image path has no file name.".into()))?;

    let bytes = tokio::fs::read(path).await?;
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(ClientError::Validation(
            "File size must be less than 5MB.".into(),
        ));
    }

    Ok(ImageFile {
        file_name,
        content_type,
        bytes,
    })
}

pub struct SignupForm {
    pub email: String,
    pub name: String,
    pub password: String,
    pub confirm_password: String,
    pub image: PathBuf,
}

impl SignupForm {
    pub fn validate(&self) -> Result<()> {
        if self.email.is_empty()
            || self.name.is_empty()
            || self.password.is_empty()
            || self.confirm_password.is_empty()
        {
            return Err(ClientError::Validation(
                "Please fill out all fields and select a file.".into(),
            ));
        }
        if self.password != self.confirm_password {
            return Err(ClientError::Validation("Passwords do not match.".into()));
        }
        validation::validate_email(&self.email)?;
        validation::validate_password(&self.password)?;
        Ok(())
    }
}

/// Sign up and upload the profile image. Returns the uploaded object key.
pub async fn signup(api: &ApiClient, form: &SignupForm) -> Result<String> {
    form.validate()?;
    let image = load_image(&form.image).await?;
    let filename = format!("{}_{}", uuid::Uuid::new_v4(), image.file_name);

    let response = api
        .signup(&SignupRequest {
            filename: filename.clone(),
            content_type: image.content_type.to_string(),
            email: form.email.clone(),
            name: form.name.clone(),
            password: form.password.clone(),
        })
        .await?;

    api.upload(&response.upload_url, image.content_type, image.bytes)
        .await?;
    info!(email = %form.email, key = %filename, "Signup complete");
    Ok(filename)
}

/// Log in and remember the token and image URL.
pub async fn login(
    api: &ApiClient,
    store: &SessionStore,
    email: &str,
    password: &str,
) -> Result<Session> {
    if email.is_empty() || password.is_empty() {
        return Err(ClientError::Validation("Please fill in all fields.".into()));
    }

    let response = api
        .login(&LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })
        .await?;

    let session = Session {
        auth_token: response.token,
        profile_image_url: response.profile_image_url,
    };
    store.save(&session).await?;
    Ok(session)
}

/// Replace the logged-in user's profile image and update the stored URL.
pub async fn update_image(api: &ApiClient, store: &SessionStore, image: &Path) -> Result<Session> {
    let session = store.require().await?;
    let email = session.token()?.email;
    let image = load_image(image).await?;

    let old_image_key = object_key(&session.profile_image_url)
        .ok_or_else(|| ClientError::Session("profile image URL has no object key".into()))?
        .to_string();
    let new_filename = format!(
        "{}_{}",
        chrono::Utc::now().timestamp_millis(),
        image.file_name
    );

    let response = api
        .update_profile_image(&UpdateProfileImageRequest {
            email,
            old_image_key,
            new_filename: new_filename.clone(),
            new_content_type: image.content_type.to_string(),
        })
        .await?;
    api.upload(&response.upload_url, image.content_type, image.bytes)
        .await?;

    let updated = Session {
        profile_image_url: replace_object_key(&session.profile_image_url, &new_filename),
        ..session
    };
    store.save(&updated).await?;
    Ok(updated)
}

/// Last path segment of an object URL
pub fn object_key(url: &str) -> Option<&str> {
    url.rsplit('/').next().filter(|key| !key.is_empty())
}

fn replace_object_key(url: &str, key: &str) -> String {
    match url.rsplit_once('/') {
        Some((prefix, _)) => format!("{}/{}", prefix, key),
        None => key.to_string(),
    }
}
