use regex::Regex;
use std::sync::OnceLock;

use crate::error::ApiError;
use crate::types::{LoginRequest, SignupRequest, UpdateProfileImageRequest};

pub const MIN_PASSWORD_LEN: usize = 6;

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex"))
}

pub fn require(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::validation(format!("{} is required", field)));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ApiError> {
    require("email", email)?;
    if !email_pattern().is_match(email) {
        return Err(ApiError::validation("Please enter a valid email address."));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ApiError> {
    require("password", password)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation(format!(
            "Password must be at least {} characters long.",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Object keys go straight into the bucket root: no absolute or parent paths.
pub fn validate_object_key(field: &str, key: &str) -> Result<(), ApiError> {
    require(field, key)?;
    if key.starts_with('/') || key.split('/').any(|segment| segment == "..") {
        return Err(ApiError::validation(format!("{} is not a valid object key", field)));
    }
    Ok(())
}

pub fn validate_image_content_type(field: &str, content_type: &str) -> Result<(), ApiError> {
    require(field, content_type)?;
    if !content_type.starts_with("image/") {
        return Err(ApiError::validation(format!("{} must be an image type", field)));
    }
    Ok(())
}

impl SignupRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_object_key("filename", &self.filename)?;
        validate_image_content_type("contentType", &self.content_type)?;
        validate_email(&self.email)?;
        require("name", &self.name)?;
        validate_password(&self.password)
    }
}

impl LoginRequest {
    /// Only presence is checked; a malformed email simply won't be found.
    pub fn validate(&self) -> Result<(), ApiError> {
        require("email", &self.email)?;
        require("password", &self.password)
    }
}

impl UpdateProfileImageRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_email(&self.email)?;
        validate_object_key("oldImageKey", &self.old_image_key)?;
        validate_object_key("newFilename", &self.new_filename)?;
        validate_image_content_type("newContentType", &self.new_content_type)
    }
}
