use crate::credentials;
use crate::error::ApiError;
use crate::s3::public_object_url;
use crate::token::Token;
use crate::types::{
    now_rfc3339, parse_body, LoginRequest, LoginResponse, SignupRequest, UploadUrlResponse,
    UserRecord,
};
use crate::AppState;

/// Handle user signup
///
/// Presigns the image upload, hashes the password with a fresh salt and stores
/// the record. The record points at the image before the client has uploaded
/// it; nothing confirms the upload later.
pub async fn signup(state: &AppState, body: &[u8]) -> Result<UploadUrlResponse, ApiError> {
    let req: SignupRequest = parse_body(body)?;
    req.validate()?;

    tracing::info!("Signing up user: {}", req.email);

    let upload_url = state
        .objects
        .presign_upload(&req.filename, &req.content_type, state.config.upload_url_ttl)
        .await?;

    let hashed = credentials::hash_password(&req.password, None);

    let user = UserRecord {
        email: req.email,
        name: req.name,
        password_hash: hashed.hash,
        salt: hashed.salt,
        profile_image_url: public_object_url(&state.config.bucket_name, &req.filename),
        created_at: now_rfc3339(),
    };
    state.records.create_user(&user).await?;

    tracing::info!("Signup successful for user: {}", user.email);
    Ok(UploadUrlResponse { upload_url })
}

/// Handle user login
///
/// Unknown email and wrong password produce the same error so callers cannot
/// probe which emails are registered.
pub async fn login(state: &AppState, body: &[u8]) -> Result<LoginResponse, ApiError> {
    let req: LoginRequest = parse_body(body)?;
    req.validate()?;

    tracing::info!("Authenticating user: {}", req.email);

    let Some(user) = state.records.get_user(&req.email).await? else {
        tracing::info!("Login failed: no record for {}", req.email);
        return Err(ApiError::InvalidCredentials);
    };

    if !credentials::verify_password(&req.password, &user.salt, &user.password_hash) {
        tracing::info!("Login failed: password mismatch for {}", req.email);
        return Err(ApiError::InvalidCredentials);
    }

    let token = Token::issue(&user.email).encode();
    tracing::info!("Login successful for user: {}", user.email);

    Ok(LoginResponse {
        message: "Login successful".to_string(),
        email: user.email,
        profile_image_url: user.profile_image_url,
        token,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::memory::{MemoryObjectStore, MemoryRecordStore, ObjectOp};
    use std::sync::Arc;

    fn state() -> (Arc<AppState>, Arc<MemoryObjectStore>, Arc<MemoryRecordStore>) {
        let objects = Arc::new(MemoryObjectStore::new("profile-images"));
        let records = Arc::new(MemoryRecordStore::new());
        let state = AppState::new(
            Config::new("profile-images", "Users"),
            objects.clone(),
            records.clone(),
        );
        (state, objects, records)
    }

    fn signup_body() -> Vec<u8> {
        serde_json::json!({
            "filename": "1f0e_avatar.png",
            "contentType": "image/png",
            "email": "a@b.com",
            "name": "Alice",
            "password": "secret1",
        })
        .to_string()
        .into_bytes()
    }

    fn login_body(email: &str, password: &str) -> Vec<u8> {
        serde_json::json!({ "email": email, "password": password })
            .to_string()
            .into_bytes()
    }

    #[tokio::test]
    async fn signup_stores_hashed_record() {
        let (state, objects, records) = state();

        let response = signup(&state, &signup_body()).await.unwrap();
        assert!(response
            .upload_url
            .starts_with("https://profile-images.s3.amazonaws.com/1f0e_avatar.png?"));

        let user = records.get("a@b.com").unwrap();
        assert_eq!(user.name, "Alice");
        assert_ne!(user.password_hash, "secret1");
        assert!(credentials::verify_password("secret1", &user.salt, &user.password_hash));
        assert_eq!(
            user.profile_image_url,
            "https://profile-images.s3.amazonaws.com/1f0e_avatar.png"
        );
        assert!(!user.created_at.is_empty());

        assert_eq!(
            objects.ops(),
            vec![ObjectOp::Presign {
                key: "1f0e_avatar.png".to_string(),
                content_type: "image/png".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn signup_rejects_duplicate_email() {
        let (state, _, records) = state();
        signup(&state, &signup_body()).await.unwrap();
        let original = records.get("a@b.com").unwrap();

        let err = signup(&state, &signup_body()).await.unwrap_err();
        assert!(matches!(err, ApiError::UserExists));
        assert_eq!(records.get("a@b.com").unwrap(), original);
    }

    #[tokio::test]
    async fn signup_validates_before_any_remote_call() {
        let (state, objects, records) = state();
        let body = serde_json::json!({
            "filename": "a.png",
            "contentType": "image/png",
            "email": "not-an-email",
            "name": "Alice",
            "password": "secret1",
        })
        .to_string();

        let err = signup(&state, body.as_bytes()).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(objects.ops().is_empty());
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn signup_presign_failure_writes_nothing() {
        let (state, objects, records) = state();
        objects.fail_presign(true);

        let err = signup(&state, &signup_body()).await.unwrap_err();
        assert!(matches!(err, ApiError::ObjectStore(_)));
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn login_returns_token_and_image() {
        let (state, _, _) = state();
        signup(&state, &signup_body()).await.unwrap();

        let response = login(&state, &login_body("a@b.com", "secret1")).await.unwrap();
        assert_eq!(response.message, "Login successful");
        assert_eq!(response.email, "a@b.com");
        assert_eq!(
            response.profile_image_url,
            "https://profile-images.s3.amazonaws.com/1f0e_avatar.png"
        );
        assert_eq!(Token::decode(&response.token).unwrap().email, "a@b.com");
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let (state, _, _) = state();
        signup(&state, &signup_body()).await.unwrap();

        let wrong_password = login(&state, &login_body("a@b.com", "secret2"))
            .await
            .unwrap_err();
        let unknown_email = login(&state, &login_body("nobody@b.com", "secret1"))
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, ApiError::InvalidCredentials));
        assert!(matches!(unknown_email, ApiError::InvalidCredentials));
        assert_eq!(wrong_password.body(), unknown_email.body());
    }
}
