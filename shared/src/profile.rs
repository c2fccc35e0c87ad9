use crate::error::ApiError;
use crate::s3::public_object_url;
use crate::types::{parse_body, UpdateProfileImageRequest, UploadUrlResponse};
use crate::AppState;

/// Replace a user's profile image
///
/// Order is delete old object, presign new upload, update the record. None of
/// it is rolled back: if the presign or the later client upload fails, the old
/// image is already gone.
pub async fn update_profile_image(
    state: &AppState,
    body: &[u8],
) -> Result<UploadUrlResponse, ApiError> {
    let req: UpdateProfileImageRequest = parse_body(body)?;
    req.validate()?;

    tracing::info!(
        "Updating profile image for {}: {} -> {}",
        req.email,
        req.old_image_key,
        req.new_filename
    );

    state.objects.delete_object(&req.old_image_key).await?;

    let upload_url = state
        .objects
        .presign_upload(
            &req.new_filename,
            &req.new_content_type,
            state.config.upload_url_ttl,
        )
        .await?;

    let new_url = public_object_url(&state.config.bucket_name, &req.new_filename);
    state
        .records
        .update_profile_image(&req.email, &new_url)
        .await?;

    Ok(UploadUrlResponse { upload_url })
}
