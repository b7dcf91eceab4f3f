/// Attachment upload endpoints
///
/// Uploads are two-phase: this endpoint allocates a storage id and a
/// signed, time-limited PUT target; the client then ships the bytes
/// directly to the blob store and references the storage id from a task.
/// If the later task mutation fails, the uploaded blob is simply left
/// unreferenced.
///
/// # Endpoints
///
/// - `POST /v1/uploads` - Allocate an upload grant
use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use taskdeck_shared::auth::middleware::AuthContext;
use taskdeck_shared::storage::UploadGrant;

/// Allocate an upload grant
///
/// # Endpoint
///
/// ```text
/// POST /v1/uploads
/// ```
///
/// # Response
///
/// ```json
/// {
///   "storage_id": "9f2c...",
///   "upload_url": "https://files.example.com/files/9f2c...?expires=...&sig=...",
///   "expires_at": "2026-08-07T12:15:00Z"
/// }
/// ```
pub async fn create_upload(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UploadGrant>> {
    let grant = state.signer.create_upload_grant();

    tracing::info!(
        subject = %auth.subject,
        storage_id = %grant.storage_id,
        "Issued upload grant"
    );

    Ok(Json(grant))
}
