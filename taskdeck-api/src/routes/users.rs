/// User endpoints
///
/// The identity provider owns sign-in; these endpoints map its identities
/// to user rows and manage role selection.
///
/// # Endpoints
///
/// - `POST /v1/users/sync` - Find or create the caller's user row
/// - `POST /v1/users/role` - Pick a role (creating a team for new admins)
/// - `GET  /v1/users/me` - Current user, or null when not signed in
/// - `GET  /v1/users/by-email` - Exact email lookup
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use taskdeck_shared::auth::middleware::AuthContext;
use taskdeck_shared::models::user::{CreateUser, User, UserRole};
use validator::Validate;

/// Role selection request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRoleRequest {
    /// Role to take
    pub role: UserRole,

    /// Team to create when becoming an admin
    #[validate(length(min = 1, max = 100, message = "Team name must be 1-100 characters"))]
    pub team_name: Option<String>,
}

/// Email lookup query
#[derive(Debug, Deserialize)]
pub struct ByEmailParams {
    /// Email to look up (case-sensitive exact match)
    pub email: String,
}

/// Find-or-create the caller's user row
///
/// Idempotent by identity: the first call after sign-in inserts a
/// roleless, teamless row from the token claims; later calls return the
/// existing row unchanged.
///
/// # Endpoint
///
/// ```text
/// POST /v1/users/sync
/// Authorization: Bearer <identity token>
/// ```
pub async fn sync_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<User>> {
    let user = User::create_or_get(
        &state.db,
        CreateUser {
            subject: auth.subject,
            email: auth.email,
            name: auth.name,
        },
    )
    .await?;

    Ok(Json(user))
}

/// Set the caller's role
///
/// Becoming an admin with a `team_name` creates the team and links it in
/// the same transaction; any other role change patches the role only.
///
/// # Endpoint
///
/// ```text
/// POST /v1/users/role
/// Content-Type: application/json
///
/// { "role": "admin", "team_name": "Acme Ops" }
/// ```
///
/// # Errors
///
/// - `404 Not Found`: no user row for the caller's identity
/// - `422 Unprocessable Entity`: validation failed
pub async fn update_role(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateRoleRequest>,
) -> ApiResult<Json<User>> {
    req.validate()?;

    tracing::info!(
        subject = %auth.subject,
        role = %req.role.as_str(),
        creates_team = req.team_name.is_some(),
        "Updating user role"
    );

    let user = User::update_role(&state.db, &auth.subject, req.role, req.team_name.as_deref())
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Current user lookup
///
/// Never fails on a missing identity: an unauthenticated caller simply
/// gets `null` ("not signed in yet"), as does an identity with no row.
///
/// # Endpoint
///
/// ```text
/// GET /v1/users/me
/// ```
pub async fn current_user(
    State(state): State<AppState>,
    auth: Option<Extension<AuthContext>>,
) -> ApiResult<Json<Option<User>>> {
    let Some(Extension(auth)) = auth else {
        return Ok(Json(None));
    };

    let user = User::find_by_subject(&state.db, &auth.subject).await?;

    Ok(Json(user))
}

/// Exact email lookup
///
/// # Endpoint
///
/// ```text
/// GET /v1/users/by-email?email=ada@example.com
/// ```
pub async fn user_by_email(
    State(state): State<AppState>,
    Query(params): Query<ByEmailParams>,
) -> ApiResult<Json<Option<User>>> {
    let user = User::find_by_email(&state.db, &params.email).await?;

    Ok(Json(user))
}
