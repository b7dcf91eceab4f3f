/// Team directory endpoints
///
/// # Endpoints
///
/// - `GET    /v1/teams` - Team lookup
/// - `GET    /v1/teams/members` - Member listing
/// - `POST   /v1/teams/members` - Invite a member by email
/// - `DELETE /v1/teams/members/:user_id` - Remove a member
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskdeck_shared::auth::middleware::AuthContext;
use taskdeck_shared::models::team::Team;
use taskdeck_shared::models::user::User;
use uuid::Uuid;
use validator::Validate;

/// Team-scoped query parameters
///
/// The team id is optional on purpose: a user without a team gets an
/// empty answer, never a fabricated default team.
#[derive(Debug, Deserialize)]
pub struct TeamParams {
    /// Team to read
    pub team_id: Option<Uuid>,
}

/// Invite request
#[derive(Debug, Deserialize, Validate)]
pub struct AddMemberRequest {
    /// Email of the member to add (exact match against stored emails)
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Team to add them to
    pub team_id: Uuid,
}

/// Invite response
#[derive(Debug, Serialize)]
pub struct AddMemberResponse {
    /// The member's user id (existing or newly created placeholder)
    pub user_id: Uuid,
}

/// Team lookup
///
/// # Endpoint
///
/// ```text
/// GET /v1/teams?team_id=<uuid>
/// ```
pub async fn get_team(
    State(state): State<AppState>,
    Query(params): Query<TeamParams>,
) -> ApiResult<Json<Option<Team>>> {
    let Some(team_id) = params.team_id else {
        return Ok(Json(None));
    };

    let team = Team::find_by_id(&state.db, team_id).await?;

    Ok(Json(team))
}

/// Member listing
///
/// # Endpoint
///
/// ```text
/// GET /v1/teams/members?team_id=<uuid>
/// ```
pub async fn team_members(
    State(state): State<AppState>,
    Query(params): Query<TeamParams>,
) -> ApiResult<Json<Vec<User>>> {
    let Some(team_id) = params.team_id else {
        return Ok(Json(Vec::new()));
    };

    let members = Team::members(&state.db, team_id).await?;

    Ok(Json(members))
}

/// Invite a member by email
///
/// An existing user joins the team (keeping any role they already have);
/// an unknown email gets a pending placeholder row that the real identity
/// claims when they sign up.
///
/// # Endpoint
///
/// ```text
/// POST /v1/teams/members
/// Content-Type: application/json
///
/// { "email": "new.hire@example.com", "team_id": "<uuid>" }
/// ```
pub async fn add_member(
    State(state): State<AppState>,
    Json(req): Json<AddMemberRequest>,
) -> ApiResult<Json<AddMemberResponse>> {
    req.validate()?;

    tracing::info!(team_id = %req.team_id, "Adding team member by email");

    let user_id = Team::add_member_by_email(&state.db, &req.email, req.team_id).await?;

    Ok(Json(AddMemberResponse { user_id }))
}

/// Remove a member from the caller's team
///
/// Soft removal: the target's team reference is cleared, their account
/// persists. The caller must be an admin of the same team.
///
/// # Endpoint
///
/// ```text
/// DELETE /v1/teams/members/<user_id>
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: caller is not a team admin
/// - `404 Not Found`: target user does not exist
/// - `409 Conflict`: target belongs to a different team
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let caller = User::find_by_subject(&state.db, &auth.subject)
        .await?
        .ok_or_else(|| ApiError::Forbidden("No account for caller identity".to_string()))?;

    tracing::info!(
        caller_id = %caller.id,
        target_id = %user_id,
        "Removing team member"
    );

    Team::remove_member(&state.db, &caller, user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
