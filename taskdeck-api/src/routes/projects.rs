/// Project endpoints
///
/// # Endpoints
///
/// - `POST   /v1/projects` - Create a project
/// - `GET    /v1/projects` - List a team's projects, newest first
/// - `GET    /v1/projects/:id` - Project lookup
/// - `DELETE /v1/projects/:id` - Delete a project and its tasks
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use taskdeck_shared::models::project::{CreateProject, Project};
use uuid::Uuid;
use validator::Validate;

/// Create project request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    /// Project name (no uniqueness constraint within a team)
    #[validate(length(min = 1, max = 200, message = "Project name must be 1-200 characters"))]
    pub name: String,

    /// Owning team
    pub team_id: Uuid,
}

/// Project listing parameters
#[derive(Debug, Deserialize)]
pub struct ListProjectsParams {
    /// Team whose projects to list; no team means an empty listing
    pub team_id: Option<Uuid>,
}

/// Create a project
///
/// # Endpoint
///
/// ```text
/// POST /v1/projects
/// Content-Type: application/json
///
/// { "name": "Launch", "team_id": "<uuid>" }
/// ```
pub async fn create_project(
    State(state): State<AppState>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<Json<Project>> {
    req.validate()?;

    tracing::info!(team_id = %req.team_id, name = %req.name, "Creating project");

    let project = Project::create(
        &state.db,
        CreateProject {
            name: req.name,
            team_id: req.team_id,
        },
    )
    .await?;

    Ok(Json(project))
}

/// List a team's projects, newest first
///
/// # Endpoint
///
/// ```text
/// GET /v1/projects?team_id=<uuid>
/// ```
pub async fn list_projects(
    State(state): State<AppState>,
    Query(params): Query<ListProjectsParams>,
) -> ApiResult<Json<Vec<Project>>> {
    let Some(team_id) = params.team_id else {
        return Ok(Json(Vec::new()));
    };

    let projects = Project::list_by_team(&state.db, team_id).await?;

    Ok(Json(projects))
}

/// Project lookup
///
/// Returns `null` when the project does not exist.
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Option<Project>>> {
    let project = Project::find_by_id(&state.db, id).await?;

    Ok(Json(project))
}

/// Delete a project and every task in it
///
/// Tasks go first, then the project; a crash in between leaves an empty
/// project rather than orphaned tasks.
///
/// # Errors
///
/// - `404 Not Found`: project does not exist
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let deleted = Project::delete(&state.db, id).await?;

    if !deleted {
        return Err(ApiError::NotFound("Project not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
