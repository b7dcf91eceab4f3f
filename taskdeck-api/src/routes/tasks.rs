/// Task endpoints
///
/// The task lifecycle (create, assign, complete, reopen, delete) and the
/// three query paths behind the dashboards.
///
/// # Endpoints
///
/// - `POST   /v1/tasks` - Create a task
/// - `GET    /v1/tasks/by-project/:project_id` - A project's tasks
/// - `GET    /v1/tasks/mine` - One user's tasks, with refinements
/// - `GET    /v1/tasks/admin` - Team-wide admin view, fully enriched
/// - `POST   /v1/tasks/:id/assign` - Update assignment
/// - `POST   /v1/tasks/:id/done` - Mark done
/// - `POST   /v1/tasks/:id/reopen` - Mark pending again
/// - `DELETE /v1/tasks/:id` - Hard delete (admins only)
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use taskdeck_shared::auth::middleware::AuthContext;
use taskdeck_shared::models::task::{CreateTask, Task};
use taskdeck_shared::models::task_query::{
    AdminTask, AdminTasksFilter, MyTask, MyTasksFilter, TaskWithAssignee,
};
use taskdeck_shared::models::user::User;
use uuid::Uuid;
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// Owning project
    pub project_id: Uuid,

    /// Legacy single assignee
    pub assigned_to: Option<Uuid>,

    /// Assignee list
    pub assignees: Option<Vec<Uuid>>,

    /// Creator reference
    pub created_by: Option<Uuid>,

    /// Storage ids of attached images
    pub images: Option<Vec<String>>,
}

/// Assignment update request
#[derive(Debug, Deserialize)]
pub struct AssignTaskRequest {
    /// New assignee list
    pub assignees: Option<Vec<Uuid>>,

    /// Legacy single-assignee update
    pub user_id: Option<Uuid>,
}

/// Completion request
#[derive(Debug, Deserialize)]
pub struct MarkDoneRequest {
    /// Who completed the task
    pub completed_by: Option<Uuid>,

    /// Completion note (overwrites the previous one; also appended to the
    /// history when a completer is given)
    pub note: Option<String>,
}

/// Reopen request
#[derive(Debug, Deserialize)]
pub struct MarkPendingRequest {
    /// Author for the reopen note
    pub user_id: Option<Uuid>,

    /// Reopen note (recorded only when an author is given)
    pub note: Option<String>,
}

/// "My tasks" query parameters
#[derive(Debug, Deserialize)]
pub struct MyTasksParams {
    /// Whose tasks to list; no user means an empty answer
    pub user_id: Option<Uuid>,

    /// Case-insensitive substring over title or project name
    pub search: Option<String>,

    /// Exact-match project narrowing
    pub project_id: Option<Uuid>,

    /// Inclusive creation-time lower bound (RFC 3339)
    pub date_from: Option<DateTime<Utc>>,

    /// Inclusive creation-time upper bound (RFC 3339)
    pub date_to: Option<DateTime<Utc>>,
}

/// Admin view query parameters
#[derive(Debug, Deserialize)]
pub struct AdminTasksParams {
    /// Team to read; no team means an empty answer
    pub team_id: Option<Uuid>,

    /// Narrow to one project
    pub project_id: Option<Uuid>,

    /// Tasks assigned to this user (either representation)
    pub assigned_to: Option<Uuid>,

    /// Tasks completed by exactly this user
    pub completed_by: Option<Uuid>,

    /// Inclusive creation-time lower bound (RFC 3339)
    pub date_from: Option<DateTime<Utc>>,

    /// Inclusive creation-time upper bound (RFC 3339)
    pub date_to: Option<DateTime<Utc>>,
}

/// Create a task
///
/// The assignee list is reconciled with the legacy single-assignee field;
/// status always starts pending.
///
/// # Endpoint
///
/// ```text
/// POST /v1/tasks
/// Content-Type: application/json
///
/// {
///   "title": "Write copy",
///   "project_id": "<uuid>",
///   "assignees": ["<uuid>"],
///   "created_by": "<uuid>"
/// }
/// ```
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate()?;

    tracing::info!(
        subject = %auth.subject,
        project_id = %req.project_id,
        title = %req.title,
        "Creating task"
    );

    let task = Task::create(
        &state.db,
        CreateTask {
            title: req.title,
            project_id: req.project_id,
            assigned_to: req.assigned_to,
            assignees: req.assignees,
            created_by: req.created_by,
            images: req.images,
        },
    )
    .await?;

    Ok(Json(task))
}

/// A project's tasks, newest first, with the legacy assignee resolved
pub async fn tasks_by_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<TaskWithAssignee>>> {
    let tasks = TaskWithAssignee::for_project(&state.db, project_id).await?;

    Ok(Json(tasks))
}

/// One user's tasks with optional refinements
///
/// Tolerates rows from before the multi-assignee migration (legacy field
/// OR list membership) and answers an empty list when no user id is
/// supplied, never "all tasks".
///
/// # Endpoint
///
/// ```text
/// GET /v1/tasks/mine?user_id=<uuid>&search=copy&project_id=<uuid>
///     &date_from=2026-01-01T00:00:00Z&date_to=2026-02-01T00:00:00Z
/// ```
pub async fn my_tasks(
    State(state): State<AppState>,
    Query(params): Query<MyTasksParams>,
) -> ApiResult<Json<Vec<MyTask>>> {
    let Some(user_id) = params.user_id else {
        return Ok(Json(Vec::new()));
    };

    let filter = MyTasksFilter {
        project: params.project_id,
        date_from: params.date_from,
        date_to: params.date_to,
        search: params.search,
    };

    let tasks = MyTask::for_user(&state.db, user_id, &filter).await?;

    Ok(Json(tasks))
}

/// Team-wide admin view, fully enriched
///
/// Empty when no team id is supplied.
///
/// # Endpoint
///
/// ```text
/// GET /v1/tasks/admin?team_id=<uuid>&project_id=<uuid>
///     &assigned_to=<uuid>&completed_by=<uuid>
/// ```
pub async fn admin_tasks(
    State(state): State<AppState>,
    Query(params): Query<AdminTasksParams>,
) -> ApiResult<Json<Vec<AdminTask>>> {
    let Some(team_id) = params.team_id else {
        return Ok(Json(Vec::new()));
    };

    let filter = AdminTasksFilter {
        project: params.project_id,
        assigned_to: params.assigned_to,
        completed_by: params.completed_by,
        date_from: params.date_from,
        date_to: params.date_to,
    };

    let tasks = AdminTask::for_team(&state.db, &state.signer, team_id, &filter).await?;

    Ok(Json(tasks))
}

/// Update a task's assignment
///
/// # Errors
///
/// - `404 Not Found`: task does not exist
pub async fn assign_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AssignTaskRequest>,
) -> ApiResult<Json<Task>> {
    let task = Task::assign(&state.db, id, req.assignees, req.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Mark a task done
///
/// # Errors
///
/// - `404 Not Found`: task does not exist
pub async fn mark_done(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<MarkDoneRequest>,
) -> ApiResult<Json<Task>> {
    let task = Task::mark_done(&state.db, id, req.completed_by, req.note)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    tracing::info!(task_id = %task.id, "Task marked done");

    Ok(Json(task))
}

/// Reopen a done task
///
/// # Errors
///
/// - `404 Not Found`: task does not exist
pub async fn mark_pending(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<MarkPendingRequest>,
) -> ApiResult<Json<Task>> {
    let task = Task::mark_pending(&state.db, id, req.user_id, req.note)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    tracing::info!(task_id = %task.id, "Task reopened");

    Ok(Json(task))
}

/// Hard-delete a task
///
/// # Errors
///
/// - `403 Forbidden`: caller is not an admin
/// - `404 Not Found`: task does not exist
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let caller = User::find_by_subject(&state.db, &auth.subject)
        .await?
        .ok_or_else(|| ApiError::Forbidden("No account for caller identity".to_string()))?;

    let deleted = Task::delete(&state.db, &caller, id).await?;

    if !deleted {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    tracing::info!(task_id = %id, caller_id = %caller.id, "Task deleted");

    Ok(StatusCode::NO_CONTENT)
}
