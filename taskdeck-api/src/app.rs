/// Application state and router builder
///
/// This module defines the shared application state and provides a
/// function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskdeck_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = taskdeck_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```
use crate::config::Config;
use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
    routing::{delete, get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskdeck_shared::auth::middleware::{authenticate_bearer, AuthError};
use taskdeck_shared::storage::UrlSigner;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; the
/// config sits behind an Arc so cloning stays cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Signer for attachment upload/download URLs
    pub signer: UrlSigner,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        let signer = UrlSigner::new(
            config.storage.base_url.clone(),
            &config.storage.signing_secret,
            config.storage.url_ttl_seconds,
        );

        Self {
            db,
            config: Arc::new(config),
            signer,
        }
    }

    /// Gets the identity token secret
    pub fn auth_secret(&self) -> &str {
        &self.config.auth.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// └── /v1/                             # API v1 (bearer auth)
///     ├── /users/
///     │   ├── POST /sync               # Map identity to a user row
///     │   ├── POST /role               # Pick role (+ create team)
///     │   ├── GET  /me                 # Current user (optional auth)
///     │   └── GET  /by-email           # Exact email lookup
///     ├── /teams/
///     │   ├── GET    /                 # Team by id
///     │   ├── GET    /members          # Member listing
///     │   ├── POST   /members          # Invite by email
///     │   └── DELETE /members/:user_id # Remove from team
///     ├── /projects/                   # CRUD + cascading delete
///     ├── /tasks/                      # Lifecycle + query paths
///     └── /uploads/                    # Attachment upload grants
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // getCurrentUser must tolerate a missing identity ("not signed in
    // yet"), so /users/me gets the optional auth layer.
    let me_route = Router::new()
        .route("/users/me", get(routes::users::current_user))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            optional_auth_layer,
        ));

    let authed_routes = Router::new()
        .route("/users/sync", post(routes::users::sync_user))
        .route("/users/role", post(routes::users::update_role))
        .route("/users/by-email", get(routes::users::user_by_email))
        .route("/teams", get(routes::teams::get_team))
        .route("/teams/members", get(routes::teams::team_members))
        .route("/teams/members", post(routes::teams::add_member))
        .route("/teams/members/:user_id", delete(routes::teams::remove_member))
        .route("/projects", post(routes::projects::create_project))
        .route("/projects", get(routes::projects::list_projects))
        .route("/projects/:id", get(routes::projects::get_project))
        .route("/projects/:id", delete(routes::projects::delete_project))
        .route("/tasks", post(routes::tasks::create_task))
        .route("/tasks/by-project/:project_id", get(routes::tasks::tasks_by_project))
        .route("/tasks/mine", get(routes::tasks::my_tasks))
        .route("/tasks/admin", get(routes::tasks::admin_tasks))
        .route("/tasks/:id/assign", post(routes::tasks::assign_task))
        .route("/tasks/:id/done", post(routes::tasks::mark_done))
        .route("/tasks/:id/reopen", post(routes::tasks::mark_pending))
        .route("/tasks/:id", delete(routes::tasks::delete_task))
        .route("/uploads", post(routes::uploads::create_upload))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_layer,
        ));

    let v1_routes = Router::new().merge(me_route).merge(authed_routes);

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bearer authentication middleware layer
///
/// Validates the identity token and injects an `AuthContext` into request
/// extensions; requests without valid credentials are rejected.
async fn auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth = authenticate_bearer(req.headers(), state.auth_secret())?;
    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}

/// Optional bearer authentication middleware layer
///
/// Like [`auth_layer`], but a missing Authorization header passes through
/// without an `AuthContext` so the handler can answer "not signed in".
/// A present-but-invalid token is still rejected.
async fn optional_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    match authenticate_bearer(req.headers(), state.auth_secret()) {
        Ok(auth) => {
            req.extensions_mut().insert(auth);
        }
        Err(AuthError::MissingCredentials) => {}
        Err(err) => return Err(err.into()),
    }

    Ok(next.run(req).await)
}
