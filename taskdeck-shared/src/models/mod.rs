/// Database models for Taskdeck
///
/// This module contains all database models and their SQL operations.
///
/// # Models
///
/// - `user`: users mapped from external identities, roles, team membership
/// - `team`: teams and the member directory
/// - `project`: projects scoped to a team
/// - `task`: the task entity and its lifecycle mutations
/// - `task_query`: the retrieval paths (by project, "my tasks", admin view)
///   with their enrichment and in-memory filtering
pub mod project;
pub mod task;
pub mod task_query;
pub mod team;
pub mod user;
