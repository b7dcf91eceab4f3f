/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `users`: Identity sync, role selection, current-user lookup
/// - `teams`: Team lookup and the member directory
/// - `projects`: Project CRUD with cascading delete
/// - `tasks`: Task lifecycle and the three query paths
/// - `uploads`: Attachment upload grants
pub mod health;
pub mod projects;
pub mod tasks;
pub mod teams;
pub mod uploads;
pub mod users;
