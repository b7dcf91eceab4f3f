//! Identity and authentication utilities.
//!
//! Taskdeck does not manage credentials itself: an external identity
//! provider signs users in and issues the tokens this module validates.
//! The validated claims become an [`middleware::AuthContext`] carried in
//! request extensions, which handlers resolve to an internal user row when
//! an operation needs authorization.

pub mod jwt;
pub mod middleware;

pub use middleware::{AuthContext, AuthError};
