//! # Taskdeck Shared Library
//!
//! This crate contains the data layer and shared utilities used across the
//! Taskdeck API server and notifier.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their SQL operations
//! - `auth`: Identity token validation and request auth context
//! - `db`: Connection pool and schema migrations
//! - `storage`: Signed URLs for task attachments

pub mod auth;
pub mod db;
pub mod models;
pub mod storage;

/// Current version of the Taskdeck shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
