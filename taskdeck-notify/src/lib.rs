//! # Taskdeck Notify
//!
//! Client-side change notifications for Taskdeck. The backend has no push
//! channel; instead, clients re-fetch their task queries and this crate
//! diffs successive snapshots to surface "task assigned" and "task
//! completed" events, delivering them through a pluggable sink with an
//! in-app toast fallback.
//!
//! ## Modules
//!
//! - `watcher`: snapshot-diff detectors (assignments, completions)
//! - `sink`: notification delivery channels and the fallback dispatcher
//! - `poller`: polling subscription client feeding snapshots to a watcher

pub mod poller;
pub mod sink;
pub mod watcher;
