//! Database layer: connection pool management and schema migrations.

pub mod migrations;
pub mod pool;

pub use pool::{close_pool, create_pool, health_check, DatabaseConfig};
