//! SQLite database modules.
//!
//! Provides connection pool management, schema definitions, and
//! Diesel model types for the stage status table.

pub mod connection;
pub mod model;
pub mod schema;
