//! SQLite persistence adapters.
//!
//! Provides the pooled SQLite store and the stage status recorder built on
//! Diesel ORM.

pub mod database;
pub mod recorder;
