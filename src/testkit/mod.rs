//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`store`] - Throwaway on-disk stores and a read helper for asserting
//!   on stored rows. The crate itself exposes no read path.

pub mod store;
