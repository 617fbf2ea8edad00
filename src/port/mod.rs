//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!   pipeline stage ──► StatusRecorder (port) ──► SqliteStatusRecorder (adapter)
//!                                                      │
//!                                                      ▼
//!                                                 PoolManager ──► SQLite
//! ```

pub mod outbound;
