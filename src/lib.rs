//! Core library surface for the student records manager TUI application.
//!
//! The headless core (models, store, query, stats, export) is exposed as an
//! ordinary library so the `bin` target, the integration tests, and any
//! external tooling all drive the exact same pieces the UI does.
pub mod export;
pub mod logging;
pub mod models;
pub mod query;
pub mod stats;
pub mod store;
pub mod ui;

/// The domain type other layers manipulate.
pub use models::Student;

/// Convenience re-exports for the persistence layer. These are typically
/// used by `main.rs` to open the key-value store and hydrate the roster.
pub use store::{data_dir, KvStore, StoreError, StudentStore};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
