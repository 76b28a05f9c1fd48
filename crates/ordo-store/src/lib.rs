//! Ordo Store - durable Sequence Store on SQLite
//!
//! Provides:
//! - SQLite schema with a checksummed migrations framework
//! - A small connection pool so threads can run transactions side by side
//! - `SqliteStore`, the `SequenceStore` implementation for one sibling family

pub mod db;
pub mod errors;
pub mod family;
pub mod migrations;
mod pool;
pub mod repo;

pub use errors::Result;
pub use family::Family;
pub use repo::SqliteStore;
