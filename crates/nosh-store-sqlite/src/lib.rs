//! SQLite backend for nosh sessions, votes and the dish catalog.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every closure handed to that thread
//! runs to completion before the next one starts, which is what makes the
//! per-session check-then-write sequences atomic.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
