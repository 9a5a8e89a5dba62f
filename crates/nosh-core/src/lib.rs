//! Core types and trait definitions for nosh group decision sessions.
//!
//! Nothing here speaks HTTP or SQL. Storage backends implement [`store::SessionStore`] and
//! [`store::DishCatalog`]; the API layer drives everything through
//! [`coordinator::SessionCoordinator`].

// Store impls write `async fn`; the trait signatures carry the `Send` bounds.
#![allow(async_fn_in_trait)]

pub mod completion;
pub mod coordinator;
pub mod dish;
pub mod error;
pub mod lookup;
pub mod observer;
pub mod ranking;
pub mod session;
pub mod store;
pub mod vote;

pub use error::{Error, ErrorKind, Result};
