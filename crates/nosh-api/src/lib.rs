//! JSON REST API for nosh group sessions.
//!
//! Exposes an axum [`Router`] backed by a [`SessionCoordinator`] over any
//! [`DishCatalog`] store. TLS and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", nosh_api::api_router(coordinator.clone()))
//! ```

pub mod dishes;
pub mod error;
pub mod sessions;
pub mod voting;

use std::sync::Arc;

use axum::{
  Json, Router,
  routing::{get, post},
};
use nosh_core::{coordinator::SessionCoordinator, store::DishCatalog};
use serde_json::{Value, json};

pub use error::ApiError;

/// Build a fully-materialised API router for `coordinator`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(coordinator: Arc<SessionCoordinator<S>>) -> Router<()>
where
  S: DishCatalog + 'static,
{
  Router::new()
    // Registry
    .route("/sessions", post(sessions::create::<S>))
    .route("/sessions/join", post(sessions::join::<S>))
    .route("/sessions/{code}", get(sessions::get_one::<S>))
    .route("/sessions/{code}/members", get(sessions::members::<S>))
    .route("/sessions/{code}/members/leave", post(sessions::leave::<S>))
    .route("/sessions/{code}/start", post(sessions::start::<S>))
    .route("/sessions/{code}/started", get(sessions::started::<S>))
    // Voting
    .route("/sessions/{code}/swipes", post(voting::swipe::<S>))
    .route("/sessions/{code}/done", post(voting::mark_done::<S>))
    .route("/sessions/{code}/completion", get(voting::completion::<S>))
    .route("/sessions/{code}/results", get(voting::results::<S>))
    // Catalog
    .route("/dishes", get(dishes::list::<S>))
    .route("/health", get(health))
    .with_state(coordinator)
}

/// `GET /health`
async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }
