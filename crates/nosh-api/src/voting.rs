//! Handlers for swiping, completion polling and results.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/sessions/:code/swipes` | Body: `{"memberId","itemId","preference"}`; upsert, 404 for unknown dishes |
//! | `POST` | `/sessions/:code/done` | Body: `{"memberId":".."}` |
//! | `GET`  | `/sessions/:code/completion` | Polled until `allCompleted` |
//! | `GET`  | `/sessions/:code/results` | Ranked shortlist, or an empty list + `message` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
};
use nosh_core::{
  completion::CompletionStatus,
  coordinator::{GroupResults, MarkDoneOutcome, SessionCoordinator},
  session::SessionCode,
  store::DishCatalog,
  vote::{Preference, Vote},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::ApiError, sessions::MemberBody};

type Coordinator<S> = State<Arc<SessionCoordinator<S>>>;

// ─── Swipe ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwipeBody {
  pub member_id:  Uuid,
  #[serde(default)]
  pub item_id:    String,
  /// Parsed separately so an unknown value is a 400 with a clear message.
  #[serde(default)]
  pub preference: String,
}

/// `POST /sessions/:code/swipes`
pub async fn swipe<S: DishCatalog>(
  State(coordinator): Coordinator<S>,
  Path(code): Path<SessionCode>,
  body: Result<Json<SwipeBody>, JsonRejection>,
) -> Result<Json<Vote>, ApiError> {
  let Json(body) = body?;
  let preference: Preference = body.preference.parse()?;
  let vote = coordinator
    .submit_swipe(&code, body.member_id, &body.item_id, preference)
    .await?;
  Ok(Json(vote))
}

// ─── Completion ───────────────────────────────────────────────────────────────

/// `POST /sessions/:code/done`
pub async fn mark_done<S: DishCatalog>(
  State(coordinator): Coordinator<S>,
  Path(code): Path<SessionCode>,
  body: Result<Json<MemberBody>, JsonRejection>,
) -> Result<Json<MarkDoneOutcome>, ApiError> {
  let Json(body) = body?;
  let outcome = coordinator.mark_done(&code, body.member_id).await?;
  Ok(Json(outcome))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResponse {
  #[serde(flatten)]
  pub status:           CompletionStatus,
  pub poll_interval_ms: u64,
}

/// `GET /sessions/:code/completion`
pub async fn completion<S: DishCatalog>(
  State(coordinator): Coordinator<S>,
  Path(code): Path<SessionCode>,
) -> Result<Json<CompletionResponse>, ApiError> {
  let status = coordinator.completion_status(&code).await?;
  Ok(Json(CompletionResponse {
    status,
    poll_interval_ms: coordinator.policy().poll_interval_ms,
  }))
}

// ─── Results ──────────────────────────────────────────────────────────────────

/// `GET /sessions/:code/results`
pub async fn results<S: DishCatalog>(
  State(coordinator): Coordinator<S>,
  Path(code): Path<SessionCode>,
) -> Result<Json<GroupResults>, ApiError> {
  Ok(Json(coordinator.results(&code).await?))
}
