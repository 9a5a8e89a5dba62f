//! Handlers for session registry endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/sessions` | Body: `{"creatorName":"..","sessionName":"..","avatar":".."}`; 201 |
//! | `POST` | `/sessions/join` | Body: `{"code":"..","displayName":"..","avatar":".."}`; 404 on bad code |
//! | `GET`  | `/sessions/:code` | Full session with derived `state` |
//! | `GET`  | `/sessions/:code/members` | Name, leader and roster |
//! | `POST` | `/sessions/:code/members/leave` | Body: `{"memberId":".."}`; 403 for the leader |
//! | `POST` | `/sessions/:code/start` | Body: `{"memberId":".."}`; 403 unless leader, 409 if started |
//! | `GET`  | `/sessions/:code/started` | `{"started":bool}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use nosh_core::{
  Error,
  coordinator::SessionCoordinator,
  session::{Member, NewMember, Session, SessionCode, SessionState},
  store::DishCatalog,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;

type Coordinator<S> = State<Arc<SessionCoordinator<S>>>;

/// Body shared by the member-scoped actions (`leave`, `start`, `done`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberBody {
  pub member_id: Uuid,
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
  #[serde(default)]
  pub creator_name: String,
  pub session_name: Option<String>,
  pub avatar:       Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Created {
  pub code:             SessionCode,
  pub leader_member_id: Uuid,
  pub session_name:     String,
}

/// `POST /sessions`; returns 201 with the new join code and leader id.
pub async fn create<S: DishCatalog>(
  State(coordinator): Coordinator<S>,
  body: Result<Json<CreateBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Json(body) = body?;
  let creator = NewMember::new(body.creator_name).with_avatar(body.avatar);
  let session = coordinator.create_session(creator, body.session_name).await?;

  Ok((
    StatusCode::CREATED,
    Json(Created {
      code:             session.code,
      leader_member_id: session.leader_id,
      session_name:     session.name,
    }),
  ))
}

// ─── Join ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinBody {
  #[serde(default)]
  pub code:         String,
  #[serde(default)]
  pub display_name: String,
  pub avatar:       Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Joined {
  pub member_id: Uuid,
  pub code:      SessionCode,
}

/// `POST /sessions/join`
pub async fn join<S: DishCatalog>(
  State(coordinator): Coordinator<S>,
  body: Result<Json<JoinBody>, JsonRejection>,
) -> Result<Json<Joined>, ApiError> {
  let Json(body) = body?;
  let code = SessionCode::new(&body.code);
  if code.is_empty() {
    return Err(Error::MissingField("code").into());
  }

  let member = NewMember::new(body.display_name).with_avatar(body.avatar);
  let member = coordinator.join_session(&code, member).await?;
  Ok(Json(Joined { member_id: member.id, code }))
}

// ─── Read ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SessionDetail {
  #[serde(flatten)]
  pub session: Session,
  pub state:   SessionState,
}

/// `GET /sessions/:code`
pub async fn get_one<S: DishCatalog>(
  State(coordinator): Coordinator<S>,
  Path(code): Path<SessionCode>,
) -> Result<Json<SessionDetail>, ApiError> {
  let session = coordinator.get_session(&code).await?;
  let state = session.state();
  Ok(Json(SessionDetail { session, state }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
  pub session_name: String,
  pub leader_id:    Uuid,
  pub members:      Vec<Member>,
}

/// `GET /sessions/:code/members`
pub async fn members<S: DishCatalog>(
  State(coordinator): Coordinator<S>,
  Path(code): Path<SessionCode>,
) -> Result<Json<Membership>, ApiError> {
  let session = coordinator.get_session(&code).await?;
  Ok(Json(Membership {
    session_name: session.name,
    leader_id:    session.leader_id,
    members:      session.members,
  }))
}

/// `GET /sessions/:code/started`
pub async fn started<S: DishCatalog>(
  State(coordinator): Coordinator<S>,
  Path(code): Path<SessionCode>,
) -> Result<impl IntoResponse, ApiError> {
  let started = coordinator.has_started(&code).await?;
  Ok(Json(json!({
    "started": started,
    "pollIntervalMs": coordinator.policy().poll_interval_ms,
  })))
}

// ─── Leave / start ────────────────────────────────────────────────────────────

/// `POST /sessions/:code/members/leave`
pub async fn leave<S: DishCatalog>(
  State(coordinator): Coordinator<S>,
  Path(code): Path<SessionCode>,
  body: Result<Json<MemberBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Json(body) = body?;
  coordinator.leave_session(&code, body.member_id).await?;
  Ok(Json(json!({ "message": "Member removed" })))
}

/// `POST /sessions/:code/start`
pub async fn start<S: DishCatalog>(
  State(coordinator): Coordinator<S>,
  Path(code): Path<SessionCode>,
  body: Result<Json<MemberBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Json(body) = body?;
  coordinator.start_session(&code, body.member_id).await?;
  Ok(Json(json!({ "message": "Session started" })))
}
