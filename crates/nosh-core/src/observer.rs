//! Session change notifications.
//!
//! Clients learn about progress by polling, so the default observer does
//! nothing. A push transport can be plugged in by implementing
//! [`SessionObserver`] without touching the coordinator.

use serde::Serialize;
use uuid::Uuid;

use crate::session::SessionCode;

/// Something that changed in a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
  Created { leader_id: Uuid },
  MemberJoined { member_id: Uuid },
  MemberLeft { member_id: Uuid },
  Started,
  MemberFinished { member_id: Uuid },
  /// Emitted exactly once per session, by whichever call latches completion.
  Completed,
}

pub trait SessionObserver: Send + Sync {
  fn notify(&self, code: &SessionCode, event: &SessionEvent);
}

/// The polling default: events are dropped and clients re-fetch state.
#[derive(Debug, Clone, Copy, Default)]
pub struct PollingObserver;

impl SessionObserver for PollingObserver {
  fn notify(&self, _code: &SessionCode, _event: &SessionEvent) {}
}
