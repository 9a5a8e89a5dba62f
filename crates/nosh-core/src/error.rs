//! Error types for `nosh-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::session::SessionCode;

/// Broad classification of an [`Error`], used by transports to pick a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  NotFound,
  Forbidden,
  Conflict,
  InvalidArgument,
  Internal,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("session not found: {0}")]
  SessionNotFound(SessionCode),

  #[error("member {member} not found in session {code}")]
  MemberNotFound { code: SessionCode, member: Uuid },

  #[error("member {member} is not part of session {code}")]
  NotAMember { code: SessionCode, member: Uuid },

  #[error("only the leader can start the session")]
  LeaderOnly,

  #[error("dish not found: {0}")]
  DishNotFound(String),

  #[error("leader cannot leave the session")]
  LeaderCannotLeave,

  #[error("session {0} has already started")]
  AlreadyStarted(SessionCode),

  #[error("session {0} has not started yet")]
  NotStarted(SessionCode),

  #[error("invalid preference {0:?}; expected like, dislike or superlike")]
  InvalidPreference(String),

  #[error("missing required field: {0}")]
  MissingField(&'static str),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }

  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::SessionNotFound(_)
      | Self::MemberNotFound { .. }
      | Self::DishNotFound(_) => ErrorKind::NotFound,
      Self::NotAMember { .. } | Self::LeaderOnly | Self::LeaderCannotLeave => {
        ErrorKind::Forbidden
      }
      Self::AlreadyStarted(_) | Self::NotStarted(_) => ErrorKind::Conflict,
      Self::InvalidPreference(_) | Self::MissingField(_) => {
        ErrorKind::InvalidArgument
      }
      Self::Store(_) => ErrorKind::Internal,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
