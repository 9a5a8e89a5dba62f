//! Sessions, members and join codes.
//!
//! A session is one group decision round. It is addressed everywhere by its
//! short join code; the members it holds are addressed by UUID.

use std::fmt;

use chrono::{DateTime, Utc};
use rand_core::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Join code ───────────────────────────────────────────────────────────────

/// Characters a join code is drawn from.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Number of characters in a generated join code.
pub const CODE_LENGTH: usize = 6;

/// A short, human-shareable session identifier.
///
/// Codes are case-insensitive on input and always stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct SessionCode(String);

impl SessionCode {
  pub fn new(raw: impl AsRef<str>) -> Self {
    Self(raw.as_ref().trim().to_ascii_uppercase())
  }

  /// Draw a fresh random code. Uniqueness is the caller's concern.
  pub fn generate<R: RngCore + ?Sized>(rng: &mut R) -> Self {
    let code = (0..CODE_LENGTH)
      .map(|_| {
        let idx = rng.next_u32() as usize % CODE_ALPHABET.len();
        CODE_ALPHABET[idx] as char
      })
      .collect();
    Self(code)
  }

  pub fn as_str(&self) -> &str { &self.0 }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

/// Where a coordinator draws candidate join codes from.
pub trait CodeSource: Send + Sync {
  fn draw(&self) -> SessionCode;
}

/// Uniform codes from the operating system's RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCodes;

impl CodeSource for RandomCodes {
  fn draw(&self) -> SessionCode { SessionCode::generate(&mut rand_core::OsRng) }
}

impl<F> CodeSource for F
where
  F: Fn() -> SessionCode + Send + Sync,
{
  fn draw(&self) -> SessionCode { self() }
}

impl From<String> for SessionCode {
  fn from(raw: String) -> Self { Self::new(raw) }
}

impl From<&str> for SessionCode {
  fn from(raw: &str) -> Self { Self::new(raw) }
}

impl From<SessionCode> for String {
  fn from(code: SessionCode) -> Self { code.0 }
}

impl fmt::Display for SessionCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── Members ─────────────────────────────────────────────────────────────────

/// A participant in a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
  pub id:                  Uuid,
  pub display_name:        String,
  /// Opaque avatar reference chosen by the client (e.g. a blob icon name).
  pub avatar:              Option<String>,
  /// Set once the member explicitly signals they are done swiping.
  pub has_finished_voting: bool,
  pub joined_at:           DateTime<Utc>,
}

/// Input for admitting a member; the id and timestamp are assigned on insert.
#[derive(Debug, Clone)]
pub struct NewMember {
  pub display_name: String,
  pub avatar:       Option<String>,
}

impl NewMember {
  pub fn new(display_name: impl Into<String>) -> Self {
    Self { display_name: display_name.into(), avatar: None }
  }

  pub fn with_avatar(mut self, avatar: Option<String>) -> Self {
    self.avatar = avatar;
    self
  }

  pub fn into_member(self) -> Member {
    Member {
      id:                  Uuid::new_v4(),
      display_name:        self.display_name,
      avatar:              self.avatar,
      has_finished_voting: false,
      joined_at:           Utc::now(),
    }
  }
}

/// The subset of a member shown alongside results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSummary {
  pub id:     Uuid,
  pub name:   String,
  pub avatar: Option<String>,
}

impl From<&Member> for MemberSummary {
  fn from(m: &Member) -> Self {
    Self {
      id:     m.id,
      name:   m.display_name.clone(),
      avatar: m.avatar.clone(),
    }
  }
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// Lifecycle position of a session, derived from its flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
  /// Members may join; the leader may start.
  Forming,
  /// Members swipe and mark themselves done.
  Voting,
  /// Every member has finished.
  Complete,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
  pub code:       SessionCode,
  pub name:       String,
  pub leader_id:  Uuid,
  /// Roster in join order; the leader is always first.
  pub members:    Vec<Member>,
  pub started:    bool,
  pub completed:  bool,
  pub created_at: DateTime<Utc>,
}

impl Session {
  pub fn state(&self) -> SessionState {
    if self.completed {
      SessionState::Complete
    } else if self.started {
      SessionState::Voting
    } else {
      SessionState::Forming
    }
  }

  pub fn member(&self, id: Uuid) -> Option<&Member> {
    self.members.iter().find(|m| m.id == id)
  }

  pub fn is_member(&self, id: Uuid) -> bool { self.member(id).is_some() }

  pub fn is_leader(&self, id: Uuid) -> bool { self.leader_id == id }
}

/// Input for [`SessionStore::insert_session`](crate::store::SessionStore::insert_session).
#[derive(Debug, Clone)]
pub struct NewSession {
  pub code:   SessionCode,
  pub name:   String,
  /// Becomes the leader and the first roster entry.
  pub leader: Member,
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Counter(u32);

  impl RngCore for Counter {
    fn next_u32(&mut self) -> u32 {
      self.0 += 1;
      self.0
    }
    fn next_u64(&mut self) -> u64 { self.next_u32() as u64 }
    fn fill_bytes(&mut self, dest: &mut [u8]) {
      for b in dest {
        *b = self.next_u32() as u8;
      }
    }
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
      self.fill_bytes(dest);
      Ok(())
    }
  }

  #[test]
  fn generated_code_uses_alphabet() {
    let code = SessionCode::generate(&mut rand_core::OsRng);
    assert_eq!(code.as_str().len(), CODE_LENGTH);
    assert!(code.as_str().bytes().all(|b| CODE_ALPHABET.contains(&b)));
  }

  #[test]
  fn generated_code_is_driven_by_rng() {
    let code = SessionCode::generate(&mut Counter(0));
    assert_eq!(code.as_str(), "BCDEFG");
  }

  #[test]
  fn code_input_is_normalised() {
    assert_eq!(SessionCode::new(" ab12cd "), SessionCode::new("AB12CD"));
    let parsed: SessionCode = serde_json::from_str("\"xy9z00\"").unwrap();
    assert_eq!(parsed.as_str(), "XY9Z00");
  }

  #[test]
  fn state_follows_flags() {
    let leader = NewMember::new("Alex").into_member();
    let mut session = Session {
      code:       SessionCode::new("ABCDEF"),
      name:       "Lunch".into(),
      leader_id:  leader.id,
      members:    vec![leader],
      started:    false,
      completed:  false,
      created_at: Utc::now(),
    };
    assert_eq!(session.state(), SessionState::Forming);
    session.started = true;
    assert_eq!(session.state(), SessionState::Voting);
    session.completed = true;
    assert_eq!(session.state(), SessionState::Complete);
  }
}
