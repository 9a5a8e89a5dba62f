//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, UUIDs are hyphenated lowercase strings and
//! booleans are `0`/`1` integers.

use chrono::{DateTime, Utc};
use nosh_core::{
  session::{Member, Session, SessionCode},
  vote::{Preference, Vote},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Preference ───────────────────────────────────────────────────────────────

pub fn encode_preference(p: Preference) -> &'static str { p.as_str() }

pub fn decode_preference(s: &str) -> Result<Preference> {
  s.parse().map_err(|_| Error::UnknownPreference(s.to_owned()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read from a `sessions` row.
pub struct RawSession {
  pub code:       String,
  pub name:       String,
  pub leader_id:  String,
  pub started:    bool,
  pub completed:  bool,
  pub created_at: String,
}

impl RawSession {
  pub fn into_session(self, members: Vec<RawMember>) -> Result<Session> {
    Ok(Session {
      code:       SessionCode::new(&self.code),
      name:       self.name,
      leader_id:  decode_uuid(&self.leader_id)?,
      members:    members
        .into_iter()
        .map(RawMember::into_member)
        .collect::<Result<_>>()?,
      started:    self.started,
      completed:  self.completed,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read from a `members` row.
pub struct RawMember {
  pub member_id:       String,
  pub display_name:    String,
  pub avatar:          Option<String>,
  pub finished_voting: bool,
  pub joined_at:       String,
}

impl RawMember {
  pub fn into_member(self) -> Result<Member> {
    Ok(Member {
      id:                  decode_uuid(&self.member_id)?,
      display_name:        self.display_name,
      avatar:              self.avatar,
      has_finished_voting: self.finished_voting,
      joined_at:           decode_dt(&self.joined_at)?,
    })
  }
}

/// Raw values read from a `votes` row.
pub struct RawVote {
  pub session_code:      String,
  pub member_id:         String,
  pub dish_id:           String,
  pub preference:        String,
  pub first_recorded_at: String,
  pub updated_at:        String,
}

impl RawVote {
  pub fn into_vote(self) -> Result<Vote> {
    Ok(Vote {
      session:           SessionCode::new(&self.session_code),
      member_id:         decode_uuid(&self.member_id)?,
      dish_id:           self.dish_id,
      preference:        decode_preference(&self.preference)?,
      first_recorded_at: decode_dt(&self.first_recorded_at)?,
      updated_at:        decode_dt(&self.updated_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn preference_column_round_trips_through_parse() {
    for p in [Preference::Superlike, Preference::Like, Preference::Dislike] {
      assert_eq!(decode_preference(encode_preference(p)).unwrap(), p);
    }
  }

  #[test]
  fn unknown_preference_column_is_an_error() {
    let err = decode_preference("meh").unwrap_err();
    assert!(matches!(err, Error::UnknownPreference(ref v) if v == "meh"));
  }
}
