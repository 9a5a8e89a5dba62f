//! Swipe preferences and the votes that record them.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, session::SessionCode};

/// A member's reaction to a dish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preference {
  Superlike,
  Like,
  Dislike,
}

impl Preference {
  /// Score contribution of a single vote. Fixed policy, not configurable.
  pub const fn weight(self) -> i64 {
    match self {
      Self::Superlike => 3,
      Self::Like => 1,
      Self::Dislike => -1,
    }
  }

  /// Whether a vote with this preference counts its author as a supporter.
  pub const fn is_positive(self) -> bool {
    matches!(self, Self::Superlike | Self::Like)
  }

  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Superlike => "superlike",
      Self::Like => "like",
      Self::Dislike => "dislike",
    }
  }
}

impl FromStr for Preference {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "superlike" | "super_like" | "super-like" => Ok(Self::Superlike),
      "like" => Ok(Self::Like),
      "dislike" => Ok(Self::Dislike),
      _ => Err(Error::InvalidPreference(s.to_owned())),
    }
  }
}

impl fmt::Display for Preference {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// The live preference of one member for one dish within one session.
///
/// `(session, member_id, dish_id)` is the identity; re-swiping overwrites
/// `preference` and `updated_at` in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
  pub session:           SessionCode,
  pub member_id:         Uuid,
  pub dish_id:           String,
  pub preference:        Preference,
  pub first_recorded_at: DateTime<Utc>,
  pub updated_at:        DateTime<Utc>,
}

/// Input for [`SessionStore::record_vote`](crate::store::SessionStore::record_vote).
#[derive(Debug, Clone)]
pub struct NewVote {
  pub session:    SessionCode,
  pub member_id:  Uuid,
  pub dish_id:    String,
  pub preference: Preference,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn weights_are_fixed() {
    assert_eq!(Preference::Superlike.weight(), 3);
    assert_eq!(Preference::Like.weight(), 1);
    assert_eq!(Preference::Dislike.weight(), -1);
  }

  #[test]
  fn parse_accepts_known_spellings() {
    assert_eq!("like".parse::<Preference>().unwrap(), Preference::Like);
    assert_eq!("SuperLike".parse::<Preference>().unwrap(), Preference::Superlike);
    assert_eq!("super_like".parse::<Preference>().unwrap(), Preference::Superlike);
    assert_eq!(" dislike ".parse::<Preference>().unwrap(), Preference::Dislike);
  }

  #[test]
  fn parse_rejects_unknown_values() {
    let err = "meh".parse::<Preference>().unwrap_err();
    assert!(matches!(err, Error::InvalidPreference(ref v) if v == "meh"));
    assert_eq!(err.kind(), crate::ErrorKind::InvalidArgument);
  }
}
