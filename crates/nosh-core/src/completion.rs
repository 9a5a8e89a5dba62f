//! Completion tracking: a polled read model over the roster's done flags.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::Member;

/// One roster entry as reported by [`CompletionStatus`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberProgress {
  pub id:                  Uuid,
  pub name:                String,
  pub avatar:              Option<String>,
  pub has_finished_voting: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionStatus {
  pub members:             Vec<MemberProgress>,
  pub completed_count:     usize,
  pub total_count:         usize,
  /// True iff every current member has finished (vacuously true when empty).
  pub all_completed:       bool,
  /// `100 * completed / total`, or `0` for an empty roster.
  pub progress_percentage: f64,
}

impl CompletionStatus {
  /// Derive the status from the explicit per-member done flags.
  pub fn from_members(members: &[Member]) -> Self {
    Self::build(members, |m| m.has_finished_voting)
  }

  /// Legacy heuristic: treat a member as done once they have cast at least
  /// one vote. Only for deployments without the explicit done flag.
  pub fn from_vote_counts(members: &[Member], counts: &[(Uuid, u64)]) -> Self {
    Self::build(members, |m| {
      counts.iter().any(|(id, n)| *id == m.id && *n > 0)
    })
  }

  fn build(members: &[Member], done: impl Fn(&Member) -> bool) -> Self {
    let members: Vec<MemberProgress> = members
      .iter()
      .map(|m| MemberProgress {
        id:                  m.id,
        name:                m.display_name.clone(),
        avatar:              m.avatar.clone(),
        has_finished_voting: done(m),
      })
      .collect();

    let completed_count = members.iter().filter(|m| m.has_finished_voting).count();
    let total_count = members.len();
    let progress_percentage = if total_count == 0 {
      0.0
    } else {
      completed_count as f64 / total_count as f64 * 100.0
    };

    Self {
      members,
      completed_count,
      total_count,
      all_completed: completed_count == total_count,
      progress_percentage,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::session::NewMember;

  fn roster(done: &[bool]) -> Vec<Member> {
    done
      .iter()
      .enumerate()
      .map(|(i, d)| {
        let mut m = NewMember::new(format!("member-{i}")).into_member();
        m.has_finished_voting = *d;
        m
      })
      .collect()
  }

  #[test]
  fn partial_progress() {
    let status = CompletionStatus::from_members(&roster(&[true, false, true, false]));
    assert_eq!(status.completed_count, 2);
    assert_eq!(status.total_count, 4);
    assert!(!status.all_completed);
    assert_eq!(status.progress_percentage, 50.0);
  }

  #[test]
  fn all_done() {
    let status = CompletionStatus::from_members(&roster(&[true, true, true]));
    assert!(status.all_completed);
    assert_eq!(status.progress_percentage, 100.0);
  }

  #[test]
  fn empty_roster_reports_zero_progress() {
    let status = CompletionStatus::from_members(&[]);
    assert_eq!(status.total_count, 0);
    assert_eq!(status.progress_percentage, 0.0);
    assert!(status.all_completed);
  }

  #[test]
  fn vote_count_heuristic_disagrees_with_flag() {
    let members = roster(&[false, false]);
    let counts = vec![(members[0].id, 1), (members[1].id, 0)];

    let heuristic = CompletionStatus::from_vote_counts(&members, &counts);
    assert_eq!(heuristic.completed_count, 1);

    let explicit = CompletionStatus::from_members(&members);
    assert_eq!(explicit.completed_count, 0);
  }
}
