//! The ranking engine: a pure function from votes to an ordered shortlist.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
  dish::Dish,
  session::{Member, MemberSummary},
  vote::{Preference, Vote},
};

/// Shortlist length used when the caller does not ask for another.
pub const DEFAULT_TOP_N: usize = 8;

/// Per-preference vote counts for one dish.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
  pub superlikes: u32,
  pub likes:      u32,
  pub dislikes:   u32,
}

impl Breakdown {
  pub fn add(&mut self, preference: Preference) {
    match preference {
      Preference::Superlike => self.superlikes += 1,
      Preference::Like => self.likes += 1,
      Preference::Dislike => self.dislikes += 1,
    }
  }

  /// Total number of votes, regardless of preference.
  pub fn interactions(&self) -> u32 { self.superlikes + self.likes + self.dislikes }

  pub fn score(&self) -> i64 {
    i64::from(self.superlikes) * Preference::Superlike.weight()
      + i64::from(self.likes) * Preference::Like.weight()
      + i64::from(self.dislikes) * Preference::Dislike.weight()
  }
}

/// A catalog dish with its computed group score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedDish {
  #[serde(flatten)]
  pub dish:             Dish,
  pub score:            i64,
  pub breakdown:        Breakdown,
  /// Current members who liked or superliked the dish, in vote order.
  pub supporters:       Vec<MemberSummary>,
  /// Filled in after ranking by the location directory; not part of the
  /// ranking itself.
  pub restaurant_count: u32,
}

#[derive(Default)]
struct Tally {
  breakdown:  Breakdown,
  supporters: Vec<MemberSummary>,
}

/// Rank `catalog` by the weighted score of `votes`.
///
/// Ordering is score descending, then total interactions descending, then
/// catalog order. Only votes from `members` for dishes in `catalog` count.
/// Returns an empty list if no vote counts.
pub fn rank_dishes(
  votes: &[Vote],
  members: &[Member],
  catalog: &[Dish],
  top_n: usize,
) -> Vec<RankedDish> {
  let mut tallies: HashMap<&str, Tally> = HashMap::new();
  for vote in votes {
    let Some(member) = members.iter().find(|m| m.id == vote.member_id) else {
      continue;
    };
    if !catalog.iter().any(|d| d.id == vote.dish_id) {
      continue;
    }

    let tally = tallies.entry(vote.dish_id.as_str()).or_default();
    tally.breakdown.add(vote.preference);
    if vote.preference.is_positive() && !tally.supporters.iter().any(|s| s.id == member.id) {
      tally.supporters.push(MemberSummary::from(member));
    }
  }

  if tallies.is_empty() {
    return Vec::new();
  }

  let mut ranked: Vec<RankedDish> = catalog
    .iter()
    .map(|dish| {
      let tally = tallies.remove(dish.id.as_str()).unwrap_or_default();
      RankedDish {
        dish:             dish.clone(),
        score:            tally.breakdown.score(),
        breakdown:        tally.breakdown,
        supporters:       tally.supporters,
        restaurant_count: 0,
      }
    })
    .collect();

  // `sort_by` is stable, so equal keys keep catalog order.
  ranked.sort_by(|a, b| {
    b.score
      .cmp(&a.score)
      .then_with(|| b.breakdown.interactions().cmp(&a.breakdown.interactions()))
  });
  ranked.truncate(top_n);
  ranked
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use uuid::Uuid;

  use super::*;
  use crate::session::{NewMember, SessionCode};

  fn members(n: usize) -> Vec<Member> {
    (0..n)
      .map(|i| NewMember::new(format!("member-{i}")).into_member())
      .collect()
  }

  fn vote(member: &Member, dish: &str, preference: Preference) -> Vote {
    Vote {
      session: SessionCode::new("TEST01"),
      member_id: member.id,
      dish_id: dish.into(),
      preference,
      first_recorded_at: Utc::now(),
      updated_at: Utc::now(),
    }
  }

  fn catalog(ids: &[&str]) -> Vec<Dish> {
    ids.iter().map(|id| Dish::new(*id, format!("Dish {id}"), "Thai")).collect()
  }

  fn order(ranked: &[RankedDish]) -> Vec<&str> {
    ranked.iter().map(|r| r.dish.id.as_str()).collect()
  }

  #[test]
  fn equal_scores_and_interactions_keep_catalog_order() {
    use Preference::*;
    let m = members(4);
    let votes = vec![
      vote(&m[0], "a", Superlike),
      vote(&m[1], "a", Like),
      vote(&m[2], "a", Like),
      vote(&m[3], "a", Dislike),
      vote(&m[0], "b", Like),
      vote(&m[1], "b", Like),
      vote(&m[2], "b", Like),
      vote(&m[3], "b", Like),
    ];

    let ranked = rank_dishes(&votes, &m, &catalog(&["a", "b"]), DEFAULT_TOP_N);
    assert_eq!(order(&ranked), ["a", "b"]);
    assert_eq!(ranked[0].score, 4);
    assert_eq!(ranked[1].score, 4);
    assert_eq!(
      ranked[0].breakdown,
      Breakdown { superlikes: 1, likes: 2, dislikes: 1 }
    );

    let ranked = rank_dishes(&votes, &m, &catalog(&["b", "a"]), DEFAULT_TOP_N);
    assert_eq!(order(&ranked), ["b", "a"]);
  }

  #[test]
  fn unvoted_dish_sorts_below_voted_dish_of_equal_score() {
    use Preference::*;
    let m = members(2);
    let votes = vec![vote(&m[0], "a", Like), vote(&m[1], "a", Dislike)];

    let ranked = rank_dishes(&votes, &m, &catalog(&["c", "a"]), DEFAULT_TOP_N);
    assert_eq!(order(&ranked), ["a", "c"]);

    let c = &ranked[1];
    assert_eq!(c.score, 0);
    assert_eq!(c.breakdown, Breakdown::default());
    assert!(c.supporters.is_empty());
  }

  #[test]
  fn higher_interaction_count_breaks_score_ties() {
    use Preference::*;
    let m = members(3);
    let votes = vec![
      vote(&m[0], "quiet", Like),
      vote(&m[0], "busy", Superlike),
      vote(&m[1], "busy", Dislike),
      vote(&m[2], "busy", Dislike),
    ];

    let ranked = rank_dishes(&votes, &m, &catalog(&["quiet", "busy"]), DEFAULT_TOP_N);
    assert_eq!(order(&ranked), ["busy", "quiet"]);
  }

  #[test]
  fn input_vote_order_does_not_change_ranking() {
    use Preference::*;
    let m = members(3);
    let mut votes = vec![
      vote(&m[0], "a", Like),
      vote(&m[1], "b", Superlike),
      vote(&m[2], "c", Dislike),
      vote(&m[0], "c", Like),
      vote(&m[1], "a", Dislike),
    ];
    let dishes = catalog(&["a", "b", "c"]);

    let forward = rank_dishes(&votes, &m, &dishes, DEFAULT_TOP_N);
    votes.reverse();
    let backward = rank_dishes(&votes, &m, &dishes, DEFAULT_TOP_N);
    assert_eq!(order(&forward), order(&backward));
    assert_eq!(order(&forward), ["b", "a", "c"]);
  }

  #[test]
  fn supporters_follow_vote_order_and_departed_votes_are_ignored() {
    use Preference::*;
    let m = members(3);
    let departed = NewMember::new("gone").into_member();
    let votes = vec![
      vote(&m[2], "a", Superlike),
      vote(&departed, "a", Like),
      vote(&m[1], "a", Dislike),
      vote(&m[0], "a", Like),
    ];

    let ranked = rank_dishes(&votes, &m, &catalog(&["a"]), DEFAULT_TOP_N);
    let ids: Vec<Uuid> = ranked[0].supporters.iter().map(|s| s.id).collect();
    assert_eq!(ids, [m[2].id, m[0].id]);
    assert_eq!(ranked[0].breakdown.likes, 1);
    assert_eq!(ranked[0].score, 3 - 1 + 1);
  }

  #[test]
  fn truncates_to_top_n() {
    use Preference::*;
    let m = members(1);
    let ids: Vec<String> = (0..12).map(|i| format!("d{i}")).collect();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let votes: Vec<Vote> = id_refs.iter().map(|id| vote(&m[0], id, Like)).collect();

    let ranked = rank_dishes(&votes, &m, &catalog(&id_refs), DEFAULT_TOP_N);
    assert_eq!(ranked.len(), DEFAULT_TOP_N);
    assert_eq!(order(&ranked), &id_refs[..DEFAULT_TOP_N]);
  }

  #[test]
  fn no_votes_or_no_catalog_yields_nothing() {
    let m = members(2);
    assert!(rank_dishes(&[], &m, &catalog(&["a"]), DEFAULT_TOP_N).is_empty());

    let votes = vec![vote(&m[0], "a", Preference::Like)];
    assert!(rank_dishes(&votes, &m, &[], DEFAULT_TOP_N).is_empty());
  }

  #[test]
  fn votes_outside_the_catalog_rank_nothing() {
    let m = members(2);
    let votes = vec![
      vote(&m[0], "x", Preference::Superlike),
      vote(&m[1], "y", Preference::Like),
    ];
    assert!(rank_dishes(&votes, &m, &catalog(&["a", "b", "c"]), DEFAULT_TOP_N).is_empty());
  }

  #[test]
  fn only_departed_votes_rank_nothing() {
    let m = members(1);
    let departed = NewMember::new("gone").into_member();
    let votes = vec![vote(&departed, "a", Preference::Superlike)];
    assert!(rank_dishes(&votes, &m, &catalog(&["a"]), DEFAULT_TOP_N).is_empty());
  }
}
