//! Integration tests for `SqliteStore` against an in-memory database.

use nosh_core::{
  dish::Dish,
  session::{NewMember, NewSession, Session, SessionCode},
  store::{DishCatalog, SessionStore},
  vote::{NewVote, Preference},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn session(s: &SqliteStore, code: &str) -> Session {
  s.insert_session(NewSession {
    code:   SessionCode::new(code),
    name:   "Lunch crew".into(),
    leader: NewMember::new("Alex").into_member(),
  })
  .await
  .unwrap()
  .expect("code is free")
}

fn vote(code: &SessionCode, member_id: Uuid, dish: &str, preference: Preference) -> NewVote {
  NewVote {
    session: code.clone(),
    member_id,
    dish_id: dish.into(),
    preference,
  }
}

// ─── Sessions ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get_session() {
  let s = store().await;
  let created = session(&s, "ABC123").await;

  let fetched = s.get_session(&created.code).await.unwrap().unwrap();
  assert_eq!(fetched.code, created.code);
  assert_eq!(fetched.name, "Lunch crew");
  assert_eq!(fetched.leader_id, created.leader_id);
  assert_eq!(fetched.members.len(), 1);
  assert_eq!(fetched.members[0].id, created.leader_id);
  assert!(!fetched.started);
  assert!(!fetched.completed);
}

#[tokio::test]
async fn get_session_missing_returns_none() {
  let s = store().await;
  let result = s.get_session(&SessionCode::new("NOPE00")).await.unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn taken_code_is_reported_without_writing() {
  let s = store().await;
  let first = session(&s, "DUP001").await;

  let second = s
    .insert_session(NewSession {
      code:   SessionCode::new("DUP001"),
      name:   "Other".into(),
      leader: NewMember::new("Sam").into_member(),
    })
    .await
    .unwrap();
  assert!(second.is_none());

  let fetched = s.get_session(&first.code).await.unwrap().unwrap();
  assert_eq!(fetched.name, "Lunch crew");
  assert_eq!(fetched.members.len(), 1);
}

// ─── Roster ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn members_are_listed_in_join_order() {
  let s = store().await;
  let created = session(&s, "ROSTER").await;

  let sarah = s
    .add_member(&created.code, NewMember::new("Sarah"))
    .await
    .unwrap()
    .unwrap();
  let mike = s
    .add_member(
      &created.code,
      NewMember::new("Mike").with_avatar(Some("blob-3".into())),
    )
    .await
    .unwrap()
    .unwrap();

  let fetched = s.get_session(&created.code).await.unwrap().unwrap();
  let ids: Vec<Uuid> = fetched.members.iter().map(|m| m.id).collect();
  assert_eq!(ids, [created.leader_id, sarah.id, mike.id]);
  assert_eq!(fetched.members[2].avatar.as_deref(), Some("blob-3"));
}

#[tokio::test]
async fn duplicate_display_names_are_distinct_members() {
  let s = store().await;
  let created = session(&s, "TWINS1").await;

  let a = s.add_member(&created.code, NewMember::new("Sam")).await.unwrap().unwrap();
  let b = s.add_member(&created.code, NewMember::new("Sam")).await.unwrap().unwrap();
  assert_ne!(a.id, b.id);

  let fetched = s.get_session(&created.code).await.unwrap().unwrap();
  assert_eq!(fetched.members.len(), 3);
}

#[tokio::test]
async fn add_member_to_missing_session_returns_none() {
  let s = store().await;
  let result = s
    .add_member(&SessionCode::new("GHOST1"), NewMember::new("Sam"))
    .await
    .unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn concurrent_joins_are_all_kept() {
  let s = store().await;
  let created = session(&s, "RUSH01").await;

  let joins = (0..16).map(|i| {
    let s = s.clone();
    let code = created.code.clone();
    tokio::spawn(async move {
      s.add_member(&code, NewMember::new(format!("guest-{i}")))
        .await
        .unwrap()
        .unwrap()
    })
  });

  let mut ids = Vec::new();
  for handle in joins.collect::<Vec<_>>() {
    ids.push(handle.await.unwrap().id);
  }
  ids.sort();
  ids.dedup();
  assert_eq!(ids.len(), 16);

  let fetched = s.get_session(&created.code).await.unwrap().unwrap();
  assert_eq!(fetched.members.len(), 17);
}

#[tokio::test]
async fn remove_member_keeps_votes() {
  let s = store().await;
  let created = session(&s, "LEAVE1").await;
  let sam = s.add_member(&created.code, NewMember::new("Sam")).await.unwrap().unwrap();

  s.record_vote(vote(&created.code, sam.id, "dish1", Preference::Like))
    .await
    .unwrap();

  assert!(s.remove_member(&created.code, sam.id).await.unwrap());
  assert!(!s.remove_member(&created.code, sam.id).await.unwrap());

  let fetched = s.get_session(&created.code).await.unwrap().unwrap();
  assert!(!fetched.is_member(sam.id));

  let votes = s.votes_for_session(&created.code).await.unwrap();
  assert_eq!(votes.len(), 1);
  assert_eq!(votes[0].member_id, sam.id);
}

// ─── Latches ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn started_flips_exactly_once() {
  let s = store().await;
  let created = session(&s, "START1").await;

  assert!(s.set_started(&created.code).await.unwrap());
  assert!(!s.set_started(&created.code).await.unwrap());
  assert!(s.get_session(&created.code).await.unwrap().unwrap().started);
}

#[tokio::test]
async fn completed_flips_exactly_once_under_contention() {
  let s = store().await;
  let created = session(&s, "DONE01").await;

  let racers: Vec<_> = (0..8)
    .map(|_| {
      let s = s.clone();
      let code = created.code.clone();
      tokio::spawn(async move { s.set_completed(&code).await.unwrap() })
    })
    .collect();

  let mut winners = 0;
  for r in racers {
    if r.await.unwrap() {
      winners += 1;
    }
  }
  assert_eq!(winners, 1);
}

#[tokio::test]
async fn mark_member_done_is_idempotent() {
  let s = store().await;
  let created = session(&s, "MARK01").await;

  assert!(s.mark_member_done(&created.code, created.leader_id).await.unwrap());
  assert!(s.mark_member_done(&created.code, created.leader_id).await.unwrap());
  assert!(!s.mark_member_done(&created.code, Uuid::new_v4()).await.unwrap());

  let fetched = s.get_session(&created.code).await.unwrap().unwrap();
  assert!(fetched.members[0].has_finished_voting);
}

// ─── Votes ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn reswipe_overwrites_in_place() {
  let s = store().await;
  let created = session(&s, "VOTE01").await;
  let leader = created.leader_id;

  let first = s
    .record_vote(vote(&created.code, leader, "dish1", Preference::Like))
    .await
    .unwrap();
  s.record_vote(vote(&created.code, leader, "dish2", Preference::Dislike))
    .await
    .unwrap();
  let again = s
    .record_vote(vote(&created.code, leader, "dish1", Preference::Superlike))
    .await
    .unwrap();

  assert_eq!(again.first_recorded_at, first.first_recorded_at);

  let votes = s.votes_for_session(&created.code).await.unwrap();
  assert_eq!(votes.len(), 2);
  assert_eq!(votes[0].dish_id, "dish1");
  assert_eq!(votes[0].preference, Preference::Superlike);
  assert_eq!(votes[1].dish_id, "dish2");

  assert_eq!(s.vote_count_for_member(&created.code, leader).await.unwrap(), 2);
}

#[tokio::test]
async fn votes_are_scoped_to_their_session() {
  let s = store().await;
  let one = session(&s, "SCOPE1").await;
  let two = session(&s, "SCOPE2").await;

  s.record_vote(vote(&one.code, one.leader_id, "dish1", Preference::Like))
    .await
    .unwrap();

  assert_eq!(s.votes_for_session(&one.code).await.unwrap().len(), 1);
  assert!(s.votes_for_session(&two.code).await.unwrap().is_empty());
  assert_eq!(s.vote_count_for_member(&two.code, one.leader_id).await.unwrap(), 0);
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn catalog_keeps_insertion_order_across_upserts() {
  let s = store().await;
  s.upsert_dish(Dish::new("dish1", "Thai Green Curry", "Thai")).await.unwrap();
  s.upsert_dish(Dish::new("dish2", "Laksa", "")).await.unwrap();

  let mut updated = Dish::new("dish1", "Thai Green Curry", "Thai");
  updated.image = Some("/img/curry.jpg".into());
  s.upsert_dish(updated).await.unwrap();

  let dishes = s.list_dishes().await.unwrap();
  let ids: Vec<&str> = dishes.iter().map(|d| d.id.as_str()).collect();
  assert_eq!(ids, ["dish1", "dish2"]);
  assert_eq!(dishes[0].image.as_deref(), Some("/img/curry.jpg"));
  assert_eq!(dishes[1].cuisine, "");
}

#[tokio::test]
async fn get_dish_finds_only_catalog_entries() {
  let s = store().await;
  s.upsert_dish(Dish::new("dish1", "Thai Green Curry", "Thai")).await.unwrap();

  let found = s.get_dish("dish1").await.unwrap().unwrap();
  assert_eq!(found.name, "Thai Green Curry");
  assert!(s.get_dish("dish99").await.unwrap().is_none());
}
