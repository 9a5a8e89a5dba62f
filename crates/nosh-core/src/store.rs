//! The `SessionStore` and `DishCatalog` traits.
//!
//! Implemented by storage backends (e.g. `nosh-store-sqlite`). The
//! coordinator depends on these abstractions, never on a concrete backend.
//!
//! Every mutating method must be atomic with respect to the entity it
//! touches: two concurrent calls for the same session may not interleave.

use std::future::Future;

use uuid::Uuid;

use crate::{
  dish::Dish,
  session::{Member, NewMember, NewSession, Session, SessionCode},
  vote::{NewVote, Vote},
};

// ─── Sessions and votes ──────────────────────────────────────────────────────

/// Abstraction over the shared durable store holding sessions and votes.
///
/// Methods report "does not exist" through `Option`/`bool` rather than
/// errors; `Self::Error` is reserved for backend failures.
pub trait SessionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Registry ──────────────────────────────────────────────────────────

  /// Insert a session and its leader in one atomic check-then-insert.
  ///
  /// Returns `None` if `new.code` is already held by another session, in
  /// which case nothing is written.
  fn insert_session(
    &self,
    new: NewSession,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + '_;

  /// Retrieve a session with its full roster. Returns `None` if not found.
  fn get_session<'a>(
    &'a self,
    code: &'a SessionCode,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + 'a;

  /// Append a member to the roster. Returns `None` if the session does not
  /// exist.
  fn add_member<'a>(
    &'a self,
    code: &'a SessionCode,
    member: NewMember,
  ) -> impl Future<Output = Result<Option<Member>, Self::Error>> + Send + 'a;

  /// Remove a member from the roster, leaving their votes in place.
  /// Returns `false` if no such member was in the session.
  fn remove_member<'a>(
    &'a self,
    code: &'a SessionCode,
    member_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Flip `started` from false to true. Returns `true` only for the call
  /// that performed the flip.
  fn set_started<'a>(
    &'a self,
    code: &'a SessionCode,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Flip `completed` from false to true. Returns `true` only for the call
  /// that performed the flip.
  fn set_completed<'a>(
    &'a self,
    code: &'a SessionCode,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Set a member's done flag. Idempotent. Returns `false` if the member is
  /// not currently in the session.
  fn mark_member_done<'a>(
    &'a self,
    code: &'a SessionCode,
    member_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  // ── Votes ─────────────────────────────────────────────────────────────

  /// Upsert a vote by `(session, member, dish)`. The caller has already
  /// verified membership.
  fn record_vote(
    &self,
    vote: NewVote,
  ) -> impl Future<Output = Result<Vote, Self::Error>> + Send + '_;

  /// All live votes for a session, one per `(member, dish)`, ordered by when
  /// each pair was first voted on.
  fn votes_for_session<'a>(
    &'a self,
    code: &'a SessionCode,
  ) -> impl Future<Output = Result<Vec<Vote>, Self::Error>> + Send + 'a;

  /// Number of distinct dishes a member has voted on in a session.
  fn vote_count_for_member<'a>(
    &'a self,
    code: &'a SessionCode,
    member_id: Uuid,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

/// Read access to the votable dish catalog, plus the seeding entry point.
pub trait DishCatalog: SessionStore {
  /// All dishes in catalog order.
  fn list_dishes(
    &self,
  ) -> impl Future<Output = Result<Vec<Dish>, Self::Error>> + Send + '_;

  /// Look up one dish by id. Returns `None` if it is not in the catalog.
  fn get_dish<'a>(
    &'a self,
    dish_id: &'a str,
  ) -> impl Future<Output = Result<Option<Dish>, Self::Error>> + Send + 'a;

  /// Insert or replace a dish by id. Replacing keeps the original position.
  fn upsert_dish(
    &self,
    dish: Dish,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
