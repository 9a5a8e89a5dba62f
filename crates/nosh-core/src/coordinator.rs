//! [`SessionCoordinator`]: the orchestration layer over a session store.
//!
//! Lifecycle per session: `Forming` → `Voting` (leader starts) → `Complete`
//! (every member has marked themselves done). Nothing moves backwards.
//!
//! The coordinator holds no per-session state of its own; every call looks
//! the session up by code, so any number of coordinators may share a store.

use std::{collections::HashSet, sync::Arc};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  completion::CompletionStatus,
  lookup::Lookups,
  observer::{PollingObserver, SessionEvent, SessionObserver},
  ranking::{DEFAULT_TOP_N, RankedDish, rank_dishes},
  session::{
    CodeSource, Member, MemberSummary, NewMember, NewSession, RandomCodes, Session,
    SessionCode,
  },
  store::DishCatalog,
  vote::{NewVote, Preference, Vote},
};

// ─── Policy ──────────────────────────────────────────────────────────────────

/// Tunables for a coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorPolicy {
  /// Length of the results shortlist.
  pub top_n:              usize,
  /// Accept swipes before the leader has started the session.
  pub allow_early_swipes: bool,
  /// Interval clients are told to poll at, in milliseconds.
  pub poll_interval_ms:   u64,
}

impl Default for CoordinatorPolicy {
  fn default() -> Self {
    Self {
      top_n:              DEFAULT_TOP_N,
      allow_early_swipes: false,
      poll_interval_ms:   2_000,
    }
  }
}

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// Returned by [`SessionCoordinator::mark_done`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkDoneOutcome {
  pub user_completed:  bool,
  pub group_completed: bool,
  pub completed_count: usize,
  pub total_count:     usize,
}

/// Returned by [`SessionCoordinator::results`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupResults {
  pub top_dishes:    Vec<RankedDish>,
  pub group_members: Vec<MemberSummary>,
  pub total_votes:   usize,
  pub unique_voters: usize,
  /// Present only when there is nothing to rank yet.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message:       Option<String>,
}

/// Message returned in place of a ranking when nobody has voted.
pub const NO_VOTES_MESSAGE: &str = "No votes found for this session yet.";

// ─── Coordinator ─────────────────────────────────────────────────────────────

pub struct SessionCoordinator<S> {
  store:    Arc<S>,
  lookups:  Lookups,
  observer: Arc<dyn SessionObserver>,
  codes:    Arc<dyn CodeSource>,
  policy:   CoordinatorPolicy,
}

impl<S: DishCatalog> SessionCoordinator<S> {
  /// A coordinator with default policy, no-op lookups, polling delivery and
  /// random join codes.
  pub fn new(store: Arc<S>) -> Self {
    Self {
      store,
      lookups: Lookups::default(),
      observer: Arc::new(PollingObserver),
      codes: Arc::new(RandomCodes),
      policy: CoordinatorPolicy::default(),
    }
  }

  pub fn with_lookups(mut self, lookups: Lookups) -> Self {
    self.lookups = lookups;
    self
  }

  pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
    self.observer = observer;
    self
  }

  pub fn with_code_source(mut self, codes: Arc<dyn CodeSource>) -> Self {
    self.codes = codes;
    self
  }

  pub fn with_policy(mut self, policy: CoordinatorPolicy) -> Self {
    self.policy = policy;
    self
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn policy(&self) -> &CoordinatorPolicy { &self.policy }

  async fn load(&self, code: &SessionCode) -> Result<Session> {
    self
      .store
      .get_session(code)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::SessionNotFound(code.clone()))
  }

  fn notify(&self, code: &SessionCode, event: SessionEvent) {
    self.observer.notify(code, &event);
  }

  // ── Registry ──────────────────────────────────────────────────────────────

  /// Create a session led by `creator`, drawing join codes until one is free.
  pub async fn create_session(
    &self,
    creator: NewMember,
    name: Option<String>,
  ) -> Result<Session> {
    let creator = validated(creator, "creatorName")?;
    let name = name
      .map(|n| n.trim().to_owned())
      .filter(|n| !n.is_empty())
      .unwrap_or_else(|| format!("{}'s group", creator.display_name));
    let leader = creator.into_member();

    loop {
      let code = self.codes.draw();
      let new = NewSession {
        code:   code.clone(),
        name:   name.clone(),
        leader: leader.clone(),
      };

      match self.store.insert_session(new).await.map_err(Error::store)? {
        Some(session) => {
          tracing::info!(code = %session.code, leader = %session.leader_id, "session created");
          self.notify(&session.code, SessionEvent::Created {
            leader_id: session.leader_id,
          });
          return Ok(session);
        }
        None => tracing::debug!(%code, "join code collision; drawing another"),
      }
    }
  }

  pub async fn join_session(
    &self,
    code: &SessionCode,
    member: NewMember,
  ) -> Result<Member> {
    let member = validated(member, "displayName")?;
    let member = self
      .store
      .add_member(code, member)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::SessionNotFound(code.clone()))?;

    tracing::info!(%code, member = %member.id, "member joined");
    self.notify(code, SessionEvent::MemberJoined { member_id: member.id });
    Ok(member)
  }

  /// Remove a non-leader member. Their votes stay on record.
  pub async fn leave_session(&self, code: &SessionCode, member_id: Uuid) -> Result<()> {
    let session = self.load(code).await?;
    if session.is_leader(member_id) {
      return Err(Error::LeaderCannotLeave);
    }

    let removed = self
      .store
      .remove_member(code, member_id)
      .await
      .map_err(Error::store)?;
    if !removed {
      return Err(Error::MemberNotFound { code: code.clone(), member: member_id });
    }

    tracing::info!(%code, member = %member_id, "member left");
    self.notify(code, SessionEvent::MemberLeft { member_id });
    Ok(())
  }

  pub async fn get_session(&self, code: &SessionCode) -> Result<Session> {
    self.load(code).await
  }

  pub async fn list_members(&self, code: &SessionCode) -> Result<Vec<Member>> {
    Ok(self.load(code).await?.members)
  }

  /// Lock the session for voting. Leader only, and only once.
  pub async fn start_session(&self, code: &SessionCode, member_id: Uuid) -> Result<()> {
    let session = self.load(code).await?;
    if !session.is_leader(member_id) {
      return Err(Error::LeaderOnly);
    }

    let flipped = self.store.set_started(code).await.map_err(Error::store)?;
    if !flipped {
      return Err(Error::AlreadyStarted(code.clone()));
    }

    tracing::info!(%code, members = session.members.len(), "session started");
    self.notify(code, SessionEvent::Started);
    Ok(())
  }

  pub async fn has_started(&self, code: &SessionCode) -> Result<bool> {
    Ok(self.load(code).await?.started)
  }

  // ── Voting ────────────────────────────────────────────────────────────────

  /// Record (or overwrite) a member's preference for a dish.
  pub async fn submit_swipe(
    &self,
    code: &SessionCode,
    member_id: Uuid,
    dish_id: &str,
    preference: Preference,
  ) -> Result<Vote> {
    let dish_id = dish_id.trim();
    if dish_id.is_empty() {
      return Err(Error::MissingField("itemId"));
    }

    let session = self.load(code).await?;
    if !session.is_member(member_id) {
      return Err(Error::NotAMember { code: code.clone(), member: member_id });
    }
    if !session.started && !self.policy.allow_early_swipes {
      return Err(Error::NotStarted(code.clone()));
    }
    if self
      .store
      .get_dish(dish_id)
      .await
      .map_err(Error::store)?
      .is_none()
    {
      return Err(Error::DishNotFound(dish_id.to_owned()));
    }

    let vote = self
      .store
      .record_vote(NewVote {
        session: code.clone(),
        member_id,
        dish_id: dish_id.to_owned(),
        preference,
      })
      .await
      .map_err(Error::store)?;

    tracing::debug!(%code, member = %member_id, dish = dish_id, %preference, "swipe recorded");
    Ok(vote)
  }

  // ── Completion ────────────────────────────────────────────────────────────

  /// Flag a member as finished and report where the group stands.
  pub async fn mark_done(
    &self,
    code: &SessionCode,
    member_id: Uuid,
  ) -> Result<MarkDoneOutcome> {
    let session = self.load(code).await?;
    let not_a_member = || Error::NotAMember { code: code.clone(), member: member_id };
    if !session.is_member(member_id) {
      return Err(not_a_member());
    }

    let marked = self
      .store
      .mark_member_done(code, member_id)
      .await
      .map_err(Error::store)?;
    if !marked {
      // Left between the roster read and the write.
      return Err(not_a_member());
    }

    if !session.member(member_id).is_some_and(|m| m.has_finished_voting) {
      tracing::info!(%code, member = %member_id, "member finished voting");
      self.notify(code, SessionEvent::MemberFinished { member_id });
    }

    let status = self.completion_status(code).await?;
    Ok(MarkDoneOutcome {
      user_completed:  true,
      group_completed: status.all_completed,
      completed_count: status.completed_count,
      total_count:     status.total_count,
    })
  }

  /// Current progress of the roster. Latches the session's `completed` flag
  /// the first time every member is done.
  pub async fn completion_status(&self, code: &SessionCode) -> Result<CompletionStatus> {
    let session = self.load(code).await?;
    let status = CompletionStatus::from_members(&session.members);

    if status.all_completed && !session.completed {
      let latched = self.store.set_completed(code).await.map_err(Error::store)?;
      if latched {
        tracing::info!(%code, members = status.total_count, "session complete");
        self.notify(code, SessionEvent::Completed);
      }
    }

    Ok(status)
  }

  /// Completion derived from vote counts instead of done flags.
  ///
  /// For clients that never call [`mark_done`](Self::mark_done); does not
  /// latch the session's `completed` flag.
  pub async fn completion_by_votes(&self, code: &SessionCode) -> Result<CompletionStatus> {
    let session = self.load(code).await?;
    let mut counts = Vec::with_capacity(session.members.len());
    for member in &session.members {
      let n = self
        .store
        .vote_count_for_member(code, member.id)
        .await
        .map_err(Error::store)?;
      counts.push((member.id, n));
    }
    Ok(CompletionStatus::from_vote_counts(&session.members, &counts))
  }

  // ── Results ───────────────────────────────────────────────────────────────

  /// Rank the catalog by the session's votes. Computable in any state.
  ///
  /// Only votes cast by current members for catalog dishes are counted;
  /// votes of departed members stay in the store but drop out of results.
  pub async fn results(&self, code: &SessionCode) -> Result<GroupResults> {
    let session = self.load(code).await?;
    let group_members: Vec<MemberSummary> =
      session.members.iter().map(MemberSummary::from).collect();

    let catalog = self.store.list_dishes().await.map_err(Error::store)?;
    let votes: Vec<Vote> = self
      .store
      .votes_for_session(code)
      .await
      .map_err(Error::store)?
      .into_iter()
      .filter(|v| session.is_member(v.member_id))
      .filter(|v| catalog.iter().any(|d| d.id == v.dish_id))
      .collect();

    if votes.is_empty() {
      return Ok(GroupResults {
        top_dishes: Vec::new(),
        group_members,
        total_votes: 0,
        unique_voters: 0,
        message: Some(NO_VOTES_MESSAGE.to_owned()),
      });
    }

    let mut top_dishes =
      rank_dishes(&votes, &session.members, &catalog, self.policy.top_n);

    for ranked in &mut top_dishes {
      if ranked.dish.cuisine.trim().is_empty() {
        ranked.dish.cuisine = self.lookups.cuisine_or_default(&ranked.dish.name).await;
      }
      if ranked.dish.image.as_deref().is_none_or(|i| i.trim().is_empty()) {
        ranked.dish.image = Some(self.lookups.image_or_default(&ranked.dish.name).await);
      }
      ranked.restaurant_count = self
        .lookups
        .restaurant_count_or_default(&ranked.dish.cuisine)
        .await;
    }

    let unique_voters = votes
      .iter()
      .map(|v| v.member_id)
      .collect::<HashSet<_>>()
      .len();

    Ok(GroupResults {
      top_dishes,
      group_members,
      total_votes: votes.len(),
      unique_voters,
      message: None,
    })
  }
}

fn validated(mut member: NewMember, field: &'static str) -> Result<NewMember> {
  member.display_name = member.display_name.trim().to_owned();
  if member.display_name.is_empty() {
    return Err(Error::MissingField(field));
  }
  Ok(member)
}
