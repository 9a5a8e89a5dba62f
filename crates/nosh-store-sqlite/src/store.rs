//! [`SqliteStore`] is the SQLite implementation of [`SessionStore`] and
//! [`DishCatalog`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use nosh_core::{
  dish::Dish,
  session::{Member, NewMember, NewSession, Session, SessionCode},
  store::{DishCatalog, SessionStore},
  vote::{NewVote, Vote},
};

use crate::{
  Result,
  encode::{
    RawMember, RawSession, RawVote, decode_dt, encode_dt, encode_preference,
    encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Row readers ─────────────────────────────────────────────────────────────

const MEMBER_COLUMNS: &str =
  "member_id, display_name, avatar, finished_voting, joined_at";

fn read_member(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawMember> {
  Ok(RawMember {
    member_id:       row.get(0)?,
    display_name:    row.get(1)?,
    avatar:          row.get(2)?,
    finished_voting: row.get(3)?,
    joined_at:       row.get(4)?,
  })
}

fn read_vote(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawVote> {
  Ok(RawVote {
    session_code:      row.get(0)?,
    member_id:         row.get(1)?,
    dish_id:           row.get(2)?,
    preference:        row.get(3)?,
    first_recorded_at: row.get(4)?,
    updated_at:        row.get(5)?,
  })
}

fn read_dish(row: &rusqlite::Row<'_>) -> rusqlite::Result<Dish> {
  Ok(Dish {
    id:          row.get(0)?,
    name:        row.get(1)?,
    cuisine:     row.get(2)?,
    image:       row.get(3)?,
    restaurant:  row.get(4)?,
    description: row.get(5)?,
  })
}

fn insert_member(
  conn: &rusqlite::Connection,
  code: &str,
  member: &Member,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO members (member_id, session_code, display_name, avatar, finished_voting, joined_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    rusqlite::params![
      encode_uuid(member.id),
      code,
      member.display_name,
      member.avatar,
      member.has_finished_voting,
      encode_dt(member.joined_at),
    ],
  )?;
  Ok(())
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A nosh store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── SessionStore impl ───────────────────────────────────────────────────────

impl SessionStore for SqliteStore {
  type Error = crate::Error;

  // ── Registry ──────────────────────────────────────────────────────────────

  async fn insert_session(&self, new: NewSession) -> Result<Option<Session>> {
    let session = Session {
      code:       new.code,
      name:       new.name,
      leader_id:  new.leader.id,
      members:    vec![new.leader],
      started:    false,
      completed:  false,
      created_at: Utc::now(),
    };

    let code_str   = session.code.as_str().to_owned();
    let name       = session.name.clone();
    let leader_str = encode_uuid(session.leader_id);
    let at_str     = encode_dt(session.created_at);
    let leader     = session.members[0].clone();

    let inserted: bool = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let taken = tx
          .query_row(
            "SELECT 1 FROM sessions WHERE code = ?1",
            rusqlite::params![code_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if taken {
          return Ok(false);
        }

        tx.execute(
          "INSERT INTO sessions (code, name, leader_id, started, completed, created_at)
           VALUES (?1, ?2, ?3, 0, 0, ?4)",
          rusqlite::params![code_str, name, leader_str, at_str],
        )?;
        insert_member(&tx, &code_str, &leader)?;

        tx.commit()?;
        Ok(true)
      })
      .await?;

    Ok(inserted.then_some(session))
  }

  async fn get_session(&self, code: &SessionCode) -> Result<Option<Session>> {
    let code_str = code.as_str().to_owned();

    let raw: Option<(RawSession, Vec<RawMember>)> = self
      .conn
      .call(move |conn| {
        let session = conn
          .query_row(
            "SELECT code, name, leader_id, started, completed, created_at
             FROM sessions WHERE code = ?1",
            rusqlite::params![code_str],
            |row| {
              Ok(RawSession {
                code:       row.get(0)?,
                name:       row.get(1)?,
                leader_id:  row.get(2)?,
                started:    row.get(3)?,
                completed:  row.get(4)?,
                created_at: row.get(5)?,
              })
            },
          )
          .optional()?;

        let Some(session) = session else {
          return Ok(None);
        };

        let mut stmt = conn.prepare(&format!(
          "SELECT {MEMBER_COLUMNS} FROM members WHERE session_code = ?1 ORDER BY rowid"
        ))?;
        let members = stmt
          .query_map(rusqlite::params![code_str], read_member)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some((session, members)))
      })
      .await?;

    raw
      .map(|(session, members)| session.into_session(members))
      .transpose()
  }

  async fn add_member(
    &self,
    code: &SessionCode,
    member: NewMember,
  ) -> Result<Option<Member>> {
    let member   = member.into_member();
    let code_str = code.as_str().to_owned();
    let row      = member.clone();

    let added: bool = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let exists = tx
          .query_row(
            "SELECT 1 FROM sessions WHERE code = ?1",
            rusqlite::params![code_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !exists {
          return Ok(false);
        }

        insert_member(&tx, &code_str, &row)?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    Ok(added.then_some(member))
  }

  async fn remove_member(&self, code: &SessionCode, member_id: Uuid) -> Result<bool> {
    let code_str = code.as_str().to_owned();
    let id_str   = encode_uuid(member_id);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM members WHERE session_code = ?1 AND member_id = ?2",
          rusqlite::params![code_str, id_str],
        )?)
      })
      .await?;

    Ok(removed == 1)
  }

  async fn set_started(&self, code: &SessionCode) -> Result<bool> {
    let code_str = code.as_str().to_owned();

    let flipped = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE sessions SET started = 1 WHERE code = ?1 AND started = 0",
          rusqlite::params![code_str],
        )?)
      })
      .await?;

    Ok(flipped == 1)
  }

  async fn set_completed(&self, code: &SessionCode) -> Result<bool> {
    let code_str = code.as_str().to_owned();

    let flipped = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE sessions SET completed = 1 WHERE code = ?1 AND completed = 0",
          rusqlite::params![code_str],
        )?)
      })
      .await?;

    Ok(flipped == 1)
  }

  async fn mark_member_done(&self, code: &SessionCode, member_id: Uuid) -> Result<bool> {
    let code_str = code.as_str().to_owned();
    let id_str   = encode_uuid(member_id);

    // SQLite counts matched rows, so re-marking still reports 1.
    let matched = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE members SET finished_voting = 1
           WHERE session_code = ?1 AND member_id = ?2",
          rusqlite::params![code_str, id_str],
        )?)
      })
      .await?;

    Ok(matched == 1)
  }

  // ── Votes ─────────────────────────────────────────────────────────────────

  async fn record_vote(&self, vote: NewVote) -> Result<Vote> {
    let now        = Utc::now();
    let code_str   = vote.session.as_str().to_owned();
    let member_str = encode_uuid(vote.member_id);
    let dish_id    = vote.dish_id.clone();
    let pref_str   = encode_preference(vote.preference);
    let now_str    = encode_dt(now);

    let first_recorded: String = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "INSERT INTO votes
             (session_code, member_id, dish_id, preference, first_recorded_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?5)
           ON CONFLICT (session_code, member_id, dish_id)
           DO UPDATE SET preference = excluded.preference,
                         updated_at = excluded.updated_at
           RETURNING first_recorded_at",
          rusqlite::params![code_str, member_str, dish_id, pref_str, now_str],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(Vote {
      session:           vote.session,
      member_id:         vote.member_id,
      dish_id:           vote.dish_id,
      preference:        vote.preference,
      first_recorded_at: decode_dt(&first_recorded)?,
      updated_at:        now,
    })
  }

  async fn votes_for_session(&self, code: &SessionCode) -> Result<Vec<Vote>> {
    let code_str = code.as_str().to_owned();

    let raws: Vec<RawVote> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT session_code, member_id, dish_id, preference, first_recorded_at, updated_at
           FROM votes WHERE session_code = ?1 ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![code_str], read_vote)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawVote::into_vote).collect()
  }

  async fn vote_count_for_member(
    &self,
    code: &SessionCode,
    member_id: Uuid,
  ) -> Result<u64> {
    let code_str = code.as_str().to_owned();
    let id_str   = encode_uuid(member_id);

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM votes WHERE session_code = ?1 AND member_id = ?2",
          rusqlite::params![code_str, id_str],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(count.max(0) as u64)
  }
}

// ─── DishCatalog impl ────────────────────────────────────────────────────────

impl DishCatalog for SqliteStore {
  async fn list_dishes(&self) -> Result<Vec<Dish>> {
    let dishes = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT dish_id, name, cuisine, image, restaurant, description
           FROM dishes ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map([], read_dish)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(dishes)
  }

  async fn get_dish(&self, dish_id: &str) -> Result<Option<Dish>> {
    let id = dish_id.to_owned();

    let dish = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT dish_id, name, cuisine, image, restaurant, description
               FROM dishes WHERE dish_id = ?1",
              rusqlite::params![id],
              read_dish,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(dish)
  }

  async fn upsert_dish(&self, dish: Dish) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO dishes (dish_id, name, cuisine, image, restaurant, description)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)
           ON CONFLICT (dish_id) DO UPDATE SET
             name        = excluded.name,
             cuisine     = excluded.cuisine,
             image       = excluded.image,
             restaurant  = excluded.restaurant,
             description = excluded.description",
          rusqlite::params![
            dish.id,
            dish.name,
            dish.cuisine,
            dish.image,
            dish.restaurant,
            dish.description,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
