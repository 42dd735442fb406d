//! [`SqliteStore`] — the SQLite implementation of [`WonderStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use wonders_core::{
  discussion::Discussion,
  identity::{
    ActivityStreak, EditPrivileges, Identity, NewIdentity, Permissions,
    Reputation, Role,
  },
  reputation::{EventKind, ReputationEvent},
  revision::{Revision, RevisionSummary},
  store::WonderStore,
  wonder::Wonder,
};

use crate::{
  Error, Result,
  encode::{decode_doc, encode_doc, encode_dt, encode_uuid},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A BackyardWonders store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All writes
/// funnel through the one connection, which serialises concurrent
/// read-modify-write sequences in practice.
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

  /// Open an in-memory store — useful for testing.
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

  /// Fetch a single `doc` column by primary key from `table`.
  async fn get_doc(
    &self,
    sql: &'static str,
    key: String,
  ) -> Result<Option<String>> {
    let doc: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(sql, rusqlite::params![key], |row| row.get(0))
            .optional()?,
        )
      })
      .await?;
    Ok(doc)
  }
}

// ─── WonderStore impl ────────────────────────────────────────────────────────

impl WonderStore for SqliteStore {
  type Error = Error;

  // ── Identities ────────────────────────────────────────────────────────────

  async fn add_identity(&self, input: NewIdentity) -> Result<Identity> {
    let identity = Identity {
      identity_id:     Uuid::new_v4(),
      external_id:     input.external_id,
      email:           input.email,
      display_name:    input.display_name,
      picture:         input.picture,
      role:            Role::Beginner,
      edit_privileges: EditPrivileges::None,
      permissions:     Permissions::default(),
      reputation:      Reputation::default(),
      activity_streak: ActivityStreak::default(),
      created_at:      Utc::now(),
    };

    let id_str = encode_uuid(identity.identity_id);
    let external = identity.external_id.clone();
    let email = identity.email.clone();
    let doc = encode_doc(&identity)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO identities (identity_id, external_id, email, doc)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, external, email, doc],
        )?;
        Ok(())
      })
      .await?;

    Ok(identity)
  }

  async fn get_identity(&self, id: Uuid) -> Result<Option<Identity>> {
    let doc = self
      .get_doc(
        "SELECT doc FROM identities WHERE identity_id = ?1",
        encode_uuid(id),
      )
      .await?;
    doc.as_deref().map(decode_doc).transpose()
  }

  async fn put_identity(&self, identity: &Identity) -> Result<()> {
    let id_str = encode_uuid(identity.identity_id);
    let email = identity.email.clone();
    let doc = encode_doc(identity)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE identities SET email = ?2, doc = ?3 WHERE identity_id = ?1",
          rusqlite::params![id_str, email, doc],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Wonders ───────────────────────────────────────────────────────────────

  async fn add_wonder(&self, wonder: &Wonder) -> Result<()> {
    let id_str = encode_uuid(wonder.wonder_id);
    let slug = wonder.slug.clone();
    let at_str = encode_dt(wonder.created_at);
    let doc = encode_doc(wonder)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO wonders (wonder_id, slug, created_at, doc)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, slug, at_str, doc],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_wonder(&self, id: Uuid) -> Result<Option<Wonder>> {
    let doc = self
      .get_doc("SELECT doc FROM wonders WHERE wonder_id = ?1", encode_uuid(id))
      .await?;
    doc.as_deref().map(decode_doc).transpose()
  }

  async fn get_wonder_by_slug(&self, slug: &str) -> Result<Option<Wonder>> {
    let doc = self
      .get_doc("SELECT doc FROM wonders WHERE slug = ?1", slug.to_owned())
      .await?;
    doc.as_deref().map(decode_doc).transpose()
  }

  async fn put_wonder(&self, wonder: &Wonder) -> Result<()> {
    let id_str = encode_uuid(wonder.wonder_id);
    let slug = wonder.slug.clone();
    let doc = encode_doc(wonder)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE wonders SET slug = ?2, doc = ?3 WHERE wonder_id = ?1",
          rusqlite::params![id_str, slug, doc],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Revisions ─────────────────────────────────────────────────────────────

  async fn add_revision(&self, revision: &Revision) -> Result<()> {
    let id_str = encode_uuid(revision.revision_id);
    let wonder_str = encode_uuid(revision.wonder_id);
    let editor_str = encode_uuid(revision.editor);
    let status = revision.outcome.discriminant().to_owned();
    let version = revision.version.map(i64::from);
    let at_str = encode_dt(revision.created_at);
    let doc = encode_doc(revision)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO revisions
             (revision_id, wonder_id, editor, status, version, created_at, doc)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str, wonder_str, editor_str, status, version, at_str, doc
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_revision(&self, id: Uuid) -> Result<Option<Revision>> {
    let doc = self
      .get_doc(
        "SELECT doc FROM revisions WHERE revision_id = ?1",
        encode_uuid(id),
      )
      .await?;
    doc.as_deref().map(decode_doc).transpose()
  }

  async fn get_revision_by_version(
    &self,
    wonder_id: Uuid,
    version: u32,
  ) -> Result<Option<Revision>> {
    let wonder_str = encode_uuid(wonder_id);
    let version = i64::from(version);

    let doc: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT doc FROM revisions WHERE wonder_id = ?1 AND version = ?2",
              rusqlite::params![wonder_str, version],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    doc.as_deref().map(decode_doc).transpose()
  }

  async fn list_revisions(
    &self,
    wonder_id: Uuid,
  ) -> Result<Vec<RevisionSummary>> {
    let wonder_str = encode_uuid(wonder_id);

    let docs: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT doc FROM revisions
           WHERE wonder_id = ?1
           ORDER BY created_at DESC, revision_id DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![wonder_str], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    docs
      .iter()
      .map(|doc| Ok(decode_doc::<Revision>(doc)?.summary()))
      .collect()
  }

  async fn put_revision(&self, revision: &Revision) -> Result<()> {
    let id_str = encode_uuid(revision.revision_id);
    let status = revision.outcome.discriminant().to_owned();
    let version = revision.version.map(i64::from);
    let doc = encode_doc(revision)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE revisions SET status = ?2, version = ?3, doc = ?4
           WHERE revision_id = ?1",
          rusqlite::params![id_str, status, version, doc],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Reputation events ─────────────────────────────────────────────────────

  async fn add_event(&self, event: &ReputationEvent) -> Result<()> {
    let id_str = encode_uuid(event.event_id);
    let identity_str = encode_uuid(event.identity_id);
    let kind = event.kind.discriminant().to_owned();
    let at_str = encode_dt(event.created_at);
    let doc = encode_doc(event)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO reputation_events
             (event_id, identity_id, kind, created_at, doc)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, identity_str, kind, at_str, doc],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn count_events(
    &self,
    identity_id: Uuid,
    kind: EventKind,
  ) -> Result<u64> {
    let identity_str = encode_uuid(identity_id);
    let kind_str = kind.discriminant().to_owned();

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM reputation_events
           WHERE identity_id = ?1 AND kind = ?2",
          rusqlite::params![identity_str, kind_str],
          |row| row.get(0),
        )?)
      })
      .await?;
    Ok(count as u64)
  }

  // ── Discussions ───────────────────────────────────────────────────────────

  async fn add_discussion(&self, discussion: &Discussion) -> Result<()> {
    let id_str = encode_uuid(discussion.discussion_id);
    let wonder_str = encode_uuid(discussion.wonder_id);
    let at_str = encode_dt(discussion.created_at);
    let doc = encode_doc(discussion)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO discussions (discussion_id, wonder_id, created_at, doc)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, wonder_str, at_str, doc],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_discussion(&self, id: Uuid) -> Result<Option<Discussion>> {
    let doc = self
      .get_doc(
        "SELECT doc FROM discussions WHERE discussion_id = ?1",
        encode_uuid(id),
      )
      .await?;
    doc.as_deref().map(decode_doc).transpose()
  }

  async fn put_discussion(&self, discussion: &Discussion) -> Result<()> {
    let id_str = encode_uuid(discussion.discussion_id);
    let doc = encode_doc(discussion)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE discussions SET doc = ?2 WHERE discussion_id = ?1",
          rusqlite::params![id_str, doc],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn list_discussions(&self, wonder_id: Uuid) -> Result<Vec<Discussion>> {
    let wonder_str = encode_uuid(wonder_id);

    let docs: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT doc FROM discussions
           WHERE wonder_id = ?1
           ORDER BY created_at DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![wonder_str], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    docs.iter().map(|doc| decode_doc(doc)).collect()
  }
}
