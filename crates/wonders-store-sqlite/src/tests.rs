//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::Utc;
use uuid::Uuid;

use wonders_core::{
  discussion::{
    Discussion, DiscussionKind, DiscussionStatus, NewDiscussion,
  },
  identity::NewIdentity,
  reputation::{EventKind, EventMetadata, ReputationEvent},
  revision::{Revision, RevisionChange, RevisionOutcome},
  store::WonderStore,
  wonder::{Category, GeoPoint, Section, Wonder},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn new_identity(tag: &str) -> NewIdentity {
  NewIdentity {
    external_id:  format!("ext-{tag}"),
    email:        format!("{tag}@example.com"),
    display_name: tag.to_string(),
    picture:      None,
  }
}

fn wonder(created_by: Uuid, slug: &str) -> Wonder {
  Wonder {
    wonder_id:          Uuid::new_v4(),
    name:               "Hidden Falls".into(),
    slug:               slug.to_string(),
    category:           Category::Nature,
    subcategory:        "waterfall".into(),
    country:            "New Zealand".into(),
    location:           GeoPoint { lat: -36.85, lng: 174.76 },
    content:            Default::default(),
    cover_image:        None,
    photos:             Vec::new(),
    ratings:            Vec::new(),
    average_rating:     0.0,
    current_version:    0,
    completeness_score: 0,
    created_by,
    created_at:         Utc::now(),
    updated_at:         Utc::now(),
  }
}

fn pending_revision(wonder_id: Uuid, editor: Uuid) -> Revision {
  Revision {
    revision_id:  Uuid::new_v4(),
    wonder_id,
    editor,
    change:       RevisionChange::SectionEdit {
      section:  Section::History,
      previous: String::new(),
      current:  "Settled in the 1860s.".into(),
    },
    outcome:      RevisionOutcome::Pending,
    version:      None,
    edit_summary: None,
    snapshot:     None,
    comments:     Vec::new(),
    created_at:   Utc::now(),
  }
}

// ─── Identities ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_identity() {
  let s = store().await;

  let identity = s.add_identity(new_identity("alice")).await.unwrap();
  assert_eq!(identity.reputation.points, 0);
  assert_eq!(identity.reputation.level, 1);

  let fetched = s.get_identity(identity.identity_id).await.unwrap().unwrap();
  assert_eq!(fetched.identity_id, identity.identity_id);
  assert_eq!(fetched.email, "alice@example.com");
}

#[tokio::test]
async fn get_identity_missing_returns_none() {
  let s = store().await;
  assert!(s.get_identity(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn put_identity_round_trips_reputation() {
  let s = store().await;
  let mut identity = s.add_identity(new_identity("bob")).await.unwrap();

  identity.reputation.add_points(150);
  s.put_identity(&identity).await.unwrap();

  let fetched = s.get_identity(identity.identity_id).await.unwrap().unwrap();
  assert_eq!(fetched.reputation.points, 150);
  assert_eq!(fetched.reputation.level, 2);
}

// ─── Wonders ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_wonder_and_fetch_by_id_and_slug() {
  let s = store().await;
  let creator = s.add_identity(new_identity("carol")).await.unwrap();
  let w = wonder(creator.identity_id, "hidden-falls-new-zealand");

  s.add_wonder(&w).await.unwrap();

  let by_id = s.get_wonder(w.wonder_id).await.unwrap().unwrap();
  assert_eq!(by_id.slug, "hidden-falls-new-zealand");

  let by_slug = s
    .get_wonder_by_slug("hidden-falls-new-zealand")
    .await
    .unwrap()
    .unwrap();
  assert_eq!(by_slug.wonder_id, w.wonder_id);

  assert!(s.get_wonder_by_slug("no-such-slug").await.unwrap().is_none());
}

#[tokio::test]
async fn put_wonder_round_trips_content_map() {
  let s = store().await;
  let creator = s.add_identity(new_identity("dave")).await.unwrap();
  let mut w = wonder(creator.identity_id, "falls");
  s.add_wonder(&w).await.unwrap();

  w.set_section(
    Section::Overview,
    "A tall waterfall.".into(),
    creator.identity_id,
    Utc::now(),
  );
  w.current_version = 1;
  s.put_wonder(&w).await.unwrap();

  let fetched = s.get_wonder(w.wonder_id).await.unwrap().unwrap();
  assert_eq!(fetched.section_text(Section::Overview), "A tall waterfall.");
  assert_eq!(fetched.current_version, 1);
  assert_eq!(fetched.completeness_score, 13);
}

// ─── Revisions ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn revision_outcome_round_trips() {
  let s = store().await;
  let editor = s.add_identity(new_identity("erin")).await.unwrap();
  let w = wonder(editor.identity_id, "w1");
  s.add_wonder(&w).await.unwrap();

  let mut rev = pending_revision(w.wonder_id, editor.identity_id);
  s.add_revision(&rev).await.unwrap();

  let fetched = s.get_revision(rev.revision_id).await.unwrap().unwrap();
  assert!(fetched.outcome.is_pending());
  assert!(fetched.version.is_none());

  let reviewer = Uuid::new_v4();
  rev.outcome = RevisionOutcome::Rejected {
    by:     reviewer,
    at:     Utc::now(),
    reason: "needs a source".into(),
  };
  s.put_revision(&rev).await.unwrap();

  let fetched = s.get_revision(rev.revision_id).await.unwrap().unwrap();
  assert!(matches!(
    fetched.outcome,
    RevisionOutcome::Rejected { by, ref reason, .. }
      if by == reviewer && reason == "needs a source"
  ));
}

#[tokio::test]
async fn get_revision_by_version_ignores_pending() {
  let s = store().await;
  let editor = s.add_identity(new_identity("finn")).await.unwrap();
  let w = wonder(editor.identity_id, "w2");
  s.add_wonder(&w).await.unwrap();

  let pending = pending_revision(w.wonder_id, editor.identity_id);
  s.add_revision(&pending).await.unwrap();

  // A pending revision has no version; version lookups never see it.
  assert!(
    s.get_revision_by_version(w.wonder_id, 1)
      .await
      .unwrap()
      .is_none()
  );

  let mut applied = pending_revision(w.wonder_id, editor.identity_id);
  applied.version = Some(1);
  applied.outcome = RevisionOutcome::Approved {
    by: editor.identity_id,
    at: Utc::now(),
  };
  s.add_revision(&applied).await.unwrap();

  let fetched = s
    .get_revision_by_version(w.wonder_id, 1)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(fetched.revision_id, applied.revision_id);
}

#[tokio::test]
async fn list_revisions_is_newest_first_and_strips_payload() {
  let s = store().await;
  let editor = s.add_identity(new_identity("gina")).await.unwrap();
  let w = wonder(editor.identity_id, "w3");
  s.add_wonder(&w).await.unwrap();

  let mut first = pending_revision(w.wonder_id, editor.identity_id);
  first.created_at = Utc::now() - chrono::Duration::seconds(10);
  s.add_revision(&first).await.unwrap();

  let second = pending_revision(w.wonder_id, editor.identity_id);
  s.add_revision(&second).await.unwrap();

  let summaries = s.list_revisions(w.wonder_id).await.unwrap();
  assert_eq!(summaries.len(), 2);
  assert_eq!(summaries[0].revision_id, second.revision_id);
  assert_eq!(summaries[1].revision_id, first.revision_id);
  assert_eq!(summaries[0].section, Some(Section::History));
  assert_eq!(summaries[0].status, "pending");
}

// ─── Reputation events ───────────────────────────────────────────────────────

#[tokio::test]
async fn count_events_filters_by_identity_and_kind() {
  let s = store().await;
  let alice = s.add_identity(new_identity("alice")).await.unwrap();
  let bob = s.add_identity(new_identity("bob")).await.unwrap();

  let event = |identity_id, kind| ReputationEvent {
    event_id: Uuid::new_v4(),
    identity_id,
    kind,
    points: 10,
    wonder_id: None,
    revision_id: None,
    description: "test".into(),
    metadata: EventMetadata::default(),
    created_at: Utc::now(),
  };

  s.add_event(&event(alice.identity_id, EventKind::EditApproved))
    .await
    .unwrap();
  s.add_event(&event(alice.identity_id, EventKind::EditApproved))
    .await
    .unwrap();
  s.add_event(&event(alice.identity_id, EventKind::WonderAdded))
    .await
    .unwrap();
  s.add_event(&event(bob.identity_id, EventKind::EditApproved))
    .await
    .unwrap();

  assert_eq!(
    s.count_events(alice.identity_id, EventKind::EditApproved)
      .await
      .unwrap(),
    2
  );
  assert_eq!(
    s.count_events(alice.identity_id, EventKind::WonderAdded)
      .await
      .unwrap(),
    1
  );
  assert_eq!(
    s.count_events(bob.identity_id, EventKind::WonderAdded)
      .await
      .unwrap(),
    0
  );
}

// ─── Discussions ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn discussion_round_trip_and_listing() {
  let s = store().await;
  let creator = s.add_identity(new_identity("hana")).await.unwrap();
  let w = wonder(creator.identity_id, "w4");
  s.add_wonder(&w).await.unwrap();

  let input = NewDiscussion {
    wonder_id:       w.wonder_id,
    title:           "Trail conditions".into(),
    content:         "Is the upper track open?".into(),
    kind:            DiscussionKind::General,
    linked_revision: None,
  };
  let mut d = Discussion {
    discussion_id:      Uuid::new_v4(),
    wonder_id:          input.wonder_id,
    creator:            creator.identity_id,
    title:              input.title,
    content:            input.content,
    kind:               input.kind,
    status:             DiscussionStatus::Open,
    comments:           Vec::new(),
    upvotes:            Vec::new(),
    downvotes:          Vec::new(),
    linked_revision:    input.linked_revision,
    resolved_by:        None,
    resolution_summary: None,
    created_at:         Utc::now(),
  };
  s.add_discussion(&d).await.unwrap();

  d.resolve(creator.identity_id, Some("track open".into()));
  s.put_discussion(&d).await.unwrap();

  let listed = s.list_discussions(w.wonder_id).await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].status, DiscussionStatus::Resolved);
  assert_eq!(listed[0].resolution_summary.as_deref(), Some("track open"));
}

#[tokio::test(flavor = "multi_thread")]
async fn store_futures_can_cross_threads() {
  // Exercised as trait methods so the returned futures must be `Send`;
  // a non-Send future would fail to spawn here.
  async fn fetch<S: WonderStore>(s: S, id: Uuid) -> Option<Wonder> {
    s.get_wonder(id).await.ok().flatten()
  }

  let s = store().await;
  let creator = s.add_identity(new_identity("iris")).await.unwrap();
  let w = wonder(creator.identity_id, "w5");
  s.add_wonder(&w).await.unwrap();

  let handle = tokio::spawn(fetch(s, w.wonder_id));
  let fetched = handle.await.unwrap().unwrap();
  assert_eq!(fetched.wonder_id, w.wonder_id);
}
