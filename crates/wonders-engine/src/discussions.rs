//! Discussion threads attached to wonders.
//!
//! Anyone may open a thread, comment, or vote. Resolution is limited to the
//! thread's creator or a discussion moderator; archiving is moderator-only.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;
use wonders_core::{
  discussion::{
    Discussion, DiscussionComment, DiscussionStatus, NewDiscussion, VoteKind,
  },
  identity::Identity,
  store::WonderStore,
};

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct DiscussionService<S> {
  store: S,
}

impl<S: WonderStore> DiscussionService<S> {
  pub fn new(store: S) -> Self { Self { store } }

  pub async fn open_discussion(
    &self,
    creator_id: Uuid,
    input: NewDiscussion,
  ) -> Result<Discussion> {
    if input.title.trim().is_empty() {
      return Err(Error::Validation("title is required".to_string()));
    }
    if input.content.trim().is_empty() {
      return Err(Error::Validation("content is required".to_string()));
    }
    self.identity(creator_id).await?;
    self
      .store
      .get_wonder(input.wonder_id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::WonderNotFound(input.wonder_id.to_string()))?;

    let discussion = Discussion {
      discussion_id:      Uuid::new_v4(),
      wonder_id:          input.wonder_id,
      creator:            creator_id,
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
    self
      .store
      .add_discussion(&discussion)
      .await
      .map_err(Error::store)?;
    info!(
      wonder = %discussion.wonder_id,
      discussion = %discussion.discussion_id,
      "discussion opened"
    );
    Ok(discussion)
  }

  pub async fn comment(
    &self,
    author_id: Uuid,
    discussion_id: Uuid,
    text: String,
  ) -> Result<Discussion> {
    if text.trim().is_empty() {
      return Err(Error::Validation("comment text is required".to_string()));
    }
    self.identity(author_id).await?;
    let mut discussion = self.discussion(discussion_id).await?;
    discussion.comments.push(DiscussionComment {
      comment_id: Uuid::new_v4(),
      author:     author_id,
      text,
      created_at: Utc::now(),
    });
    self
      .store
      .put_discussion(&discussion)
      .await
      .map_err(Error::store)?;
    Ok(discussion)
  }

  /// Cast or replace the voter's single vote on a thread.
  pub async fn vote(
    &self,
    voter_id: Uuid,
    discussion_id: Uuid,
    kind: VoteKind,
  ) -> Result<Discussion> {
    self.identity(voter_id).await?;
    let mut discussion = self.discussion(discussion_id).await?;
    discussion.vote(voter_id, kind);
    self
      .store
      .put_discussion(&discussion)
      .await
      .map_err(Error::store)?;
    Ok(discussion)
  }

  /// Close a thread with an optional summary. Only the creator or a
  /// discussion moderator may resolve.
  pub async fn resolve(
    &self,
    actor_id: Uuid,
    discussion_id: Uuid,
    summary: Option<String>,
  ) -> Result<Discussion> {
    let actor = self.identity(actor_id).await?;
    let mut discussion = self.discussion(discussion_id).await?;
    if discussion.creator != actor_id && !actor.can_moderate_discussions() {
      return Err(Error::PermissionDenied {
        actor:  actor_id,
        action: "resolve discussions",
      });
    }
    if discussion.status != DiscussionStatus::Open {
      return Err(Error::AlreadyResolved(discussion_id));
    }
    discussion.resolve(actor_id, summary);
    self
      .store
      .put_discussion(&discussion)
      .await
      .map_err(Error::store)?;
    Ok(discussion)
  }

  pub async fn reopen(
    &self,
    actor_id: Uuid,
    discussion_id: Uuid,
  ) -> Result<Discussion> {
    let actor = self.identity(actor_id).await?;
    let mut discussion = self.discussion(discussion_id).await?;
    if discussion.creator != actor_id && !actor.can_moderate_discussions() {
      return Err(Error::PermissionDenied {
        actor:  actor_id,
        action: "reopen discussions",
      });
    }
    discussion.reopen();
    self
      .store
      .put_discussion(&discussion)
      .await
      .map_err(Error::store)?;
    Ok(discussion)
  }

  /// Take a thread out of circulation. Moderator-only.
  pub async fn archive(
    &self,
    actor_id: Uuid,
    discussion_id: Uuid,
  ) -> Result<Discussion> {
    let actor = self.identity(actor_id).await?;
    if !actor.can_moderate() {
      return Err(Error::PermissionDenied {
        actor:  actor_id,
        action: "archive discussions",
      });
    }
    let mut discussion = self.discussion(discussion_id).await?;
    discussion.archive();
    self
      .store
      .put_discussion(&discussion)
      .await
      .map_err(Error::store)?;
    Ok(discussion)
  }

  /// Threads for a wonder, newest first.
  pub async fn list_for_wonder(
    &self,
    wonder_id: Uuid,
  ) -> Result<Vec<Discussion>> {
    self
      .store
      .get_wonder(wonder_id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::WonderNotFound(wonder_id.to_string()))?;
    self
      .store
      .list_discussions(wonder_id)
      .await
      .map_err(Error::store)
  }

  async fn identity(&self, id: Uuid) -> Result<Identity> {
    self
      .store
      .get_identity(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::IdentityNotFound(id))
  }

  async fn discussion(&self, id: Uuid) -> Result<Discussion> {
    self
      .store
      .get_discussion(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::DiscussionNotFound(id))
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use wonders_core::{
    discussion::DiscussionKind,
    identity::{NewIdentity, Role},
    wonder::{Category, GeoPoint, Wonder},
  };
  use wonders_store_sqlite::SqliteStore;

  use super::*;

  async fn store() -> SqliteStore {
    SqliteStore::open_in_memory().await.expect("in-memory store")
  }

  async fn identity(store: &SqliteStore, tag: &str, role: Role) -> Identity {
    let mut identity = store
      .add_identity(NewIdentity {
        external_id:  format!("ext-{tag}"),
        email:        format!("{tag}@example.com"),
        display_name: tag.to_string(),
        picture:      None,
      })
      .await
      .unwrap();
    identity.role = role;
    store.put_identity(&identity).await.unwrap();
    identity
  }

  async fn seed_wonder(store: &SqliteStore, created_by: Uuid) -> Wonder {
    let wonder = Wonder {
      wonder_id:          Uuid::new_v4(),
      name:               "Hidden Falls".into(),
      slug:               "hidden-falls".into(),
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
    };
    store.add_wonder(&wonder).await.unwrap();
    wonder
  }

  fn thread_input(wonder_id: Uuid) -> NewDiscussion {
    NewDiscussion {
      wonder_id,
      title: "Trail conditions".into(),
      content: "Is the upper track open?".into(),
      kind: DiscussionKind::General,
      linked_revision: None,
    }
  }

  #[tokio::test]
  async fn open_comment_and_vote() {
    let s = store().await;
    let service = DiscussionService::new(s.clone());
    let alice = identity(&s, "alice", Role::Beginner).await;
    let bob = identity(&s, "bob", Role::Beginner).await;
    let wonder = seed_wonder(&s, alice.identity_id).await;

    let d = service
      .open_discussion(alice.identity_id, thread_input(wonder.wonder_id))
      .await
      .unwrap();

    service
      .comment(bob.identity_id, d.discussion_id, "Open as of Sunday.".into())
      .await
      .unwrap();
    service
      .vote(bob.identity_id, d.discussion_id, VoteKind::Up)
      .await
      .unwrap();
    // Re-voting replaces rather than stacks.
    let voted = service
      .vote(bob.identity_id, d.discussion_id, VoteKind::Down)
      .await
      .unwrap();
    assert_eq!(voted.comments.len(), 1);
    assert_eq!(voted.vote_score(), -1);

    let listed = service.list_for_wonder(wonder.wonder_id).await.unwrap();
    assert_eq!(listed.len(), 1);
  }

  #[tokio::test]
  async fn creator_resolves_their_own_thread() {
    let s = store().await;
    let service = DiscussionService::new(s.clone());
    let alice = identity(&s, "alice", Role::Beginner).await;
    let wonder = seed_wonder(&s, alice.identity_id).await;

    let d = service
      .open_discussion(alice.identity_id, thread_input(wonder.wonder_id))
      .await
      .unwrap();
    let resolved = service
      .resolve(alice.identity_id, d.discussion_id, Some("track open".into()))
      .await
      .unwrap();
    assert_eq!(resolved.status, DiscussionStatus::Resolved);
    assert_eq!(resolved.resolved_by, Some(alice.identity_id));

    let err = service
      .resolve(alice.identity_id, d.discussion_id, None)
      .await
      .unwrap_err();
    assert!(matches!(err, Error::AlreadyResolved(_)));
  }

  #[tokio::test]
  async fn bystanders_cannot_resolve_or_archive() {
    let s = store().await;
    let service = DiscussionService::new(s.clone());
    let alice = identity(&s, "alice", Role::Beginner).await;
    let carol = identity(&s, "carol", Role::Explorer).await;
    let wonder = seed_wonder(&s, alice.identity_id).await;

    let d = service
      .open_discussion(alice.identity_id, thread_input(wonder.wonder_id))
      .await
      .unwrap();

    let err = service
      .resolve(carol.identity_id, d.discussion_id, None)
      .await
      .unwrap_err();
    assert!(matches!(err, Error::PermissionDenied { .. }));

    let err = service
      .archive(carol.identity_id, d.discussion_id)
      .await
      .unwrap_err();
    assert!(matches!(err, Error::PermissionDenied { .. }));
  }

  #[tokio::test]
  async fn moderators_resolve_and_archive_other_threads() {
    let s = store().await;
    let service = DiscussionService::new(s.clone());
    let alice = identity(&s, "alice", Role::Beginner).await;
    let moderator = identity(&s, "mod", Role::ContentModerator).await;
    let wonder = seed_wonder(&s, alice.identity_id).await;

    let d = service
      .open_discussion(alice.identity_id, thread_input(wonder.wonder_id))
      .await
      .unwrap();
    service
      .resolve(moderator.identity_id, d.discussion_id, None)
      .await
      .unwrap();
    let reopened = service
      .reopen(moderator.identity_id, d.discussion_id)
      .await
      .unwrap();
    assert_eq!(reopened.status, DiscussionStatus::Open);
    assert!(reopened.resolved_by.is_none());

    let archived = service
      .archive(moderator.identity_id, d.discussion_id)
      .await
      .unwrap();
    assert_eq!(archived.status, DiscussionStatus::Archived);
  }

  #[tokio::test]
  async fn missing_threads_are_not_found() {
    let s = store().await;
    let service = DiscussionService::new(s.clone());
    let alice = identity(&s, "alice", Role::Beginner).await;

    let err = service
      .comment(alice.identity_id, Uuid::new_v4(), "hello".into())
      .await
      .unwrap_err();
    assert!(matches!(err, Error::DiscussionNotFound(_)));
  }
}
