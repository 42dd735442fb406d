//! The moderation engine: the revision lifecycle state machine.
//!
//! A submitted edit either applies immediately (editors holding any edit
//! privilege) or enters the pending queue for review. Approval applies the
//! change and rewards the original editor; rejection records a reason and
//! changes nothing else. Reverts synthesize a brand-new approved revision
//! restoring an earlier snapshot, so history stays append-only.

use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use wonders_core::{
  identity::Identity,
  reputation::{EventKind, EventMetadata, NewReputationEvent},
  revision::{
    ContentSnapshot, Revision, RevisionChange, RevisionComment,
    RevisionComparison, RevisionOutcome, RevisionSummary, snapshot_diff,
  },
  store::WonderStore,
  wonder::{Section, Wonder},
};

use crate::{
  EDIT_APPROVED_POINTS,
  error::{Error, Result},
  reputation::ReputationEngine,
};

/// A proposed change to one section of a wonder.
#[derive(Debug, Clone, Deserialize)]
pub struct NewEdit {
  pub section:      Section,
  pub text:         String,
  pub edit_summary: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ModerationEngine<S> {
  store:      S,
  reputation: ReputationEngine<S>,
}

impl<S: WonderStore + Clone> ModerationEngine<S> {
  pub fn new(store: S) -> Self {
    Self {
      reputation: ReputationEngine::new(store.clone()),
      store,
    }
  }

  /// Submit a section edit. Editors with any edit privilege get the
  /// direct-apply fast path: the revision is created already approved,
  /// the content applied, and the reward recorded, all in one call.
  /// Everyone else gets a pending revision and no content change.
  pub async fn submit_edit(
    &self,
    editor_id: Uuid,
    wonder_id: Uuid,
    input: NewEdit,
  ) -> Result<Revision> {
    let editor = self.identity(editor_id).await?;
    let mut wonder = self.wonder(wonder_id).await?;
    let now = Utc::now();

    let mut revision = Revision {
      revision_id: Uuid::new_v4(),
      wonder_id,
      editor: editor_id,
      change: RevisionChange::SectionEdit {
        section:  input.section,
        previous: wonder.section_text(input.section).to_string(),
        current:  input.text.clone(),
      },
      outcome: RevisionOutcome::Pending,
      version: None,
      edit_summary: input.edit_summary,
      snapshot: None,
      comments: Vec::new(),
      created_at: now,
    };

    if editor.can_edit_directly() {
      wonder.set_section(input.section, input.text, editor_id, now);
      wonder.current_version += 1;
      revision.version = Some(wonder.current_version);
      revision.outcome = RevisionOutcome::Approved { by: editor_id, at: now };
      revision.snapshot = Some(ContentSnapshot::of(&wonder));

      self.store.add_revision(&revision).await.map_err(Error::store)?;
      self.store.put_wonder(&wonder).await.map_err(Error::store)?;
      info!(
        wonder = %wonder_id,
        revision = %revision.revision_id,
        version = wonder.current_version,
        "edit applied directly"
      );
      self.reward_editor(&revision).await?;
    } else {
      self.store.add_revision(&revision).await.map_err(Error::store)?;
      info!(
        wonder = %wonder_id,
        revision = %revision.revision_id,
        "edit queued for review"
      );
    }

    self
      .reputation
      .record_activity(editor_id, now.date_naive())
      .await?;
    Ok(revision)
  }

  /// Approve a pending revision, apply its change, and reward the original
  /// editor. The authorization check runs before any mutation.
  pub async fn approve_revision(
    &self,
    reviewer_id: Uuid,
    wonder_id: Uuid,
    revision_id: Uuid,
  ) -> Result<Revision> {
    let reviewer = self.identity(reviewer_id).await?;
    if !reviewer.can_approve_edits() {
      return Err(Error::PermissionDenied {
        actor:  reviewer_id,
        action: "approve revisions",
      });
    }

    let mut revision = self.revision_of(wonder_id, revision_id).await?;
    if !revision.outcome.is_pending() {
      return Err(Error::AlreadyResolved(revision_id));
    }
    let mut wonder = self.wonder(wonder_id).await?;
    let now = Utc::now();

    match &revision.change {
      RevisionChange::SectionEdit { section, current, .. } => {
        // Attribution goes to the original editor, not the reviewer.
        wonder.set_section(*section, current.clone(), revision.editor, now);
      }
      RevisionChange::Revert { .. } => {
        // Reverts are born approved and never sit in the pending queue.
        return Err(Error::Validation(
          "revert revisions cannot be approved".to_string(),
        ));
      }
    }
    wonder.current_version += 1;
    revision.version = Some(wonder.current_version);
    revision.outcome = RevisionOutcome::Approved { by: reviewer_id, at: now };
    revision.snapshot = Some(ContentSnapshot::of(&wonder));

    self.store.put_wonder(&wonder).await.map_err(Error::store)?;
    self.store.put_revision(&revision).await.map_err(Error::store)?;
    info!(
      wonder = %wonder_id,
      revision = %revision_id,
      reviewer = %reviewer_id,
      version = wonder.current_version,
      "revision approved"
    );

    self.reward_editor(&revision).await?;
    self
      .reputation
      .record_activity(revision.editor, now.date_naive())
      .await?;
    Ok(revision)
  }

  /// Reject a pending revision with a reason. Nothing else changes: no
  /// content mutation and no reputation event.
  pub async fn reject_revision(
    &self,
    reviewer_id: Uuid,
    wonder_id: Uuid,
    revision_id: Uuid,
    reason: String,
  ) -> Result<Revision> {
    if reason.trim().is_empty() {
      return Err(Error::Validation(
        "a rejection reason is required".to_string(),
      ));
    }
    let reviewer = self.identity(reviewer_id).await?;
    if !reviewer.can_approve_edits() {
      return Err(Error::PermissionDenied {
        actor:  reviewer_id,
        action: "reject revisions",
      });
    }

    let mut revision = self.revision_of(wonder_id, revision_id).await?;
    if !revision.outcome.is_pending() {
      return Err(Error::AlreadyResolved(revision_id));
    }

    revision.outcome = RevisionOutcome::Rejected {
      by: reviewer_id,
      at: Utc::now(),
      reason,
    };
    self.store.put_revision(&revision).await.map_err(Error::store)?;
    info!(
      wonder = %wonder_id,
      revision = %revision_id,
      reviewer = %reviewer_id,
      "revision rejected"
    );
    Ok(revision)
  }

  /// Restore the wonder to the content recorded at an earlier applied
  /// version. The restore itself is a brand-new approved revision with a
  /// `Revert` change, so the history never loses the in-between states.
  pub async fn revert_to_version(
    &self,
    actor_id: Uuid,
    wonder_id: Uuid,
    version: u32,
  ) -> Result<(Wonder, Revision)> {
    let actor = self.identity(actor_id).await?;
    if !actor.can_approve_edits() {
      return Err(Error::PermissionDenied {
        actor:  actor_id,
        action: "revert content",
      });
    }

    let mut wonder = self.wonder(wonder_id).await?;
    let target = self.applied_revision(wonder_id, version).await?;
    let snapshot = target.snapshot.ok_or_else(|| {
      Error::Validation(format!("version {version} has no snapshot"))
    })?;
    let now = Utc::now();

    wonder.name = snapshot.name.clone();
    wonder.category = snapshot.category;
    wonder.subcategory = snapshot.subcategory.clone();
    wonder.country = snapshot.country.clone();
    wonder.location = snapshot.location;
    for section in Section::ALL {
      let text = snapshot
        .sections
        .get(&section)
        .cloned()
        .unwrap_or_default();
      wonder.set_section(section, text, actor_id, now);
    }
    wonder.current_version += 1;

    let revision = Revision {
      revision_id: Uuid::new_v4(),
      wonder_id,
      editor: actor_id,
      change: RevisionChange::Revert { to_version: version },
      outcome: RevisionOutcome::Approved { by: actor_id, at: now },
      version: Some(wonder.current_version),
      edit_summary: Some(format!("Reverted to version {version}")),
      snapshot: Some(ContentSnapshot::of(&wonder)),
      comments: Vec::new(),
      created_at: now,
    };

    self.store.add_revision(&revision).await.map_err(Error::store)?;
    self.store.put_wonder(&wonder).await.map_err(Error::store)?;
    info!(
      wonder = %wonder_id,
      to_version = version,
      new_version = wonder.current_version,
      actor = %actor_id,
      "content reverted"
    );
    Ok((wonder, revision))
  }

  /// Field-by-field comparison of two applied versions.
  pub async fn compare_revisions(
    &self,
    wonder_id: Uuid,
    from_version: u32,
    to_version: u32,
  ) -> Result<RevisionComparison> {
    let from = self.applied_revision(wonder_id, from_version).await?;
    let to = self.applied_revision(wonder_id, to_version).await?;
    let diff = match (&from.snapshot, &to.snapshot) {
      (Some(a), Some(b)) => snapshot_diff(a, b),
      _ => {
        return Err(Error::Validation(
          "both revisions must carry snapshots".to_string(),
        ));
      }
    };
    Ok(RevisionComparison { from_revision: from, to_revision: to, diff })
  }

  /// Revision history for a wonder, newest first.
  pub async fn list_revisions(
    &self,
    wonder_id: Uuid,
  ) -> Result<Vec<RevisionSummary>> {
    self.wonder(wonder_id).await?;
    self.store.list_revisions(wonder_id).await.map_err(Error::store)
  }

  /// A single applied revision by its version number.
  pub async fn get_revision(
    &self,
    wonder_id: Uuid,
    version: u32,
  ) -> Result<Revision> {
    self.applied_revision(wonder_id, version).await
  }

  pub async fn get_revision_by_id(
    &self,
    wonder_id: Uuid,
    revision_id: Uuid,
  ) -> Result<Revision> {
    self.revision_of(wonder_id, revision_id).await
  }

  /// Append a comment to a revision's discussion thread.
  pub async fn add_revision_comment(
    &self,
    author_id: Uuid,
    revision_id: Uuid,
    text: String,
  ) -> Result<RevisionComment> {
    if text.trim().is_empty() {
      return Err(Error::Validation("comment text is required".to_string()));
    }
    self.identity(author_id).await?;
    let mut revision = self
      .store
      .get_revision(revision_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::RevisionNotFound(revision_id))?;

    let comment = RevisionComment {
      comment_id: Uuid::new_v4(),
      author:     author_id,
      text,
      created_at: Utc::now(),
    };
    revision.comments.push(comment.clone());
    self.store.put_revision(&revision).await.map_err(Error::store)?;
    Ok(comment)
  }

  // ── Internals ─────────────────────────────────────────────────────────

  async fn reward_editor(&self, revision: &Revision) -> Result<()> {
    self
      .reputation
      .record_event(NewReputationEvent {
        identity_id: revision.editor,
        kind:        EventKind::EditApproved,
        points:      EDIT_APPROVED_POINTS,
        wonder_id:   Some(revision.wonder_id),
        revision_id: Some(revision.revision_id),
        description: "Edit approved".to_string(),
        metadata:    EventMetadata::default(),
      })
      .await?;
    Ok(())
  }

  async fn identity(&self, id: Uuid) -> Result<Identity> {
    self
      .store
      .get_identity(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::IdentityNotFound(id))
  }

  async fn wonder(&self, id: Uuid) -> Result<Wonder> {
    self
      .store
      .get_wonder(id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::WonderNotFound(id.to_string()))
  }

  async fn revision_of(
    &self,
    wonder_id: Uuid,
    revision_id: Uuid,
  ) -> Result<Revision> {
    let revision = self
      .store
      .get_revision(revision_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::RevisionNotFound(revision_id))?;
    if revision.wonder_id != wonder_id {
      return Err(Error::RevisionNotFound(revision_id));
    }
    Ok(revision)
  }

  async fn applied_revision(
    &self,
    wonder_id: Uuid,
    version: u32,
  ) -> Result<Revision> {
    self
      .store
      .get_revision_by_version(wonder_id, version)
      .await
      .map_err(Error::store)?
      .ok_or(Error::VersionNotFound { wonder: wonder_id, version })
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
