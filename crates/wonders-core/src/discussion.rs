//! Discussion threads attached to a wonder.
//!
//! Independent of the revision log, but a thread may reference the revision
//! it is about. Kept simple: comments are append-only, votes replace any
//! earlier vote by the same identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscussionKind {
  General,
  EditProposal,
  ContentIssue,
  FactCheck,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscussionStatus {
  Open,
  Resolved,
  Archived,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscussionComment {
  pub comment_id: Uuid,
  pub author:     Uuid,
  pub text:       String,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
  Up,
  Down,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discussion {
  pub discussion_id:      Uuid,
  pub wonder_id:          Uuid,
  pub creator:            Uuid,
  pub title:              String,
  pub content:            String,
  pub kind:               DiscussionKind,
  pub status:             DiscussionStatus,
  pub comments:           Vec<DiscussionComment>,
  pub upvotes:            Vec<Uuid>,
  pub downvotes:          Vec<Uuid>,
  pub linked_revision:    Option<Uuid>,
  pub resolved_by:        Option<Uuid>,
  pub resolution_summary: Option<String>,
  pub created_at:         DateTime<Utc>,
}

impl Discussion {
  pub fn vote_score(&self) -> i64 {
    self.upvotes.len() as i64 - self.downvotes.len() as i64
  }

  /// Record a vote, replacing any earlier vote by the same identity.
  pub fn vote(&mut self, identity_id: Uuid, kind: VoteKind) {
    self.upvotes.retain(|id| *id != identity_id);
    self.downvotes.retain(|id| *id != identity_id);
    match kind {
      VoteKind::Up => self.upvotes.push(identity_id),
      VoteKind::Down => self.downvotes.push(identity_id),
    }
  }

  pub fn resolve(&mut self, by: Uuid, summary: Option<String>) {
    self.status = DiscussionStatus::Resolved;
    self.resolved_by = Some(by);
    self.resolution_summary = summary;
  }

  pub fn reopen(&mut self) {
    self.status = DiscussionStatus::Open;
    self.resolved_by = None;
    self.resolution_summary = None;
  }

  pub fn archive(&mut self) { self.status = DiscussionStatus::Archived; }
}

/// Input to discussion creation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewDiscussion {
  pub wonder_id:       Uuid,
  pub title:           String,
  pub content:         String,
  pub kind:            DiscussionKind,
  pub linked_revision: Option<Uuid>,
}

// ─── Tests ───────────────────────────────────────────────────────────────────
