//! Reputation events, badges, and the milestone rule table.
//!
//! Events form an immutable append-only ledger and are the sole cause of
//! point changes. Milestone checks are keyed by event kind through a typed
//! rule table — adding a new contribution kind means extending the
//! exhaustive match in [`EventKind::milestone_rule`], which the compiler
//! enforces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Kinds ───────────────────────────────────────────────────────────────────

/// Contribution kinds tracked in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
  EditApproved,
  /// Recorded in the taxonomy but currently never emitted: rejection is an
  /// intentionally silent outcome.
  EditRejected,
  WonderAdded,
  PhotoApproved,
  HelpfulReview,
  AchievementEarned,
  BadgeAwarded,
  LevelUp,
  EditStreak,
  ModerationAction,
}

impl EventKind {
  /// The discriminant string stored in the `kind` column.
  /// Must match the `rename_all = "snake_case"` serde tags above.
  pub fn discriminant(&self) -> &'static str {
    match self {
      Self::EditApproved => "edit_approved",
      Self::EditRejected => "edit_rejected",
      Self::WonderAdded => "wonder_added",
      Self::PhotoApproved => "photo_approved",
      Self::HelpfulReview => "helpful_review",
      Self::AchievementEarned => "achievement_earned",
      Self::BadgeAwarded => "badge_awarded",
      Self::LevelUp => "level_up",
      Self::EditStreak => "edit_streak",
      Self::ModerationAction => "moderation_action",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeKind {
  Contributor,
  Editor,
  Photographer,
  Reviewer,
  Curator,
  Expert,
  Moderator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementKind {
  FirstContribution,
  EditStreak,
  PhotoMilestone,
  ReviewMilestone,
  RegionalExpert,
  ContentQuality,
}

// ─── Milestone rules ─────────────────────────────────────────────────────────

/// Where a milestone check gets its count from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MilestoneSource {
  /// All-time count of this event kind in the ledger, recomputed on every
  /// check (self-correcting; never cached).
  LedgerCount,
  /// The `streak_count` carried in the triggering event's metadata.
  StreakCount,
}

/// A badge-awarding rule: when the observed count exactly equals one of
/// the thresholds, award one badge named `"<N> <label>"`. Exact match (not
/// `>=`) limits each rule to a single crossing per event, and checks stop
/// at the first matching threshold.
#[derive(Debug)]
pub struct MilestoneRule {
  pub source:      MilestoneSource,
  pub thresholds:  &'static [u64],
  pub badge:       BadgeKind,
  pub label:       &'static str,
  pub description: &'static str,
}

impl MilestoneRule {
  /// The threshold crossed by `count`, if any.
  pub fn crossed(&self, count: u64) -> Option<u64> {
    self.thresholds.iter().copied().find(|m| *m == count)
  }

  pub fn badge_name(&self, milestone: u64) -> String {
    format!("{milestone} {}", self.label)
  }
}

static EDIT_MILESTONES: MilestoneRule = MilestoneRule {
  source:      MilestoneSource::LedgerCount,
  thresholds:  &[1, 10, 50, 100, 500],
  badge:       BadgeKind::Editor,
  label:       "Edits",
  description: "Made successful edits",
};

static WONDER_MILESTONES: MilestoneRule = MilestoneRule {
  source:      MilestoneSource::LedgerCount,
  thresholds:  &[1, 5, 25, 100],
  badge:       BadgeKind::Contributor,
  label:       "Wonders",
  description: "Added new wonders to the map",
};

static PHOTO_MILESTONES: MilestoneRule = MilestoneRule {
  source:      MilestoneSource::LedgerCount,
  thresholds:  &[1, 10, 50, 100],
  badge:       BadgeKind::Photographer,
  label:       "Photos",
  description: "Contributed approved photos",
};

static REVIEW_MILESTONES: MilestoneRule = MilestoneRule {
  source:      MilestoneSource::LedgerCount,
  thresholds:  &[1, 10, 50, 100],
  badge:       BadgeKind::Reviewer,
  label:       "Helpful Reviews",
  description: "Wrote reviews that others found helpful",
};

static STREAK_MILESTONES: MilestoneRule = MilestoneRule {
  source:      MilestoneSource::StreakCount,
  thresholds:  &[7, 30, 100, 365],
  badge:       BadgeKind::Editor,
  label:       "Day Streak",
  description: "Made contributions on consecutive days",
};

impl EventKind {
  /// The milestone rule triggered by this event kind, if any.
  pub fn milestone_rule(&self) -> Option<&'static MilestoneRule> {
    match self {
      Self::EditApproved => Some(&EDIT_MILESTONES),
      Self::WonderAdded => Some(&WONDER_MILESTONES),
      Self::PhotoApproved => Some(&PHOTO_MILESTONES),
      Self::HelpfulReview => Some(&REVIEW_MILESTONES),
      Self::EditStreak => Some(&STREAK_MILESTONES),
      Self::EditRejected
      | Self::AchievementEarned
      | Self::BadgeAwarded
      | Self::LevelUp
      | Self::ModerationAction => None,
    }
  }
}

// ─── Events ──────────────────────────────────────────────────────────────────

/// Type-specific context carried alongside an event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventMetadata {
  pub streak_count:      Option<u64>,
  pub quality_score:     Option<u8>,
  pub moderation_action: Option<String>,
}

impl EventMetadata {
  pub fn is_empty(&self) -> bool { *self == Self::default() }
}

/// One immutable ledger entry. Never updated or deleted once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReputationEvent {
  pub event_id:    Uuid,
  pub identity_id: Uuid,
  pub kind:        EventKind,
  /// Signed; penalties are negative.
  pub points:      i64,
  pub wonder_id:   Option<Uuid>,
  pub revision_id: Option<Uuid>,
  pub description: String,
  pub metadata:    EventMetadata,
  pub created_at:  DateTime<Utc>,
}

/// Input to the reputation engine; id and timestamp are server-assigned.
#[derive(Debug, Clone, Deserialize)]
pub struct NewReputationEvent {
  pub identity_id: Uuid,
  pub kind:        EventKind,
  pub points:      i64,
  pub wonder_id:   Option<Uuid>,
  pub revision_id: Option<Uuid>,
  pub description: String,
  #[serde(default)]
  pub metadata:    EventMetadata,
}

// ─── Tests ───────────────────────────────────────────────────────────────────
