//! Identity — a user account, its trust tier, and accumulated reputation.
//!
//! Identities are created on first successful authentication (the auth
//! provider itself is an external capability) and are mutated only by
//! self-service profile edits and by the reputation engine. They are never
//! hard-deleted.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::reputation::{AchievementKind, BadgeKind};

// ─── Trust tiers ─────────────────────────────────────────────────────────────

/// Ordered trust tier. Derived `Ord` follows declaration order, so
/// `role >= Role::WonderGuide` means "WonderGuide or higher".
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
  Beginner,
  Explorer,
  Trailblazer,
  WonderGuide,
  RegionalCurator,
  ContentModerator,
  Admin,
  SuperAdmin,
}

/// Tiered edit capability: determines whether an identity's edits apply
/// immediately or must pass review.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EditPrivileges {
  /// Can only suggest edits; every submission goes through review.
  #[default]
  None,
  MinorEdits,
  FullEdits,
  TrustedEditor,
  Moderator,
}

/// Specialised capability flags, granted independently of role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
  pub can_verify_content:       bool,
  pub can_moderate_discussions: bool,
  pub can_review_edits:         bool,
  pub can_protect_locations:    bool,
}

// ─── Reputation sub-documents ────────────────────────────────────────────────

/// A badge awarded once per milestone crossing, never duplicated for the
/// same `(kind, name)` pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Badge {
  pub kind:        BadgeKind,
  pub name:        String,
  pub description: String,
  pub awarded_at:  DateTime<Utc>,
}

/// Long-running achievement progress, upserted by kind. Callers only ever
/// raise `progress`; completion latches at 100.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievement {
  pub kind:         AchievementKind,
  pub name:         String,
  /// 0–100.
  pub progress:     u8,
  pub completed:    bool,
  pub completed_at: Option<DateTime<Utc>>,
}

/// Accumulated reputation. `points` changes only through reputation events;
/// `level` is derived and monotonic non-decreasing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reputation {
  pub points:       i64,
  pub level:        u32,
  pub badges:       Vec<Badge>,
  pub achievements: Vec<Achievement>,
}

impl Default for Reputation {
  fn default() -> Self {
    Self {
      points:       0,
      level:        1,
      badges:       Vec::new(),
      achievements: Vec::new(),
    }
  }
}

impl Reputation {
  /// The level implied by a point total: `floor(sqrt(points/100)) + 1`.
  /// Negative totals clamp to level 1.
  pub fn level_for_points(points: i64) -> u32 {
    let points = points.max(0) as f64;
    (points / 100.0).sqrt().floor() as u32 + 1
  }

  /// Add (signed) points and recompute the level. The level never
  /// decreases, even if a penalty pulls the total below a boundary.
  /// Returns `true` if the identity levelled up.
  pub fn add_points(&mut self, points: i64) -> bool {
    self.points += points;
    let new_level = Self::level_for_points(self.points);
    if new_level > self.level {
      self.level = new_level;
      true
    } else {
      false
    }
  }

  pub fn has_badge(&self, kind: BadgeKind, name: &str) -> bool {
    self.badges.iter().any(|b| b.kind == kind && b.name == name)
  }
}

// ─── Activity streak ─────────────────────────────────────────────────────────

/// Per-identity consecutive-day activity counter, independent of the
/// reputation event ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityStreak {
  pub current:            u32,
  pub longest:            u32,
  pub last_activity_date: Option<NaiveDate>,
}

impl ActivityStreak {
  /// Register a qualifying activity on `today`. Exactly one elapsed day
  /// extends the streak; a longer gap resets it; same-day activity is a
  /// no-op for the counter.
  pub fn touch(&mut self, today: NaiveDate) {
    match self.last_activity_date {
      None => self.current = 1,
      Some(last) => {
        let elapsed = (today - last).num_days();
        if elapsed == 1 {
          self.current += 1;
          self.longest = self.longest.max(self.current);
        } else if elapsed > 1 {
          self.current = 1;
        }
      }
    }
    self.longest = self.longest.max(self.current);
    self.last_activity_date = Some(today);
  }
}

// ─── Identity ────────────────────────────────────────────────────────────────

/// A user account. Authorization decisions go through the predicate
/// methods below, never through ad-hoc role checks in route logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
  pub identity_id:     Uuid,
  /// Opaque id from the external auth provider.
  pub external_id:     String,
  pub email:           String,
  pub display_name:    String,
  pub picture:         Option<String>,
  pub role:            Role,
  pub edit_privileges: EditPrivileges,
  pub permissions:     Permissions,
  pub reputation:      Reputation,
  pub activity_streak: ActivityStreak,
  pub created_at:      DateTime<Utc>,
}

impl Identity {
  /// May this identity's edits skip the pending state and apply directly?
  pub fn can_edit_directly(&self) -> bool {
    self.edit_privileges != EditPrivileges::None
  }

  /// May this identity approve or reject pending revisions?
  /// Either a trusted role or 500+ reputation points qualifies.
  pub fn can_approve_edits(&self) -> bool {
    self.role >= Role::WonderGuide || self.reputation.points >= 500
  }

  pub fn can_moderate(&self) -> bool { self.role >= Role::ContentModerator }

  pub fn can_moderate_discussions(&self) -> bool {
    self.permissions.can_moderate_discussions || self.can_moderate()
  }
}

/// Input to [`crate::store::WonderStore::add_identity`]; server-assigned
/// fields (id, timestamps, defaults) are filled in by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct NewIdentity {
  pub external_id:  String,
  pub email:        String,
  pub display_name: String,
  pub picture:      Option<String>,
}

// ─── Tests ───────────────────────────────────────────────────────────────────
