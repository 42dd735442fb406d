//! Revision types — the append-only change log for wonder content.
//!
//! A revision is written once and its outcome transitions exactly once
//! (pending → approved or pending → rejected). Reverts never touch old
//! revisions; they are recorded as brand-new approved revisions carrying
//! the restored snapshot.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::wonder::{Category, GeoPoint, Section, Wonder};

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// The lifecycle outcome of a revision. Exactly one state holds at a time;
/// the reviewer/reason fields exist only in the states where they are
/// meaningful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RevisionOutcome {
  Pending,
  Approved {
    by: Uuid,
    at: DateTime<Utc>,
  },
  Rejected {
    by:     Uuid,
    at:     DateTime<Utc>,
    reason: String,
  },
}

impl RevisionOutcome {
  pub fn is_pending(&self) -> bool { matches!(self, Self::Pending) }

  pub fn is_approved(&self) -> bool { matches!(self, Self::Approved { .. }) }

  /// The storage discriminant for the `status` column.
  pub fn discriminant(&self) -> &'static str {
    match self {
      Self::Pending => "pending",
      Self::Approved { .. } => "approved",
      Self::Rejected { .. } => "rejected",
    }
  }
}

// ─── Change payload ──────────────────────────────────────────────────────────

/// What a revision proposes. Section edits carry before/after text for one
/// section; reverts reference an earlier applied version whose snapshot is
/// restored wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RevisionChange {
  SectionEdit {
    section:  Section,
    previous: String,
    current:  String,
  },
  Revert {
    to_version: u32,
  },
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// Full snapshot of a wonder's editable fields, recorded at the moment a
/// revision is applied. This is what compare and revert operate on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSnapshot {
  pub name:        String,
  pub category:    Category,
  pub subcategory: String,
  pub country:     String,
  pub location:    GeoPoint,
  /// Section texts only; edit attribution is not part of the snapshot.
  pub sections:    BTreeMap<Section, String>,
}

impl ContentSnapshot {
  /// Capture the current editable state of `wonder`.
  pub fn of(wonder: &Wonder) -> Self {
    Self {
      name:        wonder.name.clone(),
      category:    wonder.category,
      subcategory: wonder.subcategory.clone(),
      country:     wonder.country.clone(),
      location:    wonder.location,
      sections:    wonder
        .content
        .iter()
        .map(|(s, c)| (*s, c.text.clone()))
        .collect(),
    }
  }

  fn section_text(&self, section: Section) -> &str {
    self
      .sections
      .get(&section)
      .map(String::as_str)
      .unwrap_or("")
  }
}

/// Field-by-field "changed" map between two snapshots: structural
/// inequality per field, keyed by field/section name. Pure; used only for
/// display.
pub fn snapshot_diff(
  from: &ContentSnapshot,
  to: &ContentSnapshot,
) -> BTreeMap<String, bool> {
  let mut diff = BTreeMap::new();
  diff.insert("name".to_string(), from.name != to.name);
  diff.insert("category".to_string(), from.category != to.category);
  diff.insert("subcategory".to_string(), from.subcategory != to.subcategory);
  diff.insert("country".to_string(), from.country != to.country);
  diff.insert("location".to_string(), from.location != to.location);
  for section in Section::ALL {
    diff.insert(
      section.discriminant().to_string(),
      from.section_text(section) != to.section_text(section),
    );
  }
  diff
}

// ─── Revision ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Revision {
  pub revision_id:  Uuid,
  pub wonder_id:    Uuid,
  pub editor:       Uuid,
  pub change:       RevisionChange,
  pub outcome:      RevisionOutcome,
  /// Assigned only when applied; `(wonder_id, version)` is unique and
  /// dense over applied revisions.
  pub version:      Option<u32>,
  pub edit_summary: Option<String>,
  /// Recorded at apply time; `None` while pending or rejected.
  pub snapshot:     Option<ContentSnapshot>,
  pub comments:     Vec<RevisionComment>,
  pub created_at:   DateTime<Utc>,
}

/// Discussion attached to a single revision, append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevisionComment {
  pub comment_id: Uuid,
  pub author:     Uuid,
  pub text:       String,
  pub created_at: DateTime<Utc>,
}

/// List-view projection: everything but the heavy change/snapshot payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevisionSummary {
  pub revision_id:   Uuid,
  pub wonder_id:     Uuid,
  pub editor:        Uuid,
  /// `None` for revert revisions, which touch every section.
  pub section:       Option<Section>,
  pub status:        String,
  pub version:       Option<u32>,
  pub edit_summary:  Option<String>,
  pub comment_count: usize,
  pub created_at:    DateTime<Utc>,
}

impl Revision {
  pub fn summary(&self) -> RevisionSummary {
    RevisionSummary {
      revision_id:   self.revision_id,
      wonder_id:     self.wonder_id,
      editor:        self.editor,
      section:       match &self.change {
        RevisionChange::SectionEdit { section, .. } => Some(*section),
        RevisionChange::Revert { .. } => None,
      },
      status:        self.outcome.discriminant().to_string(),
      version:       self.version,
      edit_summary:  self.edit_summary.clone(),
      comment_count: self.comments.len(),
      created_at:    self.created_at,
    }
  }
}

/// The result of comparing two applied revisions of the same wonder.
#[derive(Debug, Clone, Serialize)]
pub struct RevisionComparison {
  pub from_revision: Revision,
  pub to_revision:   Revision,
  pub diff:          BTreeMap<String, bool>,
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn snapshot(history: &str, name: &str) -> ContentSnapshot {
    let mut sections = BTreeMap::new();
    sections.insert(Section::History, history.to_string());
    ContentSnapshot {
      name: name.to_string(),
      category: Category::Nature,
      subcategory: "lake".into(),
      country: "NZ".into(),
      location: GeoPoint { lat: 1.0, lng: 2.0 },
      sections,
    }
  }

  #[test]
  fn diff_flags_only_changed_fields() {
    let a = snapshot("old history", "Lake");
    let b = snapshot("new history", "Lake");
    let diff = snapshot_diff(&a, &b);

    assert_eq!(diff["history"], true);
    assert_eq!(diff["name"], false);
    assert_eq!(diff["location"], false);
    // Absent sections on both sides compare equal.
    assert_eq!(diff["overview"], false);
  }

  #[test]
  fn diff_treats_location_structurally() {
    let a = snapshot("h", "Lake");
    let mut b = snapshot("h", "Lake");
    b.location = GeoPoint { lat: 1.0, lng: 2.5 };
    assert_eq!(snapshot_diff(&a, &b)["location"], true);
  }

  #[test]
  fn outcome_serialises_as_tagged_union() {
    let approved = RevisionOutcome::Approved { by: Uuid::new_v4(), at: Utc::now() };
    let json = serde_json::to_value(&approved).unwrap();
    assert_eq!(json["status"], "approved");
    assert!(json.get("reason").is_none());

    let rejected = RevisionOutcome::Rejected {
      by:     Uuid::new_v4(),
      at:     Utc::now(),
      reason: "unsourced".into(),
    };
    let json = serde_json::to_value(&rejected).unwrap();
    assert_eq!(json["status"], "rejected");
    assert_eq!(json["reason"], "unsourced");
  }
}
