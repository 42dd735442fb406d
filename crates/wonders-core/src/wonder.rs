//! Wonder — a geotagged point of interest with wiki-style sectioned content.
//!
//! Live content is mutated only through the moderation engine's apply step;
//! initial creation bypasses revisioning and starts at version 0.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Classification ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
  Nature,
  Historical,
  Caves,
  Urban,
  Viewpoints,
  Water,
}

// ─── Geography ───────────────────────────────────────────────────────────────

/// A WGS84 coordinate pair. `PartialEq` is structural and is what revision
/// comparison uses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
  pub lat: f64,
  pub lng: f64,
}

impl GeoPoint {
  pub fn validate(&self) -> Result<()> {
    if !(-90.0..=90.0).contains(&self.lat) {
      return Err(Error::Validation(format!(
        "latitude {} out of range [-90, 90]",
        self.lat
      )));
    }
    if !(-180.0..=180.0).contains(&self.lng) {
      return Err(Error::Validation(format!(
        "longitude {} out of range [-180, 180]",
        self.lng
      )));
    }
    Ok(())
  }
}

// ─── Content sections ────────────────────────────────────────────────────────

/// The canonical wiki sections. Revisions target exactly one section;
/// completeness counts all seven plus photo presence.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Section {
  Overview,
  History,
  Geography,
  FloraAndFauna,
  CulturalSignificance,
  VisitingInfo,
  SafetyGuidelines,
}

impl Section {
  pub const ALL: [Section; 7] = [
    Section::Overview,
    Section::History,
    Section::Geography,
    Section::FloraAndFauna,
    Section::CulturalSignificance,
    Section::VisitingInfo,
    Section::SafetyGuidelines,
  ];

  /// The discriminant string used in storage and diff maps.
  /// Must match the `rename_all = "snake_case"` serde tags above.
  pub fn discriminant(&self) -> &'static str {
    match self {
      Section::Overview => "overview",
      Section::History => "history",
      Section::Geography => "geography",
      Section::FloraAndFauna => "flora_and_fauna",
      Section::CulturalSignificance => "cultural_significance",
      Section::VisitingInfo => "visiting_info",
      Section::SafetyGuidelines => "safety_guidelines",
    }
  }
}

/// One section's live text plus edit attribution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SectionContent {
  pub text:           String,
  pub last_edited_by: Option<Uuid>,
  pub last_edited_at: Option<DateTime<Utc>>,
}

// ─── Media & ratings ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
  pub url:         String,
  pub caption:     Option<String>,
  pub uploaded_by: Uuid,
  pub uploaded_at: DateTime<Utc>,
}

/// One identity's rating; at most one per identity, upserted in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
  pub identity_id: Uuid,
  /// 1–5 inclusive.
  pub rating:      u8,
  pub comment:     Option<String>,
  pub created_at:  DateTime<Utc>,
}

// ─── Wonder ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wonder {
  pub wonder_id:          Uuid,
  pub name:               String,
  /// Unique, derived from name + country; see [`slugify`].
  pub slug:               String,
  pub category:           Category,
  pub subcategory:        String,
  pub country:            String,
  pub location:           GeoPoint,
  pub content:            BTreeMap<Section, SectionContent>,
  pub cover_image:        Option<Photo>,
  pub photos:             Vec<Photo>,
  pub ratings:            Vec<Rating>,
  pub average_rating:     f64,
  /// Strictly +1 per applied revision; equals the version of the most
  /// recently applied revision. 0 means "as created, never revised".
  pub current_version:    u32,
  /// 0–100: non-empty canonical sections (plus photo presence) out of 8.
  pub completeness_score: u8,
  pub created_by:         Uuid,
  pub created_at:         DateTime<Utc>,
  pub updated_at:         DateTime<Utc>,
}

impl Wonder {
  pub fn section_text(&self, section: Section) -> &str {
    self
      .content
      .get(&section)
      .map(|c| c.text.as_str())
      .unwrap_or("")
  }

  /// Overwrite one section's live text, stamping attribution.
  /// Callers are responsible for the surrounding revision bookkeeping.
  pub fn set_section(
    &mut self,
    section: Section,
    text: String,
    edited_by: Uuid,
    at: DateTime<Utc>,
  ) {
    self.content.insert(section, SectionContent {
      text,
      last_edited_by: Some(edited_by),
      last_edited_at: Some(at),
    });
    self.updated_at = at;
    self.completeness_score = self.completeness();
  }

  /// Completeness: count of non-empty canonical sections plus "has at
  /// least one photo", out of a fixed denominator of 8, as a 0–100
  /// integer percentage.
  pub fn completeness(&self) -> u8 {
    let mut filled = Section::ALL
      .iter()
      .filter(|s| !self.section_text(**s).trim().is_empty())
      .count();
    if !self.photos.is_empty() || self.cover_image.is_some() {
      filled += 1;
    }
    ((filled as f64 / 8.0) * 100.0).round() as u8
  }

  /// Upsert one identity's rating and recompute the average (rounded to
  /// one decimal place, matching what the map UI displays).
  pub fn rate(&mut self, rating: Rating) -> Result<()> {
    if !(1..=5).contains(&rating.rating) {
      return Err(Error::Validation(
        "rating must be between 1 and 5".to_string(),
      ));
    }
    match self
      .ratings
      .iter_mut()
      .find(|r| r.identity_id == rating.identity_id)
    {
      Some(existing) => *existing = rating,
      None => self.ratings.push(rating),
    }
    let total: u32 = self.ratings.iter().map(|r| u32::from(r.rating)).sum();
    self.average_rating =
      (f64::from(total) / self.ratings.len() as f64 * 10.0).round() / 10.0;
    Ok(())
  }
}

/// Input to wonder creation; the engine derives the slug and fills in
/// server-assigned fields.
#[derive(Debug, Clone, Deserialize)]
pub struct NewWonder {
  pub name:        String,
  pub category:    Category,
  pub subcategory: String,
  pub country:     String,
  pub location:    GeoPoint,
  /// Initial overview text (the one section required at creation).
  pub overview:    String,
}

impl NewWonder {
  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::Validation("name is required".to_string()));
    }
    if self.country.trim().is_empty() {
      return Err(Error::Validation("country is required".to_string()));
    }
    if self.overview.trim().is_empty() {
      return Err(Error::Validation("overview is required".to_string()));
    }
    self.location.validate()
  }
}

// ─── Slugs ───────────────────────────────────────────────────────────────────

/// Lowercase/ASCII-fold `input` into a hyphenated slug fragment.
pub fn slugify(input: &str) -> String {
  let mut out = String::with_capacity(input.len());
  let mut last_dash = true; // suppress leading dashes
  for c in input.chars() {
    if c.is_ascii_alphanumeric() {
      out.push(c.to_ascii_lowercase());
      last_dash = false;
    } else if !last_dash {
      out.push('-');
      last_dash = true;
    }
  }
  while out.ends_with('-') {
    out.pop();
  }
  out
}

/// The base slug for a wonder: name plus country.
pub fn base_slug(name: &str, country: &str) -> String {
  let name_part = slugify(name);
  let country_part = slugify(country);
  if country_part.is_empty() {
    name_part
  } else {
    format!("{name_part}-{country_part}")
  }
}

/// The first collision fallback: base slug with coordinates rounded to two
/// decimal places. Further collisions get a numeric counter (handled by the
/// caller's store loop).
pub fn slug_with_coordinates(base: &str, location: GeoPoint) -> String {
  format!("{base}-{:.2}-{:.2}", location.lat, location.lng)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
