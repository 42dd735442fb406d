//! Wonder creation and ratings.
//!
//! Creation bypasses the revision pipeline: the wonder starts at version 0
//! with its overview section filled in, and later changes go through the
//! moderation engine. Slug uniqueness is probed against the store; image
//! uploads degrade to a placeholder URL rather than failing the create.

use chrono::Utc;
use tracing::warn;
use uuid::Uuid;
use wonders_core::{
  reputation::{EventKind, EventMetadata, NewReputationEvent},
  store::WonderStore,
  wonder::{
    NewWonder, Photo, Rating, Section, Wonder, base_slug,
    slug_with_coordinates,
  },
};

use crate::{
  WONDER_ADDED_POINTS,
  error::{Error, Result},
  media::{MediaStore, PLACEHOLDER_IMAGE_URL, PlaceholderMediaStore},
  reputation::ReputationEngine,
};

/// An image submitted alongside a wonder. The first upload becomes the
/// cover image.
#[derive(Debug, Clone)]
pub struct ImageUpload {
  pub filename: String,
  pub bytes:    Vec<u8>,
  pub caption:  Option<String>,
}

#[derive(Debug, Clone)]
pub struct WonderService<S, M = PlaceholderMediaStore> {
  store:      S,
  reputation: ReputationEngine<S>,
  media:      M,
}

impl<S: WonderStore + Clone> WonderService<S> {
  pub fn new(store: S) -> Self {
    Self::with_media(store, PlaceholderMediaStore)
  }
}

impl<S: WonderStore + Clone, M: MediaStore> WonderService<S, M> {
  pub fn with_media(store: S, media: M) -> Self {
    Self {
      reputation: ReputationEngine::new(store.clone()),
      store,
      media,
    }
  }

  /// Create a wonder: validate, derive a unique slug, upload images (with
  /// placeholder degradation), persist, and reward the creator.
  pub async fn create_wonder(
    &self,
    creator_id: Uuid,
    input: NewWonder,
    images: Vec<ImageUpload>,
  ) -> Result<Wonder> {
    input.validate()?;
    self
      .store
      .get_identity(creator_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::IdentityNotFound(creator_id))?;

    let now = Utc::now();
    let slug = self.unique_slug(&input).await?;

    let mut wonder = Wonder {
      wonder_id: Uuid::new_v4(),
      name: input.name,
      slug,
      category: input.category,
      subcategory: input.subcategory,
      country: input.country,
      location: input.location,
      content: Default::default(),
      cover_image: None,
      photos: Vec::new(),
      ratings: Vec::new(),
      average_rating: 0.0,
      current_version: 0,
      completeness_score: 0,
      created_by: creator_id,
      created_at: now,
      updated_at: now,
    };
    wonder.set_section(Section::Overview, input.overview, creator_id, now);

    for image in images {
      let url = match self.media.upload(&image.filename, &image.bytes).await
      {
        Ok(url) => url,
        Err(err) => {
          warn!(
            filename = %image.filename,
            error = %err,
            "image upload failed, using placeholder"
          );
          PLACEHOLDER_IMAGE_URL.to_string()
        }
      };
      let photo = Photo {
        url,
        caption: image.caption,
        uploaded_by: creator_id,
        uploaded_at: now,
      };
      if wonder.cover_image.is_none() {
        wonder.cover_image = Some(photo.clone());
      }
      wonder.photos.push(photo);
    }
    wonder.completeness_score = wonder.completeness();

    self.store.add_wonder(&wonder).await.map_err(Error::store)?;

    self
      .reputation
      .record_event(NewReputationEvent {
        identity_id: creator_id,
        kind:        EventKind::WonderAdded,
        points:      WONDER_ADDED_POINTS,
        wonder_id:   Some(wonder.wonder_id),
        revision_id: None,
        description: format!("Added {}", wonder.name),
        metadata:    EventMetadata::default(),
      })
      .await?;
    self
      .reputation
      .record_activity(creator_id, now.date_naive())
      .await?;

    Ok(wonder)
  }

  /// Look up a wonder by UUID, falling back to slug.
  pub async fn get_wonder(&self, id_or_slug: &str) -> Result<Wonder> {
    if let Ok(id) = Uuid::parse_str(id_or_slug)
      && let Some(wonder) =
        self.store.get_wonder(id).await.map_err(Error::store)?
    {
      return Ok(wonder);
    }
    self
      .store
      .get_wonder_by_slug(id_or_slug)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::WonderNotFound(id_or_slug.to_string()))
  }

  /// Upsert one identity's 1–5 rating and recompute the average.
  pub async fn rate_wonder(
    &self,
    rater_id: Uuid,
    id_or_slug: &str,
    rating: u8,
    comment: Option<String>,
  ) -> Result<Wonder> {
    self
      .store
      .get_identity(rater_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::IdentityNotFound(rater_id))?;
    let mut wonder = self.get_wonder(id_or_slug).await?;
    wonder.rate(Rating {
      identity_id: rater_id,
      rating,
      comment,
      created_at: Utc::now(),
    })?;
    self.store.put_wonder(&wonder).await.map_err(Error::store)?;
    Ok(wonder)
  }

  /// Probe the store for a free slug: name+country, then rounded
  /// coordinates, then a numeric counter.
  async fn unique_slug(&self, input: &NewWonder) -> Result<String> {
    let base = base_slug(&input.name, &input.country);
    if self.slug_free(&base).await? {
      return Ok(base);
    }
    let with_coords = slug_with_coordinates(&base, input.location);
    if self.slug_free(&with_coords).await? {
      return Ok(with_coords);
    }
    let mut counter = 2u32;
    loop {
      let candidate = format!("{base}-{counter}");
      if self.slug_free(&candidate).await? {
        return Ok(candidate);
      }
      counter += 1;
    }
  }

  async fn slug_free(&self, slug: &str) -> Result<bool> {
    Ok(
      self
        .store
        .get_wonder_by_slug(slug)
        .await
        .map_err(Error::store)?
        .is_none(),
    )
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use wonders_core::{
    identity::{Identity, NewIdentity},
    reputation::BadgeKind,
    wonder::{Category, GeoPoint},
  };
  use wonders_store_sqlite::SqliteStore;

  use super::*;
  use crate::media::MediaError;

  async fn store() -> SqliteStore {
    SqliteStore::open_in_memory().await.expect("in-memory store")
  }

  async fn identity(store: &SqliteStore, tag: &str) -> Identity {
    store
      .add_identity(NewIdentity {
        external_id:  format!("ext-{tag}"),
        email:        format!("{tag}@example.com"),
        display_name: tag.to_string(),
        picture:      None,
      })
      .await
      .unwrap()
  }

  fn falls(lat: f64, lng: f64) -> NewWonder {
    NewWonder {
      name:        "Hidden Falls".into(),
      category:    Category::Nature,
      subcategory: "waterfall".into(),
      country:     "New Zealand".into(),
      location:    GeoPoint { lat, lng },
      overview:    "A tall waterfall at the end of the gorge track.".into(),
    }
  }

  struct FixedMedia;

  impl MediaStore for FixedMedia {
    async fn upload(
      &self,
      filename: &str,
      _bytes: &[u8],
    ) -> Result<String, MediaError> {
      Ok(format!("https://img.example.com/{filename}"))
    }
  }

  #[tokio::test]
  async fn create_persists_and_rewards_the_creator() {
    let s = store().await;
    let service = WonderService::new(s.clone());
    let alice = identity(&s, "alice").await;

    let wonder = service
      .create_wonder(alice.identity_id, falls(-36.85, 174.76), Vec::new())
      .await
      .unwrap();

    assert_eq!(wonder.slug, "hidden-falls-new-zealand");
    assert_eq!(wonder.current_version, 0);
    assert_eq!(wonder.completeness_score, 13); // overview only

    let fetched = service.get_wonder("hidden-falls-new-zealand").await.unwrap();
    assert_eq!(fetched.wonder_id, wonder.wonder_id);
    let by_id =
      service.get_wonder(&wonder.wonder_id.to_string()).await.unwrap();
    assert_eq!(by_id.wonder_id, wonder.wonder_id);

    let alice = s.get_identity(alice.identity_id).await.unwrap().unwrap();
    assert_eq!(alice.reputation.points, WONDER_ADDED_POINTS);
    assert!(alice.reputation.has_badge(BadgeKind::Contributor, "1 Wonders"));
    assert_eq!(alice.activity_streak.current, 1);
  }

  #[tokio::test]
  async fn slug_collisions_fall_back_to_coordinates_then_counter() {
    let s = store().await;
    let service = WonderService::new(s.clone());
    let alice = identity(&s, "alice").await;

    let first = service
      .create_wonder(alice.identity_id, falls(-36.85, 174.76), Vec::new())
      .await
      .unwrap();
    assert_eq!(first.slug, "hidden-falls-new-zealand");

    let second = service
      .create_wonder(alice.identity_id, falls(-45.03, 168.66), Vec::new())
      .await
      .unwrap();
    assert_eq!(second.slug, "hidden-falls-new-zealand--45.03-168.66");

    // Same name, country, and coordinates: the counter breaks the tie.
    let third = service
      .create_wonder(alice.identity_id, falls(-45.03, 168.66), Vec::new())
      .await
      .unwrap();
    assert_eq!(third.slug, "hidden-falls-new-zealand-2");
  }

  #[tokio::test]
  async fn failed_upload_degrades_to_the_placeholder() {
    let s = store().await;
    let service = WonderService::new(s.clone());
    let alice = identity(&s, "alice").await;

    let wonder = service
      .create_wonder(
        alice.identity_id,
        falls(-36.85, 174.76),
        vec![ImageUpload {
          filename: "falls.jpg".into(),
          bytes:    vec![0xff, 0xd8],
          caption:  Some("the falls".into()),
        }],
      )
      .await
      .unwrap();

    let cover = wonder.cover_image.unwrap();
    assert_eq!(cover.url, PLACEHOLDER_IMAGE_URL);
    assert_eq!(wonder.photos.len(), 1);
    assert_eq!(wonder.completeness_score, 25); // overview + photo
  }

  #[tokio::test]
  async fn successful_upload_uses_the_returned_url() {
    let s = store().await;
    let service = WonderService::with_media(s.clone(), FixedMedia);
    let alice = identity(&s, "alice").await;

    let wonder = service
      .create_wonder(
        alice.identity_id,
        falls(-36.85, 174.76),
        vec![ImageUpload {
          filename: "falls.jpg".into(),
          bytes:    vec![0xff, 0xd8],
          caption:  None,
        }],
      )
      .await
      .unwrap();

    assert_eq!(
      wonder.cover_image.unwrap().url,
      "https://img.example.com/falls.jpg"
    );
  }

  #[tokio::test]
  async fn invalid_input_is_rejected_before_any_write() {
    let s = store().await;
    let service = WonderService::new(s.clone());
    let alice = identity(&s, "alice").await;

    let mut input = falls(-36.85, 174.76);
    input.location.lat = 91.0;
    let err = service
      .create_wonder(alice.identity_id, input, Vec::new())
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
  }

  #[tokio::test]
  async fn rating_round_trips_through_the_store() {
    let s = store().await;
    let service = WonderService::new(s.clone());
    let alice = identity(&s, "alice").await;
    let bob = identity(&s, "bob").await;

    let wonder = service
      .create_wonder(alice.identity_id, falls(-36.85, 174.76), Vec::new())
      .await
      .unwrap();

    service
      .rate_wonder(alice.identity_id, &wonder.slug, 5, None)
      .await
      .unwrap();
    let rated = service
      .rate_wonder(bob.identity_id, &wonder.slug, 2, Some("muddy".into()))
      .await
      .unwrap();
    assert_eq!(rated.average_rating, 3.5);

    let fetched = service.get_wonder(&wonder.slug).await.unwrap();
    assert_eq!(fetched.ratings.len(), 2);
    assert_eq!(fetched.average_rating, 3.5);

    let err = service
      .rate_wonder(bob.identity_id, &wonder.slug, 0, None)
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
  }

  #[tokio::test]
  async fn unknown_wonder_lookups_are_not_found() {
    let s = store().await;
    let service = WonderService::new(s);
    let err = service.get_wonder("no-such-slug").await.unwrap_err();
    assert!(matches!(err, Error::WonderNotFound(_)));
  }
}
