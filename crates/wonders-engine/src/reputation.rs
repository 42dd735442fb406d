//! The reputation engine.
//!
//! Every point change flows through [`ReputationEngine::record_event`]:
//! persist the ledger entry, apply the points to the identity, then run the
//! milestone check for the event's kind. Badge awards and achievement
//! progress are side effects of recording, never separate writes.

use chrono::{NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;
use wonders_core::{
  identity::{Achievement, ActivityStreak, Badge, Identity},
  reputation::{
    AchievementKind, EventKind, EventMetadata, MilestoneSource,
    NewReputationEvent, ReputationEvent,
  },
  store::WonderStore,
};

use crate::{
  EDIT_STREAK_POINTS,
  error::{Error, Result},
};

#[derive(Debug, Clone)]
pub struct ReputationEngine<S> {
  store: S,
}

impl<S: WonderStore> ReputationEngine<S> {
  pub fn new(store: S) -> Self { Self { store } }

  /// Append an event to the ledger, apply its points to the identity, and
  /// run the milestone check for its kind. Returns the stored event.
  ///
  /// Level-ups and badge awards are themselves recorded as zero-point
  /// ledger entries, so the ledger is a complete account of how the
  /// identity got where it is.
  pub async fn record_event(
    &self,
    input: NewReputationEvent,
  ) -> Result<ReputationEvent> {
    // Resolve the identity first so an unknown id surfaces as not-found
    // and never leaves an orphan ledger entry behind.
    let mut identity = self
      .store
      .get_identity(input.identity_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::IdentityNotFound(input.identity_id))?;

    let now = Utc::now();
    let event = ReputationEvent {
      event_id:    Uuid::new_v4(),
      identity_id: input.identity_id,
      kind:        input.kind,
      points:      input.points,
      wonder_id:   input.wonder_id,
      revision_id: input.revision_id,
      description: input.description,
      metadata:    input.metadata,
      created_at:  now,
    };
    self.store.add_event(&event).await.map_err(Error::store)?;

    let levelled_up = identity.reputation.add_points(event.points);
    let awarded = self.check_milestone(&mut identity, &event).await?;
    self.update_achievements(&mut identity, &event);
    self.store.put_identity(&identity).await.map_err(Error::store)?;

    if levelled_up {
      let level = identity.reputation.level;
      info!(identity = %identity.identity_id, level, "identity levelled up");
      self
        .note(
          &identity,
          EventKind::LevelUp,
          format!("Reached level {level}"),
        )
        .await?;
    }
    if let Some(badge) = awarded {
      self
        .note(
          &identity,
          EventKind::BadgeAwarded,
          format!("Earned the {} badge", badge.name),
        )
        .await?;
    }

    Ok(event)
  }

  /// Register a qualifying contribution on `today` for streak purposes.
  /// Hitting a streak milestone length records an `edit_streak` event,
  /// which in turn awards the streak badge. Same-day activity is a no-op.
  pub async fn record_activity(
    &self,
    identity_id: Uuid,
    today: NaiveDate,
  ) -> Result<ActivityStreak> {
    let mut identity = self
      .store
      .get_identity(identity_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::IdentityNotFound(identity_id))?;

    if identity.activity_streak.last_activity_date == Some(today) {
      return Ok(identity.activity_streak);
    }

    identity.activity_streak.touch(today);
    let streak = identity.activity_streak;
    self.store.put_identity(&identity).await.map_err(Error::store)?;

    let milestone_hit = EventKind::EditStreak
      .milestone_rule()
      .and_then(|rule| rule.crossed(u64::from(streak.current)))
      .is_some();
    if milestone_hit {
      self
        .record_event(NewReputationEvent {
          identity_id,
          kind: EventKind::EditStreak,
          points: EDIT_STREAK_POINTS,
          wonder_id: None,
          revision_id: None,
          description: format!(
            "Contributed {} days in a row",
            streak.current
          ),
          metadata: EventMetadata {
            streak_count: Some(u64::from(streak.current)),
            ..EventMetadata::default()
          },
        })
        .await?;
    }

    Ok(streak)
  }

  /// Run the milestone rule for `event`, mutating `identity` in place when
  /// a badge is due. Counts come from the ledger (or the event's own
  /// streak metadata) so the check is self-correcting across retries.
  async fn check_milestone(
    &self,
    identity: &mut Identity,
    event: &ReputationEvent,
  ) -> Result<Option<Badge>> {
    let Some(rule) = event.kind.milestone_rule() else {
      return Ok(None);
    };
    let count = match rule.source {
      MilestoneSource::LedgerCount => self
        .store
        .count_events(event.identity_id, event.kind)
        .await
        .map_err(Error::store)?,
      MilestoneSource::StreakCount => {
        event.metadata.streak_count.unwrap_or(0)
      }
    };
    let Some(milestone) = rule.crossed(count) else {
      return Ok(None);
    };

    let name = rule.badge_name(milestone);
    if identity.reputation.has_badge(rule.badge, &name) {
      return Ok(None);
    }
    let badge = Badge {
      kind:        rule.badge,
      name:        name.clone(),
      description: rule.description.to_string(),
      awarded_at:  event.created_at,
    };
    identity.reputation.badges.push(badge.clone());
    info!(identity = %identity.identity_id, badge = %name, "badge awarded");
    Ok(Some(badge))
  }

  /// Achievement upserts keyed by event kind. Progress only ever rises;
  /// completion latches.
  fn update_achievements(
    &self,
    identity: &mut Identity,
    event: &ReputationEvent,
  ) {
    let (kind, name) = match event.kind {
      EventKind::EditApproved | EventKind::WonderAdded => {
        (AchievementKind::FirstContribution, "First Contribution")
      }
      _ => return,
    };
    let achievements = &mut identity.reputation.achievements;
    if achievements.iter().any(|a| a.kind == kind) {
      return;
    }
    achievements.push(Achievement {
      kind,
      name: name.to_string(),
      progress: 100,
      completed: true,
      completed_at: Some(event.created_at),
    });
  }

  /// Append a zero-point bookkeeping entry to the ledger.
  async fn note(
    &self,
    identity: &Identity,
    kind: EventKind,
    description: String,
  ) -> Result<()> {
    let event = ReputationEvent {
      event_id: Uuid::new_v4(),
      identity_id: identity.identity_id,
      kind,
      points: 0,
      wonder_id: None,
      revision_id: None,
      description,
      metadata: EventMetadata::default(),
      created_at: Utc::now(),
    };
    self.store.add_event(&event).await.map_err(Error::store)
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use wonders_core::{
    identity::Identity,
    reputation::BadgeKind,
  };
  use wonders_store_sqlite::SqliteStore;

  use super::*;
  use crate::EDIT_APPROVED_POINTS;

  async fn store() -> SqliteStore {
    SqliteStore::open_in_memory().await.expect("in-memory store")
  }

  async fn identity(store: &SqliteStore, tag: &str) -> Identity {
    store
      .add_identity(wonders_core::identity::NewIdentity {
        external_id:  format!("ext-{tag}"),
        email:        format!("{tag}@example.com"),
        display_name: tag.to_string(),
        picture:      None,
      })
      .await
      .unwrap()
  }

  fn edit_approved(identity_id: Uuid) -> NewReputationEvent {
    NewReputationEvent {
      identity_id,
      kind: EventKind::EditApproved,
      points: EDIT_APPROVED_POINTS,
      wonder_id: None,
      revision_id: None,
      description: "Edit approved".into(),
      metadata: EventMetadata::default(),
    }
  }

  #[tokio::test]
  async fn points_accrue_and_level_rises() {
    let s = store().await;
    let engine = ReputationEngine::new(s.clone());
    let alice = identity(&s, "alice").await;

    for _ in 0..10 {
      engine.record_event(edit_approved(alice.identity_id)).await.unwrap();
    }

    let alice = s.get_identity(alice.identity_id).await.unwrap().unwrap();
    assert_eq!(alice.reputation.points, 100);
    assert_eq!(alice.reputation.level, 2);
    assert_eq!(
      s.count_events(alice.identity_id, EventKind::LevelUp).await.unwrap(),
      1
    );
  }

  #[tokio::test]
  async fn tenth_edit_awards_the_badge_exactly_once() {
    let s = store().await;
    let engine = ReputationEngine::new(s.clone());
    let bob = identity(&s, "bob").await;

    for _ in 0..12 {
      engine.record_event(edit_approved(bob.identity_id)).await.unwrap();
    }

    let bob = s.get_identity(bob.identity_id).await.unwrap().unwrap();
    let ten_edits: Vec<_> = bob
      .reputation
      .badges
      .iter()
      .filter(|b| b.kind == BadgeKind::Editor && b.name == "10 Edits")
      .collect();
    assert_eq!(ten_edits.len(), 1);
    // The first edit earned its own badge too.
    assert!(bob.reputation.has_badge(BadgeKind::Editor, "1 Edits"));
  }

  #[tokio::test]
  async fn first_contribution_achievement_latches() {
    let s = store().await;
    let engine = ReputationEngine::new(s.clone());
    let carol = identity(&s, "carol").await;

    engine.record_event(edit_approved(carol.identity_id)).await.unwrap();
    engine.record_event(edit_approved(carol.identity_id)).await.unwrap();

    let carol = s.get_identity(carol.identity_id).await.unwrap().unwrap();
    let firsts: Vec<_> = carol
      .reputation
      .achievements
      .iter()
      .filter(|a| a.kind == AchievementKind::FirstContribution)
      .collect();
    assert_eq!(firsts.len(), 1);
    assert!(firsts[0].completed);
    assert_eq!(firsts[0].progress, 100);
  }

  #[tokio::test]
  async fn seven_day_streak_awards_badge_and_points() {
    let s = store().await;
    let engine = ReputationEngine::new(s.clone());
    let dana = identity(&s, "dana").await;

    let day = |d| NaiveDate::from_ymd_opt(2025, 6, d).unwrap();
    for d in 1..=7 {
      engine.record_activity(dana.identity_id, day(d)).await.unwrap();
    }

    let dana = s.get_identity(dana.identity_id).await.unwrap().unwrap();
    assert_eq!(dana.activity_streak.current, 7);
    assert!(dana.reputation.has_badge(BadgeKind::Editor, "7 Day Streak"));
    assert_eq!(dana.reputation.points, EDIT_STREAK_POINTS);
  }

  #[tokio::test]
  async fn same_day_activity_does_not_advance_the_streak() {
    let s = store().await;
    let engine = ReputationEngine::new(s.clone());
    let eve = identity(&s, "eve").await;

    let day = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    let first = engine.record_activity(eve.identity_id, day).await.unwrap();
    let second = engine.record_activity(eve.identity_id, day).await.unwrap();
    assert_eq!(first.current, 1);
    assert_eq!(second.current, 1);
  }

  #[tokio::test]
  async fn events_for_unknown_identity_are_rejected() {
    let s = store().await;
    let engine = ReputationEngine::new(s.clone());
    let ghost = Uuid::new_v4();
    let err =
      engine.record_event(edit_approved(ghost)).await.unwrap_err();
    assert!(matches!(err, Error::IdentityNotFound(_)));
    // No orphan ledger entry may be written for the unknown identity.
    assert_eq!(
      s.count_events(ghost, EventKind::EditApproved).await.unwrap(),
      0
    );
  }
}
