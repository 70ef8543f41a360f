//! [`AssignmentEngine`], the orchestrator tying scoring, selection,
//! notification and lifecycle together over a [`CampaignStore`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
  Error, Result,
  assignment::{Assignment, AssignmentStatus, NewAssignment, NewNotification},
  lifecycle::{self, InvalidTransition},
  locks::KeyedLocks,
  notify::NotificationComposer,
  scoring::{ScoreCalculator, ScoringSettings},
  selection::CampaignSelector,
  store::{CampaignStore, CreateAssignment},
};

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// Result of [`AssignmentEngine::assign`]. Every variant is an expected
/// outcome; only storage failures surface as [`Error`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AssignOutcome {
  /// A new assignment and notification were committed.
  Created(Assignment),
  /// The subscriber already held an active assignment; it is returned as-is.
  Existing(Assignment),
  NoEligibleCampaign,
  SubscriberNotFound,
  MetricsMissing,
}

impl AssignOutcome {
  pub fn assignment(&self) -> Option<&Assignment> {
    match self {
      Self::Created(a) | Self::Existing(a) => Some(a),
      _ => None,
    }
  }
}

/// Result of [`AssignmentEngine::update_status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StatusUpdate {
  Updated(Assignment),
  NotFound,
  InvalidTransition(InvalidTransition),
}

/// Result of [`AssignmentEngine::score`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ScoreOutcome {
  Scored { score: Decimal },
  SubscriberNotFound,
  MetricsMissing,
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// The campaign assignment engine.
///
/// `assign` is serialised per subscriber id so that two concurrent calls
/// cannot both pass the active-assignment check. Calls for different
/// subscribers run independently.
pub struct AssignmentEngine<S> {
  store:      Arc<S>,
  calculator: RwLock<ScoreCalculator>,
  selector:   CampaignSelector,
  composer:   NotificationComposer,
  locks:      KeyedLocks,
}

impl<S: CampaignStore> AssignmentEngine<S> {
  pub fn new(store: Arc<S>, scoring: ScoringSettings) -> Result<Self> {
    scoring.validate()?;
    Ok(Self {
      store,
      calculator: RwLock::new(ScoreCalculator::new(scoring)),
      selector: CampaignSelector,
      composer: NotificationComposer::default(),
      locks: KeyedLocks::default(),
    })
  }

  pub fn with_composer(mut self, composer: NotificationComposer) -> Self {
    self.composer = composer;
    self
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  // ── Scoring configuration ─────────────────────────────────────────────

  pub async fn scoring(&self) -> ScoringSettings { self.calculator.read().await.settings().clone() }

  /// Replace the scoring configuration. Subsequent scores use the new
  /// settings; existing assignments keep their snapshot.
  pub async fn set_scoring(&self, settings: ScoringSettings) -> Result<()> {
    settings.validate()?;
    *self.calculator.write().await = ScoreCalculator::new(settings);
    tracing::info!("scoring settings replaced");
    Ok(())
  }

  // ── Operations ────────────────────────────────────────────────────────

  /// Score a subscriber with the current settings, without assigning.
  pub async fn score(&self, subscriber_id: &str) -> Result<ScoreOutcome> {
    let profile = self
      .store
      .get_subscriber_with_metrics(subscriber_id)
      .await
      .map_err(store_failure("get_subscriber_with_metrics"))?;

    let Some(profile) = profile else {
      return Ok(ScoreOutcome::SubscriberNotFound);
    };
    let Some(metrics) = profile.metrics else {
      return Ok(ScoreOutcome::MetricsMissing);
    };

    let score = self.calculator.read().await.score(&metrics);
    Ok(ScoreOutcome::Scored { score })
  }

  /// Assign the best campaign to `subscriber_id` as of now.
  pub async fn assign(&self, subscriber_id: &str) -> Result<AssignOutcome> {
    self.assign_at(subscriber_id, Utc::now()).await
  }

  /// Assign the best campaign to `subscriber_id`, treating `now` as the
  /// current time for eligibility and timestamps.
  pub async fn assign_at(&self, subscriber_id: &str, now: DateTime<Utc>) -> Result<AssignOutcome> {
    tracing::info!(subscriber_id, "starting campaign assignment");

    let profile = self
      .store
      .get_subscriber_with_metrics(subscriber_id)
      .await
      .map_err(store_failure("get_subscriber_with_metrics"))?;

    let Some(profile) = profile else {
      tracing::warn!(subscriber_id, "subscriber not found");
      return Ok(AssignOutcome::SubscriberNotFound);
    };
    let Some(metrics) = profile.metrics else {
      tracing::warn!(subscriber_id, "subscriber has no metrics");
      return Ok(AssignOutcome::MetricsMissing);
    };
    let segment = profile.subscriber.segment;

    let _guard = self.locks.lock(subscriber_id).await;

    if let Some(existing) = self.active_assignment(subscriber_id).await? {
      tracing::info!(
        subscriber_id,
        assignment_id = %existing.assignment_id,
        "subscriber already has an active assignment"
      );
      return Ok(AssignOutcome::Existing(existing));
    }

    let score = self.calculator.read().await.score(&metrics);
    tracing::debug!(subscriber_id, %score, "subscriber scored");

    let catalog = self
      .store
      .list_active_campaigns(&segment)
      .await
      .map_err(store_failure("list_active_campaigns"))?;

    let Some(selection) = self.selector.select(&segment, now, &catalog) else {
      tracing::warn!(subscriber_id, %segment, "no eligible campaign");
      return Ok(AssignOutcome::NoEligibleCampaign);
    };
    let selected = selection.selected;

    for loser in &selection.suppressed {
      tracing::info!(
        subscriber_id,
        campaign_id = %loser.campaign_id,
        campaign_type = %loser.campaign_type,
        selected = %selected.campaign_id,
        "campaign suppressed in favor of {}: lower priority or older",
        selected.campaign_id
      );
    }

    let composed = self.composer.compose(&selected.campaign_type, &segment);
    let assignment = NewAssignment {
      subscriber_id: subscriber_id.to_owned(),
      campaign_id: selected.campaign_id.clone(),
      score,
      assigned_at: now,
    };
    let notification = NewNotification {
      subscriber_id: subscriber_id.to_owned(),
      channel:       composed.channel,
      message:       composed.message,
      sent_at:       now,
    };

    let created = self
      .store
      .create_assignment(assignment, notification)
      .await
      .map_err(store_failure("create_assignment"))?;

    match created {
      CreateAssignment::Created { assignment, notification } => {
        tracing::info!(
          subscriber_id,
          campaign_id = %assignment.campaign_id,
          assignment_id = %assignment.assignment_id,
          %score,
          channel = %notification.channel,
          "campaign assigned"
        );
        Ok(AssignOutcome::Created(assignment))
      }
      // Another process won the race past our in-process lock; the storage
      // constraint kept the invariant, so hand back its assignment.
      CreateAssignment::ActiveExists => match self.active_assignment(subscriber_id).await? {
        Some(existing) => Ok(AssignOutcome::Existing(existing)),
        None => Err(Error::Conflict(subscriber_id.to_owned())),
      },
    }
  }

  /// Move an assignment to `target`, if the lifecycle allows it.
  pub async fn update_status(&self, assignment_id: Uuid, target: AssignmentStatus) -> Result<StatusUpdate> {
    loop {
      let current = self
        .store
        .get_assignment(assignment_id)
        .await
        .map_err(store_failure("get_assignment"))?;

      let Some(current) = current else {
        tracing::warn!(%assignment_id, "assignment not found");
        return Ok(StatusUpdate::NotFound);
      };

      let next = match lifecycle::transition(current.status, target) {
        Ok(next) => next,
        Err(rejected) => {
          tracing::warn!(%assignment_id, "{rejected}");
          return Ok(StatusUpdate::InvalidTransition(rejected));
        }
      };

      let applied = self
        .store
        .compare_and_set_status(assignment_id, current.status, next)
        .await
        .map_err(store_failure("compare_and_set_status"))?;

      if applied {
        tracing::info!(%assignment_id, status = %next, "assignment status updated");
        return Ok(StatusUpdate::Updated(Assignment { status: next, ..current }));
      }

      tracing::debug!(%assignment_id, "status changed concurrently; re-evaluating");
    }
  }

  async fn active_assignment(&self, subscriber_id: &str) -> Result<Option<Assignment>> {
    self
      .store
      .find_active_assignment(subscriber_id)
      .await
      .map_err(store_failure("find_active_assignment"))
  }
}

/// Log a backend failure and wrap it. Storage errors are never retried here.
fn store_failure<E>(operation: &'static str) -> impl FnOnce(E) -> Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  move |e| {
    tracing::error!(operation, error = %e, "store operation failed");
    Error::store(e)
  }
}
