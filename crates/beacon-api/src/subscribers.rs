//! Handlers for `/subscribers` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/subscribers` | Ordered by id; optional `?segment=<segment>` |
//! | `POST` | `/subscribers` | Body: subscriber fields plus optional `metrics` |
//! | `GET`  | `/subscribers/:id` | Subscriber and metrics; 404 if not found |
//! | `PUT`  | `/subscribers/:id/metrics` | Insert or replace metrics |
//! | `GET`  | `/subscribers/:id/score` | Score under the current settings |
//! | `GET`  | `/subscribers/:id/assignments` | Newest first |
//! | `GET`  | `/subscribers/:id/notifications` | Newest first |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use beacon_core::{
  ScoreOutcome,
  assignment::{Assignment, Notification},
  store::CampaignStore,
  subscriber::{Metrics, Segment, Subscriber, SubscriberProfile},
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{Engine, error::ApiError};

// ─── Bodies ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MetricsBody {
  pub data_volume_gb: Decimal,
  pub monthly_spend:  Decimal,
  #[serde(default)]
  pub loyalty_years:  u32,
}

impl MetricsBody {
  fn into_metrics(self, subscriber_id: String) -> Result<Metrics, ApiError> {
    if self.data_volume_gb < Decimal::ZERO || self.monthly_spend < Decimal::ZERO {
      return Err(ApiError::BadRequest("metrics must not be negative".into()));
    }
    Ok(Metrics {
      subscriber_id,
      data_volume_gb: self.data_volume_gb,
      monthly_spend: self.monthly_spend,
      loyalty_years: self.loyalty_years,
    })
  }
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub subscriber_id: String,
  #[serde(default)]
  pub name:          String,
  #[serde(default)]
  pub city:          String,
  pub segment:       Segment,
  pub metrics:       Option<MetricsBody>,
}

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub segment: Option<Segment>,
}

/// `GET /subscribers[?segment=<segment>]`
pub async fn list<S>(
  State(engine): State<Engine<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<SubscriberProfile>>, ApiError>
where
  S: CampaignStore,
{
  let subscribers = engine
    .store()
    .list_subscribers(params.segment.as_ref())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(subscribers))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /subscribers`
pub async fn create<S>(
  State(engine): State<Engine<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CampaignStore,
{
  let id = body.subscriber_id.trim().to_owned();
  if id.is_empty() {
    return Err(ApiError::BadRequest("subscriber_id must not be empty".into()));
  }
  let metrics = body.metrics.map(|m| m.into_metrics(id.clone())).transpose()?;

  let store = engine.store();
  let existing = store.get_subscriber_with_metrics(&id).await.map_err(ApiError::store)?;
  if existing.is_some() {
    return Err(ApiError::Conflict(format!("subscriber {id} already exists")));
  }

  let subscriber = Subscriber {
    subscriber_id: id,
    name:          body.name,
    city:          body.city,
    segment:       body.segment,
  };
  let profile = store
    .add_subscriber_with_metrics(subscriber, metrics)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(subscriber_id = %profile.subscriber.subscriber_id, "subscriber created");
  Ok((StatusCode::CREATED, Json(profile)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /subscribers/:id`
pub async fn get_one<S>(
  State(engine): State<Engine<S>>,
  Path(id): Path<String>,
) -> Result<Json<SubscriberProfile>, ApiError>
where
  S: CampaignStore,
{
  let profile = engine
    .store()
    .get_subscriber_with_metrics(&id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("subscriber {id} not found")))?;
  Ok(Json(profile))
}

// ─── Metrics ─────────────────────────────────────────────────────────────────

/// `PUT /subscribers/:id/metrics`
pub async fn put_metrics<S>(
  State(engine): State<Engine<S>>,
  Path(id): Path<String>,
  Json(body): Json<MetricsBody>,
) -> Result<Json<Metrics>, ApiError>
where
  S: CampaignStore,
{
  let metrics = body.into_metrics(id.clone())?;

  let store = engine.store();
  if store.get_subscriber_with_metrics(&id).await.map_err(ApiError::store)?.is_none() {
    return Err(ApiError::NotFound(format!("subscriber {id} not found")));
  }

  let metrics = store.put_metrics(metrics).await.map_err(ApiError::store)?;
  Ok(Json(metrics))
}

// ─── Score ───────────────────────────────────────────────────────────────────

/// `GET /subscribers/:id/score`
pub async fn score<S>(
  State(engine): State<Engine<S>>,
  Path(id): Path<String>,
) -> Result<Json<ScoreOutcome>, ApiError>
where
  S: CampaignStore,
{
  Ok(Json(engine.score(&id).await?))
}

// ─── History ─────────────────────────────────────────────────────────────────

/// `GET /subscribers/:id/assignments`
pub async fn assignments<S>(
  State(engine): State<Engine<S>>,
  Path(id): Path<String>,
) -> Result<Json<Vec<Assignment>>, ApiError>
where
  S: CampaignStore,
{
  let list = engine.store().list_assignments(&id).await.map_err(ApiError::store)?;
  Ok(Json(list))
}

/// `GET /subscribers/:id/notifications`
pub async fn notifications<S>(
  State(engine): State<Engine<S>>,
  Path(id): Path<String>,
) -> Result<Json<Vec<Notification>>, ApiError>
where
  S: CampaignStore,
{
  let list = engine.store().list_notifications(&id).await.map_err(ApiError::store)?;
  Ok(Json(list))
}
