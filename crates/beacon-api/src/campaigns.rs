//! Handlers for `/campaigns` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/campaigns` | Ordered by priority, then most recent start |
//! | `POST`  | `/campaigns` | Priority must be at least 1 |
//! | `GET`   | `/campaigns/:id` | 404 if not found |
//! | `PUT`   | `/campaigns/:id` | Replace every field; body id, if given, must match |
//! | `PATCH` | `/campaigns/:id/active` | Body: `{"active":false}` |
//! | `PATCH` | `/campaigns/:id/priority` | Body: `{"priority":2}` |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use beacon_core::{campaign::Campaign, store::CampaignStore, subscriber::Segment};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{Engine, error::ApiError};

fn check_priority(priority: u32) -> Result<u32, ApiError> {
  if priority == 0 {
    return Err(ApiError::BadRequest("priority must be at least 1".into()));
  }
  Ok(priority)
}

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /campaigns`
pub async fn list<S>(State(engine): State<Engine<S>>) -> Result<Json<Vec<Campaign>>, ApiError>
where
  S: CampaignStore,
{
  let campaigns = engine.store().list_campaigns().await.map_err(ApiError::store)?;
  Ok(Json(campaigns))
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub campaign_id:    String,
  pub campaign_type:  String,
  pub target_segment: Segment,
  pub priority:       u32,
  pub start_time:     DateTime<Utc>,
  pub end_time:       DateTime<Utc>,
  #[serde(default = "default_active")]
  pub active:         bool,
}

fn default_active() -> bool { true }

impl CreateBody {
  /// Validate and normalise the body into a campaign.
  fn into_campaign(self) -> Result<Campaign, ApiError> {
    let campaign_id = self.campaign_id.trim().to_owned();
    let campaign_type = self.campaign_type.trim().to_owned();
    if campaign_id.is_empty() || campaign_type.is_empty() {
      return Err(ApiError::BadRequest("campaign_id and campaign_type are required".into()));
    }
    let priority = check_priority(self.priority)?;
    if self.end_time < self.start_time {
      return Err(ApiError::BadRequest("end_time is before start_time".into()));
    }

    Ok(Campaign {
      campaign_id,
      campaign_type,
      target_segment: self.target_segment,
      priority,
      start_time: self.start_time,
      end_time: self.end_time,
      active: self.active,
    })
  }
}

/// `POST /campaigns`
pub async fn create<S>(
  State(engine): State<Engine<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CampaignStore,
{
  let campaign = body.into_campaign()?;
  let id = campaign.campaign_id.clone();

  let store = engine.store();
  if store.get_campaign(&id).await.map_err(ApiError::store)?.is_some() {
    return Err(ApiError::Conflict(format!("campaign {id} already exists")));
  }

  let campaign = store.add_campaign(campaign).await.map_err(ApiError::store)?;

  tracing::info!(campaign_id = %campaign.campaign_id, "campaign created");
  Ok((StatusCode::CREATED, Json(campaign)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /campaigns/:id`
pub async fn get_one<S>(
  State(engine): State<Engine<S>>,
  Path(id): Path<String>,
) -> Result<Json<Campaign>, ApiError>
where
  S: CampaignStore,
{
  let campaign = engine
    .store()
    .get_campaign(&id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("campaign {id} not found")))?;
  Ok(Json(campaign))
}

// ─── Updates ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub campaign_id:    Option<String>,
  pub campaign_type:  String,
  pub target_segment: Segment,
  pub priority:       u32,
  pub start_time:     DateTime<Utc>,
  pub end_time:       DateTime<Utc>,
  #[serde(default = "default_active")]
  pub active:         bool,
}

/// `PUT /campaigns/:id`
pub async fn update<S>(
  State(engine): State<Engine<S>>,
  Path(id): Path<String>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<Campaign>, ApiError>
where
  S: CampaignStore,
{
  if let Some(body_id) = &body.campaign_id
    && body_id.trim() != id
  {
    tracing::warn!(campaign_id = %id, body_id = %body_id, "campaign id mismatch");
    return Err(ApiError::BadRequest(format!("campaign id mismatch: {id} vs {body_id}")));
  }

  let campaign = CreateBody {
    campaign_id:    id.clone(),
    campaign_type:  body.campaign_type,
    target_segment: body.target_segment,
    priority:       body.priority,
    start_time:     body.start_time,
    end_time:       body.end_time,
    active:         body.active,
  }
  .into_campaign()?;

  let campaign = engine
    .store()
    .update_campaign(campaign)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("campaign {id} not found")))?;
  tracing::info!(campaign_id = %id, "campaign updated");
  Ok(Json(campaign))
}

#[derive(Debug, Deserialize)]
pub struct ActiveBody {
  pub active: bool,
}

/// `PATCH /campaigns/:id/active`
pub async fn set_active<S>(
  State(engine): State<Engine<S>>,
  Path(id): Path<String>,
  Json(body): Json<ActiveBody>,
) -> Result<Json<Campaign>, ApiError>
where
  S: CampaignStore,
{
  let campaign = engine
    .store()
    .set_campaign_active(&id, body.active)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("campaign {id} not found")))?;
  tracing::info!(campaign_id = %id, active = body.active, "campaign toggled");
  Ok(Json(campaign))
}

#[derive(Debug, Deserialize)]
pub struct PriorityBody {
  pub priority: u32,
}

/// `PATCH /campaigns/:id/priority`
pub async fn set_priority<S>(
  State(engine): State<Engine<S>>,
  Path(id): Path<String>,
  Json(body): Json<PriorityBody>,
) -> Result<Json<Campaign>, ApiError>
where
  S: CampaignStore,
{
  let priority = check_priority(body.priority)?;
  let campaign = engine
    .store()
    .set_campaign_priority(&id, priority)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("campaign {id} not found")))?;
  tracing::info!(campaign_id = %id, priority, "campaign priority changed");
  Ok(Json(campaign))
}
