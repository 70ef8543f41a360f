//! `POST /assign`
//!
//! Body: `{"subscriber_id":"U-1"}`. Answers `201` with the new assignment, or
//! `200` with whatever else the engine decided (existing assignment, no
//! eligible campaign, unknown subscriber, missing metrics).

use axum::{Json, extract::State, http::StatusCode};
use beacon_core::{AssignOutcome, store::CampaignStore};
use serde::Deserialize;

use crate::{Engine, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct AssignBody {
  pub subscriber_id: String,
}

pub async fn handler<S>(
  State(engine): State<Engine<S>>,
  Json(body): Json<AssignBody>,
) -> Result<(StatusCode, Json<AssignOutcome>), ApiError>
where
  S: CampaignStore,
{
  if body.subscriber_id.trim().is_empty() {
    return Err(ApiError::BadRequest("subscriber_id must not be empty".into()));
  }

  let outcome = engine.assign(&body.subscriber_id).await?;
  let status = match outcome {
    AssignOutcome::Created(_) => StatusCode::CREATED,
    _ => StatusCode::OK,
  };
  Ok((status, Json(outcome)))
}
