//! `GET` / `PUT /settings/scoring`: read or replace the live scoring
//! configuration. Missing fields in a `PUT` body take their defaults.

use axum::{Json, extract::State};
use beacon_core::{scoring::ScoringSettings, store::CampaignStore};

use crate::{Engine, error::ApiError};

pub async fn get_scoring<S>(State(engine): State<Engine<S>>) -> Json<ScoringSettings>
where
  S: CampaignStore,
{
  Json(engine.scoring().await)
}

pub async fn put_scoring<S>(
  State(engine): State<Engine<S>>,
  Json(settings): Json<ScoringSettings>,
) -> Result<Json<ScoringSettings>, ApiError>
where
  S: CampaignStore,
{
  engine.set_scoring(settings).await?;
  Ok(Json(engine.scoring().await))
}
