//! Handlers for `/assignments` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/assignments` | Newest first; optional `?status=ASSIGNED\|USED\|EXPIRED` |
//! | `GET`   | `/assignments/:id` | 404 if not found |
//! | `PATCH` | `/assignments/:id/status` | Body: `{"status":"USED"}`; 404 / 409 |

use std::str::FromStr;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use beacon_core::{
  StatusUpdate,
  assignment::{Assignment, AssignmentStatus},
  store::CampaignStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{Engine, error::ApiError};

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub status: Option<String>,
}

/// `GET /assignments[?status=<status>]`
pub async fn list<S>(
  State(engine): State<Engine<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Assignment>>, ApiError>
where
  S: CampaignStore,
{
  let status = match params.status.as_deref().map(str::trim) {
    None | Some("") => None,
    Some(raw) => Some(
      AssignmentStatus::from_str(raw)
        .map_err(|_| ApiError::BadRequest(format!("unknown status {raw}")))?,
    ),
  };

  let assignments = engine
    .store()
    .list_all_assignments(status)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(assignments))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /assignments/:id`
pub async fn get_one<S>(
  State(engine): State<Engine<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Assignment>, ApiError>
where
  S: CampaignStore,
{
  let assignment = engine
    .store()
    .get_assignment(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("assignment {id} not found")))?;
  Ok(Json(assignment))
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// The target status is taken as a raw string so that values outside the
/// lifecycle are answered like any other refused transition.
#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: String,
}

/// `PATCH /assignments/:id/status`
///
/// A missing assignment is reported before the target status is looked at.
pub async fn set_status<S>(
  State(engine): State<Engine<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<StatusBody>,
) -> Result<Json<Assignment>, ApiError>
where
  S: CampaignStore,
{
  let not_found = || ApiError::NotFound(format!("assignment {id} not found"));

  let current = engine
    .store()
    .get_assignment(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(not_found)?;

  let Ok(target) = AssignmentStatus::from_str(body.status.trim()) else {
    tracing::warn!(assignment_id = %id, status = %body.status, "unknown target status");
    return Err(ApiError::Conflict(format!(
      "cannot move assignment from {} to unknown status {}",
      current.status, body.status
    )));
  };

  match engine.update_status(id, target).await? {
    StatusUpdate::Updated(assignment) => Ok(Json(assignment)),
    StatusUpdate::NotFound => Err(not_found()),
    StatusUpdate::InvalidTransition(rejected) => Err(ApiError::Conflict(rejected.to_string())),
  }
}
