//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Wrap a backend error from a direct store call.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

impl From<beacon_core::Error> for ApiError {
  fn from(e: beacon_core::Error) -> Self {
    match e {
      beacon_core::Error::InvalidScoring(m) => Self::BadRequest(m),
      beacon_core::Error::Conflict(id) => {
        Self::Conflict(format!("conflicting active assignment for subscriber {id}"))
      }
      beacon_core::Error::Store(inner) => Self::Store(inner),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn engine_conflict_names_the_subscriber() {
    let err = ApiError::from(beacon_core::Error::Conflict("U-1".into()));
    assert!(matches!(
      &err,
      ApiError::Conflict(m) if m == "conflicting active assignment for subscriber U-1"
    ));
    assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
  }

  #[test]
  fn invalid_scoring_is_a_bad_request() {
    let err = ApiError::from(beacon_core::Error::InvalidScoring("weights.loyalty".into()));
    assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
  }
}
