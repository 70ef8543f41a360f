//! Error types for `beacon-core`.
//!
//! Only infrastructure failures live here. Expected outcomes (unknown
//! subscriber, invalid transition, no eligible campaign) are modelled as
//! variants of the engine's outcome enums instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid scoring settings: {0}")]
  InvalidScoring(String),

  /// The store refused a new assignment as a duplicate, yet no active
  /// assignment could be read back.
  #[error("conflicting assignment for subscriber {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error. Used as `.map_err(Error::store)`.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
