//! Error type for `beacon-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("decimal parse error: {0}")]
  Decimal(#[from] rust_decimal::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored enum column held a value this build does not know.
  #[error("unknown {column} value: {value:?}")]
  UnknownValue { column: &'static str, value: String },

  #[error("subscriber already exists: {0}")]
  DuplicateSubscriber(String),

  #[error("campaign already exists: {0}")]
  DuplicateCampaign(String),

  #[error("subscriber not found: {0}")]
  SubscriberNotFound(String),

  #[error("campaign not found: {0}")]
  CampaignNotFound(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
