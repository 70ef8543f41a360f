//! Subscribers and their usage metrics.
//!
//! Both are created by an external loader; the engine only reads them.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ─── Segment ─────────────────────────────────────────────────────────────────

/// A subscriber segment, e.g. `HIGH_USAGE` or `STANDARD`.
///
/// The catalog of segments is open-ended, so this is a string newtype rather
/// than an enum. Values are normalised to upper case on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Segment(String);

impl Segment {
  pub const HIGH_USAGE: &'static str = "HIGH_USAGE";
  pub const STANDARD: &'static str = "STANDARD";

  pub fn new(name: impl AsRef<str>) -> Self {
    Self(name.as_ref().trim().to_ascii_uppercase())
  }

  pub fn as_str(&self) -> &str { &self.0 }

  pub fn is_high_usage(&self) -> bool { self.0 == Self::HIGH_USAGE }
}

impl fmt::Display for Segment {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<String> for Segment {
  fn from(s: String) -> Self { Self::new(s) }
}

impl From<&str> for Segment {
  fn from(s: &str) -> Self { Self::new(s) }
}

impl From<Segment> for String {
  fn from(s: Segment) -> Self { s.0 }
}

// ─── Subscriber ──────────────────────────────────────────────────────────────

/// A telecom subscriber. `subscriber_id` is the stable external identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
  pub subscriber_id: String,
  pub name:          String,
  pub city:          String,
  pub segment:       Segment,
}

// ─── Metrics ─────────────────────────────────────────────────────────────────

/// Monthly usage metrics; at most one row per subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
  pub subscriber_id:  String,
  /// Monthly data volume in GB.
  pub data_volume_gb: Decimal,
  /// Monthly spend in the billing currency.
  pub monthly_spend:  Decimal,
  /// Whole years of tenure.
  pub loyalty_years:  u32,
}

/// A subscriber loaded together with its metrics, if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriberProfile {
  pub subscriber: Subscriber,
  pub metrics:    Option<Metrics>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn segment_is_normalised() {
    assert_eq!(Segment::new(" high_usage ").as_str(), "HIGH_USAGE");
    assert!(Segment::from("high_usage").is_high_usage());
    assert!(!Segment::from("STANDARD").is_high_usage());
  }

  #[test]
  fn segment_serialises_as_plain_string() {
    let json = serde_json::to_string(&Segment::from("standard")).unwrap();
    assert_eq!(json, "\"STANDARD\"");
    let back: Segment = serde_json::from_str("\"youth\"").unwrap();
    assert_eq!(back.as_str(), "YOUTH");
  }
}
