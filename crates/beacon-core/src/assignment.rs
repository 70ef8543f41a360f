//! Assignments and the notifications issued alongside them.
//!
//! Both are created exclusively by the engine. Notifications are never
//! mutated; an assignment's `status` changes only through
//! [`crate::lifecycle::transition`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

// ─── Status ──────────────────────────────────────────────────────────────────

/// Lifecycle status of an assignment. `Used` and `Expired` are terminal.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum AssignmentStatus {
  Assigned,
  Used,
  Expired,
}

impl AssignmentStatus {
  pub fn is_terminal(self) -> bool { !matches!(self, Self::Assigned) }
}

// ─── Assignment ──────────────────────────────────────────────────────────────

/// The record linking a subscriber to the one campaign chosen for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
  pub assignment_id: Uuid,
  pub subscriber_id: String,
  pub campaign_id:   String,
  /// The subscriber's score at assignment time; never recomputed.
  pub score:         Decimal,
  pub status:        AssignmentStatus,
  pub assigned_at:   DateTime<Utc>,
}

/// Input to [`crate::store::CampaignStore::create_assignment`]. The id is
/// assigned by the store and the status always starts as `Assigned`.
#[derive(Debug, Clone)]
pub struct NewAssignment {
  pub subscriber_id: String,
  pub campaign_id:   String,
  pub score:         Decimal,
  pub assigned_at:   DateTime<Utc>,
}

// ─── Notification ────────────────────────────────────────────────────────────

/// Delivery channel for a notification.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum Channel {
  #[serde(rename = "SMS")]
  #[strum(serialize = "SMS")]
  Sms,
  /// BiP app push.
  #[serde(rename = "BiP")]
  #[strum(serialize = "BiP")]
  Bip,
  #[serde(rename = "EMAIL")]
  #[strum(serialize = "EMAIL")]
  Email,
}

/// A message issued to a subscriber when an assignment is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
  pub notification_id: Uuid,
  pub subscriber_id:   String,
  pub channel:         Channel,
  pub message:         String,
  pub sent_at:         DateTime<Utc>,
}

/// Input to [`crate::store::CampaignStore::create_assignment`].
#[derive(Debug, Clone)]
pub struct NewNotification {
  pub subscriber_id: String,
  pub channel:       Channel,
  pub message:       String,
  pub sent_at:       DateTime<Utc>,
}
