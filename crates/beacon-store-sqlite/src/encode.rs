//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`
//! suffix) so that lexical order matches chronological order. Decimals are
//! stored as their canonical text form. UUIDs are stored as hyphenated
//! lowercase strings.

use std::str::FromStr;

use beacon_core::{
  assignment::{Assignment, AssignmentStatus, Channel, Notification},
  campaign::Campaign,
  subscriber::{Metrics, Subscriber, SubscriberProfile},
};
use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Decimal ──────────────────────────────────────────────────────────────────

pub fn encode_decimal(d: Decimal) -> String { d.normalize().to_string() }

pub fn decode_decimal(s: &str) -> Result<Decimal> { Ok(Decimal::from_str(s)?) }

// ─── Enums ────────────────────────────────────────────────────────────────────

pub fn decode_status(s: &str) -> Result<AssignmentStatus> {
  AssignmentStatus::from_str(s).map_err(|_| Error::UnknownValue { column: "status", value: s.to_owned() })
}

pub fn decode_channel(s: &str) -> Result<Channel> {
  Channel::from_str(s).map_err(|_| Error::UnknownValue { column: "channel", value: s.to_owned() })
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw columns of a `subscribers` row left-joined with `metrics`.
pub struct RawProfile {
  pub subscriber_id:  String,
  pub name:           String,
  pub city:           String,
  pub segment:        String,
  pub data_volume_gb: Option<String>,
  pub monthly_spend:  Option<String>,
  pub loyalty_years:  Option<u32>,
}

impl RawProfile {
  pub const SELECT: &'static str = "SELECT s.subscriber_id, s.name, s.city, s.segment,
            m.data_volume_gb, m.monthly_spend, m.loyalty_years
     FROM subscribers s
     LEFT JOIN metrics m ON m.subscriber_id = s.subscriber_id";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      subscriber_id:  row.get(0)?,
      name:           row.get(1)?,
      city:           row.get(2)?,
      segment:        row.get(3)?,
      data_volume_gb: row.get(4)?,
      monthly_spend:  row.get(5)?,
      loyalty_years:  row.get(6)?,
    })
  }

  pub fn into_profile(self) -> Result<SubscriberProfile> {
    let metrics = match (self.data_volume_gb, self.monthly_spend, self.loyalty_years) {
      (Some(data), Some(spend), Some(years)) => Some(Metrics {
        subscriber_id:  self.subscriber_id.clone(),
        data_volume_gb: decode_decimal(&data)?,
        monthly_spend:  decode_decimal(&spend)?,
        loyalty_years:  years,
      }),
      _ => None,
    };

    Ok(SubscriberProfile {
      subscriber: Subscriber {
        subscriber_id: self.subscriber_id,
        name:          self.name,
        city:          self.city,
        segment:       self.segment.into(),
      },
      metrics,
    })
  }
}

/// Raw columns of a `campaigns` row.
pub struct RawCampaign {
  pub campaign_id:    String,
  pub campaign_type:  String,
  pub target_segment: String,
  pub priority:       u32,
  pub start_time:     String,
  pub end_time:       String,
  pub active:         bool,
}

impl RawCampaign {
  pub const SELECT: &'static str = "SELECT campaign_id, campaign_type, target_segment, priority,
            start_time, end_time, active
     FROM campaigns";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      campaign_id:    row.get(0)?,
      campaign_type:  row.get(1)?,
      target_segment: row.get(2)?,
      priority:       row.get(3)?,
      start_time:     row.get(4)?,
      end_time:       row.get(5)?,
      active:         row.get(6)?,
    })
  }

  pub fn into_campaign(self) -> Result<Campaign> {
    Ok(Campaign {
      campaign_id:    self.campaign_id,
      campaign_type:  self.campaign_type,
      target_segment: self.target_segment.into(),
      priority:       self.priority,
      start_time:     decode_dt(&self.start_time)?,
      end_time:       decode_dt(&self.end_time)?,
      active:         self.active,
    })
  }
}

/// Raw columns of an `assignments` row.
pub struct RawAssignment {
  pub assignment_id: String,
  pub subscriber_id: String,
  pub campaign_id:   String,
  pub score:         String,
  pub status:        String,
  pub assigned_at:   String,
}

impl RawAssignment {
  pub const SELECT: &'static str = "SELECT assignment_id, subscriber_id, campaign_id, score, status, assigned_at
     FROM assignments";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      assignment_id: row.get(0)?,
      subscriber_id: row.get(1)?,
      campaign_id:   row.get(2)?,
      score:         row.get(3)?,
      status:        row.get(4)?,
      assigned_at:   row.get(5)?,
    })
  }

  pub fn into_assignment(self) -> Result<Assignment> {
    Ok(Assignment {
      assignment_id: decode_uuid(&self.assignment_id)?,
      subscriber_id: self.subscriber_id,
      campaign_id:   self.campaign_id,
      score:         decode_decimal(&self.score)?,
      status:        decode_status(&self.status)?,
      assigned_at:   decode_dt(&self.assigned_at)?,
    })
  }
}

/// Raw columns of a `notifications` row.
pub struct RawNotification {
  pub notification_id: String,
  pub subscriber_id:   String,
  pub channel:         String,
  pub message:         String,
  pub sent_at:         String,
}

impl RawNotification {
  pub const SELECT: &'static str = "SELECT notification_id, subscriber_id, channel, message, sent_at
     FROM notifications";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      notification_id: row.get(0)?,
      subscriber_id:   row.get(1)?,
      channel:         row.get(2)?,
      message:         row.get(3)?,
      sent_at:         row.get(4)?,
    })
  }

  pub fn into_notification(self) -> Result<Notification> {
    Ok(Notification {
      notification_id: decode_uuid(&self.notification_id)?,
      subscriber_id:   self.subscriber_id,
      channel:         decode_channel(&self.channel)?,
      message:         self.message,
      sent_at:         decode_dt(&self.sent_at)?,
    })
  }
}
