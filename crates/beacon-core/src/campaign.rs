//! Campaigns: time-bounded, segment-targeted, prioritised offers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::subscriber::Segment;

/// A promotional campaign.
///
/// `start_time < end_time` is expected but not enforced; a campaign with an
/// inverted window is simply never eligible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
  pub campaign_id:    String,
  /// Open-ended category, e.g. `DATA_BOOST`. Keys the message template table.
  pub campaign_type:  String,
  pub target_segment: Segment,
  /// 1 is the highest priority.
  pub priority:       u32,
  pub start_time:     DateTime<Utc>,
  pub end_time:       DateTime<Utc>,
  pub active:         bool,
}

impl Campaign {
  /// Whether this campaign may be offered to `segment` at `now`. Both window
  /// bounds are inclusive.
  pub fn is_eligible(&self, segment: &Segment, now: DateTime<Utc>) -> bool {
    self.active
      && &self.target_segment == segment
      && self.start_time <= now
      && now <= self.end_time
  }
}
