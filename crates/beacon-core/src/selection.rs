//! Picking one campaign among competing candidates.
//!
//! The subscriber's score plays no part here: campaigns carry no
//! per-subscriber scoring, only priority and recency.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::{campaign::Campaign, subscriber::Segment};

/// The winning campaign plus every eligible competitor it beat.
#[derive(Debug, Clone)]
pub struct Selection {
  pub selected:   Campaign,
  /// Eligible candidates that lost, best first.
  pub suppressed: Vec<Campaign>,
}

/// Stateless campaign selector.
#[derive(Debug, Clone, Copy, Default)]
pub struct CampaignSelector;

impl CampaignSelector {
  /// Filter `catalog` to campaigns eligible for `segment` at `now` and pick
  /// the best one. Returns `None` when nothing is eligible.
  pub fn select(&self, segment: &Segment, now: DateTime<Utc>, catalog: &[Campaign]) -> Option<Selection> {
    let mut eligible: Vec<Campaign> = catalog
      .iter()
      .filter(|c| c.is_eligible(segment, now))
      .cloned()
      .collect();

    eligible.sort_by(rank);

    let mut ranked = eligible.into_iter();
    let selected = ranked.next()?;
    Some(Selection { selected, suppressed: ranked.collect() })
  }
}

/// Ascending priority, then most recent start. The final tie-break on id
/// keeps the choice deterministic regardless of catalog order.
fn rank(a: &Campaign, b: &Campaign) -> Ordering {
  a.priority
    .cmp(&b.priority)
    .then_with(|| b.start_time.cmp(&a.start_time))
    .then_with(|| a.campaign_id.cmp(&b.campaign_id))
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> { Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap() }

  fn campaign(id: &str, segment: &str, priority: u32, start: DateTime<Utc>) -> Campaign {
    Campaign {
      campaign_id: id.into(),
      campaign_type: "DATA_BOOST".into(),
      target_segment: segment.into(),
      priority,
      start_time: start,
      end_time: at(2030, 1, 1),
      active: true,
    }
  }

  #[test]
  fn equal_priority_prefers_latest_start() {
    let catalog = vec![
      campaign("C-JAN", "STANDARD", 2, at(2024, 1, 1)),
      campaign("C-MAR", "STANDARD", 2, at(2024, 3, 1)),
    ];
    let sel = CampaignSelector
      .select(&"STANDARD".into(), at(2024, 6, 1), &catalog)
      .unwrap();
    assert_eq!(sel.selected.campaign_id, "C-MAR");
    assert_eq!(sel.suppressed.len(), 1);
    assert_eq!(sel.suppressed[0].campaign_id, "C-JAN");
  }

  #[test]
  fn lower_priority_number_wins_regardless_of_recency() {
    let catalog = vec![
      campaign("C-NEW", "STANDARD", 3, at(2024, 5, 1)),
      campaign("C-OLD", "STANDARD", 1, at(2023, 1, 1)),
      campaign("C-MID", "STANDARD", 2, at(2024, 4, 1)),
    ];
    let sel = CampaignSelector
      .select(&"STANDARD".into(), at(2024, 6, 1), &catalog)
      .unwrap();
    assert_eq!(sel.selected.campaign_id, "C-OLD");
    let order: Vec<_> = sel.suppressed.iter().map(|c| c.campaign_id.as_str()).collect();
    assert_eq!(order, ["C-MID", "C-NEW"]);
  }

  #[test]
  fn never_selects_ineligible_campaigns() {
    let now = at(2024, 6, 1);
    let mut inactive = campaign("C-OFF", "STANDARD", 1, at(2024, 1, 1));
    inactive.active = false;
    let other_segment = campaign("C-HU", "HIGH_USAGE", 1, at(2024, 1, 1));
    let future = campaign("C-FUT", "STANDARD", 1, at(2024, 7, 1));
    let mut past = campaign("C-PAST", "STANDARD", 1, at(2024, 1, 1));
    past.end_time = at(2024, 5, 31);
    let fallback = campaign("C-OK", "STANDARD", 9, at(2024, 1, 1));

    let catalog = vec![inactive, other_segment, future, past, fallback];
    let sel = CampaignSelector.select(&"STANDARD".into(), now, &catalog).unwrap();
    assert_eq!(sel.selected.campaign_id, "C-OK");
    assert!(sel.suppressed.is_empty());
  }

  #[test]
  fn empty_when_nothing_is_eligible() {
    let catalog = vec![campaign("C-HU", "HIGH_USAGE", 1, at(2024, 1, 1))];
    assert!(
      CampaignSelector
        .select(&"STANDARD".into(), at(2024, 6, 1), &catalog)
        .is_none()
    );
    assert!(CampaignSelector.select(&"STANDARD".into(), at(2024, 6, 1), &[]).is_none());
  }

  #[test]
  fn full_tie_is_broken_by_id() {
    let catalog = vec![
      campaign("C-B", "STANDARD", 1, at(2024, 1, 1)),
      campaign("C-A", "STANDARD", 1, at(2024, 1, 1)),
    ];
    let sel = CampaignSelector
      .select(&"STANDARD".into(), at(2024, 6, 1), &catalog)
      .unwrap();
    assert_eq!(sel.selected.campaign_id, "C-A");
  }
}
