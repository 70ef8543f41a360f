//! Suitability scoring.
//!
//! A subscriber's score is their weighted usage divided by the weighted usage
//! of a reference "maximal" subscriber, scaled to `[0, 100]`:
//!
//! ```text
//! raw   = data·w_data + spend·w_spend + loyalty·w_loyalty
//! max   = max_data·w_data + max_spend·w_spend + max_loyalty·w_loyalty
//! score = round_2dp(clamp(raw / max × 100, 0, 100))
//! ```
//!
//! Rounding is half-away-from-zero. A non-positive `max` (for example all
//! maxima configured as zero) yields a score of zero rather than an error.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, subscriber::Metrics};

/// Decimal places kept in a score.
pub const SCORE_DP: u32 = 2;

// ─── Settings ────────────────────────────────────────────────────────────────

/// Per-metric weights.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
  pub data_usage:    Decimal,
  pub monthly_spend: Decimal,
  pub loyalty:       Decimal,
}

impl Default for Weights {
  fn default() -> Self {
    Self {
      data_usage:    Decimal::new(5, 1),
      monthly_spend: Decimal::new(3, 1),
      loyalty:       Decimal::new(2, 1),
    }
  }
}

/// Reference maxima used to normalise the raw score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaxValues {
  pub data_usage:    Decimal,
  pub monthly_spend: Decimal,
  pub loyalty:       Decimal,
}

impl Default for MaxValues {
  fn default() -> Self {
    Self {
      data_usage:    Decimal::from(100),
      monthly_spend: Decimal::from(1000),
      loyalty:       Decimal::from(20),
    }
  }
}

/// Operator-tunable scoring configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringSettings {
  pub weights:    Weights,
  pub max_values: MaxValues,
}

impl ScoringSettings {
  /// Reject negative weights or maxima.
  pub fn validate(&self) -> Result<()> {
    let fields = [
      ("weights.data_usage", self.weights.data_usage),
      ("weights.monthly_spend", self.weights.monthly_spend),
      ("weights.loyalty", self.weights.loyalty),
      ("max_values.data_usage", self.max_values.data_usage),
      ("max_values.monthly_spend", self.max_values.monthly_spend),
      ("max_values.loyalty", self.max_values.loyalty),
    ];
    for (name, value) in fields {
      if value < Decimal::ZERO {
        return Err(Error::InvalidScoring(format!("{name} must not be negative, got {value}")));
      }
    }
    Ok(())
  }
}

// ─── Calculator ──────────────────────────────────────────────────────────────

/// Pure score calculator bound to one [`ScoringSettings`].
#[derive(Debug, Clone, Default)]
pub struct ScoreCalculator {
  settings: ScoringSettings,
}

impl ScoreCalculator {
  pub fn new(settings: ScoringSettings) -> Self { Self { settings } }

  pub fn settings(&self) -> &ScoringSettings { &self.settings }

  /// Score `metrics` into `[0, 100]` with two decimal places.
  pub fn score(&self, metrics: &Metrics) -> Decimal {
    let w = &self.settings.weights;
    let m = &self.settings.max_values;

    let raw = weighted_sum(
      metrics.data_volume_gb,
      metrics.monthly_spend,
      Decimal::from(metrics.loyalty_years),
      w,
    );
    let max = weighted_sum(m.data_usage, m.monthly_spend, m.loyalty, w);

    let Some(max) = max else {
      tracing::warn!(
        subscriber_id = %metrics.subscriber_id,
        "score maximum overflowed; scoring as zero"
      );
      return Decimal::ZERO;
    };

    if max <= Decimal::ZERO {
      return Decimal::ZERO;
    }

    let normalized = match raw {
      Some(raw) => raw
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(max))
        .or_else(|| raw.checked_div(max)?.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ONE_HUNDRED),
      // Metrics are non-negative, so a raw sum too large to represent is
      // above any representable maximum.
      None => {
        tracing::warn!(
          subscriber_id = %metrics.subscriber_id,
          "raw score overflowed; scoring as full"
        );
        Decimal::ONE_HUNDRED
      }
    }
    .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);

    let score = normalized.round_dp_with_strategy(SCORE_DP, RoundingStrategy::MidpointAwayFromZero);
    tracing::debug!(subscriber_id = %metrics.subscriber_id, %score, "calculated score");
    score
  }
}

fn weighted_sum(data: Decimal, spend: Decimal, loyalty: Decimal, w: &Weights) -> Option<Decimal> {
  data
    .checked_mul(w.data_usage)?
    .checked_add(spend.checked_mul(w.monthly_spend)?)?
    .checked_add(loyalty.checked_mul(w.loyalty)?)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn metrics(data: Decimal, spend: Decimal, loyalty: u32) -> Metrics {
    Metrics {
      subscriber_id:  "U-1".into(),
      data_volume_gb: data,
      monthly_spend:  spend,
      loyalty_years:  loyalty,
    }
  }

  fn dec(s: &str) -> Decimal { s.parse().unwrap() }

  fn example_settings() -> ScoringSettings {
    ScoringSettings {
      weights:    Weights {
        data_usage:    dec("0.5"),
        monthly_spend: dec("0.3"),
        loyalty:       dec("0.2"),
      },
      max_values: MaxValues {
        data_usage:    dec("20"),
        monthly_spend: dec("500"),
        loyalty:       dec("10"),
      },
    }
  }

  /// Only data usage counts, against a maximum of 1000.
  fn data_only() -> ScoreCalculator {
    ScoreCalculator::new(ScoringSettings {
      weights:    Weights {
        data_usage:    Decimal::ONE,
        monthly_spend: Decimal::ZERO,
        loyalty:       Decimal::ZERO,
      },
      max_values: MaxValues {
        data_usage:    dec("1000"),
        monthly_spend: Decimal::ZERO,
        loyalty:       Decimal::ZERO,
      },
    })
  }

  #[test]
  fn worked_example() {
    // raw = 5 + 60 + 0.6 = 65.6; max = 10 + 150 + 2 = 162; 65.6 / 162 = 40.4938...
    let calc = ScoreCalculator::new(example_settings());
    assert_eq!(calc.score(&metrics(dec("10"), dec("200"), 3)), dec("40.49"));
  }

  #[test]
  fn score_is_clamped_to_one_hundred() {
    let calc = ScoreCalculator::new(example_settings());
    assert_eq!(calc.score(&metrics(dec("500"), dec("9000"), 40)), Decimal::ONE_HUNDRED);
  }

  #[test]
  fn zero_metrics_score_zero() {
    let calc = ScoreCalculator::new(example_settings());
    assert_eq!(calc.score(&metrics(Decimal::ZERO, Decimal::ZERO, 0)), Decimal::ZERO);
  }

  #[test]
  fn zero_maxima_score_zero() {
    let mut settings = example_settings();
    settings.max_values = MaxValues {
      data_usage:    Decimal::ZERO,
      monthly_spend: Decimal::ZERO,
      loyalty:       Decimal::ZERO,
    };
    let calc = ScoreCalculator::new(settings);
    assert_eq!(calc.score(&metrics(dec("10"), dec("200"), 3)), Decimal::ZERO);
  }

  #[test]
  fn zero_weights_score_zero() {
    let mut settings = example_settings();
    settings.weights = Weights {
      data_usage:    Decimal::ZERO,
      monthly_spend: Decimal::ZERO,
      loyalty:       Decimal::ZERO,
    };
    let calc = ScoreCalculator::new(settings);
    assert_eq!(calc.score(&metrics(dec("10"), dec("200"), 3)), Decimal::ZERO);
  }

  #[test]
  fn midpoints_round_away_from_zero() {
    let calc = data_only();
    // 1.25 / 1000 × 100 = 0.125 exactly; half-to-even would give 0.12.
    assert_eq!(calc.score(&metrics(dec("1.25"), Decimal::ZERO, 0)), dec("0.13"));
    // 123.45 / 1000 × 100 = 12.345 exactly.
    assert_eq!(calc.score(&metrics(dec("123.45"), Decimal::ZERO, 0)), dec("12.35"));
    // Just under the midpoint rounds down.
    assert_eq!(calc.score(&metrics(dec("123.449"), Decimal::ZERO, 0)), dec("12.34"));
  }

  #[test]
  fn monotonic_in_each_metric() {
    let calc = ScoreCalculator::new(example_settings());
    let mut last = Decimal::ZERO;
    for step in 0..30 {
      let s = calc.score(&metrics(Decimal::from(step), dec("100"), 2));
      assert!(s >= last, "data step {step}: {s} < {last}");
      last = s;
    }

    let mut last = Decimal::ZERO;
    for step in 0..60 {
      let s = calc.score(&metrics(dec("5"), Decimal::from(step * 10), 2));
      assert!(s >= last, "spend step {step}: {s} < {last}");
      last = s;
    }

    let mut last = Decimal::ZERO;
    for years in 0..15 {
      let s = calc.score(&metrics(dec("5"), dec("100"), years));
      assert!(s >= last, "loyalty {years}: {s} < {last}");
      last = s;
    }
  }

  #[test]
  fn always_within_bounds() {
    let calc = ScoreCalculator::new(example_settings());
    for data in [0, 1, 19, 20, 21, 1000] {
      for spend in [0, 250, 500, 100_000] {
        for years in [0, 5, 10, 99] {
          let s = calc.score(&metrics(Decimal::from(data), Decimal::from(spend), years));
          assert!(s >= Decimal::ZERO && s <= Decimal::ONE_HUNDRED, "{s}");
        }
      }
    }
  }

  #[test]
  fn overflowing_usage_scores_full() {
    let mut settings = example_settings();
    settings.weights.data_usage = dec("2");
    let calc = ScoreCalculator::new(settings);

    let huge = calc.score(&metrics(dec("10000000000000000000000000000"), Decimal::ZERO, 0));
    let beyond = calc.score(&metrics(Decimal::MAX, Decimal::ZERO, 0));
    assert_eq!(huge, Decimal::ONE_HUNDRED);
    assert_eq!(beyond, Decimal::ONE_HUNDRED);
    assert!(beyond >= huge);
  }

  #[test]
  fn overflowing_maximum_scores_zero() {
    let mut settings = example_settings();
    settings.weights.data_usage = dec("2");
    settings.max_values.data_usage = Decimal::MAX;
    let calc = ScoreCalculator::new(settings);
    assert_eq!(calc.score(&metrics(dec("10"), dec("10"), 1)), Decimal::ZERO);
  }

  #[test]
  fn validate_rejects_negative_values() {
    assert!(ScoringSettings::default().validate().is_ok());

    let mut settings = ScoringSettings::default();
    settings.weights.loyalty = dec("-0.1");
    assert!(matches!(settings.validate(), Err(Error::InvalidScoring(_))));

    let mut settings = ScoringSettings::default();
    settings.max_values.data_usage = dec("-1");
    assert!(settings.validate().is_err());
  }

  #[test]
  fn settings_deserialise_with_partial_input() {
    let settings: ScoringSettings =
      serde_json::from_str(r#"{"weights": {"data_usage": 0.7}}"#).unwrap();
    assert_eq!(settings.weights.data_usage, dec("0.7"));
    assert_eq!(settings.weights.monthly_spend, dec("0.3"));
    assert_eq!(settings.max_values, MaxValues::default());
  }
}
