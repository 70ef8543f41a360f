//! Choosing the channel and message text for a new assignment.
//!
//! Both decisions are table lookups so they can be extended from
//! configuration without touching the composer.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{assignment::Channel, subscriber::Segment};

/// Placeholder substituted with the campaign type inside a template.
pub const TYPE_PLACEHOLDER: &str = "{campaign_type}";

const FALLBACK_TEMPLATE: &str =
  "Size özel {campaign_type} kampanyası tanımlandı. Hemen kullanmaya başlayın!";

const STOCK_TEMPLATES: &[(&str, &str)] = &[
  ("DATA_BOOST", "Size özel 5 GB ek internet kampanyası tanımlandı."),
  (
    "LOYALTY_REWARD",
    "Size özel sadakat ödülü kampanyası tanımlandı. Özel avantajlar sizi bekliyor!",
  ),
  ("DISCOUNT_OFFER", "Size özel indirim kampanyası tanımlandı. Fırsatı kaçırmayın!"),
  (
    "UPGRADE_PLAN",
    "Size özel plan yükseltme kampanyası tanımlandı. Daha fazla avantaj için yükseltin!",
  ),
  (
    "WELCOME_BONUS",
    "Size özel hoş geldin bonusu kampanyası tanımlandı. Yeni avantajlar sizi bekliyor!",
  ),
  (
    "RETENTION_OFFER",
    "Size özel özel teklif kampanyası tanımlandı. Özel fırsatlar sizin için!",
  ),
  ("PREMIUM_TRIAL", "Size özel premium deneme kampanyası tanımlandı. Premium deneyimi yaşayın!"),
  ("BASIC_PLAN", "Size özel temel plan kampanyası tanımlandı. Hemen kullanmaya başlayın!"),
];

// ─── Channel rules ───────────────────────────────────────────────────────────

/// Segment → channel lookup with a default for unlisted segments.
#[derive(Debug, Clone)]
pub struct ChannelRules {
  by_segment: HashMap<Segment, Channel>,
  default:    Channel,
}

impl ChannelRules {
  pub fn new(default: Channel) -> Self { Self { by_segment: HashMap::new(), default } }

  pub fn with(mut self, segment: impl Into<Segment>, channel: Channel) -> Self {
    self.by_segment.insert(segment.into(), channel);
    self
  }

  pub fn channel_for(&self, segment: &Segment) -> Channel {
    self.by_segment.get(segment).copied().unwrap_or(self.default)
  }
}

impl Default for ChannelRules {
  /// High-usage subscribers are reached through BiP; everyone else by SMS.
  fn default() -> Self { Self::new(Channel::Sms).with(Segment::HIGH_USAGE, Channel::Bip) }
}

// ─── Message templates ───────────────────────────────────────────────────────

/// Campaign type → message template, with a fallback for unknown types.
/// Keys are matched case-insensitively.
#[derive(Debug, Clone)]
pub struct MessageTemplates {
  by_type:  HashMap<String, String>,
  fallback: String,
}

impl MessageTemplates {
  pub fn empty(fallback: impl Into<String>) -> Self {
    Self { by_type: HashMap::new(), fallback: fallback.into() }
  }

  pub fn insert(&mut self, campaign_type: impl Into<String>, template: impl Into<String>) {
    self.by_type.insert(campaign_type.into().to_ascii_uppercase(), template.into());
  }

  pub fn render(&self, campaign_type: &str) -> String {
    let template = self
      .by_type
      .get(&campaign_type.to_ascii_uppercase())
      .unwrap_or(&self.fallback);
    template.replace(TYPE_PLACEHOLDER, campaign_type)
  }
}

impl Default for MessageTemplates {
  fn default() -> Self {
    let mut templates = Self::empty(FALLBACK_TEMPLATE);
    for (campaign_type, template) in STOCK_TEMPLATES {
      templates.insert(*campaign_type, *template);
    }
    templates
  }
}

// ─── Config ──────────────────────────────────────────────────────────────────

/// Operator overrides layered on top of the stock tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
  /// Extra or replacement templates keyed by campaign type.
  pub templates:         HashMap<String, String>,
  /// Extra or replacement channels keyed by segment.
  pub channels:          HashMap<Segment, Channel>,
  pub fallback_template: Option<String>,
}

// ─── Composer ────────────────────────────────────────────────────────────────

/// The decided channel and message; nothing is actually sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedNotification {
  pub channel: Channel,
  pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct NotificationComposer {
  channels:  ChannelRules,
  templates: MessageTemplates,
}

impl NotificationComposer {
  pub fn new(channels: ChannelRules, templates: MessageTemplates) -> Self {
    Self { channels, templates }
  }

  /// Stock tables extended by `config`.
  pub fn from_config(config: &NotificationConfig) -> Self {
    let mut channels = ChannelRules::default();
    for (segment, channel) in &config.channels {
      channels = channels.with(segment.clone(), *channel);
    }

    let mut templates = MessageTemplates::default();
    if let Some(fallback) = &config.fallback_template {
      templates.fallback = fallback.clone();
    }
    for (campaign_type, template) in &config.templates {
      templates.insert(campaign_type.clone(), template.clone());
    }

    Self { channels, templates }
  }

  pub fn compose(&self, campaign_type: &str, segment: &Segment) -> ComposedNotification {
    ComposedNotification {
      channel: self.channels.channel_for(segment),
      message: self.templates.render(campaign_type),
    }
  }
}
