//! The `CampaignStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `beacon-store-sqlite`).
//! The engine and the API depend on this abstraction, not on any concrete
//! backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  assignment::{Assignment, AssignmentStatus, NewAssignment, NewNotification, Notification},
  campaign::Campaign,
  subscriber::{Metrics, Segment, Subscriber, SubscriberProfile},
};

/// Result of [`CampaignStore::create_assignment`].
#[derive(Debug, Clone)]
pub enum CreateAssignment {
  /// Assignment and notification were committed together.
  Created {
    assignment:   Assignment,
    notification: Notification,
  },
  /// The subscriber already holds an `ASSIGNED` assignment; nothing was
  /// written.
  ActiveExists,
}

/// Abstraction over a campaign store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait CampaignStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Subscribers ───────────────────────────────────────────────────────

  /// Persist a new subscriber. Errors if the id is taken.
  fn add_subscriber(
    &self,
    subscriber: Subscriber,
  ) -> impl Future<Output = Result<Subscriber, Self::Error>> + Send + '_;

  /// Persist a new subscriber and, if given, its metrics in one write.
  /// Nothing is stored when either part is rejected.
  fn add_subscriber_with_metrics(
    &self,
    subscriber: Subscriber,
    metrics: Option<Metrics>,
  ) -> impl Future<Output = Result<SubscriberProfile, Self::Error>> + Send + '_;

  /// Insert or replace the metrics row for `metrics.subscriber_id`.
  fn put_metrics(
    &self,
    metrics: Metrics,
  ) -> impl Future<Output = Result<Metrics, Self::Error>> + Send + '_;

  /// Load a subscriber with its metrics. `None` if the subscriber is absent.
  fn get_subscriber_with_metrics<'a>(
    &'a self,
    subscriber_id: &'a str,
  ) -> impl Future<Output = Result<Option<SubscriberProfile>, Self::Error>> + Send + 'a;

  /// Subscribers with their metrics ordered by id, optionally restricted to
  /// one segment.
  fn list_subscribers<'a>(
    &'a self,
    segment: Option<&'a Segment>,
  ) -> impl Future<Output = Result<Vec<SubscriberProfile>, Self::Error>> + Send + 'a;

  // ── Campaigns ─────────────────────────────────────────────────────────

  fn add_campaign(
    &self,
    campaign: Campaign,
  ) -> impl Future<Output = Result<Campaign, Self::Error>> + Send + '_;

  fn get_campaign<'a>(
    &'a self,
    campaign_id: &'a str,
  ) -> impl Future<Output = Result<Option<Campaign>, Self::Error>> + Send + 'a;

  /// All campaigns, ordered by priority then most recent start.
  fn list_campaigns(&self) -> impl Future<Output = Result<Vec<Campaign>, Self::Error>> + Send + '_;

  /// Active campaigns targeting `segment`. Time windows are not filtered
  /// here; the selector does that against its own clock.
  fn list_active_campaigns<'a>(
    &'a self,
    segment: &'a Segment,
  ) -> impl Future<Output = Result<Vec<Campaign>, Self::Error>> + Send + 'a;

  /// Replace every mutable field of the campaign with `campaign.campaign_id`.
  /// Returns the stored campaign, or `None` if absent.
  fn update_campaign(
    &self,
    campaign: Campaign,
  ) -> impl Future<Output = Result<Option<Campaign>, Self::Error>> + Send + '_;

  /// Set the active flag. Returns the updated campaign, or `None` if absent.
  fn set_campaign_active<'a>(
    &'a self,
    campaign_id: &'a str,
    active: bool,
  ) -> impl Future<Output = Result<Option<Campaign>, Self::Error>> + Send + 'a;

  /// Set the priority. Returns the updated campaign, or `None` if absent.
  fn set_campaign_priority<'a>(
    &'a self,
    campaign_id: &'a str,
    priority: u32,
  ) -> impl Future<Output = Result<Option<Campaign>, Self::Error>> + Send + 'a;

  // ── Assignments ───────────────────────────────────────────────────────

  /// The subscriber's `ASSIGNED` assignment, if any.
  fn find_active_assignment<'a>(
    &'a self,
    subscriber_id: &'a str,
  ) -> impl Future<Output = Result<Option<Assignment>, Self::Error>> + Send + 'a;

  /// Atomically persist an assignment (status `ASSIGNED`) and its
  /// notification. Either both commit or neither does.
  fn create_assignment(
    &self,
    assignment: NewAssignment,
    notification: NewNotification,
  ) -> impl Future<Output = Result<CreateAssignment, Self::Error>> + Send + '_;

  fn get_assignment(
    &self,
    assignment_id: Uuid,
  ) -> impl Future<Output = Result<Option<Assignment>, Self::Error>> + Send + '_;

  /// A subscriber's assignments, newest first.
  fn list_assignments<'a>(
    &'a self,
    subscriber_id: &'a str,
  ) -> impl Future<Output = Result<Vec<Assignment>, Self::Error>> + Send + 'a;

  /// All assignments, newest first, optionally restricted to one status.
  fn list_all_assignments(
    &self,
    status: Option<AssignmentStatus>,
  ) -> impl Future<Output = Result<Vec<Assignment>, Self::Error>> + Send + '_;

  /// Set the status to `to` only if it is currently `expected`.
  ///
  /// Returns `false` when the row is absent or its status has moved on.
  fn compare_and_set_status(
    &self,
    assignment_id: Uuid,
    expected: AssignmentStatus,
    to: AssignmentStatus,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Notifications ─────────────────────────────────────────────────────

  /// A subscriber's notifications, newest first.
  fn list_notifications<'a>(
    &'a self,
    subscriber_id: &'a str,
  ) -> impl Future<Output = Result<Vec<Notification>, Self::Error>> + Send + 'a;
}
