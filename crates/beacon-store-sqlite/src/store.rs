//! [`SqliteStore`], the SQLite implementation of [`CampaignStore`].

use std::path::Path;

use beacon_core::{
  assignment::{
    Assignment, AssignmentStatus, NewAssignment, NewNotification, Notification,
  },
  campaign::Campaign,
  store::{CampaignStore, CreateAssignment},
  subscriber::{Metrics, Segment, Subscriber, SubscriberProfile},
};
use rusqlite::{ErrorCode, OptionalExtension as _};
use uuid::Uuid;

use crate::{
  encode::{
    RawAssignment, RawCampaign, RawNotification, RawProfile, encode_decimal, encode_dt,
    encode_uuid,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Beacon campaign store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// Which constraint a failed write tripped, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Violation {
  Unique,
  ForeignKey,
}

fn violation(e: &rusqlite::Error) -> Option<Violation> {
  match e {
    rusqlite::Error::SqliteFailure(f, _) if f.code == ErrorCode::ConstraintViolation => {
      match f.extended_code {
        rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
          Some(Violation::Unique)
        }
        rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Some(Violation::ForeignKey),
        _ => None,
      }
    }
    _ => None,
  }
}

/// Run a write, turning a constraint violation into `Ok(Err(violation))`.
fn classify<T>(
  res: rusqlite::Result<T>,
) -> tokio_rusqlite::Result<std::result::Result<T, Violation>> {
  match res {
    Ok(v) => Ok(Ok(v)),
    Err(e) => match violation(&e) {
      Some(v) => Ok(Err(v)),
      None => Err(e.into()),
    },
  }
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Apply a single-column campaign update and read the row back.
  async fn update_campaign_column(
    &self,
    campaign_id: &str,
    sql: &'static str,
    value: i64,
  ) -> Result<Option<Campaign>> {
    let id = campaign_id.to_owned();

    let raw: Option<RawCampaign> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(sql, rusqlite::params![value, id])?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(
          conn
            .query_row(
              &format!("{} WHERE campaign_id = ?1", RawCampaign::SELECT),
              rusqlite::params![id],
              RawCampaign::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCampaign::into_campaign).transpose()
  }
}

// ─── CampaignStore impl ──────────────────────────────────────────────────────

impl CampaignStore for SqliteStore {
  type Error = Error;

  // ── Subscribers ───────────────────────────────────────────────────────────

  async fn add_subscriber(&self, subscriber: Subscriber) -> Result<Subscriber> {
    let profile = self.add_subscriber_with_metrics(subscriber, None).await?;
    Ok(profile.subscriber)
  }

  async fn add_subscriber_with_metrics(
    &self,
    subscriber: Subscriber,
    metrics: Option<Metrics>,
  ) -> Result<SubscriberProfile> {
    let row = subscriber.clone();
    let metrics_row = metrics.as_ref().map(|m| {
      (
        encode_decimal(m.data_volume_gb),
        encode_decimal(m.monthly_spend),
        m.loyalty_years,
      )
    });

    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let added = classify(tx.execute(
          "INSERT INTO subscribers (subscriber_id, name, city, segment) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![row.subscriber_id, row.name, row.city, row.segment.as_str()],
        ))?;
        if let Err(v) = added {
          return Ok(Err(v));
        }

        if let Some((data, spend, years)) = metrics_row {
          tx.execute(
            "INSERT INTO metrics (subscriber_id, data_volume_gb, monthly_spend, loyalty_years)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![row.subscriber_id, data, spend, years],
          )?;
        }

        tx.commit()?;
        Ok(Ok(()))
      })
      .await?;

    match inserted {
      Ok(()) => Ok(SubscriberProfile { subscriber, metrics }),
      Err(_) => Err(Error::DuplicateSubscriber(subscriber.subscriber_id)),
    }
  }

  async fn put_metrics(&self, metrics: Metrics) -> Result<Metrics> {
    let id     = metrics.subscriber_id.clone();
    let data   = encode_decimal(metrics.data_volume_gb);
    let spend  = encode_decimal(metrics.monthly_spend);
    let years  = metrics.loyalty_years;

    let written = self
      .conn
      .call(move |conn| {
        classify(conn.execute(
          "INSERT INTO metrics (subscriber_id, data_volume_gb, monthly_spend, loyalty_years)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (subscriber_id) DO UPDATE SET
             data_volume_gb = excluded.data_volume_gb,
             monthly_spend  = excluded.monthly_spend,
             loyalty_years  = excluded.loyalty_years",
          rusqlite::params![id, data, spend, years],
        ))
      })
      .await?;

    match written {
      Ok(_) => Ok(metrics),
      Err(_) => Err(Error::SubscriberNotFound(metrics.subscriber_id)),
    }
  }

  async fn get_subscriber_with_metrics(&self, subscriber_id: &str) -> Result<Option<SubscriberProfile>> {
    let id = subscriber_id.to_owned();

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("{} WHERE s.subscriber_id = ?1", RawProfile::SELECT),
              rusqlite::params![id],
              RawProfile::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  async fn list_subscribers(&self, segment: Option<&Segment>) -> Result<Vec<SubscriberProfile>> {
    let segment = segment.map(|s| s.as_str().to_owned());

    let raws: Vec<RawProfile> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "{} WHERE ?1 IS NULL OR s.segment = ?1 ORDER BY s.subscriber_id ASC",
          RawProfile::SELECT
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![segment], RawProfile::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProfile::into_profile).collect()
  }

  // ── Campaigns ─────────────────────────────────────────────────────────────

  async fn add_campaign(&self, campaign: Campaign) -> Result<Campaign> {
    let row   = campaign.clone();
    let start = encode_dt(campaign.start_time);
    let end   = encode_dt(campaign.end_time);

    let inserted = self
      .conn
      .call(move |conn| {
        classify(conn.execute(
          "INSERT INTO campaigns (
             campaign_id, campaign_type, target_segment, priority,
             start_time, end_time, active
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            row.campaign_id,
            row.campaign_type,
            row.target_segment.as_str(),
            row.priority,
            start,
            end,
            row.active,
          ],
        ))
      })
      .await?;

    match inserted {
      Ok(_) => Ok(campaign),
      Err(_) => Err(Error::DuplicateCampaign(campaign.campaign_id)),
    }
  }

  async fn get_campaign(&self, campaign_id: &str) -> Result<Option<Campaign>> {
    let id = campaign_id.to_owned();

    let raw: Option<RawCampaign> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("{} WHERE campaign_id = ?1", RawCampaign::SELECT),
              rusqlite::params![id],
              RawCampaign::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCampaign::into_campaign).transpose()
  }

  async fn list_campaigns(&self) -> Result<Vec<Campaign>> {
    let raws: Vec<RawCampaign> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "{} ORDER BY priority ASC, start_time DESC, campaign_id ASC",
          RawCampaign::SELECT
        ))?;
        let rows = stmt
          .query_map([], RawCampaign::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCampaign::into_campaign).collect()
  }

  async fn list_active_campaigns(&self, segment: &Segment) -> Result<Vec<Campaign>> {
    let segment = segment.as_str().to_owned();

    let raws: Vec<RawCampaign> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "{} WHERE active = 1 AND target_segment = ?1",
          RawCampaign::SELECT
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![segment], RawCampaign::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCampaign::into_campaign).collect()
  }

  async fn update_campaign(&self, campaign: Campaign) -> Result<Option<Campaign>> {
    let row   = campaign.clone();
    let start = encode_dt(campaign.start_time);
    let end   = encode_dt(campaign.end_time);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE campaigns SET
             campaign_type  = ?2,
             target_segment = ?3,
             priority       = ?4,
             start_time     = ?5,
             end_time       = ?6,
             active         = ?7
           WHERE campaign_id = ?1",
          rusqlite::params![
            row.campaign_id,
            row.campaign_type,
            row.target_segment.as_str(),
            row.priority,
            start,
            end,
            row.active,
          ],
        )?)
      })
      .await?;

    Ok((changed == 1).then_some(campaign))
  }

  async fn set_campaign_active(&self, campaign_id: &str, active: bool) -> Result<Option<Campaign>> {
    self
      .update_campaign_column(
        campaign_id,
        "UPDATE campaigns SET active = ?1 WHERE campaign_id = ?2",
        i64::from(active),
      )
      .await
  }

  async fn set_campaign_priority(&self, campaign_id: &str, priority: u32) -> Result<Option<Campaign>> {
    self
      .update_campaign_column(
        campaign_id,
        "UPDATE campaigns SET priority = ?1 WHERE campaign_id = ?2",
        i64::from(priority),
      )
      .await
  }

  // ── Assignments ───────────────────────────────────────────────────────────

  async fn find_active_assignment(&self, subscriber_id: &str) -> Result<Option<Assignment>> {
    let id = subscriber_id.to_owned();

    let raw: Option<RawAssignment> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "{} WHERE subscriber_id = ?1 AND status = 'ASSIGNED'",
                RawAssignment::SELECT
              ),
              rusqlite::params![id],
              RawAssignment::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAssignment::into_assignment).transpose()
  }

  async fn create_assignment(
    &self,
    input: NewAssignment,
    notice: NewNotification,
  ) -> Result<CreateAssignment> {
    let assignment = Assignment {
      assignment_id: Uuid::new_v4(),
      subscriber_id: input.subscriber_id,
      campaign_id:   input.campaign_id,
      score:         input.score,
      status:        AssignmentStatus::Assigned,
      assigned_at:   input.assigned_at,
    };
    let notification = Notification {
      notification_id: Uuid::new_v4(),
      subscriber_id:   notice.subscriber_id,
      channel:         notice.channel,
      message:         notice.message,
      sent_at:         notice.sent_at,
    };

    let a_id      = encode_uuid(assignment.assignment_id);
    let a_sub     = assignment.subscriber_id.clone();
    let a_camp    = assignment.campaign_id.clone();
    let a_score   = encode_decimal(assignment.score);
    let a_status  = assignment.status.as_ref().to_owned();
    let a_at      = encode_dt(assignment.assigned_at);
    let n_id      = encode_uuid(notification.notification_id);
    let n_sub     = notification.subscriber_id.clone();
    let n_channel = notification.channel.as_ref().to_owned();
    let n_message = notification.message.clone();
    let n_at      = encode_dt(notification.sent_at);

    let committed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let inserted = classify(tx.execute(
          "INSERT INTO assignments (
             assignment_id, subscriber_id, campaign_id, score, status, assigned_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![a_id, a_sub, a_camp, a_score, a_status, a_at],
        ))?;
        if let Err(v) = inserted {
          // Dropping `tx` rolls back.
          return Ok(Err(v));
        }

        tx.execute(
          "INSERT INTO notifications (notification_id, subscriber_id, channel, message, sent_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![n_id, n_sub, n_channel, n_message, n_at],
        )?;

        tx.commit()?;
        Ok(Ok(()))
      })
      .await?;

    match committed {
      Ok(()) => Ok(CreateAssignment::Created { assignment, notification }),
      Err(Violation::Unique) => {
        tracing::debug!(
          subscriber_id = %assignment.subscriber_id,
          "active-assignment constraint rejected insert"
        );
        Ok(CreateAssignment::ActiveExists)
      }
      Err(Violation::ForeignKey) => Err(Error::CampaignNotFound(assignment.campaign_id)),
    }
  }

  async fn get_assignment(&self, assignment_id: Uuid) -> Result<Option<Assignment>> {
    let id = encode_uuid(assignment_id);

    let raw: Option<RawAssignment> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("{} WHERE assignment_id = ?1", RawAssignment::SELECT),
              rusqlite::params![id],
              RawAssignment::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAssignment::into_assignment).transpose()
  }

  async fn list_assignments(&self, subscriber_id: &str) -> Result<Vec<Assignment>> {
    let id = subscriber_id.to_owned();

    let raws: Vec<RawAssignment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "{} WHERE subscriber_id = ?1 ORDER BY assigned_at DESC",
          RawAssignment::SELECT
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id], RawAssignment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAssignment::into_assignment).collect()
  }

  async fn list_all_assignments(&self, status: Option<AssignmentStatus>) -> Result<Vec<Assignment>> {
    let status = status.map(|s| s.as_ref().to_owned());

    let raws: Vec<RawAssignment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "{} WHERE ?1 IS NULL OR status = ?1 ORDER BY assigned_at DESC, assignment_id ASC",
          RawAssignment::SELECT
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![status], RawAssignment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAssignment::into_assignment).collect()
  }

  async fn compare_and_set_status(
    &self,
    assignment_id: Uuid,
    expected: AssignmentStatus,
    to: AssignmentStatus,
  ) -> Result<bool> {
    let id       = encode_uuid(assignment_id);
    let expected = expected.as_ref().to_owned();
    let to       = to.as_ref().to_owned();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE assignments SET status = ?3 WHERE assignment_id = ?1 AND status = ?2",
          rusqlite::params![id, expected, to],
        )?)
      })
      .await?;

    Ok(changed == 1)
  }

  // ── Notifications ─────────────────────────────────────────────────────────

  async fn list_notifications(&self, subscriber_id: &str) -> Result<Vec<Notification>> {
    let id = subscriber_id.to_owned();

    let raws: Vec<RawNotification> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "{} WHERE subscriber_id = ?1 ORDER BY sent_at DESC",
          RawNotification::SELECT
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id], RawNotification::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawNotification::into_notification).collect()
  }
}
