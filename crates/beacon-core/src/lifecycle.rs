//! The assignment status state machine.
//!
//! ```text
//!            ┌──────► USED
//! ASSIGNED ──┤
//!            └──────► EXPIRED
//! ```
//!
//! `USED` and `EXPIRED` are terminal. Nothing transitions back to `ASSIGNED`.

use serde::Serialize;
use thiserror::Error;

use crate::assignment::AssignmentStatus;

/// A rejected status change. Carries both ends so callers can report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Error)]
#[error("cannot move assignment from {from} to {to}")]
pub struct InvalidTransition {
  pub from: AssignmentStatus,
  pub to:   AssignmentStatus,
}

/// Validate a status change and return the new status.
pub fn transition(
  from: AssignmentStatus,
  to: AssignmentStatus,
) -> Result<AssignmentStatus, InvalidTransition> {
  use AssignmentStatus::*;

  match (from, to) {
    (Assigned, Used) | (Assigned, Expired) => Ok(to),
    _ => Err(InvalidTransition { from, to }),
  }
}
