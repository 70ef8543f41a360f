//! Core types and decision logic for the Beacon campaign assignment engine.
//!
//! No HTTP or database code lives here. Storage is reached only through the
//! [`store::CampaignStore`] trait.

// Trait methods spell out their `Send` bounds; silence the advisory lint.
#![allow(async_fn_in_trait)]

pub mod assignment;
pub mod campaign;
pub mod engine;
pub mod error;
pub mod lifecycle;
mod locks;
pub mod notify;
pub mod scoring;
pub mod selection;
pub mod store;
pub mod subscriber;

pub use engine::{AssignOutcome, AssignmentEngine, ScoreOutcome, StatusUpdate};
pub use error::{Error, Result};
