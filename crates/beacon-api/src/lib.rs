//! JSON REST API for Beacon.
//!
//! Exposes an axum [`Router`] over an [`AssignmentEngine`] backed by any
//! [`beacon_core::store::CampaignStore`]. Auth, TLS and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", beacon_api::api_router(engine.clone()))
//! ```

pub mod assign;
pub mod assignments;
pub mod campaigns;
pub mod error;
pub mod settings;
pub mod subscribers;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, patch, post, put},
};
use beacon_core::{AssignmentEngine, store::CampaignStore};

pub use error::ApiError;

/// Shared handler state.
pub type Engine<S> = Arc<AssignmentEngine<S>>;

/// Build the API router for `engine`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(engine: Engine<S>) -> Router<()>
where
  S: CampaignStore + 'static,
{
  Router::new()
    // Assignment
    .route("/assign", post(assign::handler::<S>))
    .route("/assignments", get(assignments::list::<S>))
    .route("/assignments/{id}", get(assignments::get_one::<S>))
    .route("/assignments/{id}/status", patch(assignments::set_status::<S>))
    // Subscribers
    .route("/subscribers", get(subscribers::list::<S>).post(subscribers::create::<S>))
    .route("/subscribers/{id}", get(subscribers::get_one::<S>))
    .route("/subscribers/{id}/metrics", put(subscribers::put_metrics::<S>))
    .route("/subscribers/{id}/score", get(subscribers::score::<S>))
    .route("/subscribers/{id}/assignments", get(subscribers::assignments::<S>))
    .route("/subscribers/{id}/notifications", get(subscribers::notifications::<S>))
    // Campaigns
    .route("/campaigns", get(campaigns::list::<S>).post(campaigns::create::<S>))
    .route("/campaigns/{id}", get(campaigns::get_one::<S>).put(campaigns::update::<S>))
    .route("/campaigns/{id}/active", patch(campaigns::set_active::<S>))
    .route("/campaigns/{id}/priority", patch(campaigns::set_priority::<S>))
    // Settings
    .route("/settings/scoring", get(settings::get_scoring::<S>).put(settings::put_scoring::<S>))
    .with_state(engine)
}
