//! `limelight-pipeline` — materialization and the post lifecycle.
//!
//! The [`Materializer`] turns planned posts into persisted Post +
//! ScheduleEntry pairs, the [`PostRunner`] is the fire-time state machine,
//! and the [`PlanningService`] ties planner → materializer → scheduler into
//! one planning run.

pub mod error;
pub mod materializer;
pub mod publisher;
pub mod runner;
pub mod service;
pub mod sponsor;

pub use error::{PipelineError, Result};
pub use materializer::Materializer;
pub use publisher::{DryRunPublisher, PublishError, Publisher};
pub use runner::PostRunner;
pub use service::PlanningService;
pub use sponsor::match_score;
