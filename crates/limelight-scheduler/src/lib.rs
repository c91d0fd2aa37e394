//! `limelight-scheduler` — in-process one-shot timer engine.
//!
//! # Overview
//!
//! Schedule entries are registered against a shared in-memory map. The
//! [`engine::SchedulerEngine`] ticks once a second and dispatches every
//! registration whose `run_at` has arrived to the [`FireHandler`] on its own
//! spawned task, so a slow firing never delays the others.
//!
//! Registrations do not survive a process restart; the fire-time status
//! check in the post state machine is what keeps duplicate or stale firings
//! harmless.

pub mod engine;
pub mod error;
pub mod types;

pub use engine::{FireHandler, SchedulerEngine, SchedulerHandle};
pub use error::{Result, SchedulerError};
pub use types::JobHandle;
