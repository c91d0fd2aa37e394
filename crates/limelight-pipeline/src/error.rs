use thiserror::Error;

/// Errors surfaced synchronously by planning and materialization calls.
///
/// Fire-time problems never appear here — the runner logs and absorbs them
/// because there is no caller to surface them to.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Store(#[from] limelight_store::StoreError),

    #[error(transparent)]
    Plan(#[from] limelight_planner::PlanError),

    #[error(transparent)]
    Scheduler(#[from] limelight_scheduler::SchedulerError),

    #[error("Persona not found: {id}")]
    PersonaNotFound { id: String },

    #[error("Sponsor not found: {id}")]
    SponsorNotFound { id: String },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
