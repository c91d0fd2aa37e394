use thiserror::Error;

/// Errors that can occur within the timer engine.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The engine has been shut down and accepts no new registrations.
    #[error("Scheduler is shut down")]
    ShutDown,
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
