use thiserror::Error;

/// Validation failures in a cadence specification.
///
/// These are the one error category that propagates synchronously to the
/// planning caller — they indicate bad caller input, not a degraded
/// runtime service.
#[derive(Debug, Error)]
pub enum PlanError {
    /// A time-of-day string did not parse as "HH:MM AM/PM".
    #[error("Invalid time of day: {0:?}")]
    InvalidTimeOfDay(String),

    /// A weekly pattern key is not a weekday name.
    #[error("Unknown weekday in pattern: {0:?}")]
    UnknownWeekday(String),
}

pub type Result<T> = std::result::Result<T, PlanError>;
