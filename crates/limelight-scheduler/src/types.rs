use chrono::{DateTime, Utc};

/// Opaque identifier of one timer registration.
///
/// Handles are unique per registration: re-registering an entry id yields a
/// fresh handle and invalidates the old one, so a stale handle can never
/// cancel a newer registration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobHandle(pub String);

impl JobHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One pending timer registration.
///
/// Presence in the registry means `scheduled`; removal at dispatch is the
/// `fired` transition and the spawned task finishing is `completed`.
/// Removal via cancel is the terminal `cancelled` state. Nothing ever moves
/// back to `scheduled`.
#[derive(Debug, Clone)]
pub struct TimerJob {
    pub entry_id: String,
    pub handle: String,
    pub run_at: DateTime<Utc>,
}
