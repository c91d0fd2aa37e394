use chrono::{DateTime, Utc};
use limelight_core::Persona;
use limelight_generate::ContentGenerator;
use rand::Rng;
use tracing::debug;

use crate::error::Result;
use crate::interval::plan_interval;
use crate::narrative::plan_narrative;
use crate::types::{CadenceSpec, PlannedPost};
use crate::weekly::plan_weekly;

/// Turn a cadence specification into an ordered sequence of planned posts.
///
/// `now` is the reference instant every mode measures against; `rng` feeds
/// interval jitter and narrative time-of-day selection. The generator is
/// consulted only in narrative mode.
///
/// Validation failures ([`crate::PlanError`]) propagate; collaborator
/// failures never do — narrative mode degrades per pass instead.
pub async fn plan<R: Rng + ?Sized>(
    spec: &CadenceSpec,
    persona: &Persona,
    generator: &dyn ContentGenerator,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<Vec<PlannedPost>> {
    let planned = match spec {
        CadenceSpec::Interval {
            reel_period_hours,
            story_period_hours,
            horizon_days,
        } => plan_interval(*reel_period_hours, *story_period_hours, *horizon_days, now, rng),
        CadenceSpec::WeeklyPattern {
            days,
            start_date,
            end_date,
        } => plan_weekly(days, *start_date, *end_date, now)?,
        CadenceSpec::NarrativeArc { horizon_days } => {
            plan_narrative(persona, *horizon_days, generator, now, rng).await
        }
    };
    debug!(persona_id = %persona.id, count = planned.len(), "cadence planned");
    Ok(planned)
}
