use chrono::{DateTime, Duration, Utc};
use limelight_core::ContentType;
use rand::Rng;
use tracing::warn;

use crate::types::PlannedPost;

/// Bound on the per-entry timing jitter.
const JITTER_SECS: i64 = 30 * 60;

/// Interval-mode planning: `now + k·period` per content type, k = 1, 2, …
/// while the timestamp stays within `now + horizon_days`.
///
/// Each entry gets ±30 minutes of jitter from `rng` so the cadence is not
/// perfectly mechanical; jitter never moves an entry before `now` — it is
/// clamped forward. A period of zero hours is ignored (it would plan an
/// unbounded burst), as is an absent one.
pub fn plan_interval<R: Rng + ?Sized>(
    reel_period_hours: Option<u32>,
    story_period_hours: Option<u32>,
    horizon_days: u32,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<PlannedPost> {
    let horizon_end = now + Duration::days(horizon_days as i64);
    let mut planned = Vec::new();

    let cadences = [
        (ContentType::Reel, reel_period_hours),
        (ContentType::Story, story_period_hours),
    ];
    for (content_type, period) in cadences {
        let Some(period_hours) = period else { continue };
        if period_hours == 0 {
            warn!(%content_type, "ignoring zero-hour period in interval cadence");
            continue;
        }

        let mut k: i64 = 1;
        loop {
            let at = now + Duration::hours(k * period_hours as i64);
            if at > horizon_end {
                break;
            }
            let jitter = Duration::seconds(rng.gen_range(-JITTER_SECS..=JITTER_SECS));
            let jittered = (at + jitter).max(now);
            planned.push(PlannedPost {
                at: jittered,
                content_type,
                context: None,
            });
            k += 1;
        }
    }

    planned.sort_by_key(|p| p.at);
    planned
}
