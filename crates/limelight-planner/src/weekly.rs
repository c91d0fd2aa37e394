use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use tracing::debug;

use crate::error::{PlanError, Result};
use crate::time::{is_weekday_name, parse_time_of_day, weekday_name};
use crate::types::{PatternSlot, PlannedPost};

/// Weekly-pattern planning: project a day→slots template onto every calendar
/// day in `[start_date, end_date]` inclusive.
///
/// The whole pattern is validated up front — an unknown weekday key or an
/// unparseable time-of-day rejects the request before anything is planned.
/// Days already in the past are silently omitted so a partially elapsed
/// range can be re-run without erroring.
pub fn plan_weekly(
    days: &BTreeMap<String, Vec<PatternSlot>>,
    start_date: NaiveDate,
    end_date: NaiveDate,
    now: DateTime<Utc>,
) -> Result<Vec<PlannedPost>> {
    // Validate before planning: a bad key or time is caller error, not a
    // day to skip.
    let mut parsed: BTreeMap<&str, Vec<(&PatternSlot, u32, u32)>> = BTreeMap::new();
    for (day, slots) in days {
        if !is_weekday_name(day) {
            return Err(PlanError::UnknownWeekday(day.clone()));
        }
        let entry = parsed.entry(day.as_str()).or_default();
        for slot in slots {
            let (hour, minute) = parse_time_of_day(&slot.time)?;
            entry.push((slot, hour, minute));
        }
    }

    let mut planned = Vec::new();
    let mut date = start_date;
    while date <= end_date {
        if let Some(slots) = parsed.get(weekday_name(date.weekday())) {
            for (slot, hour, minute) in slots {
                let Some(naive) = date.and_hms_opt(*hour, *minute, 0) else {
                    continue;
                };
                let at = naive.and_utc();
                if at < now {
                    debug!(%at, "skipping already-elapsed pattern slot");
                    continue;
                }
                planned.push(PlannedPost {
                    at,
                    content_type: slot.content_type,
                    context: None,
                });
            }
        }
        date += Duration::days(1);
    }

    planned.sort_by_key(|p| p.at);
    Ok(planned)
}
