use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use limelight_core::ContentType;
use serde::{Deserialize, Serialize};

/// How often / when a persona should post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CadenceSpec {
    /// Independent periodic cadences per content type over a horizon.
    /// Either period may be absent; both absent is a valid degenerate case
    /// that plans nothing.
    Interval {
        reel_period_hours: Option<u32>,
        story_period_hours: Option<u32>,
        horizon_days: u32,
    },

    /// A recurring weekly template projected onto a date range (inclusive).
    /// Keys are lowercase weekday names ("monday" … "sunday").
    WeeklyPattern {
        days: BTreeMap<String, Vec<PatternSlot>>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    },

    /// Sparse cadence derived from the persona's narrative in two
    /// collaborator passes (reels first, then stories).
    NarrativeArc { horizon_days: u32 },
}

/// One slot of a weekly pattern: what to post and at what time of day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternSlot {
    #[serde(rename = "type")]
    pub content_type: ContentType,
    /// 12-hour clock with AM/PM suffix, e.g. "9:15 AM".
    pub time: String,
}

/// A not-yet-materialized scheduling intent. Exists only within a single
/// planning run; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedPost {
    pub at: DateTime<Utc>,
    pub content_type: ContentType,
    /// Free-text context carried into the generation prompt.
    pub context: Option<String>,
}
