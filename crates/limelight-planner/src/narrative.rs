use chrono::{DateTime, Duration, Utc};
use limelight_core::{ContentType, Persona};
use limelight_generate::{ContentGenerator, PlanEntry};
use rand::Rng;
use tracing::{info, warn};

use crate::types::PlannedPost;

/// Daytime window for narrative posts: hour drawn from 9..=21, minute 0..=59.
const DAY_WINDOW_START_HOUR: u32 = 9;
const DAY_WINDOW_END_HOUR: u32 = 21;

/// Narrative-arc planning: two sequential collaborator passes.
///
/// The reel pass lays down sparse tent-pole moments; the story pass sees a
/// summary of that plan and fills in around it. Either pass failing degrades
/// to an empty list for that pass — a completely empty combined plan is a
/// valid no-op outcome, not an error.
pub async fn plan_narrative<R: Rng + ?Sized>(
    persona: &Persona,
    horizon_days: u32,
    generator: &dyn ContentGenerator,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<PlannedPost> {
    let reels = match generator.reel_plan(persona, horizon_days).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!(persona_id = %persona.id, error = %e, "reel planning degraded to empty");
            Vec::new()
        }
    };

    let summary = summarize(&reels);
    let stories = match generator.story_plan(persona, horizon_days, &summary).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!(persona_id = %persona.id, error = %e, "story planning degraded to empty");
            Vec::new()
        }
    };

    let mut merged: Vec<(u32, ContentType, Option<String>)> = Vec::new();
    for entry in reels.into_iter().chain(stories) {
        match normalize(entry, horizon_days) {
            Some(slot) => merged.push(slot),
            None => continue,
        }
    }
    merged.sort_by_key(|(day, _, _)| *day);

    let mut planned = Vec::new();
    for (day, content_type, context) in merged {
        let hour = rng.gen_range(DAY_WINDOW_START_HOUR..=DAY_WINDOW_END_HOUR);
        let minute = rng.gen_range(0..60);
        let date = (now + Duration::days(day as i64)).date_naive();
        let Some(naive) = date.and_hms_opt(hour, minute, 0) else {
            continue;
        };
        let at = naive.and_utc();
        if at < now {
            continue;
        }
        planned.push(PlannedPost {
            at,
            content_type,
            context,
        });
    }

    planned.sort_by_key(|p| p.at);
    info!(persona_id = %persona.id, count = planned.len(), "narrative plan assembled");
    planned
}

/// Validate one collaborator entry. Missing day or content type means the
/// entry is dropped with a warning; the rest of the plan proceeds.
fn normalize(entry: PlanEntry, horizon_days: u32) -> Option<(u32, ContentType, Option<String>)> {
    let Some(day) = entry.day else {
        warn!("skipping plan entry without day offset");
        return None;
    };
    let Some(content_type) = entry.content_type else {
        warn!(day, "skipping plan entry without content type");
        return None;
    };
    if day == 0 || day > horizon_days {
        warn!(day, horizon_days, "skipping plan entry outside horizon");
        return None;
    }
    Some((day, content_type, entry.post_context))
}

/// Render the reel plan as the textual summary fed to the story pass.
fn summarize(reels: &[PlanEntry]) -> String {
    let lines: Vec<String> = reels
        .iter()
        .filter_map(|e| {
            let day = e.day?;
            let context = e.post_context.as_deref().unwrap_or("(no context)");
            Some(format!("day {day}: {context}"))
        })
        .collect();
    if lines.is_empty() {
        "no reels planned".to_string()
    } else {
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Timelike};
    use limelight_core::{GenerationPrompt, PersonaId};
    use limelight_generate::{GeneratorError, ScenePrompt, SponsorBrief};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Mutex;

    struct StubGenerator {
        reels: Result<Vec<PlanEntry>, ()>,
        stories: Result<Vec<PlanEntry>, ()>,
        seen_summary: Mutex<Option<String>>,
    }

    impl StubGenerator {
        fn new(reels: Result<Vec<PlanEntry>, ()>, stories: Result<Vec<PlanEntry>, ()>) -> Self {
            Self {
                reels,
                stories,
                seen_summary: Mutex::new(None),
            }
        }
    }

    fn unavailable() -> GeneratorError {
        GeneratorError::Api {
            status: 503,
            message: "unavailable".into(),
        }
    }

    #[async_trait]
    impl ContentGenerator for StubGenerator {
        async fn scene_prompt(
            &self,
            _persona: &Persona,
            _context: Option<&str>,
            _sponsor: Option<&SponsorBrief>,
        ) -> limelight_generate::Result<ScenePrompt> {
            Err(unavailable())
        }

        async fn caption(
            &self,
            _persona: &Persona,
            _prompt: &GenerationPrompt,
        ) -> limelight_generate::Result<String> {
            Err(unavailable())
        }

        async fn reel_plan(
            &self,
            _persona: &Persona,
            _horizon_days: u32,
        ) -> limelight_generate::Result<Vec<PlanEntry>> {
            self.reels.clone().map_err(|_| unavailable())
        }

        async fn story_plan(
            &self,
            _persona: &Persona,
            _horizon_days: u32,
            reel_summary: &str,
        ) -> limelight_generate::Result<Vec<PlanEntry>> {
            *self.seen_summary.lock().unwrap() = Some(reel_summary.to_string());
            self.stories.clone().map_err(|_| unavailable())
        }
    }

    fn entry(day: Option<u32>, ct: Option<ContentType>, ctx: &str) -> PlanEntry {
        PlanEntry {
            day,
            content_type: ct,
            post_context: Some(ctx.to_string()),
        }
    }

    fn persona() -> Persona {
        Persona {
            id: PersonaId::new(),
            name: "Emma".into(),
            background: "wellness advocate".into(),
            goals: vec![],
            tone: "casual".into(),
            life_story: Some("moved to the coast last spring".into()),
            audience: None,
            growth_intensity: 0.5,
            posting_frequency: None,
            active: true,
            created_at: "2026-01-01T00:00:00Z".into(),
            updated_at: "2026-01-01T00:00:00Z".into(),
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn passes_merge_sorted_by_day() {
        let gen = StubGenerator::new(
            Ok(vec![
                entry(Some(7), Some(ContentType::Reel), "market reel"),
                entry(Some(3), Some(ContentType::Reel), "coast reel"),
            ]),
            Ok(vec![
                entry(Some(5), Some(ContentType::Story), "teaser"),
                entry(Some(2), Some(ContentType::Story), "packing"),
            ]),
        );
        let mut rng = StdRng::seed_from_u64(11);
        let plan = plan_narrative(&persona(), 14, &gen, t0(), &mut rng).await;

        assert_eq!(plan.len(), 4);
        assert!(plan.windows(2).all(|w| w[0].at <= w[1].at));
        let days: Vec<i64> = plan.iter().map(|p| (p.at - t0()).num_days()).collect();
        assert!(days.windows(2).all(|w| w[0] <= w[1]));
        // randomized hour stays in the daytime window
        for p in &plan {
            assert!((DAY_WINDOW_START_HOUR..=DAY_WINDOW_END_HOUR).contains(&p.at.hour()));
        }
        assert_eq!(plan[0].context.as_deref(), Some("packing"));
    }

    #[tokio::test]
    async fn story_pass_sees_reel_summary() {
        let gen = StubGenerator::new(
            Ok(vec![entry(Some(3), Some(ContentType::Reel), "coast reel")]),
            Ok(vec![]),
        );
        let mut rng = StdRng::seed_from_u64(12);
        plan_narrative(&persona(), 14, &gen, t0(), &mut rng).await;

        let summary = gen.seen_summary.lock().unwrap().clone().unwrap();
        assert!(summary.contains("day 3: coast reel"));
    }

    #[tokio::test]
    async fn malformed_entries_are_skipped_individually() {
        let gen = StubGenerator::new(
            Ok(vec![
                entry(None, Some(ContentType::Reel), "no day"),
                entry(Some(4), None, "no type"),
                entry(Some(40), Some(ContentType::Reel), "past horizon"),
                entry(Some(6), Some(ContentType::Reel), "keeper"),
            ]),
            Ok(vec![]),
        );
        let mut rng = StdRng::seed_from_u64(13);
        let plan = plan_narrative(&persona(), 14, &gen, t0(), &mut rng).await;

        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].context.as_deref(), Some("keeper"));
    }

    #[tokio::test]
    async fn collaborator_failure_degrades_to_empty() {
        let gen = StubGenerator::new(Err(()), Err(()));
        let mut rng = StdRng::seed_from_u64(14);
        let plan = plan_narrative(&persona(), 14, &gen, t0(), &mut rng).await;
        assert!(plan.is_empty());

        // story pass still ran, with the degenerate summary
        let summary = gen.seen_summary.lock().unwrap().clone().unwrap();
        assert_eq!(summary, "no reels planned");
    }

    #[tokio::test]
    async fn one_failed_pass_keeps_the_other() {
        let gen = StubGenerator::new(
            Err(()),
            Ok(vec![entry(Some(2), Some(ContentType::Story), "solo story")]),
        );
        let mut rng = StdRng::seed_from_u64(15);
        let plan = plan_narrative(&persona(), 14, &gen, t0(), &mut rng).await;
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].content_type, ContentType::Story);
    }

    #[test]
    fn planner_does_not_introduce_duplicate_days() {
        // the merge itself must not duplicate what the collaborator returned
        let reels = vec![
            entry(Some(3), Some(ContentType::Reel), "a"),
            entry(Some(8), Some(ContentType::Reel), "b"),
        ];
        let normalized: Vec<_> = reels
            .into_iter()
            .filter_map(|e| normalize(e, 14))
            .map(|(day, _, _)| day)
            .collect();
        let mut deduped = normalized.clone();
        deduped.dedup();
        assert_eq!(normalized, deduped);
    }
}
