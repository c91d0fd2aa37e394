use std::sync::Arc;

use chrono::{DateTime, Utc};
use limelight_core::{Persona, PersonaId};
use limelight_generate::ContentGenerator;
use limelight_planner::{plan, CadenceSpec};
use limelight_scheduler::{JobHandle, SchedulerHandle};
use limelight_store::{NewPersona, Post, ScheduleEntry, Sponsor, Store};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::error::{PipelineError, Result};
use crate::materializer::Materializer;

/// Horizon used when onboarding schedules a persona's initial interval plan.
const ONBOARDING_HORIZON_DAYS: u32 = 30;

/// Orchestrates one planning run: plan → materialize each post → register
/// its timer. Fire-and-forget from the caller's perspective — results are
/// observed through subsequent store reads.
pub struct PlanningService {
    store: Store,
    generator: Arc<dyn ContentGenerator>,
    scheduler: SchedulerHandle,
    materializer: Materializer,
}

impl PlanningService {
    pub fn new(
        store: Store,
        generator: Arc<dyn ContentGenerator>,
        scheduler: SchedulerHandle,
    ) -> Self {
        let materializer = Materializer::new(store.clone(), Arc::clone(&generator));
        Self {
            store,
            generator,
            scheduler,
            materializer,
        }
    }

    /// Create a persona; when it carries a posting frequency, run its
    /// initial interval plan over the onboarding horizon.
    pub async fn onboard_persona(&self, new: NewPersona) -> Result<Persona> {
        let persona = self.store.create_persona(new)?;
        if let Some(ref frequency) = persona.posting_frequency {
            let spec = CadenceSpec::Interval {
                reel_period_hours: frequency.reel_interval_hours,
                story_period_hours: frequency.story_interval_hours,
                horizon_days: ONBOARDING_HORIZON_DAYS,
            };
            self.run_plan(&persona.id, &spec, None).await?;
        }
        Ok(persona)
    }

    /// Execute a planning run for `persona_id`. Returns how many posts were
    /// created and scheduled.
    ///
    /// One post failing to materialize is logged and skipped — the rest of
    /// the plan proceeds. Validation failures in the spec itself propagate.
    pub async fn run_plan(
        &self,
        persona_id: &PersonaId,
        spec: &CadenceSpec,
        sponsor_id: Option<&str>,
    ) -> Result<usize> {
        let persona = self
            .store
            .persona(persona_id)?
            .ok_or_else(|| PipelineError::PersonaNotFound {
                id: persona_id.to_string(),
            })?;
        let sponsor: Option<Sponsor> = match sponsor_id {
            Some(id) => Some(self.store.sponsor(id)?.ok_or_else(|| {
                PipelineError::SponsorNotFound { id: id.to_string() }
            })?),
            None => None,
        };

        let mut rng = StdRng::from_entropy();
        let planned = plan(spec, &persona, self.generator.as_ref(), Utc::now(), &mut rng).await?;

        let mut created = 0;
        for planned_post in &planned {
            let (_, entry) = match self
                .materializer
                .materialize(&persona, planned_post, sponsor.as_ref())
                .await
            {
                Ok(pair) => pair,
                Err(e) => {
                    warn!(
                        persona_id = %persona.id,
                        at = %planned_post.at,
                        error = %e,
                        "planned post abandoned"
                    );
                    continue;
                }
            };
            match self.scheduler.schedule(&entry.id, entry.run_at) {
                Ok(handle) => {
                    self.store.set_entry_job_handle(&entry.id, handle.as_str())?;
                    created += 1;
                }
                Err(e) => {
                    // Engine is shutting down — leave the pair readable but
                    // make sure the orphaned entry can never fire later.
                    warn!(entry_id = %entry.id, error = %e, "timer registration refused");
                    self.store.deactivate_entry(&entry.id)?;
                }
            }
        }

        info!(
            persona_id = %persona.id,
            planned = planned.len(),
            created,
            "planning run complete"
        );
        Ok(created)
    }

    /// Re-register every active entry whose post is still pending.
    ///
    /// Run once at daemon startup: timer registrations do not survive a
    /// restart, the store does. Entries whose run_at already elapsed fire on
    /// the next tick — the post status check keeps anything already handled
    /// from running twice.
    pub fn resume_pending(&self) -> Result<usize> {
        let now = Utc::now();
        let mut resumed = 0;
        for entry in self.store.pending_entries()? {
            if entry.run_at < now {
                warn!(entry_id = %entry.id, run_at = %entry.run_at, "resuming overdue entry — fires immediately");
            }
            let handle = match self.scheduler.schedule(&entry.id, entry.run_at) {
                Ok(h) => h,
                Err(e) => {
                    warn!(entry_id = %entry.id, error = %e, "resume stopped: scheduler refused registration");
                    break;
                }
            };
            self.store.set_entry_job_handle(&entry.id, handle.as_str())?;
            resumed += 1;
        }
        info!(resumed, "pending schedule entries re-registered");
        Ok(resumed)
    }

    /// Deactivate a schedule entry and cancel its pending timer.
    ///
    /// Race-safe against a concurrent firing: if the firing wins, the post's
    /// status check makes this a no-op; if cancellation wins, the entry is
    /// inactive before any future firing looks at it. Returns whether the
    /// entry was still active.
    pub fn cancel_entry(&self, entry_id: &str) -> Result<bool> {
        let Some(entry) = self.store.entry(entry_id)? else {
            return Ok(false);
        };
        let deactivated = self.store.deactivate_entry(entry_id)?;
        if let Some(handle) = entry.job_handle {
            self.scheduler.cancel(&JobHandle(handle));
        }
        Ok(deactivated)
    }

    /// Sponsor/persona affinity score for proposal matching.
    pub fn match_sponsor(&self, persona_id: &PersonaId, sponsor_id: &str) -> Result<f64> {
        let persona = self
            .store
            .persona(persona_id)?
            .ok_or_else(|| PipelineError::PersonaNotFound {
                id: persona_id.to_string(),
            })?;
        let sponsor = self
            .store
            .sponsor(sponsor_id)?
            .ok_or_else(|| PipelineError::SponsorNotFound {
                id: sponsor_id.to_string(),
            })?;
        Ok(crate::sponsor::match_score(&persona, &sponsor))
    }

    /// Joined Post + ScheduleEntry view for a persona, ordered by fire time.
    pub fn upcoming_posts(
        &self,
        persona_id: &PersonaId,
        include_past: bool,
        now: DateTime<Utc>,
    ) -> Result<Vec<(Post, ScheduleEntry)>> {
        Ok(self.store.posts_for_persona(persona_id, include_past, now)?)
    }
}
