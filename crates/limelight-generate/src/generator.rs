use async_trait::async_trait;
use limelight_core::{GenerationPrompt, Persona};

use crate::error::{GeneratorError, Result};
use crate::types::{PlanEntry, ScenePrompt, SponsorBrief};

/// Common interface to the generative-content collaborator.
///
/// Implementations must be treated as unreliable: network errors, service
/// errors and malformed output are all normal. Callers own the degradation
/// policy (empty plan, fallback content); implementations just report.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Produce a scene prompt for one post. `context` is the planner's
    /// free-text intent for the slot; `sponsor` decorates the prompt so the
    /// model can weave in an authentic mention.
    async fn scene_prompt(
        &self,
        persona: &Persona,
        context: Option<&str>,
        sponsor: Option<&SponsorBrief>,
    ) -> Result<ScenePrompt>;

    /// Produce a platform caption for already-generated prompt content.
    async fn caption(&self, persona: &Persona, prompt: &GenerationPrompt) -> Result<String>;

    /// First narrative pass: sparse tent-pole reel moments over the horizon.
    async fn reel_plan(&self, persona: &Persona, horizon_days: u32) -> Result<Vec<PlanEntry>>;

    /// Second narrative pass: story moments that may reference the reel plan
    /// summary for continuity.
    async fn story_plan(
        &self,
        persona: &Persona,
        horizon_days: u32,
        reel_summary: &str,
    ) -> Result<Vec<PlanEntry>>;
}

/// Generator stand-in for deployments without an API key. Every call fails
/// with `NotConfigured`, so the planner plans nothing narrative and the
/// materializer always uses fallback templates.
pub struct UnconfiguredGenerator;

fn not_configured() -> GeneratorError {
    GeneratorError::NotConfigured("no generator API key".into())
}

#[async_trait]
impl ContentGenerator for UnconfiguredGenerator {
    async fn scene_prompt(
        &self,
        _persona: &Persona,
        _context: Option<&str>,
        _sponsor: Option<&SponsorBrief>,
    ) -> Result<ScenePrompt> {
        Err(not_configured())
    }

    async fn caption(&self, _persona: &Persona, _prompt: &GenerationPrompt) -> Result<String> {
        Err(not_configured())
    }

    async fn reel_plan(&self, _persona: &Persona, _horizon_days: u32) -> Result<Vec<PlanEntry>> {
        Err(not_configured())
    }

    async fn story_plan(
        &self,
        _persona: &Persona,
        _horizon_days: u32,
        _reel_summary: &str,
    ) -> Result<Vec<PlanEntry>> {
        Err(not_configured())
    }
}
