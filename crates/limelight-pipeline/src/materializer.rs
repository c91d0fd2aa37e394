use std::sync::Arc;

use limelight_core::{GenerationPrompt, Persona};
use limelight_generate::{ContentGenerator, SponsorBrief};
use limelight_planner::PlannedPost;
use limelight_store::{NewPost, Post, ScheduleEntry, Sponsor, Store};
use tracing::warn;

use crate::error::Result;

/// Turns a [`PlannedPost`] into a persisted Post + ScheduleEntry pair.
///
/// Content generation degrading gracefully is a requirement here, not an
/// edge case: a failing collaborator produces fallback content, never a
/// missing post. Only a store failure abandons the step.
pub struct Materializer {
    store: Store,
    generator: Arc<dyn ContentGenerator>,
}

impl Materializer {
    pub fn new(store: Store, generator: Arc<dyn ContentGenerator>) -> Self {
        Self { store, generator }
    }

    /// Materialize one planned post. The Post and its ScheduleEntry are
    /// committed together; the entry's fire time is the planned time.
    pub async fn materialize(
        &self,
        persona: &Persona,
        planned: &PlannedPost,
        sponsor: Option<&Sponsor>,
    ) -> Result<(Post, ScheduleEntry)> {
        let brief = sponsor.map(|s| SponsorBrief {
            company_name: s.company_name.clone(),
            product_name: s.product_name.clone(),
        });

        let prompt = match self
            .generator
            .scene_prompt(persona, planned.context.as_deref(), brief.as_ref())
            .await
        {
            Ok(scene) => GenerationPrompt::Scene {
                description: scene.description,
                intention: scene.intention,
            },
            Err(e) => {
                warn!(persona_id = %persona.id, error = %e, "scene generation fell back to template");
                fallback_prompt(planned)
            }
        };

        let caption = match self.generator.caption(persona, &prompt).await {
            Ok(c) => c,
            Err(e) => {
                warn!(persona_id = %persona.id, error = %e, "caption generation fell back to template");
                fallback_caption(planned)
            }
        };

        let (post, entry) = self.store.create_post_with_entry(
            NewPost {
                persona_id: persona.id.clone(),
                sponsor_id: sponsor.map(|s| s.id.clone()),
                content_type: planned.content_type,
                scheduled_time: planned.at,
                generation_prompt: Some(prompt),
                caption: Some(caption),
                hashtags: derive_hashtags(planned),
            },
            planned.at,
        )?;
        Ok((post, entry))
    }
}

/// Deterministic minimal prompt: planner context verbatim as the scene.
fn fallback_prompt(planned: &PlannedPost) -> GenerationPrompt {
    let description = planned
        .context
        .clone()
        .unwrap_or_else(|| "Sharing a moment from my day.".to_string());
    GenerationPrompt::Scene {
        description,
        intention: "I want this to feel genuine and in the moment.".to_string(),
    }
}

fn fallback_caption(planned: &PlannedPost) -> String {
    format!("Sharing a little {} update ✨", planned.content_type)
}

/// Baseline tags plus a tag compacted from the planner context.
fn derive_hashtags(planned: &PlannedPost) -> Vec<String> {
    let mut tags = vec!["lifestyle".to_string(), "aiinfluencer".to_string()];
    if let Some(ref context) = planned.context {
        let compact: String = context
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .take(24)
            .collect::<String>()
            .to_ascii_lowercase();
        if !compact.is_empty() {
            tags.push(compact);
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use limelight_core::ContentType;

    #[test]
    fn fallback_uses_context_verbatim() {
        let planned = PlannedPost {
            at: Utc::now(),
            content_type: ContentType::Reel,
            context: Some("first day at the pottery studio".into()),
        };
        match fallback_prompt(&planned) {
            GenerationPrompt::Scene { description, .. } => {
                assert_eq!(description, "first day at the pottery studio");
            }
            other => panic!("unexpected prompt shape: {other:?}"),
        }
    }

    #[test]
    fn hashtags_include_compacted_context() {
        let planned = PlannedPost {
            at: Utc::now(),
            content_type: ContentType::Post,
            context: Some("Morning Run!".into()),
        };
        let tags = derive_hashtags(&planned);
        assert_eq!(tags, vec!["lifestyle", "aiinfluencer", "morningrun"]);
    }

    #[test]
    fn hashtags_without_context_are_baseline_only() {
        let planned = PlannedPost {
            at: Utc::now(),
            content_type: ContentType::Story,
            context: None,
        };
        assert_eq!(derive_hashtags(&planned), vec!["lifestyle", "aiinfluencer"]);
    }
}
