//! Prompt templates for the four generation kinds.
//!
//! Templates ask for bare JSON with exact keys; `parse` handles the
//! inevitable prose wrapping.

use limelight_core::{GenerationPrompt, Persona};

use crate::types::SponsorBrief;

fn persona_profile(persona: &Persona) -> String {
    let goals = if persona.goals.is_empty() {
        "general content creation".to_string()
    } else {
        persona.goals.join(", ")
    };
    let mut profile = format!(
        "Background: {}\nGoals: {}\nTone: {}",
        persona.background, goals, persona.tone
    );
    if let Some(ref story) = persona.life_story {
        profile.push_str("\nLife story: ");
        profile.push_str(story);
    }
    profile
}

/// Scene-prompt request: objective description + first-person intention.
pub fn scene_prompt(
    persona: &Persona,
    context: Option<&str>,
    sponsor: Option<&SponsorBrief>,
) -> String {
    let context_line = match context {
        Some(c) => format!("Context for this post: {c}"),
        None => "Generate a lifestyle/daily activity post.".to_string(),
    };
    let sponsor_line = match sponsor {
        Some(s) => {
            let product = s.product_name.as_deref().unwrap_or("their product");
            format!(
                "This post is sponsored by {}. Product: {product}. \
                 Include a natural, authentic sponsor mention.\n",
                s.company_name
            )
        }
        None => String::new(),
    };

    format!(
        "You are writing a scene prompt for an AI influencer with the following profile:\n\n\
         {}\n\n\
         {context_line}\n\
         {sponsor_line}\n\
         Respond with JSON only, using these exact keys:\n\
         {{\n\
           \"description\": \"A third-person narrative describing the scene: environment, actions, and dialogue.\",\n\
           \"intention\": \"A first-person internal monologue describing the character's thoughts, feelings, or motivation.\"\n\
         }}",
        persona_profile(persona)
    )
}

/// Caption request for already-generated prompt content.
pub fn caption(persona: &Persona, prompt: &GenerationPrompt) -> String {
    format!(
        "Create a social media caption for this planned post:\n\n\
         Scene: {}\n\
         Tone: {}\n\n\
         Requirements:\n\
         - Engaging and conversational, 1-2 relevant emojis\n\
         - Concise but impactful\n\
         - End with 5-8 relevant hashtags\n\n\
         Just return the caption text, nothing else.",
        prompt.description(),
        persona.tone
    )
}

/// First narrative pass: sparse tent-pole reel moments.
pub fn reel_plan(persona: &Persona, horizon_days: u32) -> String {
    format!(
        "Create a {horizon_days}-day reel calendar for an AI influencer with this profile:\n\n\
         {}\n\n\
         Requirements:\n\
         - Roughly {} posts per week — these are tent-pole moments, not daily updates\n\
         - Day offsets are 1..{horizon_days} and must NOT be consecutive days; leave gaps so the cadence feels natural\n\
         - Each entry carries a short context describing what happens that day\n\
         - The entries should tell a story over time\n\n\
         Respond with a JSON array only, entries shaped exactly like:\n\
         [{{\"day\": 3, \"content_type\": \"reel\", \"post_context\": \"what this reel shows\"}}]",
        persona_profile(persona),
        persona.posts_per_week()
    )
}

/// Second narrative pass: story moments referencing the reel plan.
pub fn story_plan(persona: &Persona, horizon_days: u32, reel_summary: &str) -> String {
    format!(
        "An AI influencer with this profile:\n\n\
         {}\n\n\
         already has this reel plan over the next {horizon_days} days:\n\
         {reel_summary}\n\n\
         Create the story moments that fill out the same {horizon_days} days.\n\
         Requirements:\n\
         - Sparse, non-consecutive day offsets in 1..{horizon_days}\n\
         - Stories may reference the reels for continuity (teasers, behind-the-scenes, reactions)\n\
         - Each entry carries a short context\n\n\
         Respond with a JSON array only, entries shaped exactly like:\n\
         [{{\"day\": 2, \"content_type\": \"story\", \"post_context\": \"what this story shows\"}}]",
        persona_profile(persona)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use limelight_core::PersonaId;

    fn test_persona() -> Persona {
        Persona {
            id: PersonaId::new(),
            name: "Emma".into(),
            background: "tech entrepreneur and wellness advocate".into(),
            goals: vec!["inspire balance".into(), "promote wellness".into()],
            tone: "casual".into(),
            life_story: None,
            audience: None,
            growth_intensity: 1.0,
            posting_frequency: None,
            active: true,
            created_at: "2026-01-01T00:00:00Z".into(),
            updated_at: "2026-01-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn sponsor_brief_decorates_scene_prompt() {
        let persona = test_persona();
        let sponsor = SponsorBrief {
            company_name: "GlowCo".into(),
            product_name: Some("Glow Serum".into()),
        };
        let text = scene_prompt(&persona, Some("market visit"), Some(&sponsor));
        assert!(text.contains("sponsored by GlowCo"));
        assert!(text.contains("Glow Serum"));
        assert!(text.contains("market visit"));
    }

    #[test]
    fn plain_scene_prompt_has_no_sponsor_text() {
        let persona = test_persona();
        let text = scene_prompt(&persona, None, None);
        assert!(!text.contains("sponsored"));
        assert!(text.contains("lifestyle/daily activity"));
    }

    #[test]
    fn reel_plan_density_follows_growth_intensity() {
        let persona = test_persona();
        let text = reel_plan(&persona, 30);
        // intensity 1.0 → 7 posts per week
        assert!(text.contains("Roughly 7 posts per week"));
        assert!(text.contains("NOT be consecutive"));
    }

    #[test]
    fn story_plan_embeds_reel_summary() {
        let persona = test_persona();
        let text = story_plan(&persona, 14, "day 3: beach reel\nday 9: launch reel");
        assert!(text.contains("day 9: launch reel"));
    }
}
