use limelight_core::Persona;
use limelight_store::Sponsor;

/// Sponsor/persona affinity: 0.5 base plus 0.1 per targeting tag that
/// overlaps the persona's audience interests, capped at 1.0.
pub fn match_score(persona: &Persona, sponsor: &Sponsor) -> f64 {
    let mut score = 0.5;
    if let Some(ref audience) = persona.audience {
        let overlap = sponsor
            .targeting_tags
            .iter()
            .filter(|tag| audience.interests.iter().any(|i| i == *tag))
            .count();
        score += overlap as f64 * 0.1;
    }
    score.min(1.0)
}
