use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a persona (UUIDv4 string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PersonaId(pub String);

impl PersonaId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for PersonaId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for PersonaId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PersonaId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Kind of content a post carries on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Post,
    Story,
    Reel,
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContentType::Post => "post",
            ContentType::Story => "story",
            ContentType::Reel => "reel",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "post" => Ok(ContentType::Post),
            "story" => Ok(ContentType::Story),
            "reel" => Ok(ContentType::Reel),
            other => Err(format!("unknown content type: {other}")),
        }
    }
}

/// The structured prompt attached to a generated post.
///
/// `Scene` is the current shape: an objective third-person description plus a
/// first-person intention. `Script` is the legacy single-text form still
/// accepted on read so old rows keep deserialising.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationPrompt {
    /// Scene description + internal monologue pair.
    Scene { description: String, intention: String },
    /// Legacy flat script text.
    Script { full_script: String },
}

impl GenerationPrompt {
    /// The objective text of the prompt, whichever shape it is.
    pub fn description(&self) -> &str {
        match self {
            GenerationPrompt::Scene { description, .. } => description,
            GenerationPrompt::Script { full_script } => full_script,
        }
    }
}

/// Interval cadence preferences stored with a persona.
///
/// Either interval may be absent — a persona that never posts stories is
/// valid. Both absent means the persona has no automatic cadence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PostingFrequency {
    pub reel_interval_hours: Option<u32>,
    pub story_interval_hours: Option<u32>,
}

/// Audience-targeting attributes. All fields optional — a brand-new persona
/// may not have a defined audience yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AudienceTargeting {
    pub age_range: Option<(u8, u8)>,
    pub gender: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    pub region: Option<String>,
}

/// A synthetic content-producing identity.
///
/// The id is immutable once created; everything else is mutated only through
/// explicit store update operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    pub id: PersonaId,
    pub name: String,
    /// Short background blurb used in generation prompts.
    pub background: String,
    pub goals: Vec<String>,
    pub tone: String,
    /// Long-form narrative of the persona's life story, if authored.
    pub life_story: Option<String>,
    pub audience: Option<AudienceTargeting>,
    /// 0.0 = minimal posting ambition, 1.0 = maximum. Drives planned density.
    pub growth_intensity: f64,
    pub posting_frequency: Option<PostingFrequency>,
    pub active: bool,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// RFC 3339 timestamp of the last update.
    pub updated_at: String,
}

impl Persona {
    /// Posts-per-week density derived from growth intensity.
    ///
    /// Formula carried over from the planning heuristics: 3 posts/week at
    /// zero intensity, up to 7 at full intensity.
    pub fn posts_per_week(&self) -> u32 {
        (3.0 + self.growth_intensity.clamp(0.0, 1.0) * 4.0) as u32
    }
}
