use chrono::{DateTime, Utc};
use limelight_core::types::{AudienceTargeting, PostingFrequency};
use limelight_core::{ContentType, GenerationPrompt, PersonaId};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a persisted post.
///
/// Transitions are monotonic: pending → processing → {posted, failed}.
/// Nothing ever moves backwards and nothing skips processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    /// Waiting for its schedule entry to fire.
    Pending,
    /// Claimed by a fire callback; publish in progress.
    Processing,
    /// Published; external_media_id records the platform handle.
    Posted,
    /// Publish raised. Terminal — resubmission is a manual operation.
    Failed,
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PostStatus::Pending => "pending",
            PostStatus::Processing => "processing",
            PostStatus::Posted => "posted",
            PostStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PostStatus::Pending),
            "processing" => Ok(PostStatus::Processing),
            "posted" => Ok(PostStatus::Posted),
            "failed" => Ok(PostStatus::Failed),
            other => Err(format!("unknown post status: {other}")),
        }
    }
}

/// A persisted content item. Created by the materializer; status mutated only
/// by the fire-time runner. Never deleted, only marked failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// UUID v4 string — primary key.
    pub id: String,
    pub persona_id: PersonaId,
    pub sponsor_id: Option<String>,
    pub content_type: ContentType,
    pub scheduled_time: DateTime<Utc>,
    pub generation_prompt: Option<GenerationPrompt>,
    pub caption: Option<String>,
    pub hashtags: Vec<String>,
    pub status: PostStatus,
    /// Platform media id recorded on successful publish.
    pub external_media_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// The binding between a post and a concrete fire time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// UUID v4 string — primary key.
    pub id: String,
    pub post_id: String,
    pub run_at: DateTime<Utc>,
    /// Cleared on cancellation; an inactive entry never fires.
    pub active: bool,
    /// Timer registration handle, set once the scheduler accepts the entry.
    pub job_handle: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A brand that can be attached to posts for sponsored content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sponsor {
    pub id: String,
    pub company_name: String,
    pub product_name: Option<String>,
    pub product_blurb: Option<String>,
    pub targeting_tags: Vec<String>,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Parameters for creating a persona.
#[derive(Debug, Clone, Default)]
pub struct NewPersona {
    pub name: String,
    pub background: String,
    pub goals: Vec<String>,
    pub tone: String,
    pub life_story: Option<String>,
    pub audience: Option<AudienceTargeting>,
    pub growth_intensity: f64,
    pub posting_frequency: Option<PostingFrequency>,
}

/// Parameters for creating a post together with its schedule entry.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub persona_id: PersonaId,
    pub sponsor_id: Option<String>,
    pub content_type: ContentType,
    pub scheduled_time: DateTime<Utc>,
    pub generation_prompt: Option<GenerationPrompt>,
    pub caption: Option<String>,
    pub hashtags: Vec<String>,
}
