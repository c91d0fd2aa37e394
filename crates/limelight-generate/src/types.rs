use limelight_core::ContentType;
use serde::{Deserialize, Serialize};

/// A generated scene prompt: objective third-person description plus the
/// character's first-person intention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenePrompt {
    pub description: String,
    pub intention: String,
}

/// One entry of a narrative content plan as returned by the collaborator.
///
/// Every field is optional on purpose: the model occasionally drops keys,
/// and one malformed entry must not abort the rest of the plan. The planner
/// skips entries missing `day` or `content_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanEntry {
    /// Day offset from "now", 1-based.
    pub day: Option<u32>,
    pub content_type: Option<ContentType>,
    /// Free-text context carried into materialization.
    pub post_context: Option<String>,
}

/// The sponsor facts woven into a generation prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SponsorBrief {
    pub company_name: String,
    pub product_name: Option<String>,
}
