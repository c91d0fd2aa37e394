use async_trait::async_trait;
use limelight_core::config::GeneratorConfig;
use limelight_core::{GenerationPrompt, Persona};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{GeneratorError, Result};
use crate::generator::ContentGenerator;
use crate::parse::{extract_array, extract_object};
use crate::prompt;
use crate::types::{PlanEntry, ScenePrompt, SponsorBrief};

const API_VERSION: &str = "2023-06-01";
/// Scene prompts are short; captions shorter still. Plans get the configured
/// budget since they return whole calendars.
const SCENE_MAX_TOKENS: u32 = 500;
const CAPTION_MAX_TOKENS: u32 = 200;

/// Production generator backed by the Anthropic Messages API.
pub struct AnthropicGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    plan_max_tokens: u32,
}

impl AnthropicGenerator {
    /// Build from config. Fails when no API key is configured — callers that
    /// want to run without a generator should not construct one.
    pub fn new(config: &GeneratorConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| GeneratorError::NotConfigured("generator.api_key is not set".into()))?;
        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            plan_max_tokens: config.max_tokens,
        })
    }

    /// One user-turn completion; returns the joined text blocks.
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": max_tokens,
            "messages": [{ "role": "user", "content": prompt }],
        });
        let url = format!("{}/v1/messages", self.base_url);

        debug!(model = %self.model, max_tokens, "sending generation request");

        let resp = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status == 429 {
            let retry = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5000);
            return Err(GeneratorError::RateLimited {
                retry_after_ms: retry,
            });
        }
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status, body = %text, "generation API error");
            return Err(GeneratorError::Api {
                status,
                message: text,
            });
        }

        let api_resp: ApiResponse = resp
            .json()
            .await
            .map_err(|e| GeneratorError::Parse(e.to_string()))?;

        let text = api_resp
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("");
        Ok(text)
    }

    fn parse_plan(&self, text: &str) -> Result<Vec<PlanEntry>> {
        let json = extract_array(text)
            .ok_or_else(|| GeneratorError::Parse("no JSON array in plan response".into()))?;
        serde_json::from_str(json).map_err(|e| GeneratorError::Parse(e.to_string()))
    }
}

#[async_trait]
impl ContentGenerator for AnthropicGenerator {
    async fn scene_prompt(
        &self,
        persona: &Persona,
        context: Option<&str>,
        sponsor: Option<&SponsorBrief>,
    ) -> Result<ScenePrompt> {
        let text = self
            .complete(&prompt::scene_prompt(persona, context, sponsor), SCENE_MAX_TOKENS)
            .await?;
        let json = extract_object(&text)
            .ok_or_else(|| GeneratorError::Parse("no JSON object in scene response".into()))?;
        serde_json::from_str(json).map_err(|e| GeneratorError::Parse(e.to_string()))
    }

    async fn caption(&self, persona: &Persona, gen_prompt: &GenerationPrompt) -> Result<String> {
        let text = self
            .complete(&prompt::caption(persona, gen_prompt), CAPTION_MAX_TOKENS)
            .await?;
        let caption = text.trim();
        if caption.is_empty() {
            return Err(GeneratorError::Parse("empty caption response".into()));
        }
        Ok(caption.to_string())
    }

    async fn reel_plan(&self, persona: &Persona, horizon_days: u32) -> Result<Vec<PlanEntry>> {
        let text = self
            .complete(&prompt::reel_plan(persona, horizon_days), self.plan_max_tokens)
            .await?;
        self.parse_plan(&text)
    }

    async fn story_plan(
        &self,
        persona: &Persona,
        horizon_days: u32,
        reel_summary: &str,
    ) -> Result<Vec<PlanEntry>> {
        let text = self
            .complete(
                &prompt::story_plan(persona, horizon_days, reel_summary),
                self.plan_max_tokens,
            )
            .await?;
        self.parse_plan(&text)
    }
}

// Anthropic API response types (private — only used for deserialization)

#[derive(Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    /// Thinking or any future block kind — ignored.
    #[serde(other)]
    Other,
}
