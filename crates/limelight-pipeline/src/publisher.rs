use async_trait::async_trait;
use limelight_store::Post;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// The upload collaborator raised. Terminal for the firing — the post is
/// marked failed and nothing retries.
#[derive(Debug, Error)]
#[error("publish failed: {0}")]
pub struct PublishError(pub String);

/// The actual social-platform upload, seen from the state machine's side:
/// synchronous-or-awaited, returns the platform media id or raises.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, post: &Post) -> Result<String, PublishError>;
}

/// Publisher that never touches a platform: logs the post and fabricates a
/// media id. The daemon default until a real upload client is wired in.
pub struct DryRunPublisher;

#[async_trait]
impl Publisher for DryRunPublisher {
    async fn publish(&self, post: &Post) -> Result<String, PublishError> {
        let media_id = format!("dry-{}", Uuid::new_v4());
        info!(
            post_id = %post.id,
            content_type = %post.content_type,
            media_id = %media_id,
            "dry-run publish"
        );
        Ok(media_id)
    }
}
