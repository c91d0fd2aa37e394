use std::sync::Arc;

use async_trait::async_trait;
use limelight_scheduler::FireHandler;
use limelight_store::{PostStatus, Store, StoreError};
use tracing::{debug, error, info, warn};

use crate::publisher::Publisher;

/// The fire-time lifecycle controller.
///
/// Invoked by the timer engine with an entry id; walks the post through
/// pending → processing → {posted, failed}. The pending check backed by the
/// store's compare-and-set is the idempotency guard: duplicate firings and
/// cancellation races resolve here, not in the timer layer.
pub struct PostRunner {
    store: Store,
    publisher: Arc<dyn Publisher>,
}

impl PostRunner {
    pub fn new(store: Store, publisher: Arc<dyn Publisher>) -> Self {
        Self { store, publisher }
    }

    async fn run(&self, entry_id: &str) -> Result<(), StoreError> {
        let Some(entry) = self.store.entry(entry_id)? else {
            warn!(entry_id, "fired entry not found — ignoring");
            return Ok(());
        };
        if !entry.active {
            debug!(entry_id, "fired entry is inactive — ignoring");
            return Ok(());
        }

        let Some(post) = self.store.post(&entry.post_id)? else {
            error!(
                entry_id,
                post_id = %entry.post_id,
                "schedule entry references a missing post"
            );
            return Ok(());
        };
        if post.status != PostStatus::Pending {
            warn!(
                post_id = %post.id,
                status = %post.status,
                "post is not pending — skipping duplicate firing"
            );
            return Ok(());
        }

        // Claim the post. Losing the race means another firing got here
        // between the read above and now.
        if !self
            .store
            .transition_post(&post.id, PostStatus::Pending, PostStatus::Processing)?
        {
            warn!(post_id = %post.id, "lost claim race — skipping");
            return Ok(());
        }

        match self.publisher.publish(&post).await {
            Ok(media_id) => {
                self.store.record_publish(&post.id, &media_id)?;
                info!(post_id = %post.id, media_id = %media_id, "post published");
            }
            Err(e) => {
                self.store
                    .transition_post(&post.id, PostStatus::Processing, PostStatus::Failed)?;
                error!(post_id = %post.id, error = %e, "publish failed — post marked failed");
            }
        }
        Ok(())
    }
}

#[async_trait]
impl FireHandler for PostRunner {
    async fn fire(&self, entry_id: &str) {
        // No synchronous caller exists at fire time; store errors are logged
        // and the firing is abandoned.
        if let Err(e) = self.run(entry_id).await {
            error!(entry_id, error = %e, "fire aborted on store error");
        }
    }
}
