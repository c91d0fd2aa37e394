use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::watch;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Result, SchedulerError};
use crate::types::{JobHandle, TimerJob};

/// The callback invoked when a registration's `run_at` arrives.
///
/// Firing has no synchronous caller — implementations handle and log their
/// own failures rather than returning them.
#[async_trait]
pub trait FireHandler: Send + Sync {
    async fn fire(&self, entry_id: &str);
}

struct Registry {
    /// Pending registrations keyed by entry id. Insert replaces — that is
    /// what makes re-registration idempotent.
    jobs: DashMap<String, TimerJob>,
    accepting: AtomicBool,
    shutdown_tx: watch::Sender<bool>,
}

/// Shared handle for registration management while the engine loop runs.
#[derive(Clone)]
pub struct SchedulerHandle {
    registry: Arc<Registry>,
}

impl SchedulerHandle {
    /// Register (or re-register) a one-shot timer for `entry_id`.
    ///
    /// A `run_at` already in the past is accepted and fires on the next
    /// tick — upstream planning latency routinely produces such entries.
    /// Re-registering replaces the previous timer rather than duplicating it.
    pub fn schedule(&self, entry_id: &str, run_at: DateTime<Utc>) -> Result<JobHandle> {
        if !self.registry.accepting.load(Ordering::SeqCst) {
            return Err(SchedulerError::ShutDown);
        }
        let handle = Uuid::new_v4().to_string();
        let replaced = self
            .registry
            .jobs
            .insert(
                entry_id.to_string(),
                TimerJob {
                    entry_id: entry_id.to_string(),
                    handle: handle.clone(),
                    run_at,
                },
            )
            .is_some();
        info!(entry_id, %run_at, replaced, "timer registered");
        Ok(JobHandle(handle))
    }

    /// Best-effort cancellation. Returns whether a pending timer was
    /// removed; cancelling an already-fired, replaced or unknown handle is
    /// a no-op.
    pub fn cancel(&self, handle: &JobHandle) -> bool {
        let entry_id = self
            .registry
            .jobs
            .iter()
            .find(|kv| kv.value().handle == handle.0)
            .map(|kv| kv.key().clone());
        let Some(entry_id) = entry_id else {
            debug!(handle = %handle, "cancel: no pending timer for handle");
            return false;
        };
        let removed = self
            .registry
            .jobs
            .remove_if(&entry_id, |_, job| job.handle == handle.0)
            .is_some();
        if removed {
            info!(entry_id = %entry_id, handle = %handle, "timer cancelled");
        }
        removed
    }

    /// Number of registrations still waiting to fire.
    pub fn pending_count(&self) -> usize {
        self.registry.jobs.len()
    }

    /// Stop accepting registrations and halt the engine loop. In-flight
    /// firings run to completion on their own tasks.
    pub fn shutdown(&self) {
        self.registry.accepting.store(false, Ordering::SeqCst);
        let _ = self.registry.shutdown_tx.send(true);
        info!("scheduler shutdown requested");
    }
}

/// Core timer engine: owns the tick loop and dispatches due registrations.
pub struct SchedulerEngine {
    registry: Arc<Registry>,
    handler: Arc<dyn FireHandler>,
    tick: Duration,
    /// Created together with the sender so a shutdown requested before the
    /// loop starts is still observed.
    shutdown_rx: watch::Receiver<bool>,
}

impl SchedulerEngine {
    pub fn new(handler: Arc<dyn FireHandler>, tick_secs: u64) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            registry: Arc::new(Registry {
                jobs: DashMap::new(),
                accepting: AtomicBool::new(true),
                shutdown_tx,
            }),
            handler,
            tick: Duration::from_secs(tick_secs.max(1)),
            shutdown_rx,
        }
    }

    /// Management handle sharing this engine's registry.
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            registry: Arc::clone(&self.registry),
        }
    }

    /// Main event loop. Ticks until [`SchedulerHandle::shutdown`] is called.
    pub async fn run(self) {
        info!("scheduler engine started");
        // Clone keeps the pre-run seen version, so a shutdown requested
        // before the first poll still resolves changed().
        let mut shutdown = self.shutdown_rx.clone();
        let mut interval = tokio::time::interval(self.tick);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.tick_at(Utc::now());
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("scheduler engine shutting down");
                        break;
                    }
                }
            }
        }
    }

    /// Dispatch every registration due at `now`, in ascending run_at order,
    /// each on its own task. Returns the spawned task handles so tests can
    /// await completion deterministically.
    pub fn tick_at(&self, now: DateTime<Utc>) -> Vec<tokio::task::JoinHandle<()>> {
        let mut due: Vec<TimerJob> = self
            .registry
            .jobs
            .iter()
            .filter(|kv| kv.value().run_at <= now)
            .map(|kv| kv.value().clone())
            .collect();
        due.sort_by_key(|job| job.run_at);

        let mut spawned = Vec::with_capacity(due.len());
        for job in due {
            // Guard against a re-registration that slipped in since the
            // snapshot: only the handle we saw is allowed to fire.
            if self
                .registry
                .jobs
                .remove_if(&job.entry_id, |_, current| current.handle == job.handle)
                .is_none()
            {
                continue;
            }
            info!(entry_id = %job.entry_id, run_at = %job.run_at, "firing schedule entry");
            let handler = Arc::clone(&self.handler);
            spawned.push(tokio::spawn(async move {
                handler.fire(&job.entry_id).await;
            }));
        }
        spawned
    }
}
