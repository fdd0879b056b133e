//! Background signing key rotation job.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::repositories::KeyStore;

use super::key_manager::JwkKeyManager;

/// Periodic key rotation task.
///
/// Runs on a fixed period independent of load. A failed rotation is logged
/// and swallowed; the previous key stays current and the next tick retries.
pub struct KeyRotationScheduler<S: KeyStore + 'static> {
    manager: Arc<JwkKeyManager<S>>,
    interval: Duration,
}

impl<S: KeyStore> KeyRotationScheduler<S> {
    /// Create a new scheduler rotating at `interval`.
    pub fn new(manager: Arc<JwkKeyManager<S>>, interval: Duration) -> Self {
        Self { manager, interval }
    }

    /// Run a single rotation cycle.
    pub async fn run_once(&self) {
        match self.manager.rotate_key().await {
            Ok(key_id) => info!(%key_id, "Scheduled key rotation succeeded"),
            Err(e) => error!("Scheduled key rotation failed: {}", e),
        }
    }

    /// Start the scheduler as a background task.
    ///
    /// This spawns a tokio task that rotates at regular intervals. The
    /// first tick fires after one full interval; the cold-start key comes
    /// from [`JwkKeyManager::initialize`].
    pub fn start_background_task(self: Arc<Self>) {
        let interval = self.interval;

        tokio::spawn(async move {
            info!(
                "Key rotation scheduler started - will rotate every {} seconds",
                interval.as_secs()
            );

            let mut interval_timer = tokio::time::interval(interval);
            // Consume the immediate first tick
            interval_timer.tick().await;

            loop {
                interval_timer.tick().await;
                self.run_once().await;
            }
        });
    }
}
