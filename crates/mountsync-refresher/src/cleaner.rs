use crate::cache::AdminClientCache;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Periodic cleanup scheduler for the admin client cache.
///
/// Runs as a detached low-frequency background task, sweeping expired
/// clients for the lifetime of the service. The task never blocks shutdown;
/// the service aborts it on stop.
pub struct CacheCleaner {
    cache: Arc<dyn AdminClientCache>,
    period: Duration,
}

impl CacheCleaner {
    pub fn new(cache: Arc<dyn AdminClientCache>, period: Duration) -> Self {
        Self { cache, period }
    }

    /// Starts the cleanup task.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn run(self) {
        debug!("Client cache cleaner running every {:?}", self.period);
        let mut interval = tokio::time::interval(self.period);
        // The first tick fires immediately; swallow it so sweeps start one
        // full period after service init, like a fixed-delay schedule.
        interval.tick().await;
        loop {
            interval.tick().await;
            self.cache.cleanup().await;
        }
    }
}
