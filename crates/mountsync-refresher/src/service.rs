use crate::admin::{AdminClientFactory, MountTableAdmin, TargetResolver};
use crate::cache::{AdminClientCache, ClientCache};
use crate::cleaner::CacheCleaner;
use crate::invoker::MountTableRefresher;
use crate::outcome::{CycleResult, CycleSummary, FailureSet, RefreshOutcome};
use mountsync_common::Result;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify, Semaphore};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Refresh coordinator configuration.
#[derive(Debug, Clone)]
pub struct RefresherConfig {
    /// Shared deadline for one refresh cycle
    pub update_timeout: Duration,
    /// Max idle lifetime of a cached admin client
    pub client_max_live: Duration,
    /// Period between client cache cleanup sweeps
    pub cleanup_period: Duration,
    /// Maximum refresh calls in flight at once
    pub max_concurrency: usize,
}

impl Default for RefresherConfig {
    fn default() -> Self {
        Self {
            update_timeout: Duration::from_secs(1),
            client_max_live: Duration::from_secs(60),
            cleanup_period: Duration::from_secs(15),
            max_concurrency: 32,
        }
    }
}

/// Coordinates fan-out mount table refreshes across the router fleet.
///
/// One call to [`refresh`](Self::refresh) is one cycle: it resolves the
/// current targets, dispatches one [`MountTableRefresher`] per target onto
/// the runtime, races all of them against a single shared deadline,
/// aggregates outcomes into a [`FailureSet`], evicts the admin client of
/// every failed remote address, and emits one summary line.
///
/// # Timeout vs. cancellation
///
/// The per-cycle deadline caps only the coordinator's bookkeeping window.
/// A call that outlives the deadline keeps running detached in the
/// background; its outcome is fixed at `Timeout` for this cycle even if it
/// later succeeds.
///
/// # Interruption
///
/// [`interrupt`](Self::interrupt) aborts the current (or next) cycle's
/// aggregate wait early. Every address not yet confirmed successful at that
/// point is counted as failed and evicted. Interruption is logged
/// distinctly from a timeout.
///
/// `refresh` is safe to call concurrently with itself and with the
/// background cleanup sweep: all per-cycle state is cycle-local and the
/// client cache is internally synchronized.
pub struct MountTableRefresherService {
    resolver: Arc<dyn TargetResolver>,
    cache: Arc<dyn AdminClientCache>,
    local_admin: Arc<dyn MountTableAdmin>,
    config: RefresherConfig,
    limiter: Arc<Semaphore>,
    interrupted: Notify,
    cleaner_handle: Mutex<Option<JoinHandle<()>>>,
}

impl MountTableRefresherService {
    /// Creates a service with the default [`ClientCache`] built over the
    /// given factory.
    pub fn new(
        resolver: Arc<dyn TargetResolver>,
        factory: Arc<dyn AdminClientFactory>,
        local_admin: Arc<dyn MountTableAdmin>,
        config: RefresherConfig,
    ) -> Self {
        let cache = Arc::new(ClientCache::new(factory, config.client_max_live));
        Self::with_cache(resolver, cache, local_admin, config)
    }

    /// Creates a service over an externally supplied client cache.
    pub fn with_cache(
        resolver: Arc<dyn TargetResolver>,
        cache: Arc<dyn AdminClientCache>,
        local_admin: Arc<dyn MountTableAdmin>,
        config: RefresherConfig,
    ) -> Self {
        let limiter = Arc::new(Semaphore::new(config.max_concurrency));
        Self {
            resolver,
            cache,
            local_admin,
            config,
            limiter,
            interrupted: Notify::new(),
            cleaner_handle: Mutex::new(None),
        }
    }

    /// Pre-populates admin clients for the known remote targets and starts
    /// the background cache cleaner.
    pub async fn service_init(&self) -> Result<()> {
        let targets = self.resolver.list_cached_records().await;
        for target in &targets {
            if target.is_local || !target.has_admin_address() {
                continue;
            }
            if let Err(e) = self.cache.get_or_create(&target.address).await {
                warn!("Could not pre-create admin client for {}: {}", target.address, e);
            }
        }

        let cleaner = CacheCleaner::new(self.cache.clone(), self.config.cleanup_period);
        let mut handle = self.cleaner_handle.lock().await;
        if handle.is_none() {
            *handle = Some(cleaner.spawn());
            info!("Mount table refresher service initialized");
        }
        Ok(())
    }

    /// Stops the cache cleaner and closes all cached admin clients.
    pub async fn service_stop(&self) {
        if let Some(handle) = self.cleaner_handle.lock().await.take() {
            handle.abort();
        }
        self.cache.clear().await;
        info!("Mount table refresher service stopped");
    }

    /// Interrupts the aggregate wait of the current refresh cycle.
    ///
    /// If no cycle is waiting, the interruption applies to the next one.
    pub fn interrupt(&self) {
        self.interrupted.notify_one();
    }

    /// Refreshes the mount table cache of this router and all others.
    pub async fn refresh(&self) -> CycleSummary {
        let targets = self.resolver.list_cached_records().await;

        let mut refreshers = Vec::new();
        for target in targets {
            if !target.has_admin_address() {
                // This router has not enabled its admin interface.
                debug!("Skipping target without admin address");
                continue;
            }
            let refresher = if target.is_local {
                MountTableRefresher::local(target.address, self.local_admin.clone())
            } else {
                MountTableRefresher::remote(target.address, self.cache.clone())
            };
            refreshers.push(refresher);
        }

        if refreshers.is_empty() {
            return CycleSummary::empty();
        }
        self.invoke_refresh(refreshers).await
    }

    async fn invoke_refresh(&self, refreshers: Vec<MountTableRefresher>) -> CycleSummary {
        let dispatched = refreshers.len();
        let local_addresses: HashSet<String> = refreshers
            .iter()
            .filter(|r| r.is_local())
            .map(|r| r.address().to_string())
            .collect();

        // Every dispatched address starts out assumed failed; a task removes
        // its own address only on a confirmed success. An interrupted cycle
        // then counts every unconfirmed address as failed for free.
        let failed = Arc::new(FailureSet::assume_failed(
            refreshers.iter().map(|r| r.address().to_string()),
        ));

        // One shared end time for the whole cycle, fixed when dispatch begins.
        let deadline = Instant::now() + self.config.update_timeout;

        let mut handles = Vec::with_capacity(dispatched);
        for refresher in refreshers {
            let failed = failed.clone();
            let limiter = self.limiter.clone();
            handles.push(tokio::spawn(async move {
                let address = refresher.address().to_string();

                // The call runs as its own task so that a deadline miss only
                // abandons it; the underlying refresh is never cancelled.
                let call = tokio::spawn(async move {
                    match limiter.acquire_owned().await {
                        Ok(_permit) => refresher.perform().await,
                        Err(e) => RefreshOutcome::Fault(format!("refresh limiter closed: {e}")),
                    }
                });

                let outcome = match tokio::time::timeout_at(deadline, call).await {
                    Ok(Ok(outcome)) => outcome,
                    Ok(Err(join_error)) => {
                        RefreshOutcome::Fault(format!("refresh task failed: {join_error}"))
                    }
                    Err(_elapsed) => RefreshOutcome::Timeout,
                };

                if outcome.is_success() {
                    failed.confirm_success(&address);
                }
                outcome
            }));
        }

        let result = tokio::select! {
            results = futures::future::join_all(handles) => {
                let timed_out = results
                    .iter()
                    .any(|r| matches!(r, Ok(RefreshOutcome::Timeout)));
                if timed_out {
                    warn!("Not all mount table admins updated their cache");
                    CycleResult::TimedOut
                } else {
                    CycleResult::Completed
                }
            }
            _ = self.interrupted.notified() => {
                warn!("Mount table cache refresher was interrupted");
                CycleResult::Interrupted
            }
        };

        // Evict the admin client of every failed remote address so the next
        // cycle builds a fresh one. Local targets never held one.
        let failed_addresses = failed.addresses();
        for address in &failed_addresses {
            if !local_addresses.contains(address) {
                self.cache.invalidate(address).await;
            }
        }

        let failure_count = failed_addresses.len();
        let success_count = dispatched - failure_count;
        info!(
            "Mount table entries cache refresh successCount={},failureCount={}",
            success_count, failure_count
        );

        CycleSummary {
            success_count,
            failure_count,
            result,
        }
    }
}
