use crate::admin::MountTableAdmin;
use crate::cache::AdminClientCache;
use crate::outcome::RefreshOutcome;
use std::sync::Arc;
use tracing::debug;

/// How one invoker reaches its target's refresh operation.
enum RefreshCall {
    /// In-process refresh of the local node, no admin client involved
    Local(Arc<dyn MountTableAdmin>),
    /// Remote refresh through a client obtained from the cache at call time
    Remote(Arc<dyn AdminClientCache>),
}

/// Refreshes the mount table cache of exactly one target.
///
/// One invoker exists per target per cycle and is never reused. It carries
/// no concurrency of its own; the coordinator imposes parallelism by
/// dispatching many invokers at once. Faults from the underlying call stop
/// here and become a [`RefreshOutcome::Fault`]; nothing propagates upward.
pub struct MountTableRefresher {
    address: String,
    call: RefreshCall,
}

impl MountTableRefresher {
    /// Invoker for the local node. Never touches the client cache.
    pub fn local(address: impl Into<String>, admin: Arc<dyn MountTableAdmin>) -> Self {
        Self {
            address: address.into(),
            call: RefreshCall::Local(admin),
        }
    }

    /// Invoker for a remote node, resolving its admin client through the
    /// cache when the call runs.
    pub fn remote(address: impl Into<String>, cache: Arc<dyn AdminClientCache>) -> Self {
        Self {
            address: address.into(),
            call: RefreshCall::Remote(cache),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn is_local(&self) -> bool {
        matches!(self.call, RefreshCall::Local(_))
    }

    /// Performs the refresh call and classifies its result.
    pub async fn perform(&self) -> RefreshOutcome {
        let result = match &self.call {
            RefreshCall::Local(admin) => admin.refresh().await,
            RefreshCall::Remote(cache) => match cache.get_or_create(&self.address).await {
                Ok(admin) => admin.refresh().await,
                Err(e) => Err(e),
            },
        };

        match result {
            Ok(true) => RefreshOutcome::Success,
            Ok(false) => RefreshOutcome::Failure,
            Err(e) => {
                debug!("Refresh of {} raised a fault: {}", self.address, e);
                RefreshOutcome::Fault(e.to_string())
            }
        }
    }
}
