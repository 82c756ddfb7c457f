use async_trait::async_trait;
use mountsync_common::{Result, Target};
use std::sync::Arc;

/// One node's mount-table admin interface, bound to one address.
///
/// `refresh` asks the node to reload its cached mount table. It returns
/// `Ok(true)` on success, `Ok(false)` when the node recognizably declined,
/// and `Err` on a transport or protocol fault. The coordinator treats the
/// last two identically for eviction purposes.
#[async_trait]
pub trait MountTableAdmin: Send + Sync {
    async fn refresh(&self) -> Result<bool>;
}

/// Creates admin clients on behalf of the [`ClientCache`](crate::ClientCache).
///
/// The cache owns the lifecycle of every client it creates; clients are
/// closed by dropping the last `Arc` reference.
pub trait AdminClientFactory: Send + Sync {
    fn create(&self, address: &str) -> Result<Arc<dyn MountTableAdmin>>;
}

/// Supplies the current list of known routing nodes.
#[async_trait]
pub trait TargetResolver: Send + Sync {
    async fn list_cached_records(&self) -> Vec<Target>;
}

/// Resolver over a fixed target list, for static deployments and tests.
pub struct StaticTargetResolver {
    targets: Vec<Target>,
}

impl StaticTargetResolver {
    pub fn new(targets: Vec<Target>) -> Self {
        Self { targets }
    }
}

#[async_trait]
impl TargetResolver for StaticTargetResolver {
    async fn list_cached_records(&self) -> Vec<Target> {
        self.targets.clone()
    }
}
