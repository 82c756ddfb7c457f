use serde::{Deserialize, Serialize};

/// One routing node as known to the target resolver.
///
/// A target is addressed by its admin endpoint (`host:port`). Targets whose
/// admin interface is disabled carry an empty address and are skipped before
/// dispatch. The node issuing a refresh cycle marks itself with `is_local`;
/// local refreshes run in-process and never touch the client cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Admin address where the node's refresh call can be invoked
    pub address: String,
    /// Whether this target is the node issuing the cycle itself
    pub is_local: bool,
}

impl Target {
    /// Creates a remote target reachable at the given admin address.
    pub fn remote(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            is_local: false,
        }
    }

    /// Creates a local target, refreshed in-process without an RPC handle.
    pub fn local(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            is_local: true,
        }
    }

    /// Whether the target has its admin interface enabled.
    pub fn has_admin_address(&self) -> bool {
        !self.address.is_empty()
    }
}
