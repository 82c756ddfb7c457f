//! Production admin clients for the refresh service.
//!
//! Remote nodes are reached over HTTP: one POST per refresh carrying a small
//! JSON body, answered with `{"success": bool}`. The local node is refreshed
//! in-process without any transport.

use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::Request;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use mountsync_common::{RefreshError, Result};
use mountsync_refresher::{AdminClientFactory, MountTableAdmin};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Admin client that refreshes one remote node over HTTP.
pub struct HttpAdminClient {
    address: String,
    timeout: Duration,
}

impl HttpAdminClient {
    pub fn new(address: impl Into<String>, timeout: Duration) -> Self {
        Self {
            address: address.into(),
            timeout,
        }
    }
}

#[async_trait]
impl MountTableAdmin for HttpAdminClient {
    async fn refresh(&self) -> Result<bool> {
        let url = format!("http://{}/", self.address);
        let body = serde_json::to_vec(&serde_json::json!({
            "method": "refreshMountTableEntries",
        }))?;

        let request = Request::builder()
            .method("POST")
            .uri(&url)
            .header("Content-Type", "application/json")
            .body(Full::new(Bytes::from(body)))
            .map_err(|e| RefreshError::Transport(format!("Failed to build request: {e}")))?;

        let client = Client::builder(TokioExecutor::new()).build_http();
        let response = tokio::time::timeout(self.timeout, client.request(request))
            .await
            .map_err(|_| RefreshError::Timeout(self.timeout.as_millis() as u64))?
            .map_err(|e| RefreshError::Transport(format!("HTTP request failed: {e}")))?;

        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| RefreshError::Transport(format!("Failed to read response: {e}")))?
            .to_bytes();

        let value: serde_json::Value = serde_json::from_slice(&bytes)?;
        Ok(value
            .get("success")
            .and_then(|v| v.as_bool())
            .unwrap_or(false))
    }
}

/// Factory creating [`HttpAdminClient`]s on behalf of the client cache.
pub struct HttpAdminFactory {
    timeout: Duration,
}

impl HttpAdminFactory {
    pub fn new(timeout: Duration) -> Arc<Self> {
        Arc::new(Self { timeout })
    }
}

impl AdminClientFactory for HttpAdminFactory {
    fn create(&self, address: &str) -> Result<Arc<dyn MountTableAdmin>> {
        if address.is_empty() {
            return Err(RefreshError::InvalidTarget(
                "empty admin address".to_string(),
            ));
        }
        Ok(Arc::new(HttpAdminClient::new(address, self.timeout)))
    }
}

/// In-process refresh of this node's own mount table cache.
pub struct LocalMountTableAdmin;

#[async_trait]
impl MountTableAdmin for LocalMountTableAdmin {
    async fn refresh(&self) -> Result<bool> {
        debug!("Reloading local mount table cache");
        Ok(true)
    }
}
