//! Thin HTTP fetchers against the chain's LCD/REST endpoint and the node's
//! local RPC endpoint.
//!
//! Each operation performs one GET and returns a parsed result or a
//! [`FetchError`]; there are no retries here. Retry happens on the caller's
//! next poll cycle.

pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::info;

use valwatch_core::FetchError;

pub use types::{
    Prevote, PrevoteSet, Proposal, ProposalContent, ProposalValue, SyncInfo, TallyResult,
    Validator, PREVOTE_FRESHNESS_WINDOW, STATUS_VOTING_PERIOD,
};

use types::{LcdResponse, NodeStatus};

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Chain-level reads served by the public LCD endpoint.
#[async_trait]
pub trait ChainApi: Send + Sync {
    /// Reachability probe only; no payload semantics.
    async fn lcd_reachable(&self) -> bool;

    /// `Ok(None)` means the LCD answered but knows no validator under this
    /// address, a distinct outcome from connectivity failure.
    async fn validator(&self, address: &str) -> Result<Option<Validator>, FetchError>;

    async fn validators(&self) -> Result<Vec<Validator>, FetchError>;

    async fn prevotes(&self, address: &str) -> Result<PrevoteSet, FetchError>;

    async fn proposals(&self) -> Result<Vec<Proposal>, FetchError>;
}

/// Node-level reads served by the operator's own RPC endpoint.
#[async_trait]
pub trait NodeApi: Send + Sync {
    /// Status-endpoint probe only.
    async fn reachable(&self) -> bool;

    /// One fetch shared by the catch-up and height-liveness checks.
    async fn sync_status(&self) -> Result<SyncInfo, FetchError>;
}

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .unwrap_or_default()
}

async fn get_json<T: DeserializeOwned>(
    http: &reqwest::Client,
    url: &str,
) -> Result<T, FetchError> {
    let response = http
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::Connectivity(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        info!(%url, %status, "Request returned non-success status");
        return Err(FetchError::Status(status.as_u16()));
    }

    response
        .json()
        .await
        .map_err(|e| FetchError::Malformed(e.to_string()))
}

/// Client for the Lite Client Daemon (LCD) REST API.
#[derive(Clone)]
pub struct LcdClient {
    http: reqwest::Client,
    base: String,
}

impl LcdClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: http_client(),
            base: base_url.into(),
        }
    }
}

#[async_trait]
impl ChainApi for LcdClient {
    async fn lcd_reachable(&self) -> bool {
        let url = format!("{}/node_info", self.base);
        match self.http.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    async fn validator(&self, address: &str) -> Result<Option<Validator>, FetchError> {
        let url = format!("{}/staking/validators/{address}", self.base);
        match get_json::<LcdResponse<Validator>>(&self.http, &url).await {
            Ok(wrapped) => Ok(Some(wrapped.result)),
            Err(FetchError::Status(_)) => {
                // The LCD answers 4xx both for unknown addresses and while
                // degraded; only a still-reachable LCD makes this a NotFound.
                if self.lcd_reachable().await {
                    Ok(None)
                } else {
                    Err(FetchError::Connectivity(format!(
                        "LCD unreachable while requesting {url}"
                    )))
                }
            }
            Err(e) => Err(e),
        }
    }

    async fn validators(&self) -> Result<Vec<Validator>, FetchError> {
        let url = format!("{}/staking/validators", self.base);
        let wrapped: LcdResponse<Vec<Validator>> = get_json(&self.http, &url).await?;
        Ok(wrapped.result)
    }

    async fn prevotes(&self, address: &str) -> Result<PrevoteSet, FetchError> {
        let url = format!("{}/oracle/voters/{address}/prevotes", self.base);
        let wrapped: LcdResponse<Vec<Prevote>> = get_json(&self.http, &url).await?;
        let height = wrapped
            .height
            .ok_or_else(|| FetchError::Malformed("prevote response without height".into()))?;
        Ok(PrevoteSet {
            height,
            prevotes: wrapped.result,
        })
    }

    async fn proposals(&self) -> Result<Vec<Proposal>, FetchError> {
        let url = format!("{}/gov/proposals", self.base);
        let wrapped: LcdResponse<Vec<Proposal>> = get_json(&self.http, &url).await?;
        Ok(wrapped.result)
    }
}

/// Client for the node's own Tendermint RPC endpoint.
#[derive(Clone)]
pub struct NodeRpcClient {
    http: reqwest::Client,
    base: String,
}

impl NodeRpcClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: http_client(),
            base: base_url.into(),
        }
    }
}

#[async_trait]
impl NodeApi for NodeRpcClient {
    async fn reachable(&self) -> bool {
        let url = format!("{}/status", self.base);
        match self.http.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    async fn sync_status(&self) -> Result<SyncInfo, FetchError> {
        let url = format!("{}/status", self.base);
        let wrapped: LcdResponse<NodeStatus> = get_json(&self.http, &url).await?;
        Ok(wrapped.result.sync_info)
    }
}

/// Probe for sentry nodes' `/syncing` endpoint.
#[derive(Clone)]
pub struct SentryClient {
    http: reqwest::Client,
}

impl SentryClient {
    pub fn new() -> Self {
        Self {
            http: http_client(),
        }
    }

    /// Whether the sentry node at `base_url` reports itself as syncing.
    pub async fn syncing(&self, base_url: &str) -> Result<bool, FetchError> {
        let payload: serde_json::Value =
            get_json(&self.http, &format!("{base_url}/syncing")).await?;
        Ok(payload
            .get("syncing")
            .and_then(|v| v.as_bool())
            .unwrap_or(false))
    }
}

impl Default for SentryClient {
    fn default() -> Self {
        Self::new()
    }
}
