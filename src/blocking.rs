//! Synchronous wrapper around [`EthysClient`].
//!
//! Each call drives the async client to completion on a private
//! current-thread runtime. Do not call these methods from inside an async
//! context; use [`EthysClient`] there instead.

use tokio::runtime::{Builder, Runtime};

use crate::client::{EthysClient, TelemetryOptions};
use crate::config::ClientConfig;
use crate::error::Error;
use crate::types::*;

/// Blocking client for the ETHYS x402 API.
pub struct BlockingEthysClient {
    inner: EthysClient,
    runtime: Runtime,
}

impl BlockingEthysClient {
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Network(format!("failed to start runtime: {e}")))?;
        Ok(Self {
            inner: EthysClient::new(config)?,
            runtime,
        })
    }

    /// Create a client configured from `ETHYS_*` environment variables.
    pub fn from_env() -> Result<Self, Error> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        self.inner.config()
    }

    /// See [`EthysClient::get_info`].
    pub fn get_info(&self) -> Result<InfoResponse, Error> {
        self.runtime.block_on(self.inner.get_info())
    }

    /// See [`EthysClient::connect`].
    pub fn connect(&self, req: &ConnectRequest) -> Result<ConnectResponse, Error> {
        self.runtime.block_on(self.inner.connect(req))
    }

    /// See [`EthysClient::connect_with_key`].
    pub fn connect_with_key(
        &self,
        private_key: &str,
        message: Option<&str>,
    ) -> Result<ConnectResponse, Error> {
        self.runtime
            .block_on(self.inner.connect_with_key(private_key, message))
    }

    /// See [`EthysClient::verify_payment`].
    pub fn verify_payment(&self, agent_id: &str, tx_hash: &str) -> Result<VerifyPaymentResponse, Error> {
        self.runtime.block_on(self.inner.verify_payment(agent_id, tx_hash))
    }

    /// See [`EthysClient::telemetry`].
    pub fn telemetry(
        &self,
        agent_id: &str,
        address: &str,
        events: Vec<TelemetryEvent>,
        opts: TelemetryOptions,
    ) -> Result<TelemetryResponse, Error> {
        self.runtime
            .block_on(self.inner.telemetry(agent_id, address, events, opts))
    }

    /// See [`EthysClient::discovery_search`].
    pub fn discovery_search(&self, query: &DiscoveryQuery) -> Result<DiscoverySearchResponse, Error> {
        self.runtime.block_on(self.inner.discovery_search(query))
    }

    /// See [`EthysClient::trust_score`].
    pub fn trust_score(&self, agent_id: Option<&str>) -> Result<TrustScoreResponse, Error> {
        self.runtime.block_on(self.inner.trust_score(agent_id))
    }

    /// See [`EthysClient::trust_attest`].
    pub fn trust_attest(&self, req: &TrustAttestRequest) -> Result<JsonMap, Error> {
        self.runtime.block_on(self.inner.trust_attest(req))
    }

    /// See [`EthysClient::reviews_submit`].
    pub fn reviews_submit(&self, req: &ReviewSubmitRequest) -> Result<JsonMap, Error> {
        self.runtime.block_on(self.inner.reviews_submit(req))
    }
}
