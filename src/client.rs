//! Async API client for the ETHYS x402 endpoints.
//!
//! # Example
//!
//! ```rust,no_run
//! # async fn example() -> Result<(), ethys402::Error> {
//! use ethys402::client::EthysClient;
//! use ethys402::config::ClientConfig;
//!
//! let client = EthysClient::new(ClientConfig::default())?;
//! let info = client.get_info().await?;
//! println!("{} v{}", info.name, info.version);
//! # Ok(())
//! # }
//! ```

use reqwest::header::ACCEPT;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::ClientConfig;
use crate::crypto;
use crate::error::Error;
use crate::signing::{self, TelemetrySignInput};
use crate::types::*;

/// Path prefix shared by every x402 endpoint.
pub const API_PREFIX: &str = "/api/v1/402";

/// How a telemetry batch is authenticated.
///
/// Supply either `private_key` (the batch is signed locally) or a
/// `signature` computed elsewhere; in the latter case `timestamp` and `nonce`
/// must be the values that were signed.
#[derive(Clone, Default)]
pub struct TelemetryOptions {
    pub private_key: Option<String>,
    /// Defaults to the current time.
    pub timestamp: Option<u64>,
    /// Defaults to a fresh random nonce.
    pub nonce: Option<String>,
    pub signature: Option<String>,
}

impl TelemetryOptions {
    /// Sign locally with `private_key`.
    pub fn with_private_key(private_key: impl Into<String>) -> Self {
        Self {
            private_key: Some(private_key.into()),
            ..Self::default()
        }
    }

    /// Use a signature produced elsewhere over `timestamp` and `nonce`.
    pub fn presigned(signature: impl Into<String>, timestamp: u64, nonce: impl Into<String>) -> Self {
        Self {
            signature: Some(signature.into()),
            timestamp: Some(timestamp),
            nonce: Some(nonce.into()),
            private_key: None,
        }
    }
}

impl std::fmt::Debug for TelemetryOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryOptions")
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("timestamp", &self.timestamp)
            .field("nonce", &self.nonce)
            .field("signature", &self.signature)
            .finish()
    }
}

/// Assemble a signed telemetry request body.
///
/// # Errors
///
/// [`Error::Validation`] if neither a private key nor a signature is given,
/// plus any error from [`signing::sign_telemetry`].
pub fn build_telemetry_request(
    agent_id: &str,
    address: &str,
    events: Vec<TelemetryEvent>,
    opts: TelemetryOptions,
) -> Result<TelemetryRequest, Error> {
    let timestamp = opts.timestamp.unwrap_or_else(signing::now_unix);
    let nonce = opts.nonce.unwrap_or_else(crypto::generate_nonce);

    let signature = match (opts.signature, opts.private_key) {
        (Some(signature), _) => signature,
        (None, Some(private_key)) => {
            let input = TelemetrySignInput {
                agent_id,
                address,
                timestamp: Some(timestamp),
                nonce: Some(nonce.clone()),
                events: &events,
            };
            signing::sign_telemetry(&input, &private_key)?.signature
        }
        (None, None) => {
            return Err(Error::Validation(
                "either private_key or signature must be provided".into(),
            ))
        }
    };

    Ok(TelemetryRequest {
        agent_id: agent_id.to_string(),
        address: address.to_string(),
        ts: timestamp,
        nonce,
        events,
        signature,
    })
}

/// HTTP client for the ETHYS x402 API.
#[derive(Debug, Clone)]
pub struct EthysClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl EthysClient {
    /// Create a client from `config`.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self { config, http })
    }

    /// Create a client configured from `ETHYS_*` environment variables.
    pub fn from_env() -> Result<Self, Error> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Protocol
    // -----------------------------------------------------------------------

    /// Protocol information, pricing, and onboarding steps.
    ///
    /// `GET /info`
    pub async fn get_info(&self) -> Result<InfoResponse, Error> {
        let req = self.request(Method::GET, self.endpoint("/info")?, false);
        self.execute(req, "/info").await
    }

    // -----------------------------------------------------------------------
    // Onboarding
    // -----------------------------------------------------------------------

    /// Register an agent with a wallet signature.
    ///
    /// `POST /connect`
    pub async fn connect(&self, req: &ConnectRequest) -> Result<ConnectResponse, Error> {
        let builder = self
            .request(Method::POST, self.endpoint("/connect")?, false)
            .json(req);
        self.execute(builder, "/connect").await
    }

    /// Derive the address from `private_key`, sign the connect message, and connect.
    pub async fn connect_with_key(
        &self,
        private_key: &str,
        message: Option<&str>,
    ) -> Result<ConnectResponse, Error> {
        let address = crypto::address_from_private_key(private_key)?;
        let signed = signing::sign_connect_message(private_key, &address, message)?;
        self.connect(&ConnectRequest {
            address,
            signature: signed.signature,
            message: signed.message,
            token_contract: None,
            token_id: None,
        })
        .await
    }

    /// Verify the activation payment and activate the agent.
    ///
    /// `POST /verify-payment`
    pub async fn verify_payment(
        &self,
        agent_id: &str,
        tx_hash: &str,
    ) -> Result<VerifyPaymentResponse, Error> {
        let body = VerifyPaymentRequest {
            agent_id: agent_id.to_string(),
            tx_hash: tx_hash.to_string(),
        };
        let builder = self
            .request(Method::POST, self.endpoint("/verify-payment")?, false)
            .json(&body);
        self.execute(builder, "/verify-payment").await
    }

    // -----------------------------------------------------------------------
    // Telemetry
    // -----------------------------------------------------------------------

    /// Submit a wallet-signed telemetry batch.
    ///
    /// `POST /telemetry`
    pub async fn telemetry(
        &self,
        agent_id: &str,
        address: &str,
        events: Vec<TelemetryEvent>,
        opts: TelemetryOptions,
    ) -> Result<TelemetryResponse, Error> {
        let body = build_telemetry_request(agent_id, address, events, opts)?;
        let builder = self
            .request(Method::POST, self.endpoint("/telemetry")?, false)
            .json(&body);
        self.execute(builder, "/telemetry").await
    }

    // -----------------------------------------------------------------------
    // Discovery & trust
    // -----------------------------------------------------------------------

    /// Search agents by capabilities and trust score.
    ///
    /// `GET /discovery/search`
    pub async fn discovery_search(
        &self,
        query: &DiscoveryQuery,
    ) -> Result<DiscoverySearchResponse, Error> {
        let mut url = self.endpoint("/discovery/search")?;
        let pairs = query.to_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        let req = self.request(Method::GET, url, false);
        self.execute(req, "/discovery/search").await
    }

    /// Trust score for `agent_id`, or for the authenticated agent if `None`.
    ///
    /// `GET /trust/score`. Sends the API key when configured.
    pub async fn trust_score(&self, agent_id: Option<&str>) -> Result<TrustScoreResponse, Error> {
        let mut url = self.endpoint("/trust/score")?;
        if let Some(id) = agent_id {
            url.query_pairs_mut().append_pair("agentId", id);
        }
        let req = self.request(Method::GET, url, true);
        self.execute(req, "/trust/score").await
    }

    /// Submit a trust attestation about another agent.
    ///
    /// `POST /trust/attest`. Sends the API key when configured.
    pub async fn trust_attest(&self, req: &TrustAttestRequest) -> Result<JsonMap, Error> {
        let builder = self
            .request(Method::POST, self.endpoint("/trust/attest")?, true)
            .json(req);
        self.execute(builder, "/trust/attest").await
    }

    /// Submit an EIP-712 signed client review.
    ///
    /// `POST /reviews/submit`
    pub async fn reviews_submit(&self, req: &ReviewSubmitRequest) -> Result<JsonMap, Error> {
        let builder = self
            .request(Method::POST, self.endpoint("/reviews/submit")?, false)
            .json(req);
        self.execute(builder, "/reviews/submit").await
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        let raw = format!("{}{API_PREFIX}{path}", self.config.base_url());
        Url::parse(&raw).map_err(|e| Error::InvalidUrl(format!("{e}: {raw}")))
    }

    fn request(&self, method: Method, url: Url, use_auth: bool) -> RequestBuilder {
        let builder = self
            .http
            .request(method, url)
            .header(ACCEPT, "application/json");
        match self.config.api_key() {
            Some(key) if use_auth => builder.bearer_auth(key),
            _ => builder,
        }
    }

    /// Send the request and parse a successful JSON response or map the failure.
    async fn execute<T: DeserializeOwned>(&self, req: RequestBuilder, path: &str) -> Result<T, Error> {
        tracing::debug!(path, "sending x402 request");
        let resp = req.send().await.map_err(|e| {
            tracing::warn!(path, error = %e, "x402 request failed");
            Error::from(e)
        })?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            tracing::warn!(path, status = status.as_u16(), "x402 request rejected");
            return Err(Error::from_status(status.as_u16(), &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::Validation(format!("invalid JSON response: {e}")))
    }
}
