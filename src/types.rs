//! Request and response bodies for the x402 API.
//!
//! Sub-objects whose shape the server does not pin down (pricing, network,
//! onboarding, trust scores, discovered agents) are kept as open JSON maps.

use serde::{Deserialize, Serialize};

/// Open, string-keyed JSON object.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

/// Protocol metadata from `GET /info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoResponse {
    pub protocol: String,
    pub name: String,
    pub description: String,
    pub version: String,
    pub onboarding: JsonMap,
    pub pricing: JsonMap,
    pub network: JsonMap,
    pub endpoints: JsonMap,
    #[serde(default)]
    pub features: Vec<String>,
}

impl InfoResponse {
    /// Typed view of `pricing`, if it has the expected fields.
    pub fn pricing_info(&self) -> Option<PricingInfo> {
        serde_json::from_value(serde_json::Value::Object(self.pricing.clone())).ok()
    }

    /// The `onboarding.steps` list; malformed entries are skipped.
    pub fn onboarding_steps(&self) -> Vec<OnboardingStep> {
        self.onboarding
            .get("steps")
            .and_then(|v| v.as_array())
            .map(|steps| {
                steps
                    .iter()
                    .filter_map(|s| serde_json::from_value(s.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// One step of the onboarding flow advertised by `/info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardingStep {
    pub step: u32,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub required: Option<Vec<String>>,
}

/// Activation pricing advertised by `/info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingInfo {
    pub token: JsonMap,
    pub activation_fee: JsonMap,
    #[serde(default)]
    pub current_price_usd: Option<f64>,
    #[serde(default)]
    pub token_amount: Option<String>,
}

/// Request body for `POST /connect`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    pub address: String,
    /// `0x` + 130 hex signature over `message`.
    pub signature: String,
    pub message: String,
    /// ERC-721 contract (ERC-6551 accounts only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_contract: Option<String>,
    /// ERC-721 token id (ERC-6551 accounts only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
}

/// Response from `POST /connect`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectResponse {
    pub success: bool,
    pub agent_id: String,
    #[serde(default)]
    pub onboarding: Option<JsonMap>,
    #[serde(default)]
    pub policy: Option<JsonMap>,
    #[serde(default)]
    pub agent_id_key: Option<String>,
}

/// Request body for `POST /verify-payment`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    pub agent_id: String,
    pub tx_hash: String,
}

/// Response from `POST /verify-payment`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub agent_id: String,
    /// Issued once the agent is activated.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub activated: bool,
}

/// A single telemetry event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub timestamp: u64,
    #[serde(default)]
    pub data: JsonMap,
}

impl TelemetryEvent {
    pub fn new(event_type: impl Into<String>, timestamp: u64) -> Self {
        Self {
            event_type: event_type.into(),
            timestamp,
            data: JsonMap::new(),
        }
    }

    /// Attach a data field.
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

/// Request body for `POST /telemetry` (wallet-signed).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryRequest {
    pub agent_id: String,
    pub address: String,
    /// Unix timestamp that was signed.
    pub ts: u64,
    /// `0x` + 64 hex nonce that was signed.
    pub nonce: String,
    pub events: Vec<TelemetryEvent>,
    pub signature: String,
}

/// Response from `POST /telemetry`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryResponse {
    pub success: bool,
    #[serde(default)]
    pub recorded: u64,
    #[serde(default)]
    pub agent_id: Option<String>,
}

/// Response from `GET /trust/score`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustScoreResponse {
    pub success: bool,
    pub agent_id: String,
    pub trust_score: JsonMap,
    #[serde(default)]
    pub updated_at: Option<i64>,
}

/// Request body for `POST /trust/attest`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustAttestRequest {
    pub target_agent_id: String,
    pub interaction_type: String,
    /// 1–5.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Request body for `POST /reviews/submit` (EIP-712 signed by the reviewer).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSubmitRequest {
    pub target_agent_id: String,
    pub rating: u8,
    pub review_text: String,
    pub signature: String,
    /// The EIP-712 typed data that was signed.
    #[serde(rename = "eip712")]
    pub eip712_data: serde_json::Value,
}

/// Filters for `GET /discovery/search`.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryQuery {
    /// Comma-separated tags.
    pub tags: Option<String>,
    pub min_trust: Option<u32>,
    /// Comma-separated service types.
    pub service_types: Option<String>,
}

impl DiscoveryQuery {
    /// Query parameters in wire form, skipping unset and empty filters.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(tags) = self.tags.as_deref().filter(|t| !t.is_empty()) {
            pairs.push(("tags", tags.to_string()));
        }
        if let Some(min) = self.min_trust {
            pairs.push(("minTrust", min.to_string()));
        }
        if let Some(types) = self.service_types.as_deref().filter(|t| !t.is_empty()) {
            pairs.push(("serviceTypes", types.to_string()));
        }
        pairs
    }
}

/// Response from `GET /discovery/search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoverySearchResponse {
    pub success: bool,
    #[serde(default)]
    pub agents: Vec<JsonMap>,
    #[serde(default)]
    pub total: Option<u64>,
}
