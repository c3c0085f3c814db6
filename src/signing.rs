//! Canonical message construction, signing, and verification for the two
//! wallet-signed protocol actions.
//!
//! # Messages
//!
//! - **connect**: `"Connect to ETHYS"` or caller-supplied text
//! - **telemetry**: a fixed six-line template the server rebuilds to verify
//!
//! Signatures use EIP-191 personal-message signing over the UTF-8 message
//! bytes and are encoded as `0x` + 130 hex (`r || s || v`).

use std::time::{SystemTime, UNIX_EPOCH};

use crate::address::{addresses_equal, validate_address, validate_signature_format};
use crate::crypto;
use crate::error::Error;
use crate::types::TelemetryEvent;

/// Default text signed by the connect flow.
pub const CONNECT_MESSAGE: &str = "Connect to ETHYS";

/// First line of every telemetry message.
pub const TELEMETRY_HEADER: &str = "ETHYS Telemetry";

/// A message and the signature over it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedMessage {
    pub message: String,
    /// `0x` + 130 hex.
    pub signature: String,
}

// ---------------------------------------------------------------------------
// connect
// ---------------------------------------------------------------------------

/// Build the connect message: `custom` verbatim, else [`CONNECT_MESSAGE`].
pub fn build_connect_message(custom: Option<&str>) -> String {
    custom.unwrap_or(CONNECT_MESSAGE).to_string()
}

/// Sign the connect message for `address`.
pub fn sign_connect_message(
    private_key: &str,
    address: &str,
    custom: Option<&str>,
) -> Result<SignedMessage, Error> {
    sign_message(private_key, address, &build_connect_message(custom))
}

// ---------------------------------------------------------------------------
// telemetry
// ---------------------------------------------------------------------------

/// Input parameters for signing a telemetry batch.
#[derive(Debug, Clone)]
pub struct TelemetrySignInput<'a> {
    pub agent_id: &'a str,
    /// Wallet address; must match the signing key.
    pub address: &'a str,
    /// Unix timestamp in seconds. If `None`, the current time is used.
    pub timestamp: Option<u64>,
    /// `0x` + 64 hex nonce. If `None`, a random one is generated.
    pub nonce: Option<String>,
    /// The batch being submitted; only its length is signed.
    pub events: &'a [TelemetryEvent],
}

/// The result of signing a telemetry batch.
#[derive(Debug, Clone)]
pub struct TelemetrySignOutput {
    pub timestamp: u64,
    pub nonce: String,
    pub signature: String,
}

/// Build the canonical telemetry message.
///
/// Format:
/// ```text
/// ETHYS Telemetry\nAgent: {AGENT_ID}\nAddress: {ADDRESS}\nTimestamp: {TS}\nNonce: {NONCE}\nEvents: {COUNT}
/// ```
///
/// `COUNT` is always `events.len()`, so the signed count cannot drift from
/// the submitted payload.
pub fn build_telemetry_message<E>(
    agent_id: &str,
    address: &str,
    timestamp: u64,
    nonce: &str,
    events: &[E],
) -> String {
    format!(
        "{TELEMETRY_HEADER}\nAgent: {}\nAddress: {}\nTimestamp: {}\nNonce: {}\nEvents: {}",
        agent_id,
        address,
        timestamp,
        nonce,
        events.len(),
    )
}

/// Sign a telemetry batch.
pub fn sign_telemetry(
    input: &TelemetrySignInput,
    private_key: &str,
) -> Result<TelemetrySignOutput, Error> {
    let timestamp = input.timestamp.unwrap_or_else(now_unix);
    let nonce = input.nonce.clone().unwrap_or_else(crypto::generate_nonce);

    let message =
        build_telemetry_message(input.agent_id, input.address, timestamp, &nonce, input.events);
    let signed = sign_message(private_key, input.address, &message)?;

    Ok(TelemetrySignOutput {
        timestamp,
        nonce,
        signature: signed.signature,
    })
}

// ---------------------------------------------------------------------------
// sign / verify
// ---------------------------------------------------------------------------

/// Personal-sign `message` with `private_key`, which must control `address`.
///
/// # Errors
///
/// - [`Error::Validation`]: `address` or `private_key` is malformed.
/// - [`Error::Auth`]: the key's address is not `address`.
pub fn sign_message(private_key: &str, address: &str, message: &str) -> Result<SignedMessage, Error> {
    if !validate_address(address) {
        return Err(Error::Validation(format!("invalid address format: {address}")));
    }

    let signer = crypto::signer_from_private_key(private_key)?;
    let signer_address = format!("{:#x}", signer.address());
    if !addresses_equal(&signer_address, address) {
        return Err(Error::Auth("address does not match private key".into()));
    }

    tracing::debug!(address = %signer_address, len = message.len(), "signing message");
    let signature = crypto::personal_sign(&signer, message.as_bytes())?;

    Ok(SignedMessage {
        message: message.to_string(),
        signature,
    })
}

/// Check that `signature` over `message` was produced by `address`.
///
/// Never errors: malformed input and recovery failures all yield `false`.
pub fn verify_signature(address: &str, message: &str, signature: &str) -> bool {
    if !validate_address(address) || !validate_signature_format(signature) {
        return false;
    }
    match crypto::recover_personal_signer(message.as_bytes(), signature) {
        Ok(recovered) => addresses_equal(&recovered, address),
        Err(_) => false,
    }
}

/// Get the current Unix timestamp in seconds.
pub fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
