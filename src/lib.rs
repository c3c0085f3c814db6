//! # ETHYS x402 Rust SDK
//!
//! Wallet-authenticated onboarding, telemetry, trust and discovery for
//! autonomous agents on the [ETHYS](https://402.ethys.dev) x402 protocol.
//!
//! ## Identity key
//!
//! ```text
//! agentIdKey = keccak256(version:u8 || address:20 || tokenContract:20 || tokenId:32)
//! ```
//!
//! EOA identities zero-fill the token fields; ERC-6551 token-bound accounts
//! carry the NFT contract and id.
//!
//! ## Quick Start
//!
//! ```rust
//! use ethys402::{crypto, identity::AgentIdentity, signing};
//!
//! // Generate a wallet
//! let (private_key, address) = crypto::generate_keypair();
//!
//! // Fingerprint the agent
//! let key = AgentIdentity::eoa(&address).unwrap().agent_id_key();
//! assert_eq!(key.to_string().len(), 66);
//!
//! // Sign the connect message
//! let signed = signing::sign_connect_message(&private_key, &address, None).unwrap();
//! assert_eq!(signed.message, "Connect to ETHYS");
//!
//! // Verify
//! assert!(signing::verify_signature(&address, &signed.message, &signed.signature));
//! ```

pub mod address;
pub mod config;
pub mod crypto;
pub mod error;
pub mod identity;
pub mod signing;
pub mod types;

#[cfg(feature = "client")]
pub mod blocking;

#[cfg(feature = "client")]
pub mod client;

// Re-export primary types at the crate root.
pub use error::Error;
pub use identity::{AgentIdKey, AgentIdentity};
pub use signing::SignedMessage;
pub use types::*;

#[cfg(feature = "client")]
pub use blocking::BlockingEthysClient;
#[cfg(feature = "client")]
pub use client::{EthysClient, TelemetryOptions};
