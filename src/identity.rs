//! Agent identity descriptors and the `agentIdKey` fingerprint.
//!
//! An agent is either a plain EOA or an ERC-6551 token-bound account. Both
//! are described by an [`AgentIdentity`], which encodes to a fixed 73-byte
//! layout:
//!
//! ```text
//! version (1) | address (20) | tokenContract (20, or zeros) | tokenId (32, UTF-8 right-padded, or zeros)
//! ```
//!
//! The `agentIdKey` is the Keccak-256 of that buffer.

use std::fmt;

use alloy::primitives::Address;

use crate::address::validate_address;
use crate::crypto;
use crate::error::Error;

/// Current identity layout version.
pub const IDENTITY_VERSION: u8 = 1;

/// Width of the token id field in the encoded identity.
pub const TOKEN_ID_LEN: usize = 32;

/// Total encoded identity length in bytes.
pub const ENCODED_IDENTITY_LEN: usize = 1 + 20 + 20 + TOKEN_ID_LEN;

/// Who an agent is: an EOA, or a token-bound account with its NFT.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AgentIdentity {
    version: u8,
    address: Address,
    token_contract: Option<Address>,
    token_id: Option<String>,
}

impl AgentIdentity {
    /// Build an identity, validating every address.
    ///
    /// Empty strings for `token_contract` / `token_id` are treated as absent.
    /// A contract without an id (or the reverse) is accepted; the missing
    /// region encodes as zeros.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if an address is not `0x` + 40 hex chars,
    /// or if `token_id` is longer than 32 bytes of UTF-8.
    pub fn new(
        address: &str,
        token_contract: Option<&str>,
        token_id: Option<&str>,
    ) -> Result<Self, Error> {
        let address = parse_address(address)
            .ok_or_else(|| Error::Validation(format!("invalid address format: {address}")))?;

        let token_contract = match token_contract.filter(|s| !s.is_empty()) {
            Some(raw) => Some(parse_address(raw).ok_or_else(|| {
                Error::Validation(format!("invalid token contract address format: {raw}"))
            })?),
            None => None,
        };

        let token_id = token_id.filter(|s| !s.is_empty());
        if let Some(id) = token_id {
            if id.len() > TOKEN_ID_LEN {
                return Err(Error::Validation(format!(
                    "token id exceeds {TOKEN_ID_LEN} bytes: {} bytes",
                    id.len()
                )));
            }
        }

        Ok(Self {
            version: IDENTITY_VERSION,
            address,
            token_contract,
            token_id: token_id.map(str::to_string),
        })
    }

    /// Identity for an externally-owned account.
    pub fn eoa(address: &str) -> Result<Self, Error> {
        Self::new(address, None, None)
    }

    /// Identity for an ERC-6551 token-bound account.
    pub fn token_bound(address: &str, token_contract: &str, token_id: &str) -> Result<Self, Error> {
        Self::new(address, Some(token_contract), Some(token_id))
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    /// The account address as lowercase `0x` hex.
    pub fn address(&self) -> String {
        format!("{:#x}", self.address)
    }

    /// The token contract as lowercase `0x` hex, if token-bound.
    pub fn token_contract(&self) -> Option<String> {
        self.token_contract.map(|c| format!("{c:#x}"))
    }

    pub fn token_id(&self) -> Option<&str> {
        self.token_id.as_deref()
    }

    /// Whether this identity carries token-bound account fields.
    pub fn is_token_bound(&self) -> bool {
        self.token_contract.is_some() || self.token_id.is_some()
    }

    /// Encode into the fixed 73-byte layout hashed by [`Self::agent_id_key`].
    pub fn encode(&self) -> [u8; ENCODED_IDENTITY_LEN] {
        let mut buf = [0u8; ENCODED_IDENTITY_LEN];
        buf[0] = self.version;
        buf[1..21].copy_from_slice(self.address.as_slice());
        if let Some(contract) = &self.token_contract {
            buf[21..41].copy_from_slice(contract.as_slice());
        }
        if let Some(id) = &self.token_id {
            let bytes = id.as_bytes();
            buf[41..41 + bytes.len()].copy_from_slice(bytes);
        }
        buf
    }

    /// Derive the `agentIdKey`: Keccak-256 over [`Self::encode`].
    pub fn agent_id_key(&self) -> AgentIdKey {
        AgentIdKey(crypto::keccak256_bytes(&self.encode()))
    }
}

fn parse_address(raw: &str) -> Option<Address> {
    if !validate_address(raw) {
        return None;
    }
    raw.parse().ok()
}

/// 32-byte fingerprint of an [`AgentIdentity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AgentIdKey([u8; 32]);

impl AgentIdKey {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for AgentIdKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Derive the `agentIdKey` string (`0x` + 64 hex) for an identity.
pub fn derive_agent_id_key(identity: &AgentIdentity) -> String {
    identity.agent_id_key().to_string()
}

/// Build an identity from its parts and return its `agentIdKey` string.
pub fn get_agent_id_key(
    address: &str,
    token_contract: Option<&str>,
    token_id: Option<&str>,
) -> Result<String, Error> {
    Ok(derive_agent_id_key(&AgentIdentity::new(
        address,
        token_contract,
        token_id,
    )?))
}
