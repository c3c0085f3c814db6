//! secp256k1 key handling and hashing primitives.
//!
//! Private keys are 32 bytes of hex (with or without `0x`). Messages are
//! signed with EIP-191 personal-message signing, producing 65-byte `r || s || v`
//! signatures encoded as `0x` + 130 hex; recovery accepts `v` as 0/1, 27/28
//! or an EIP-155 value. Hashing is Keccak-256, and nonces are 32 random bytes
//! from a CSPRNG.

use alloy::primitives::{keccak256, Signature, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use rand::{CryptoRng, RngCore};

use crate::address::strip_hex_prefix;
use crate::error::Error;

/// Generate a new random secp256k1 keypair.
///
/// Returns `(private_key_hex, checksummed_address)`, the key `0x`-prefixed.
pub fn generate_keypair() -> (String, String) {
    let signer = PrivateKeySigner::random();
    let private_key = format!("0x{}", hex::encode(signer.credential().to_bytes()));
    (private_key, signer.address().to_checksum(None))
}

/// Parse a hex private key (with or without `0x`) into a local signer.
pub fn signer_from_private_key(private_key: &str) -> Result<PrivateKeySigner, Error> {
    let bytes = hex::decode(strip_hex_prefix(private_key.trim()))
        .map_err(|e| Error::Validation(format!("invalid private key encoding: {e}")))?;
    let bytes: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
        Error::Validation(format!("private key must be 32 bytes, got {}", v.len()))
    })?;
    PrivateKeySigner::from_bytes(&B256::from(bytes))
        .map_err(|e| Error::Validation(format!("invalid private key: {e}")))
}

/// Derive the checksummed address that controls a private key.
pub fn address_from_private_key(private_key: &str) -> Result<String, Error> {
    Ok(signer_from_private_key(private_key)?.address().to_checksum(None))
}

/// EIP-191 personal-sign `message` and return the `0x` + 130 hex signature.
pub fn personal_sign(signer: &PrivateKeySigner, message: &[u8]) -> Result<String, Error> {
    let signature = signer
        .sign_message_sync(message)
        .map_err(|e| Error::Signing(e.to_string()))?;
    Ok(format!("0x{}", hex::encode(signature.as_bytes())))
}

/// Recover the lowercase `0x` address that personal-signed `message`.
pub fn recover_personal_signer(message: &[u8], signature_hex: &str) -> Result<String, Error> {
    let bytes = hex::decode(strip_hex_prefix(signature_hex))
        .map_err(|e| Error::Validation(format!("invalid signature encoding: {e}")))?;
    let signature = Signature::from_raw(&bytes)
        .map_err(|e| Error::Validation(format!("invalid signature: {e}")))?;
    let recovered = signature
        .recover_address_from_msg(message)
        .map_err(|e| Error::Validation(format!("signature recovery failed: {e}")))?;
    Ok(format!("{recovered:#x}"))
}

/// Keccak-256 digest of `data`.
pub fn keccak256_bytes(data: &[u8]) -> [u8; 32] {
    keccak256(data).0
}

/// Keccak-256 digest of `data` as `0x` + 64 lowercase hex.
pub fn keccak256_hex(data: &[u8]) -> String {
    format!("0x{}", hex::encode(keccak256_bytes(data)))
}

/// Generate a random 32-byte nonce as `0x` + 64 hex, from the OS CSPRNG.
pub fn generate_nonce() -> String {
    generate_nonce_with(&mut rand::rngs::OsRng)
}

/// Generate a 32-byte nonce from the supplied cryptographically secure RNG.
pub fn generate_nonce_with<R: RngCore + CryptoRng + ?Sized>(rng: &mut R) -> String {
    let mut bytes = [0u8; 32];
    rng.fill_bytes(&mut bytes);
    format!("0x{}", hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    const KNOWN_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const KNOWN_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    #[test]
    fn test_known_key_address() {
        assert_eq!(address_from_private_key(KNOWN_KEY).unwrap(), KNOWN_ADDRESS);
        // prefix is optional
        assert_eq!(
            address_from_private_key(&KNOWN_KEY[2..]).unwrap(),
            KNOWN_ADDRESS
        );
    }

    #[test]
    fn test_generate_keypair() {
        let (key, address) = generate_keypair();
        assert_eq!(key.len(), 66);
        assert_eq!(address_from_private_key(&key).unwrap(), address);
    }

    #[test]
    fn test_rejects_bad_private_keys() {
        assert!(matches!(
            signer_from_private_key("0xzz"),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            signer_from_private_key("0x0102"),
            Err(Error::Validation(_))
        ));
        // zero is not a valid secp256k1 scalar
        assert!(matches!(
            signer_from_private_key(&format!("0x{}", "0".repeat(64))),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_personal_sign_recovers() {
        let signer = signer_from_private_key(KNOWN_KEY).unwrap();
        let sig = personal_sign(&signer, b"hello").unwrap();
        assert_eq!(sig.len(), 132);
        let recovered = recover_personal_signer(b"hello", &sig).unwrap();
        assert_eq!(recovered, KNOWN_ADDRESS.to_ascii_lowercase());
    }

    #[test]
    fn test_personal_sign_is_deterministic() {
        let signer = signer_from_private_key(KNOWN_KEY).unwrap();
        let a = personal_sign(&signer, b"same").unwrap();
        let b = personal_sign(&signer, b"same").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_keccak256_empty() {
        assert_eq!(
            keccak256_hex(b""),
            "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_nonce_shape() {
        let nonce = generate_nonce();
        assert_eq!(nonce.len(), 66);
        assert!(nonce.starts_with("0x"));
        assert!(nonce[2..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_nonce_from_seeded_rng() {
        let mut a = rand::rngs::StdRng::seed_from_u64(7);
        let mut b = rand::rngs::StdRng::seed_from_u64(7);
        assert_eq!(generate_nonce_with(&mut a), generate_nonce_with(&mut b));
        assert_ne!(generate_nonce_with(&mut a), generate_nonce());
    }
}
