//! Wallet signature verification
//!
//! Verifies secp256k1 recoverable ECDSA signatures produced by Ethereum
//! wallets. The signer's public key is recovered from the signature and the
//! message digest, turned into an address, and compared with the address the
//! client claims to control.

use std::sync::LazyLock;

use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, PublicKey, Secp256k1, VerifyOnly};
use thiserror::Error;
use tiny_keccak::{Hasher, Keccak};

use super::address::{strip_hex_prefix, WalletAddress};

static SECP256K1: LazyLock<Secp256k1<VerifyOnly>> = LazyLock::new(Secp256k1::verification_only);

const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Errors that can occur while recovering a signer
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Invalid signature hex: {0}")]
    InvalidHex(String),

    #[error("Invalid signature length: expected 64 or 65 bytes, got {0}")]
    InvalidLength(usize),

    #[error("Invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    #[error("Public key recovery failed: {0}")]
    Recovery(String),
}

/// Signature split into its compact `r || s` part and recovery id
#[derive(Debug, Clone, Copy)]
struct SignatureParts {
    compact: [u8; 64],
    recovery_id: u8,
}

/// Keccak-256 digest
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// EIP-191 digest of a `personal_sign` message
pub fn personal_message_digest(message: &str) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(PERSONAL_MESSAGE_PREFIX.as_bytes());
    hasher.update(message.len().to_string().as_bytes());
    hasher.update(message.as_bytes());
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// Derive the address controlled by a public key: the last 20 bytes of the
/// Keccak-256 hash of the uncompressed key without its `0x04` tag.
pub fn address_from_public_key(public_key: &PublicKey) -> WalletAddress {
    let uncompressed = public_key.serialize_uncompressed();
    let hash = keccak256(&uncompressed[1..]);

    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    WalletAddress::from_bytes(&address)
}

/// Recover the address that produced `signature` over `digest`
///
/// # Arguments
/// * `signature` - Hex signature, `0x` prefix optional. Either 65 bytes
///   (`r || s || v`) or the 64-byte EIP-2098 compact form.
/// * `digest` - The 32-byte message hash that was signed
pub fn recover_address(signature: &str, digest: &[u8; 32]) -> Result<WalletAddress, SignatureError> {
    let parts = parse_signature(signature)?;
    recover_with_parts(&parts, digest)
}

/// Check that `signature` over `message` was produced by `claimed_address`
///
/// Both the EIP-191 personal message digest and the plain Keccak-256 digest
/// of the message are accepted. Malformed input of any kind yields `false`.
pub fn verify_wallet_signature(signature: &str, claimed_address: &str, message: &str) -> bool {
    let claimed = match WalletAddress::parse(claimed_address) {
        Ok(address) => address,
        Err(e) => {
            tracing::debug!(error = %e, "Rejecting signature for malformed address");
            return false;
        }
    };

    let parts = match parse_signature(signature) {
        Ok(parts) => parts,
        Err(e) => {
            tracing::debug!(error = %e, address = %claimed, "Rejecting malformed signature");
            return false;
        }
    };

    let digests = [personal_message_digest(message), keccak256(message.as_bytes())];
    for digest in &digests {
        match recover_with_parts(&parts, digest) {
            Ok(recovered) if recovered == claimed => return true,
            Ok(recovered) => {
                tracing::debug!(recovered = %recovered, claimed = %claimed, "Recovered address mismatch");
            }
            Err(e) => {
                tracing::debug!(error = %e, claimed = %claimed, "Signer recovery failed");
            }
        }
    }

    false
}

fn parse_signature(signature: &str) -> Result<SignatureParts, SignatureError> {
    let bytes = hex::decode(strip_hex_prefix(signature.trim()))
        .map_err(|e| SignatureError::InvalidHex(e.to_string()))?;

    let mut compact = [0u8; 64];
    match bytes.len() {
        65 => {
            compact.copy_from_slice(&bytes[..64]);
            let recovery_id = match bytes[64] {
                v @ (0 | 1) => v,
                v @ (27 | 28) => v - 27,
                v => return Err(SignatureError::InvalidRecoveryId(v)),
            };
            Ok(SignatureParts {
                compact,
                recovery_id,
            })
        }
        64 => {
            // EIP-2098: the y parity lives in the top bit of s
            compact.copy_from_slice(&bytes);
            let recovery_id = compact[32] >> 7;
            compact[32] &= 0x7f;
            Ok(SignatureParts {
                compact,
                recovery_id,
            })
        }
        n => Err(SignatureError::InvalidLength(n)),
    }
}

fn recover_with_parts(
    parts: &SignatureParts,
    digest: &[u8; 32],
) -> Result<WalletAddress, SignatureError> {
    let recovery_id = RecoveryId::try_from(i32::from(parts.recovery_id))
        .map_err(|_| SignatureError::InvalidRecoveryId(parts.recovery_id))?;
    let signature = RecoverableSignature::from_compact(&parts.compact, recovery_id)
        .map_err(|e| SignatureError::Recovery(e.to_string()))?;

    let message = Message::from_digest(*digest);
    let public_key = SECP256K1
        .recover_ecdsa(&message, &signature)
        .map_err(|e| SignatureError::Recovery(e.to_string()))?;

    Ok(address_from_public_key(&public_key))
}
