use chrono::{DateTime, SecondsFormat, Utc};
use rand::RngCore;

use crate::auth::WalletAddress;

/// 32 bytes from the OS-seeded CSPRNG, hex encoded
pub fn generate_nonce() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Human-readable text for the wallet to sign
pub fn generate_challenge_message(address: &WalletAddress, issued_at: DateTime<Utc>) -> String {
    format!(
        "Sign this message to authenticate with Car Inventory.\n\nAddress: {}\nNonce: {}\nIssued At: {}",
        address,
        generate_nonce(),
        issued_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}
