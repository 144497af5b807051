//! Authentication module
//!
//! Wallet challenge-response and password authentication, both ending in a
//! signed bearer token.

mod address;
pub mod crypto;
pub mod jwt;
pub mod password;
mod service;

pub use address::{AddressError, WalletAddress};
pub use crypto::{
    address_from_public_key, keccak256, personal_message_digest, recover_address,
    verify_wallet_signature, SignatureError,
};
pub use jwt::{AuthMethod, Claims, IssuedToken, JwtError, TokenIssuer};
pub use service::{AuthError, AuthService};
