//! OAuth 1.0 (RFC 5849) pieces needed for the three-legged flow: RSA-SHA1 request
//! signing and the request/access token exchanges.

pub mod signer;
pub mod token;

pub use signer::{Consumer, RsaSigningKey};
pub use token::{RequestToken, TokenClient, TokenCredentials};
