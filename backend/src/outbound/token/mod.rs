//! Token signing adapters.

mod jwt;

pub use jwt::{DEFAULT_ISSUER, DEFAULT_TOKEN_LIFETIME, JwtTokenService};
