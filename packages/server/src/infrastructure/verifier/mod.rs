//! Credential verifier implementations.

mod jwt;

pub use jwt::{JwtTokenVerifier, issue_token};
