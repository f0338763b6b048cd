//! JWT implementation of the token verifier.
//!
//! Verifies HS256 tokens minted by the external account service against
//! the shared secret. Verification is pure: no store access, no I/O.

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::domain::{CredentialRejection, TokenVerifier, UserId};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Subject user id
    user_id: i64,
    /// Expiration time, seconds since epoch
    exp: usize,
}

pub struct JwtTokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtTokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }
}

impl TokenVerifier for JwtTokenVerifier {
    fn verify(&self, credential: Option<&str>) -> Result<UserId, CredentialRejection> {
        let token = credential
            .filter(|t| !t.is_empty())
            .ok_or(CredentialRejection::Missing)?;

        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Ok(UserId::new(data.claims.user_id)),
            Err(e) => Err(match e.kind() {
                ErrorKind::ExpiredSignature => CredentialRejection::Expired,
                ErrorKind::InvalidSignature => CredentialRejection::InvalidSignature,
                _ => CredentialRejection::Malformed,
            }),
        }
    }
}

/// Mint a token the verifier accepts. The account service owns issuance in
/// production; this exists for local development and tests.
pub fn issue_token(
    secret: &str,
    user_id: UserId,
    ttl: std::time::Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let exp = (chrono::Utc::now().timestamp() as usize).saturating_add(ttl.as_secs() as usize);
    let claims = Claims {
        user_id: user_id.value(),
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}
