//! Credential verification interface.

use super::error::CredentialRejection;
use super::value_object::UserId;

/// Validates the opaque credential presented at connection time.
///
/// Must be a pure check against a shared secret: no I/O, no store access.
/// A rejection terminates the connection-establishment attempt before the
/// registry ever records the socket.
#[cfg_attr(test, mockall::automock)]
pub trait TokenVerifier: Send + Sync {
    fn verify<'a>(&self, credential: Option<&'a str>) -> Result<UserId, CredentialRejection>;
}
