//! External text generation interface.

use async_trait::async_trait;

use super::error::GenerationError;

/// The external generation call consumed by the assistant coordinator and
/// the memory extractor.
///
/// Latency is unbounded from the caller's perspective; callers apply their
/// own timeout and must never let a failure propagate past their boundary.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, GenerationError>;
}
