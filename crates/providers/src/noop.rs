//! A provider used when no API key is configured.

use async_trait::async_trait;
use chaty_core::error::GenerativeError;
use chaty_core::provider::Generative;

/// Always reports itself as not configured.
///
/// Wiring this in keeps the engine's fallback path uniform: FAQ lookups
/// still work, and anything that would have gone to the generative model
/// gets the apology reply instead.
pub struct NoopGenerative;

#[async_trait]
impl Generative for NoopGenerative {
    fn name(&self) -> &str {
        "noop"
    }

    async fn complete(&self, _query: &str) -> Result<String, GenerativeError> {
        Err(GenerativeError::NotConfigured(
            "no generative API key configured".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn always_not_configured() {
        let provider = NoopGenerative;
        let err = provider.complete("anything").await.unwrap_err();
        assert!(matches!(err, GenerativeError::NotConfigured(_)));
    }
}
