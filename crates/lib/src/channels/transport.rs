//! Outbound SMS transport: the seam between the dispatcher and the provider.

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("sms transport not configured: {0}")]
    NotConfigured(&'static str),
    #[error("sms request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("sms provider error: {0}")]
    Api(String),
}

/// Sends a text message. One call, one attempt: implementations do not retry.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Provider id (e.g. "twilio").
    fn id(&self) -> &str;

    async fn send(&self, from: &str, to: &str, body: &str) -> Result<(), TransportError>;
}
