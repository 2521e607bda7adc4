//! User replies: where validated inbound messages go after normalization.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Channel a user response arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum ResponseChannel {
    Sms,
}

/// Response-processing collaborator. Receives the sender with any `+1` prefix stripped.
#[async_trait]
pub trait ResponseHandler: Send + Sync {
    async fn process_user_response(&self, sender: Option<&str>, body: &str, channel: ResponseChannel);
}

/// Records replies in the log and nothing else.
#[derive(Debug, Default)]
pub struct LoggingResponseHandler;

#[async_trait]
impl ResponseHandler for LoggingResponseHandler {
    async fn process_user_response(&self, sender: Option<&str>, body: &str, channel: ResponseChannel) {
        log::info!(
            "user response via {:?} from {}: {}",
            channel,
            sender.unwrap_or("<unknown>"),
            body
        );
    }
}
