//! Typed result of a dispatch operation.

use crate::channels::TransportError;
use crate::domain::EventKind;
use crate::template::TemplateError;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

#[derive(Debug)]
pub enum DispatchOutcome {
    Sent,
    Skipped(SkipReason),
    Failed(DispatchError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Notifications are turned off in config.
    Disabled,
    /// Event-scoped notification for an event kind that does not get one.
    NotApplicable(EventKind),
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("{0} could not be resolved")]
    Unresolved(&'static str),
    #[error("user {0} has no sms number")]
    NoDestination(i64),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl DispatchOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, DispatchOutcome::Sent)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, DispatchOutcome::Skipped(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, DispatchOutcome::Failed(_))
    }
}

impl From<DispatchError> for DispatchOutcome {
    fn from(e: DispatchError) -> Self {
        DispatchOutcome::Failed(e)
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Disabled => f.write_str("disabled"),
            SkipReason::NotApplicable(kind) => write!(f, "not applicable for {:?} events", kind),
        }
    }
}

/// `{"status": "sent"}`, `{"status": "skipped", "reason": ...}` or `{"status": "failed", "error": ...}`.
impl Serialize for DispatchOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match self {
            DispatchOutcome::Sent => map.serialize_entry("status", "sent")?,
            DispatchOutcome::Skipped(reason) => {
                map.serialize_entry("status", "skipped")?;
                map.serialize_entry("reason", &reason.to_string())?;
            }
            DispatchOutcome::Failed(error) => {
                map.serialize_entry("status", "failed")?;
                map.serialize_entry("error", &error.to_string())?;
            }
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_status_and_detail() {
        assert_eq!(
            serde_json::to_value(DispatchOutcome::Sent).unwrap(),
            json!({ "status": "sent" })
        );
        assert_eq!(
            serde_json::to_value(DispatchOutcome::Skipped(SkipReason::NotApplicable(EventKind::Social)))
                .unwrap(),
            json!({ "status": "skipped", "reason": "not applicable for Social events" })
        );
        assert_eq!(
            serde_json::to_value(DispatchOutcome::from(DispatchError::Unresolved("event"))).unwrap(),
            json!({ "status": "failed", "error": "event could not be resolved" })
        );
    }

    #[test]
    fn template_error_passes_through_display() {
        let e = DispatchError::from(TemplateError::NotFound("x".to_string()));
        assert_eq!(e.to_string(), "template not found: x");
    }
}
