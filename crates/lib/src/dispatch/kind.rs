//! Outbound notification kinds and the template each one renders.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which domain objects a notification needs besides the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    User,
    /// Needs an event; only ground-school events are sent.
    Event,
    Question,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationKind {
    UserDeleted,
    QuizCompleted,
    EventRsvp,
    EventUpcoming,
    EventStarted,
    QuestionAsked,
    EventRegister,
    EventUnregister,
    SettingsVerified,
    SettingsChanged,
    SettingsChangedResend,
    PasswordReset,
    LastMinuteRegistration,
    EventCompleted,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown notification kind: {0}")]
pub struct UnknownKind(pub String);

impl NotificationKind {
    pub const ALL: [NotificationKind; 14] = [
        NotificationKind::UserDeleted,
        NotificationKind::QuizCompleted,
        NotificationKind::EventRsvp,
        NotificationKind::EventUpcoming,
        NotificationKind::EventStarted,
        NotificationKind::QuestionAsked,
        NotificationKind::EventRegister,
        NotificationKind::EventUnregister,
        NotificationKind::SettingsVerified,
        NotificationKind::SettingsChanged,
        NotificationKind::SettingsChangedResend,
        NotificationKind::PasswordReset,
        NotificationKind::LastMinuteRegistration,
        NotificationKind::EventCompleted,
    ];

    /// Kebab-case name used in URLs and logs (e.g. "event-rsvp").
    pub fn name(self) -> &'static str {
        match self {
            NotificationKind::UserDeleted => "user-deleted",
            NotificationKind::QuizCompleted => "quiz-completed",
            NotificationKind::EventRsvp => "event-rsvp",
            NotificationKind::EventUpcoming => "event-upcoming",
            NotificationKind::EventStarted => "event-started",
            NotificationKind::QuestionAsked => "question-asked",
            NotificationKind::EventRegister => "event-register",
            NotificationKind::EventUnregister => "event-unregister",
            NotificationKind::SettingsVerified => "settings-verified",
            NotificationKind::SettingsChanged => "settings-changed",
            NotificationKind::SettingsChangedResend => "settings-changed-resend",
            NotificationKind::PasswordReset => "password-reset",
            NotificationKind::LastMinuteRegistration => "last-minute-registration",
            NotificationKind::EventCompleted => "event-completed",
        }
    }

    pub fn template_name(self) -> &'static str {
        match self {
            NotificationKind::UserDeleted => "user_delete",
            NotificationKind::QuizCompleted => "quiz_complete",
            NotificationKind::EventRsvp => "gs_event_rsvp",
            NotificationKind::EventUpcoming => "gs_event_upcoming",
            NotificationKind::EventStarted => "gs_event_start",
            NotificationKind::QuestionAsked => "question",
            NotificationKind::EventRegister => "gs_event_register",
            NotificationKind::EventUnregister => "gs_event_unregister",
            NotificationKind::SettingsVerified => "user_settings_verified",
            NotificationKind::SettingsChanged => "user_verify_settings",
            NotificationKind::SettingsChangedResend => "resend_header",
            NotificationKind::PasswordReset => "password_reset",
            NotificationKind::LastMinuteRegistration => "gs_event_last_min_registration",
            NotificationKind::EventCompleted => "gs_event_completed",
        }
    }

    pub fn scope(self) -> Scope {
        match self {
            NotificationKind::EventRsvp
            | NotificationKind::EventUpcoming
            | NotificationKind::EventStarted
            | NotificationKind::EventRegister
            | NotificationKind::EventUnregister
            | NotificationKind::LastMinuteRegistration
            | NotificationKind::EventCompleted => Scope::Event,
            NotificationKind::QuestionAsked => Scope::Question,
            _ => Scope::User,
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NotificationKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NotificationKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}
