//! Notification dispatcher: one operation per outbound notification kind, plus the inbound
//! webhook path.
//!
//! Outbound: enablement gate -> resolve user/event/question -> ground-school gate (event
//! kinds) -> template context -> render -> send. Every operation returns a
//! [`DispatchOutcome`]; failures are logged and never returned as errors.
//!
//! Inbound: enablement gate -> decode -> validate body -> strip `+1` from the sender ->
//! hand off to the [`ResponseHandler`]. The webhook acknowledgment is always empty.

mod kind;
mod outcome;

pub use kind::{NotificationKind, Scope, UnknownKind};
pub use outcome::{DispatchError, DispatchOutcome, SkipReason};

use crate::channels::{InboundMessage, Transport};
use crate::config::{self, Config};
use crate::directory::Directory;
use crate::domain::{Event, EventKind, NotificationTrigger, Question, User};
use crate::phone::strip_country_code;
use crate::responses::{ResponseChannel, ResponseHandler};
use crate::template::{build_context, Renderer, TemplateContext};
use crate::validation::ResponseValidator;
use serde_json::json;
use std::sync::Arc;

/// Read-only settings injected at construction.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    /// Global switch; when false nothing is rendered, sent, or forwarded.
    pub enabled: bool,
    pub from_address: String,
    pub app_name: String,
    pub site_url: Option<String>,
}

impl DispatchSettings {
    pub fn from_config(config: &Config) -> Self {
        let from_address = config::resolve_from_address(config).unwrap_or_default();
        if config.sms.enabled && from_address.is_empty() {
            log::warn!("sms enabled but no from address configured; sends will be rejected by the provider");
        }
        Self {
            enabled: config.sms.enabled,
            from_address,
            app_name: config.app.name.clone(),
            site_url: config.app.site_url.clone(),
        }
    }
}

/// Ad hoc values some notifications add to the template context.
#[derive(Debug, Clone, Default)]
pub struct Extras {
    /// The user's reply that was not understood (settings-changed-resend).
    pub response: Option<String>,
    /// The prompt being resent (settings-changed-resend).
    pub original_message: Option<String>,
}

/// A fully specified outbound send, built and consumed within one dispatch call.
#[derive(Debug, Clone)]
pub struct NotificationRequest {
    pub template_name: &'static str,
    pub context: TemplateContext,
    pub from_address: String,
    pub to_address: String,
}

pub struct Dispatcher {
    settings: DispatchSettings,
    validator: ResponseValidator,
    directory: Arc<dyn Directory>,
    renderer: Arc<dyn Renderer>,
    transport: Arc<dyn Transport>,
    responses: Arc<dyn ResponseHandler>,
}

impl Dispatcher {
    pub fn new(
        settings: DispatchSettings,
        validator: ResponseValidator,
        directory: Arc<dyn Directory>,
        renderer: Arc<dyn Renderer>,
        transport: Arc<dyn Transport>,
        responses: Arc<dyn ResponseHandler>,
    ) -> Self {
        Self {
            settings,
            validator,
            directory,
            renderer,
            transport,
            responses,
        }
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    /// Run the outbound protocol for `kind`.
    pub async fn dispatch(
        &self,
        kind: NotificationKind,
        trigger: &NotificationTrigger,
        extras: &Extras,
    ) -> DispatchOutcome {
        if !self.settings.enabled {
            log::debug!("{}: notifications disabled, skipping", kind);
            return DispatchOutcome::Skipped(SkipReason::Disabled);
        }
        let request = match self.build_request(kind, trigger, extras).await {
            Ok(r) => r,
            Err(DispatchOutcome::Skipped(reason)) => {
                log::debug!("{}: skipped ({})", kind, reason);
                return DispatchOutcome::Skipped(reason);
            }
            Err(outcome) => return self.log_failure(kind, outcome),
        };
        match self.deliver(request).await {
            Ok(()) => DispatchOutcome::Sent,
            Err(e) => self.log_failure(kind, DispatchOutcome::Failed(e)),
        }
    }

    fn log_failure(&self, kind: NotificationKind, outcome: DispatchOutcome) -> DispatchOutcome {
        if let DispatchOutcome::Failed(ref e) = outcome {
            log::warn!("{}: {}", kind, e);
        }
        outcome
    }

    async fn build_request(
        &self,
        kind: NotificationKind,
        trigger: &NotificationTrigger,
        extras: &Extras,
    ) -> Result<NotificationRequest, DispatchOutcome> {
        let user = self.user(trigger).await?;
        let (event, question) = match kind.scope() {
            Scope::User => (None, None),
            Scope::Event => {
                let event = self.event(trigger).await?;
                if event.event_type != EventKind::GroundSchool {
                    return Err(DispatchOutcome::Skipped(SkipReason::NotApplicable(
                        event.event_type,
                    )));
                }
                (Some(event), None)
            }
            Scope::Question => (None, Some(self.question(trigger).await?)),
        };
        let to_address = user
            .sms
            .clone()
            .filter(|s| !s.trim().is_empty())
            .ok_or(DispatchError::NoDestination(user.id))?;

        let mut context = build_context(&user, event.as_ref(), question.as_ref(), &self.settings);
        match kind {
            NotificationKind::PasswordReset => {
                context.insert("code".to_string(), json!(user.code));
            }
            NotificationKind::SettingsChangedResend => {
                context.insert("response".to_string(), json!(extras.response));
                context.insert("original_message".to_string(), json!(extras.original_message));
            }
            _ => {}
        }
        Ok(NotificationRequest {
            template_name: kind.template_name(),
            context,
            from_address: self.settings.from_address.clone(),
            to_address,
        })
    }

    async fn user(&self, trigger: &NotificationTrigger) -> Result<User, DispatchError> {
        let Some(id) = trigger.user_id else {
            return Err(DispatchError::Unresolved("user"));
        };
        self.directory
            .resolve_user(id)
            .await
            .ok_or(DispatchError::Unresolved("user"))
    }

    async fn event(&self, trigger: &NotificationTrigger) -> Result<Event, DispatchError> {
        let Some(id) = trigger.event_id else {
            return Err(DispatchError::Unresolved("event"));
        };
        self.directory
            .resolve_event(id)
            .await
            .ok_or(DispatchError::Unresolved("event"))
    }

    async fn question(&self, trigger: &NotificationTrigger) -> Result<Question, DispatchError> {
        let Some(id) = trigger.question_id else {
            return Err(DispatchError::Unresolved("question"));
        };
        self.directory
            .resolve_question(id)
            .await
            .ok_or(DispatchError::Unresolved("question"))
    }

    async fn deliver(&self, request: NotificationRequest) -> Result<(), DispatchError> {
        let body = self.renderer.render(request.template_name, &request.context)?;
        log::info!(
            "sending {} via {}: from [{}] to [{}] body [{}]",
            request.template_name,
            self.transport.id(),
            request.from_address,
            request.to_address,
            body
        );
        self.transport
            .send(&request.from_address, &request.to_address, &body)
            .await?;
        Ok(())
    }

    pub async fn send_user_deleted(&self, trigger: &NotificationTrigger) -> DispatchOutcome {
        self.dispatch(NotificationKind::UserDeleted, trigger, &Extras::default())
            .await
    }

    pub async fn send_quiz_completed(&self, trigger: &NotificationTrigger) -> DispatchOutcome {
        self.dispatch(NotificationKind::QuizCompleted, trigger, &Extras::default())
            .await
    }

    pub async fn send_event_rsvp(&self, trigger: &NotificationTrigger) -> DispatchOutcome {
        self.dispatch(NotificationKind::EventRsvp, trigger, &Extras::default())
            .await
    }

    pub async fn send_event_upcoming(&self, trigger: &NotificationTrigger) -> DispatchOutcome {
        self.dispatch(NotificationKind::EventUpcoming, trigger, &Extras::default())
            .await
    }

    pub async fn send_event_started(&self, trigger: &NotificationTrigger) -> DispatchOutcome {
        self.dispatch(NotificationKind::EventStarted, trigger, &Extras::default())
            .await
    }

    pub async fn send_question_asked(&self, trigger: &NotificationTrigger) -> DispatchOutcome {
        self.dispatch(NotificationKind::QuestionAsked, trigger, &Extras::default())
            .await
    }

    pub async fn send_event_register(&self, trigger: &NotificationTrigger) -> DispatchOutcome {
        self.dispatch(NotificationKind::EventRegister, trigger, &Extras::default())
            .await
    }

    pub async fn send_event_unregister(&self, trigger: &NotificationTrigger) -> DispatchOutcome {
        self.dispatch(NotificationKind::EventUnregister, trigger, &Extras::default())
            .await
    }

    pub async fn send_settings_verified(&self, trigger: &NotificationTrigger) -> DispatchOutcome {
        self.dispatch(NotificationKind::SettingsVerified, trigger, &Extras::default())
            .await
    }

    pub async fn send_settings_changed(&self, trigger: &NotificationTrigger) -> DispatchOutcome {
        self.dispatch(NotificationKind::SettingsChanged, trigger, &Extras::default())
            .await
    }

    /// Resend the settings verification prompt after a reply that was not understood.
    pub async fn resend_settings_changed(
        &self,
        trigger: &NotificationTrigger,
        response: &str,
        original_message: &str,
    ) -> DispatchOutcome {
        let extras = Extras {
            response: Some(response.to_string()),
            original_message: Some(original_message.to_string()),
        };
        self.dispatch(NotificationKind::SettingsChangedResend, trigger, &extras)
            .await
    }

    pub async fn send_password_reset(&self, trigger: &NotificationTrigger) -> DispatchOutcome {
        self.dispatch(NotificationKind::PasswordReset, trigger, &Extras::default())
            .await
    }

    pub async fn send_last_minute_registration(
        &self,
        trigger: &NotificationTrigger,
    ) -> DispatchOutcome {
        self.dispatch(
            NotificationKind::LastMinuteRegistration,
            trigger,
            &Extras::default(),
        )
        .await
    }

    pub async fn send_event_completed(&self, trigger: &NotificationTrigger) -> DispatchOutcome {
        self.dispatch(NotificationKind::EventCompleted, trigger, &Extras::default())
            .await
    }

    /// Handle an inbound webhook body. Always returns `None`: the acknowledgment is empty
    /// whether the message was forwarded, dropped, or ignored.
    pub async fn receive_message(&self, raw: Option<&str>) -> Option<String> {
        if !self.settings.enabled {
            return None;
        }
        let decoded = InboundMessage::decode(raw);
        log::info!(
            "receive_message: {}",
            serde_json::to_string(&decoded.message).unwrap_or_default()
        );
        for skipped in &decoded.skipped {
            log::debug!(
                "receive_message: skipped segment [{}] ({:?})",
                skipped.segment,
                skipped.reason
            );
        }
        let message = decoded.message;
        if let Err(e) = self.validator.validate(message.body()) {
            log::debug!("receive_message: dropped: {}", e);
            return None;
        }
        let body = message.body()?;
        let sender = message.from().map(strip_country_code);
        self.responses
            .process_user_response(sender, body, ResponseChannel::Sms)
            .await;
        None
    }
}
