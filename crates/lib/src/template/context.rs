//! Template context: the values a message template can reference.

use crate::dispatch::DispatchSettings;
use crate::domain::{Event, Question, User};
use serde_json::{json, Map, Value};

/// Named values handed to the renderer (`user`, `event`, `question`, `appName`, ...).
pub type TemplateContext = Map<String, Value>;

/// Build a fresh context for one message. `event` and `question` are included only when given.
/// Callers may insert extra keys (e.g. `code`) afterwards.
pub fn build_context(
    user: &User,
    event: Option<&Event>,
    question: Option<&Question>,
    settings: &DispatchSettings,
) -> TemplateContext {
    let mut ctx = TemplateContext::new();
    ctx.insert("user".to_string(), json!(user));
    if let Some(event) = event {
        ctx.insert("event".to_string(), json!(event));
    }
    if let Some(question) = question {
        ctx.insert("question".to_string(), json!(question));
    }
    ctx.insert("fromAddress".to_string(), json!(settings.from_address));
    ctx.insert("appName".to_string(), json!(settings.app_name));
    ctx.insert("siteUrl".to_string(), json!(settings.site_url));
    ctx
}
