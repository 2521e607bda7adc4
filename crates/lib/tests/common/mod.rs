//! Test doubles for the dispatcher's collaborators, with call recording.

#![allow(dead_code)]

use async_trait::async_trait;
use relay::channels::{Transport, TransportError};
use relay::directory::InMemoryDirectory;
use relay::dispatch::{DispatchSettings, Dispatcher};
use relay::domain::{Event, EventKind, Question, User};
use relay::responses::{ResponseChannel, ResponseHandler};
use relay::template::{Renderer, TemplateContext, TemplateError, TemplateStore};
use relay::validation::ResponseValidator;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const FROM: &str = "+15550000000";

/// Bundled templates, counting render calls and keeping the last context.
#[derive(Default)]
pub struct CountingRenderer {
    inner: TemplateStore,
    pub calls: AtomicUsize,
    pub last_context: Mutex<Option<(String, TemplateContext)>>,
}

impl CountingRenderer {
    pub fn bundled() -> Self {
        Self {
            inner: TemplateStore::bundled(),
            ..Self::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Renderer for CountingRenderer {
    fn render(&self, template_name: &str, context: &TemplateContext) -> Result<String, TemplateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_context.lock().unwrap() = Some((template_name.to_string(), context.clone()));
        self.inner.render(template_name, context)
    }
}

/// Records every send; fails every call when `fail` is set.
#[derive(Default)]
pub struct RecordingTransport {
    pub fail: bool,
    pub sent: Mutex<Vec<(String, String, String)>>,
    pub calls: AtomicUsize,
}

impl RecordingTransport {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<(String, String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    fn id(&self) -> &str {
        "recording"
    }

    async fn send(&self, from: &str, to: &str, body: &str) -> Result<(), TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(TransportError::Api("503 provider unavailable".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((from.to_string(), to.to_string(), body.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingResponses {
    pub received: Mutex<Vec<(Option<String>, String, ResponseChannel)>>,
}

impl RecordingResponses {
    pub fn received(&self) -> Vec<(Option<String>, String, ResponseChannel)> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResponseHandler for RecordingResponses {
    async fn process_user_response(&self, sender: Option<&str>, body: &str, channel: ResponseChannel) {
        self.received
            .lock()
            .unwrap()
            .push((sender.map(str::to_string), body.to_string(), channel));
    }
}

pub fn settings(enabled: bool) -> DispatchSettings {
    DispatchSettings {
        enabled,
        from_address: FROM.to_string(),
        app_name: "Starfire Aviation".to_string(),
        site_url: Some("https://example.org".to_string()),
    }
}

pub fn pilot() -> User {
    User {
        id: 1,
        first_name: "Amelia".to_string(),
        last_name: "Earhart".to_string(),
        email: Some("amelia@example.org".to_string()),
        sms: Some("5551234567".to_string()),
        code: Some("424242".to_string()),
    }
}

pub fn event(id: i64, kind: EventKind) -> Event {
    Event {
        id,
        title: "Weather Theory".to_string(),
        description: None,
        location: Some("Hangar 2".to_string()),
        start_time: "2026-11-05T18:30:00Z".parse().unwrap(),
        event_type: kind,
    }
}

/// Directory with user 1 (has sms), user 2 (no sms), ground-school event 10, social event 11,
/// and question 20.
pub async fn directory() -> InMemoryDirectory {
    let dir = InMemoryDirectory::new();
    dir.insert_user(pilot()).await;
    dir.insert_user(User {
        id: 2,
        sms: None,
        ..pilot()
    })
    .await;
    dir.insert_event(event(10, EventKind::GroundSchool)).await;
    dir.insert_event(event(11, EventKind::Social)).await;
    dir.insert_question(Question {
        id: 20,
        text: "What does VFR stand for?".to_string(),
        choices: vec!["Visual Flight Rules".to_string()],
    })
    .await;
    dir
}

pub struct Harness {
    pub dispatcher: Dispatcher,
    pub renderer: Arc<CountingRenderer>,
    pub transport: Arc<RecordingTransport>,
    pub responses: Arc<RecordingResponses>,
}

pub async fn harness_with(
    enabled: bool,
    renderer: CountingRenderer,
    transport: RecordingTransport,
) -> Harness {
    let renderer = Arc::new(renderer);
    let transport = Arc::new(transport);
    let responses = Arc::new(RecordingResponses::default());
    let dispatcher = Dispatcher::new(
        settings(enabled),
        ResponseValidator::default(),
        Arc::new(directory().await),
        renderer.clone(),
        transport.clone(),
        responses.clone(),
    );
    Harness {
        dispatcher,
        renderer,
        transport,
        responses,
    }
}

pub async fn harness(enabled: bool) -> Harness {
    harness_with(enabled, CountingRenderer::bundled(), RecordingTransport::default()).await
}
