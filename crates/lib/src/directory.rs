//! Domain lookups: resolve the user, event and question a notification refers to.
//!
//! The relay holds no data of its own. [`InMemoryDirectory`] is the shipped implementation,
//! optionally seeded from a JSON file at startup; real deployments plug in their own.

use crate::domain::{Event, Question, User};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Lookup collaborator. `None` means the reference could not be resolved.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn resolve_user(&self, id: i64) -> Option<User>;
    async fn resolve_event(&self, id: i64) -> Option<Event>;
    async fn resolve_question(&self, id: i64) -> Option<Question>;
}

/// Seed file layout: `{ "users": [...], "events": [...], "questions": [...] }`.
#[derive(Debug, Default, Deserialize)]
pub struct DirectorySeed {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// In-memory store of users, events and questions keyed by id.
pub struct InMemoryDirectory {
    users: Arc<RwLock<HashMap<i64, User>>>,
    events: Arc<RwLock<HashMap<i64, Event>>>,
    questions: Arc<RwLock<HashMap<i64, Question>>>,
}

impl Default for InMemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            events: Arc::new(RwLock::new(HashMap::new())),
            questions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn from_seed(seed: DirectorySeed) -> Self {
        Self {
            users: Arc::new(RwLock::new(
                seed.users.into_iter().map(|u| (u.id, u)).collect(),
            )),
            events: Arc::new(RwLock::new(
                seed.events.into_iter().map(|e| (e.id, e)).collect(),
            )),
            questions: Arc::new(RwLock::new(
                seed.questions.into_iter().map(|q| (q.id, q)).collect(),
            )),
        }
    }

    /// Load a seed file. Missing file is an error: the path was configured explicitly.
    pub fn load(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("reading directory seed from {}", path.display()))?;
        let seed: DirectorySeed = serde_json::from_str(&s)
            .with_context(|| format!("parsing directory seed from {}", path.display()))?;
        log::info!(
            "directory seeded from {}: {} users, {} events, {} questions",
            path.display(),
            seed.users.len(),
            seed.events.len(),
            seed.questions.len()
        );
        Ok(Self::from_seed(seed))
    }

    /// Insert or replace a user.
    pub async fn insert_user(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }

    pub async fn insert_event(&self, event: Event) {
        self.events.write().await.insert(event.id, event);
    }

    pub async fn insert_question(&self, question: Question) {
        self.questions.write().await.insert(question.id, question);
    }
}

#[async_trait]
impl Directory for InMemoryDirectory {
    async fn resolve_user(&self, id: i64) -> Option<User> {
        self.users.read().await.get(&id).cloned()
    }

    async fn resolve_event(&self, id: i64) -> Option<Event> {
        self.events.read().await.get(&id).cloned()
    }

    async fn resolve_question(&self, id: i64) -> Option<Question> {
        self.questions.read().await.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_then_resolve() {
        let dir = InMemoryDirectory::new();
        assert_eq!(dir.resolve_user(7).await, None);
        dir.insert_user(User {
            id: 7,
            first_name: "Amelia".to_string(),
            last_name: "Earhart".to_string(),
            email: None,
            sms: Some("5551234567".to_string()),
            code: None,
        })
        .await;
        assert_eq!(dir.resolve_user(7).await.map(|u| u.first_name), Some("Amelia".to_string()));
        assert!(dir.resolve_event(7).await.is_none());
    }

    #[tokio::test]
    async fn seed_from_json() {
        let seed: DirectorySeed = serde_json::from_str(
            r#"{
                "users": [{ "id": 1, "firstName": "Wilbur", "sms": "5550001111" }],
                "events": [{ "id": 2, "title": "Weather", "startTime": "2026-03-01T18:00:00Z", "eventType": "GROUND_SCHOOL" }],
                "questions": [{ "id": 3, "text": "What is VFR?", "choices": ["a", "b"] }]
            }"#,
        )
        .unwrap();
        let dir = InMemoryDirectory::from_seed(seed);
        assert_eq!(dir.resolve_user(1).await.and_then(|u| u.sms), Some("5550001111".to_string()));
        assert_eq!(
            dir.resolve_event(2).await.map(|e| e.event_type),
            Some(crate::domain::EventKind::GroundSchool)
        );
        assert_eq!(dir.resolve_question(3).await.map(|q| q.choices.len()), Some(2));
    }
}
