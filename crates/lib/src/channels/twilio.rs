//! Twilio transport: create a Message resource via the REST API.

use crate::channels::transport::{Transport, TransportError};
use crate::config::{self, Config};
use async_trait::async_trait;
use serde::Deserialize;

const TWILIO_API_BASE: &str = "https://api.twilio.com";
const API_VERSION: &str = "2010-04-01";

/// Subset of the Message resource returned on create.
#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
    #[serde(default)]
    status: Option<String>,
}

/// Twilio REST client. Credentials are optional so the relay can start without them;
/// sends then fail with [`TransportError::NotConfigured`].
pub struct TwilioTransport {
    id: String,
    account_sid: Option<String>,
    auth_token: Option<String>,
    api_base: String,
    client: reqwest::Client,
}

impl TwilioTransport {
    pub fn new(
        account_sid: Option<String>,
        auth_token: Option<String>,
        api_base: Option<String>,
    ) -> Self {
        let api_base = api_base
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| TWILIO_API_BASE.to_string());
        Self {
            id: "twilio".to_string(),
            account_sid,
            auth_token,
            api_base,
            client: reqwest::Client::new(),
        }
    }

    /// Build from config with env overrides (TWILIO_ACCOUNT_SID, TWILIO_AUTH_TOKEN, TWILIO_API_BASE).
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config::resolve_account_sid(config),
            config::resolve_auth_token(config),
            config::resolve_api_base(config),
        )
    }

    fn messages_url(&self, account_sid: &str) -> String {
        format!(
            "{}/{}/Accounts/{}/Messages.json",
            self.api_base, API_VERSION, account_sid
        )
    }
}

#[async_trait]
impl Transport for TwilioTransport {
    fn id(&self) -> &str {
        &self.id
    }

    async fn send(&self, from: &str, to: &str, body: &str) -> Result<(), TransportError> {
        let account_sid = self
            .account_sid
            .as_deref()
            .ok_or(TransportError::NotConfigured("account sid"))?;
        let auth_token = self
            .auth_token
            .as_deref()
            .ok_or(TransportError::NotConfigured("auth token"))?;
        let res = self
            .client
            .post(self.messages_url(account_sid))
            .basic_auth(account_sid, Some(auth_token))
            .form(&[("To", to), ("From", from), ("Body", body)])
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(TransportError::Api(format!("{} {}", status, body)));
        }
        let created: MessageResource = res.json().await?;
        log::debug!(
            "twilio: message {} created ({})",
            created.sid,
            created.status.as_deref().unwrap_or("unknown")
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Path, http::StatusCode, routing::post, Form, Json, Router};
    use std::collections::HashMap;
    use tokio::sync::mpsc;

    async fn fake_twilio(status: StatusCode) -> (String, mpsc::Receiver<(String, HashMap<String, String>)>) {
        let (tx, rx) = mpsc::channel(4);
        let app = Router::new().route(
            "/2010-04-01/Accounts/:sid/Messages.json",
            post(move |Path(sid): Path<String>, Form(form): Form<HashMap<String, String>>| {
                let tx = tx.clone();
                async move {
                    let _ = tx.send((sid, form)).await;
                    (status, Json(serde_json::json!({ "sid": "SM123", "status": "queued" })))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        (format!("http://{}", addr), rx)
    }

    #[tokio::test]
    async fn posts_form_to_messages_resource() {
        let (base, mut rx) = fake_twilio(StatusCode::CREATED).await;
        let t = TwilioTransport::new(Some("AC1".into()), Some("secret".into()), Some(base + "/"));
        t.send("+15550000000", "5551234567", "hello there").await.unwrap();
        let (sid, form) = rx.recv().await.unwrap();
        assert_eq!(sid, "AC1");
        assert_eq!(form["To"], "5551234567");
        assert_eq!(form["From"], "+15550000000");
        assert_eq!(form["Body"], "hello there");
    }

    #[tokio::test]
    async fn provider_error_is_api_error() {
        let (base, _rx) = fake_twilio(StatusCode::BAD_REQUEST).await;
        let t = TwilioTransport::new(Some("AC1".into()), Some("secret".into()), Some(base));
        let err = t.send("a", "b", "c").await.unwrap_err();
        assert!(matches!(err, TransportError::Api(ref m) if m.starts_with("400")));
    }

    #[tokio::test]
    async fn missing_credentials_not_configured() {
        let t = TwilioTransport::new(None, Some("secret".into()), None);
        assert!(matches!(
            t.send("a", "b", "c").await,
            Err(TransportError::NotConfigured("account sid"))
        ));
        assert_eq!(t.id(), "twilio");
    }
}
