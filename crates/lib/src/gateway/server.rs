//! Gateway HTTP server (single port).

use crate::channels::TwilioTransport;
use crate::config::{self, Config};
use crate::directory::InMemoryDirectory;
use crate::dispatch::{DispatchSettings, Dispatcher, Extras, NotificationKind};
use crate::domain::NotificationTrigger;
use crate::responses::LoggingResponseHandler;
use crate::template::TemplateStore;
use crate::validation::ResponseValidator;
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

/// Shared state for the gateway handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<Config>,
    pub dispatcher: Arc<Dispatcher>,
}

/// Body of `POST /notifications/{kind}`: the trigger references plus resend extras.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyRequest {
    #[serde(flatten)]
    pub trigger: NotificationTrigger,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub original_message: Option<String>,
}

/// Wire the production collaborators: Twilio transport, bundled (or overridden) templates,
/// in-memory directory (seeded when configured), logging response handler.
pub fn build_dispatcher(config: &Config, config_path: &std::path::Path) -> Result<Dispatcher> {
    let templates_dir = config::resolve_templates_dir(config, config_path);
    let templates = TemplateStore::load(templates_dir.as_deref())?;
    log::info!("templates loaded: {}", templates.names().join(", "));

    let directory = match config::resolve_seed_file(config, config_path) {
        Some(path) => InMemoryDirectory::load(&path)?,
        None => {
            log::warn!("no directory seed configured; outbound notifications will not resolve users");
            InMemoryDirectory::new()
        }
    };

    Ok(Dispatcher::new(
        DispatchSettings::from_config(config),
        ResponseValidator::new(&config.validation),
        Arc::new(directory),
        Arc::new(templates),
        Arc::new(TwilioTransport::from_config(config)),
        Arc::new(LoggingResponseHandler),
    ))
}

/// Routes for the relay.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(health_http))
        .route("/sms", post(sms_webhook))
        .route("/notifications/:kind", post(notify))
        .with_state(state)
}

/// Load collaborators from config and serve until shutdown.
pub async fn run_gateway(config: Config, config_path: PathBuf) -> Result<()> {
    let dispatcher = build_dispatcher(&config, &config_path)?;
    serve(Arc::new(config), Arc::new(dispatcher)).await
}

/// Serve the gateway with an already-built dispatcher.
pub async fn serve(config: Arc<Config>, dispatcher: Arc<Dispatcher>) -> Result<()> {
    let bind_addr = format!("{}:{}", config.gateway.bind.trim(), config.gateway.port);
    if !dispatcher.settings().enabled {
        log::warn!("sms disabled (sms.enabled = false): webhooks are acknowledged and ignored");
    }
    let app = router(GatewayState { config, dispatcher });

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// GET / returns a simple health JSON (for probes).
async fn health_http(State(state): State<GatewayState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "port": state.config.gateway.port,
        "enabled": state.dispatcher.settings().enabled,
    }))
}

/// POST /sms: provider webhook. Always 200; the body is whatever the dispatcher acknowledges (empty).
async fn sms_webhook(State(state): State<GatewayState>, body: Bytes) -> (StatusCode, String) {
    let body = String::from_utf8_lossy(&body);
    log::debug!("sms webhook called with [{}]", body);
    let ack = state.dispatcher.receive_message(Some(body.as_ref())).await;
    (StatusCode::OK, ack.unwrap_or_default())
}

/// POST /notifications/{kind}: run one outbound notification and report the outcome.
async fn notify(
    State(state): State<GatewayState>,
    Path(kind): Path<String>,
    body: Bytes,
) -> Response {
    let kind: NotificationKind = match kind.parse() {
        Ok(k) => k,
        Err(e) => {
            return (StatusCode::NOT_FOUND, Json(json!({ "error": e.to_string() }))).into_response()
        }
    };
    let req: NotifyRequest = if body.is_empty() {
        NotifyRequest::default()
    } else {
        match serde_json::from_slice(&body) {
            Ok(r) => r,
            Err(e) => {
                return (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() })))
                    .into_response()
            }
        }
    };
    let extras = Extras {
        response: req.response,
        original_message: req.original_message,
    };
    let outcome = state.dispatcher.dispatch(kind, &req.trigger, &extras).await;
    (StatusCode::OK, Json(outcome)).into_response()
}
