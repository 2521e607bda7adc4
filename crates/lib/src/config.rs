//! Configuration types and loading.
//!
//! Config is loaded once at startup from a JSON file (e.g. `~/.sms-relay/config.json`) plus
//! environment overrides, then handed by reference to the dispatcher and gateway.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// SMS provider settings and the global enablement flag.
    #[serde(default)]
    pub sms: SmsConfig,

    /// Branding values exposed to templates.
    #[serde(default)]
    pub app: AppConfig,

    /// Inbound body rules.
    #[serde(default)]
    pub validation: ValidationConfig,

    #[serde(default)]
    pub templates: TemplatesConfig,

    #[serde(default)]
    pub directory: DirectoryConfig,
}

/// Gateway bind and port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Port for HTTP (default 15152).
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_gateway_bind")]
    pub bind: String,
}

fn default_gateway_port() -> u16 {
    15152
}

fn default_gateway_bind() -> String {
    "127.0.0.1".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            bind: default_gateway_bind(),
        }
    }
}

/// SMS provider (Twilio) settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsConfig {
    /// When false, every outbound notification is skipped and inbound webhooks are ignored.
    #[serde(default)]
    pub enabled: bool,
    /// Sender number for outbound messages. Overridden by SMS_RELAY_FROM_ADDRESS env.
    pub from_address: Option<String>,
    /// Overridden by TWILIO_ACCOUNT_SID env.
    pub account_sid: Option<String>,
    /// Overridden by TWILIO_AUTH_TOKEN env.
    pub auth_token: Option<String>,
    /// REST API base (default https://api.twilio.com). Overridden by TWILIO_API_BASE env.
    pub api_base: Option<String>,
}

/// Values every template can use (`appName`, `siteUrl`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub site_url: Option<String>,
}

fn default_app_name() -> String {
    "Starfire Aviation".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            site_url: None,
        }
    }
}

/// Inbound body validation rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationConfig {
    /// Maximum body length in characters (default 1600, the provider's concatenated SMS limit).
    #[serde(default = "default_max_body_length")]
    pub max_body_length: usize,
}

fn default_max_body_length() -> usize {
    1600
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_body_length: default_max_body_length(),
        }
    }
}

/// Template source. When `directory` is unset the bundled templates are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatesConfig {
    /// Directory of `*.ftl` files that override bundled templates of the same name. Relative paths are resolved against the config file's parent.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

/// Domain directory seed data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryConfig {
    /// JSON file with `users`, `events` and `questions` arrays. Relative paths are resolved against the config file's parent.
    #[serde(default)]
    pub seed_file: Option<PathBuf>,
}

/// Non-empty trimmed env var, else the non-empty trimmed config value.
fn env_or(var: &str, configured: Option<&String>) -> Option<String> {
    std::env::var(var)
        .ok()
        .and_then(|s| {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        })
        .or_else(|| {
            configured
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// Resolve the sender number: env SMS_RELAY_FROM_ADDRESS overrides config.
pub fn resolve_from_address(config: &Config) -> Option<String> {
    env_or("SMS_RELAY_FROM_ADDRESS", config.sms.from_address.as_ref())
}

/// Resolve the Twilio account SID: env TWILIO_ACCOUNT_SID overrides config.
pub fn resolve_account_sid(config: &Config) -> Option<String> {
    env_or("TWILIO_ACCOUNT_SID", config.sms.account_sid.as_ref())
}

/// Resolve the Twilio auth token: env TWILIO_AUTH_TOKEN overrides config.
pub fn resolve_auth_token(config: &Config) -> Option<String> {
    env_or("TWILIO_AUTH_TOKEN", config.sms.auth_token.as_ref())
}

/// Resolve the Twilio REST base URL: env TWILIO_API_BASE overrides config.
pub fn resolve_api_base(config: &Config) -> Option<String> {
    env_or("TWILIO_API_BASE", config.sms.api_base.as_ref())
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("SMS_RELAY_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".sms-relay").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path, or the default path. Missing file => default config.
/// Returns the config and the path that was used (for resolving relative paths).
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

fn resolve_relative(configured: Option<&PathBuf>, config_path: &Path) -> Option<PathBuf> {
    let config_parent = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    match configured {
        Some(d) if !d.as_os_str().is_empty() => {
            if d.is_absolute() {
                Some(d.clone())
            } else {
                Some(config_parent.join(d))
            }
        }
        _ => None,
    }
}

/// Template override directory, if configured.
pub fn resolve_templates_dir(config: &Config, config_path: &Path) -> Option<PathBuf> {
    resolve_relative(config.templates.directory.as_ref(), config_path)
}

/// Directory seed file, if configured.
pub fn resolve_seed_file(config: &Config, config_path: &Path) -> Option<PathBuf> {
    resolve_relative(config.directory.seed_file.as_ref(), config_path)
}
