//! Template renderer: `${path}` interpolation over a [`TemplateContext`].
//!
//! Supported syntax is the subset the message templates use: `${a.b.c}`, defaults via
//! `${a.b!"fallback"}` or `${a.b!}`, and `<#-- comments -->`. A placeholder whose value is
//! missing or null and has no default is a binding error, as is one that names an object or list.

use super::context::TemplateContext;
use anyhow::{Context, Result};
use include_dir::{include_dir, Dir};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

pub(crate) static BUNDLED_TEMPLATES: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/templates");

const TEMPLATE_EXTENSION: &str = "ftl";

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"\$\{\s*([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*)\s*(!\s*(?:"([^"]*)")?)?\s*\}"#,
    )
    .expect("valid placeholder pattern")
});

static COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<#--.*?-->\n?").expect("valid comment pattern"));

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("template not found: {0}")]
    NotFound(String),
    #[error("template {template}: {reason}")]
    Binding { template: String, reason: String },
}

/// Renderer collaborator: materialize a named template against a context.
pub trait Renderer: Send + Sync {
    fn render(&self, template_name: &str, context: &TemplateContext) -> Result<String, TemplateError>;
}

/// Templates keyed by name (file stem, e.g. "gs_event_rsvp"), loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    templates: HashMap<String, String>,
}

impl TemplateStore {
    /// The templates compiled into the binary.
    pub fn bundled() -> Self {
        let mut store = Self::default();
        for file in BUNDLED_TEMPLATES.files() {
            let path = file.path();
            if path.extension().and_then(|e| e.to_str()) != Some(TEMPLATE_EXTENSION) {
                continue;
            }
            let (Some(name), Some(source)) = (
                path.file_stem().and_then(|s| s.to_str()),
                file.contents_utf8(),
            ) else {
                log::warn!("skipping unreadable bundled template {}", path.display());
                continue;
            };
            store.insert(name, source);
        }
        store
    }

    /// Bundled templates, with any `*.ftl` in `dir` replacing the bundled one of the same name.
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        let mut store = Self::bundled();
        let Some(dir) = dir else {
            return Ok(store);
        };
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("reading template directory {}", dir.display()))?;
        for entry in entries {
            let path = entry
                .with_context(|| format!("reading template directory {}", dir.display()))?
                .path();
            if path.extension().and_then(|e| e.to_str()) != Some(TEMPLATE_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let source = std::fs::read_to_string(&path)
                .with_context(|| format!("reading template {}", path.display()))?;
            log::debug!("template {} loaded from {}", name, path.display());
            store.insert(name, source);
        }
        Ok(store)
    }

    pub fn insert(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.templates.insert(name.into(), source.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Template names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Renderer for TemplateStore {
    fn render(&self, template_name: &str, context: &TemplateContext) -> Result<String, TemplateError> {
        let source = self
            .templates
            .get(template_name)
            .ok_or_else(|| TemplateError::NotFound(template_name.to_string()))?;
        let source = COMMENT.replace_all(source, "");
        let rendered = interpolate(template_name, &source, context)?;
        // Trailing newline of the file is not part of the message.
        Ok(rendered.trim_end().to_string())
    }
}

fn interpolate(template: &str, source: &str, context: &TemplateContext) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(source.len());
    let mut last = 0;
    for caps in PLACEHOLDER.captures_iter(source) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&source[last..whole.start()]);
        let path = &caps[1];
        match (lookup(context, path), caps.get(2)) {
            (Some(value), _) if !value.is_null() => out.push_str(&scalar(template, path, value)?),
            (_, Some(_)) => out.push_str(caps.get(3).map_or("", |m| m.as_str())),
            _ => {
                return Err(TemplateError::Binding {
                    template: template.to_string(),
                    reason: format!("{} is undefined", path),
                })
            }
        }
        last = whole.end();
    }
    out.push_str(&source[last..]);
    Ok(out)
}

fn lookup<'a>(context: &'a TemplateContext, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut value = context.get(parts.next()?)?;
    for part in parts {
        value = value.as_object()?.get(part)?;
    }
    Some(value)
}

fn scalar(template: &str, path: &str, value: &Value) -> Result<String, TemplateError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(TemplateError::Binding {
            template: template.to_string(),
            reason: format!("{} is not a scalar value", path),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx(v: Value) -> TemplateContext {
        match v {
            Value::Object(m) => m,
            _ => panic!("context must be an object"),
        }
    }

    fn store(name: &str, source: &str) -> TemplateStore {
        let mut s = TemplateStore::default();
        s.insert(name, source);
        s
    }

    #[test]
    fn interpolates_nested_paths() {
        let s = store("t", "Hi ${user.firstName}, ${ count } seats, open=${open}\n");
        let out = s
            .render(
                "t",
                &ctx(json!({ "user": { "firstName": "Orville" }, "count": 3, "open": true })),
            )
            .unwrap();
        assert_eq!(out, "Hi Orville, 3 seats, open=true");
    }

    #[test]
    fn defaults_apply_to_missing_and_null() {
        let s = store("t", r#"[${a!"x"}][${b!}][${c.d!"y"}]"#);
        let out = s.render("t", &ctx(json!({ "b": null }))).unwrap();
        assert_eq!(out, "[x][][y]");
    }

    #[test]
    fn missing_value_without_default_is_binding_error() {
        let s = store("t", "code ${code}");
        assert_eq!(
            s.render("t", &ctx(json!({ "code": null }))),
            Err(TemplateError::Binding {
                template: "t".to_string(),
                reason: "code is undefined".to_string(),
            })
        );
    }

    #[test]
    fn object_value_is_binding_error() {
        let s = store("t", "${user}");
        assert!(matches!(
            s.render("t", &ctx(json!({ "user": { "id": 1 } }))),
            Err(TemplateError::Binding { .. })
        ));
    }

    #[test]
    fn unknown_template_is_not_found() {
        assert_eq!(
            TemplateStore::default().render("nope", &TemplateContext::new()),
            Err(TemplateError::NotFound("nope".to_string()))
        );
    }

    #[test]
    fn comments_are_stripped() {
        let s = store("t", "<#-- header\nspans lines -->\nbody ${x}");
        assert_eq!(s.render("t", &ctx(json!({ "x": 1 }))).unwrap(), "body 1");
    }

    #[test]
    fn bundled_templates_cover_every_notification() {
        let s = TemplateStore::bundled();
        for kind in crate::dispatch::NotificationKind::ALL {
            assert!(s.contains(kind.template_name()), "missing {}", kind.template_name());
        }
    }

    #[test]
    fn directory_overrides_bundled() {
        let dir = std::env::temp_dir().join(format!("sms-relay-templates-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("password_reset.ftl"), "code=${code}\n").unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();
        let s = TemplateStore::load(Some(&dir)).unwrap();
        assert!(!s.contains("notes"));
        assert!(s.contains("user_delete"));
        assert_eq!(
            s.render("password_reset", &ctx(json!({ "code": "42" }))).unwrap(),
            "code=42"
        );
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = std::env::temp_dir().join(format!("sms-relay-missing-{}", uuid::Uuid::new_v4()));
        assert!(TemplateStore::load(Some(&dir)).is_err());
    }
}
