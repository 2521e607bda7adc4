//! Initialize the configuration directory: create ~/.sms-relay, a default config, and an
//! editable copy of the bundled templates.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::template::BUNDLED_TEMPLATES;

/// Create the config directory and default files if they do not exist.
/// - Writes `config.json` (defaults, with `templates.directory` pointing at `templates`) if missing.
/// - Extracts the bundled templates into the `templates` subdirectory if it does not exist.
pub fn init_config_dir(config_path: &Path) -> Result<PathBuf> {
    let config_dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(config_dir)
        .with_context(|| format!("creating config directory {}", config_dir.display()))?;

    if !config_path.exists() {
        let mut config = Config::default();
        config.templates.directory = Some(PathBuf::from("templates"));
        let json = serde_json::to_string_pretty(&config).context("serializing default config")?;
        std::fs::write(config_path, json)
            .with_context(|| format!("writing default config to {}", config_path.display()))?;
        log::info!("created default config at {}", config_path.display());
    }

    let templates_dir = config_dir.join("templates");
    if !templates_dir.exists() {
        std::fs::create_dir_all(&templates_dir)
            .with_context(|| format!("creating templates directory {}", templates_dir.display()))?;
        if let Err(e) = BUNDLED_TEMPLATES.extract(&templates_dir) {
            anyhow::bail!(
                "extracting bundled templates to {}: {}",
                templates_dir.display(),
                e
            );
        }
        log::info!("extracted bundled templates to {}", templates_dir.display());
    } else {
        log::debug!(
            "templates directory already exists at {}, skipping",
            templates_dir.display()
        );
    }

    Ok(config_dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{load_config, resolve_templates_dir};
    use crate::template::TemplateStore;

    #[test]
    fn init_writes_config_and_templates() {
        let dir = std::env::temp_dir().join(format!("sms-relay-init-{}", uuid::Uuid::new_v4()));
        let config_path = dir.join("config.json");
        let returned = init_config_dir(&config_path).unwrap();
        assert_eq!(returned, dir);

        let (config, _) = load_config(Some(config_path.clone())).unwrap();
        let templates = resolve_templates_dir(&config, &config_path).unwrap();
        assert_eq!(templates, dir.join("templates"));
        assert!(templates.join("password_reset.ftl").exists());

        let store = TemplateStore::load(Some(&templates)).unwrap();
        assert!(store.contains("gs_event_rsvp"));

        // Second run leaves existing files alone.
        std::fs::write(templates.join("password_reset.ftl"), "custom").unwrap();
        init_config_dir(&config_path).unwrap();
        assert_eq!(
            std::fs::read_to_string(templates.join("password_reset.ftl")).unwrap(),
            "custom"
        );
        let _ = std::fs::remove_dir_all(&dir);
    }
}
