use std::{collections::HashMap, fs};

use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_bind: String,
    /// Origins allowed to call the API. Empty means any origin.
    pub allowed_origins: Vec<String>,
    pub record_path: Option<String>,
    pub max_body_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:3002".into(),
            allowed_origins: Vec::new(),
            record_path: None,
            max_body_bytes: 16 * 1024,
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("server.toml") {
        apply_file_overrides(&mut settings, &raw);
    }
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());

    settings
}

fn apply_file_overrides(settings: &mut Settings, raw: &str) {
    let file_cfg = match toml::from_str::<HashMap<String, toml::Value>>(raw) {
        Ok(cfg) => cfg,
        Err(error) => {
            warn!(%error, "ignoring unreadable server.toml");
            return;
        }
    };

    if let Some(v) = file_cfg.get("bind_addr").and_then(value_as_string) {
        settings.server_bind = v;
    }
    if let Some(v) = file_cfg.get("allowed_origins").and_then(value_as_string) {
        settings.allowed_origins = parse_origins(&v);
    }
    if let Some(v) = file_cfg.get("record_path").and_then(value_as_string) {
        settings.record_path = non_empty(v);
    }
    if let Some(v) = file_cfg.get("max_body_bytes").and_then(value_as_string) {
        apply_max_body_bytes(settings, &v);
    }
}

fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = lookup("APP__BIND_ADDR") {
        settings.server_bind = v;
    }
    if let Some(v) = lookup("PORT") {
        match v.trim().parse::<u16>() {
            Ok(port) => settings.server_bind = with_port(&settings.server_bind, port),
            Err(_) => warn!(value = %v, "ignoring invalid PORT"),
        }
    }

    if let Some(v) = lookup("APP__ALLOWED_ORIGINS") {
        settings.allowed_origins = parse_origins(&v);
    }

    if let Some(v) = lookup("APP__RECORD_PATH") {
        settings.record_path = non_empty(v);
    }

    if let Some(v) = lookup("APP__MAX_BODY_BYTES") {
        apply_max_body_bytes(settings, &v);
    }
}

fn apply_max_body_bytes(settings: &mut Settings, raw: &str) {
    match raw.trim().parse::<usize>() {
        Ok(parsed) if parsed > 0 => settings.max_body_bytes = parsed,
        _ => warn!(value = %raw, "ignoring invalid max_body_bytes"),
    }
}

fn value_as_string(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|item| item.as_str())
                .collect::<Vec<_>>()
                .join(","),
        ),
        _ => None,
    }
}

/// Comma separated origins; `*` anywhere in the list allows every origin.
fn parse_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| origin.trim_end_matches('/').to_string())
        .collect();

    if origins.iter().any(|origin| origin == "*") {
        return Vec::new();
    }
    origins
}

fn with_port(bind: &str, port: u16) -> String {
    match bind.rsplit_once(':') {
        Some((host, _)) => format!("{host}:{port}"),
        None => format!("{bind}:{port}"),
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
