use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::controller::ControllerSettings;

pub const DEFAULT_SETTINGS_FILE: &str = "mailview.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file '{path}': {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse settings file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid server url '{url}': {reason}")]
    InvalidServerUrl { url: String, reason: String },
    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub request_timeout_ms: u64,
    pub navigate_on_failed_send: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000".into(),
            request_timeout_ms: 10_000,
            navigate_on_failed_send: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    server_url: Option<String>,
    request_timeout_ms: Option<u64>,
    navigate_on_failed_send: Option<bool>,
}

/// Defaults, then the settings file, then the environment.
///
/// An explicit `path` must exist; the default `mailview.toml` is optional.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, SettingsError> {
    let mut settings = Settings::default();

    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_SETTINGS_FILE), false),
    };
    match fs::read_to_string(&path) {
        Ok(raw) => {
            debug!(path = %path.display(), "applying settings file");
            settings.apply_file(&raw)?;
        }
        Err(err) if !required && err.kind() == io::ErrorKind::NotFound => {}
        Err(source) => return Err(SettingsError::Read { path, source }),
    }

    settings.apply_env(|key| std::env::var(key).ok())?;
    settings.server_url()?;
    Ok(settings)
}

impl Settings {
    pub fn apply_file(&mut self, raw: &str) -> Result<(), SettingsError> {
        let file_cfg: FileSettings = toml::from_str(raw)?;
        if let Some(v) = file_cfg.server_url {
            self.server_url = v;
        }
        if let Some(v) = file_cfg.request_timeout_ms {
            self.request_timeout_ms = v;
        }
        if let Some(v) = file_cfg.navigate_on_failed_send {
            self.navigate_on_failed_send = v;
        }
        Ok(())
    }

    /// Later keys win: `MAILVIEW_SERVER_URL` is overridden by `APP__SERVER_URL`.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), SettingsError> {
        if let Some(v) = lookup("MAILVIEW_SERVER_URL") {
            self.server_url = v;
        }
        if let Some(v) = lookup("APP__SERVER_URL") {
            self.server_url = v;
        }

        if let Some(v) = lookup("APP__REQUEST_TIMEOUT_MS") {
            self.request_timeout_ms =
                v.trim()
                    .parse::<u64>()
                    .map_err(|_| SettingsError::InvalidValue {
                        key: "APP__REQUEST_TIMEOUT_MS",
                        value: v.clone(),
                    })?;
        }

        if let Some(v) = lookup("APP__NAVIGATE_ON_FAILED_SEND") {
            self.navigate_on_failed_send = parse_flag(&v).ok_or(SettingsError::InvalidValue {
                key: "APP__NAVIGATE_ON_FAILED_SEND",
                value: v.clone(),
            })?;
        }

        Ok(())
    }

    pub fn server_url(&self) -> Result<Url, SettingsError> {
        let invalid = |reason: String| SettingsError::InvalidServerUrl {
            url: self.server_url.clone(),
            reason,
        };
        let url = Url::parse(self.server_url.trim()).map_err(|err| invalid(err.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("server_url must start with http:// or https://".into()));
        }
        Ok(url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.max(1))
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            request_timeout: self.request_timeout(),
            navigate_on_failed_send: self.navigate_on_failed_send,
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
