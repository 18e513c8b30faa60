// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from a JSON file and environment variables.
//!
//! The file supplies the Strava OAuth client credentials and the public
//! domain the app is served from. A handful of environment variables
//! (`PORT`, `HTTP_TIMEOUT_SECS`, `SESSION_SECRET`, `OPEN_BROWSER`) override
//! the file so local runs don't need to edit it.

use crate::services::oauth::Scope;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use validator::{Validate, ValidationError};

/// Config file used when `APP_CONFIG` is not set.
pub const DEFAULT_CONFIG_FILE: &str = "appconfig.json";

/// Paths served by the app itself; the callback can't reuse them.
pub const RESERVED_PATHS: &[&str] = &["/", "/health", "/results", "/results/", "/auth/logout"];

/// Application configuration, loaded once at startup.
#[derive(Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Strava OAuth client ID
    #[serde(alias = "ClientID", alias = "client_id")]
    #[validate(range(min = 1))]
    pub client_id: u64,
    /// Strava OAuth client secret
    #[serde(alias = "ClientSecret", alias = "client_secret")]
    #[validate(length(min = 1))]
    pub client_secret: String,
    /// Public base URL, e.g. `http://localhost:8080`. Defaults to localhost on `port`.
    #[serde(default, alias = "Domain")]
    #[validate(custom(function = "validate_http_url"))]
    pub domain: Option<String>,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Path Strava redirects back to after authorization
    #[serde(default = "default_callback_path")]
    #[validate(custom(function = "validate_callback_path"))]
    pub callback_path: String,
    /// Deadline for each outbound Strava request
    #[serde(default = "default_http_timeout_secs")]
    #[validate(range(min = 1))]
    pub http_timeout_secs: u64,
    /// Secret used to sign session cookies and OAuth state
    #[serde(default, deserialize_with = "non_empty_secret")]
    pub session_secret: Option<String>,
    /// Scopes requested from Strava
    #[serde(default = "default_scopes")]
    #[validate(length(min = 1))]
    pub scopes: Vec<Scope>,
    /// Always show the Strava approval screen, even if already authorized
    #[serde(default)]
    pub force_approval_prompt: bool,
    /// Open the home page in a browser after startup
    #[serde(default)]
    pub open_browser: bool,
}

fn default_port() -> u16 {
    8080
}

fn default_callback_path() -> String {
    "/auth/".to_string()
}

fn default_http_timeout_secs() -> u64 {
    60
}

fn default_scopes() -> Vec<Scope> {
    vec![Scope::Read, Scope::ActivityRead]
}

fn validate_http_url(value: &str) -> Result<(), ValidationError> {
    let rest = value
        .strip_prefix("http://")
        .or_else(|| value.strip_prefix("https://"))
        .ok_or_else(|| ValidationError::new("domain_scheme"))?;
    if rest.trim_end_matches('/').is_empty() || rest.contains(char::is_whitespace) {
        return Err(ValidationError::new("domain_host"));
    }
    Ok(())
}

fn validate_callback_path(value: &str) -> Result<(), ValidationError> {
    if !value.starts_with('/') || value.contains(['?', '#', '{', '}', '*']) {
        return Err(ValidationError::new("callback_path"));
    }
    if RESERVED_PATHS.contains(&value) {
        return Err(ValidationError::new("callback_path_reserved"));
    }
    Ok(())
}

/// A blank secret counts as no secret at all.
fn non_empty_secret<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let secret = Option::<String>::deserialize(deserializer)?;
    Ok(secret
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            client_id: 12345,
            client_secret: "test_secret".to_string(),
            domain: Some("http://localhost:8080".to_string()),
            port: 8080,
            callback_path: default_callback_path(),
            http_timeout_secs: default_http_timeout_secs(),
            session_secret: Some("test_session_secret_32_bytes_min!".to_string()),
            scopes: default_scopes(),
            force_approval_prompt: false,
            open_browser: false,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("domain", &self.domain)
            .field("port", &self.port)
            .field("callback_path", &self.callback_path)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("session_secret", &self.session_secret.as_ref().map(|_| "<redacted>"))
            .field("scopes", &self.scopes)
            .field("force_approval_prompt", &self.force_approval_prompt)
            .field("open_browser", &self.open_browser)
            .finish()
    }
}

impl Config {
    /// Config for tests.
    pub fn test_default() -> Self {
        Self::default()
    }

    /// Load configuration for the running process.
    ///
    /// Reads `.env` if present, then the file named by `APP_CONFIG`
    /// (default `appconfig.json`), then applies environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let path = env::var("APP_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        config.ensure_session_secret()?;
        Ok(config)
    }

    /// Parse a JSON config file without consulting the environment.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&data)
    }

    /// Parse and validate config JSON.
    pub fn from_json(data: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.port = port.trim().parse().map_err(|_| ConfigError::Env {
                var: "PORT",
                value: port,
            })?;
        }
        if let Some(timeout) = lookup("HTTP_TIMEOUT_SECS") {
            self.http_timeout_secs = timeout.trim().parse().map_err(|_| ConfigError::Env {
                var: "HTTP_TIMEOUT_SECS",
                value: timeout,
            })?;
        }
        if let Some(secret) = lookup("SESSION_SECRET") {
            let secret = secret.trim().to_string();
            if !secret.is_empty() {
                self.session_secret = Some(secret);
            }
        }
        if let Some(open) = lookup("OPEN_BROWSER") {
            self.open_browser = matches!(
                open.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes"
            );
        }
        Ok(())
    }

    /// Generate a random session secret if none was configured.
    ///
    /// Sessions signed with a generated secret do not survive a restart.
    pub fn ensure_session_secret(&mut self) -> Result<(), ConfigError> {
        if self.session_secret.is_none() {
            tracing::warn!("No session secret configured, generating a random one");
            let secret = crate::services::session::random_hex(32)
                .map_err(|_| ConfigError::Random)?;
            self.session_secret = Some(secret);
        }
        Ok(())
    }

    /// Public base URL without a trailing slash.
    pub fn base_url(&self) -> String {
        match &self.domain {
            Some(domain) => domain.trim_end_matches('/').to_string(),
            None => format!("http://localhost:{}", self.port),
        }
    }

    /// Full URL Strava redirects to after authorization.
    pub fn callback_url(&self) -> String {
        format!("{}{}", self.base_url(), self.callback_path)
    }

    /// Whether cookies should carry the `Secure` attribute.
    pub fn is_https(&self) -> bool {
        self.base_url().starts_with("https://")
    }

    pub fn http_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.http_timeout_secs)
    }

    /// Raw session secret bytes (empty if not yet generated).
    pub fn session_secret_bytes(&self) -> &[u8] {
        self.session_secret.as_deref().unwrap_or_default().as_bytes()
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Can't open configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Can't parse configuration file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),

    #[error("Invalid value for {var}: {value:?}")]
    Env { var: &'static str, value: String },

    #[error("Failed to generate session secret")]
    Random,
}
