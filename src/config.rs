use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

use crate::translate::endpoint::{default_endpoints, Endpoint};
use crate::translate::interface::{LanguagePair, DEFAULT_CONTEXT};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub translator: TranslatorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8787
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    /// Candidate base URLs, highest priority first
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<Endpoint>,
    #[serde(default)]
    pub languages: LanguagePair,
    #[serde(default = "default_context")]
    pub context: String,
    #[serde(default = "default_attempt_timeout_ms")]
    pub attempt_timeout_ms: u64,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Bound on the whole fallback sequence
    #[serde(default = "default_deadline_ms")]
    pub deadline_ms: u64,
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    #[serde(default)]
    pub use_system_proxy: bool,
}

fn default_context() -> String {
    DEFAULT_CONTEXT.to_string()
}

fn default_attempt_timeout_ms() -> u64 {
    8_000
}

fn default_connect_timeout_ms() -> u64 {
    3_000
}

fn default_deadline_ms() -> u64 {
    20_000
}

fn default_history_limit() -> usize {
    100
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            endpoints: default_endpoints(),
            languages: LanguagePair::default(),
            context: default_context(),
            attempt_timeout_ms: default_attempt_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            deadline_ms: default_deadline_ms(),
            history_limit: default_history_limit(),
            use_system_proxy: false,
        }
    }
}

impl TranslatorConfig {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }
}

impl Config {
    /// Load configuration from a YAML or JSON file
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            anyhow::bail!("Configuration file not found: {}", path);
        }
        let content = fs::read_to_string(path)?;
        Self::parse(path, &content)
    }

    /// Parse file content, picking the format from the file extension
    pub fn parse(path: &str, content: &str) -> Result<Self> {
        let content = substitute_env_vars(content);

        let path_lower = path.to_lowercase();
        let config: Config = if path_lower.ends_with(".json") || path_lower.ends_with(".jsonld") {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };
        Ok(config)
    }

    /// `TRANSLATOR_ENDPOINTS` (comma separated) and `PORT` take precedence over the file
    pub fn apply_env_overrides(&mut self) {
        let endpoints = std::env::var("TRANSLATOR_ENDPOINTS").ok();
        let port = std::env::var("PORT").ok();
        self.apply_overrides(endpoints.as_deref(), port.as_deref());
    }

    /// Blank list items are dropped; a list with nothing left, or a port that
    /// does not parse, leaves the current value alone
    pub fn apply_overrides(&mut self, endpoints: Option<&str>, port: Option<&str>) {
        if let Some(list) = endpoints {
            let endpoints: Vec<Endpoint> = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(Endpoint::new)
                .collect();
            if !endpoints.is_empty() {
                self.translator.endpoints = endpoints;
            }
        }

        match port.map(|p| p.trim().parse::<u16>()) {
            Some(Ok(port)) => self.server.port = port,
            Some(Err(e)) => warn!("Ignoring PORT override: {}", e),
            None => {}
        }
    }

    pub fn validate(&self) -> Result<()> {
        let translator = &self.translator;
        if translator.endpoints.is_empty() {
            anyhow::bail!("translator.endpoints must list at least one endpoint");
        }
        for endpoint in &translator.endpoints {
            let url = endpoint.base_url();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                anyhow::bail!("Endpoint is not an http(s) URL: {}", url);
            }
        }
        if translator.attempt_timeout_ms == 0
            || translator.connect_timeout_ms == 0
            || translator.deadline_ms == 0
        {
            anyhow::bail!("translator timeouts must be greater than zero");
        }
        if translator.history_limit == 0 {
            anyhow::bail!("translator.history_limit must be greater than zero");
        }
        Ok(())
    }
}

/// Replace `${VAR_NAME}` with the variable's value; unset variables are left as written
pub fn substitute_env_vars(content: &str) -> String {
    let pattern = Regex::new(r"\$\{(\w+)\}").unwrap();
    pattern
        .replace_all(content, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}
