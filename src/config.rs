pub mod raw_config;

use std::{
    io,
    path::PathBuf,
    time::Duration,
};

pub use raw_config::RawConfig;
use serde::{Deserialize, Deserializer, Serialize};

const APP_DIR: &str = "typeswitch";
const CONFIG_FILE: &str = "config.toml";

/// Where the semantic fallback runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Model {
    Embedded,
    Api,
}

/// How much of the typed context a polish pass covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolishScope {
    /// Everything typed since the last line reset.
    Line,
    /// Only the text after the last sentence boundary.
    LastBoundary,
}

/// Validated runtime configuration. Construct via deserialization or
/// [`Config::default`]; fields are only reachable through accessors so
/// the validation in [`TryFrom<RawConfig>`] cannot be bypassed.
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    enabled: bool,
    languages: Vec<String>,
    model: Model,
    api_url: String,
    ai_timeout_ms: u64,
    confidence_threshold: f64,
    phrase_idle_delay_ms: u64,
    polish_scope: PolishScope,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            languages: vec!["en".to_string(), "ru".to_string()],
            model: Model::Embedded,
            api_url: "http://localhost:8080/v1/correct".to_string(),
            ai_timeout_ms: 100,
            confidence_threshold: 0.6,
            phrase_idle_delay_ms: 350,
            polish_scope: PolishScope::Line,
        }
    }
}

impl TryFrom<RawConfig> for Config {
    type Error = String;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        raw.validate()?;

        Ok(Self {
            enabled: raw.enabled,
            languages: raw.languages,
            model: raw.model,
            api_url: raw.api_url,
            ai_timeout_ms: raw.ai_timeout_ms,
            confidence_threshold: raw.confidence_threshold,
            phrase_idle_delay_ms: raw.phrase_idle_delay_ms,
            polish_scope: raw.polish_scope,
        })
    }
}

impl<'de> Deserialize<'de> for Config {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawConfig::deserialize(deserializer)?;
        Self::try_from(raw).map_err(serde::de::Error::custom)
    }
}

impl Config {
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, value: bool) {
        self.enabled = value;
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn model(&self) -> Model {
        self.model
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn ai_timeout(&self) -> Duration {
        Duration::from_millis(self.ai_timeout_ms)
    }

    pub fn confidence_threshold(&self) -> f64 {
        self.confidence_threshold
    }

    pub fn phrase_idle_delay(&self) -> Duration {
        Duration::from_millis(self.phrase_idle_delay_ms)
    }

    pub fn polish_scope(&self) -> PolishScope {
        self.polish_scope
    }
}

pub fn config_path() -> io::Result<PathBuf> {
    Ok(base_dir("XDG_CONFIG_HOME", ".config")?
        .join(APP_DIR)
        .join(CONFIG_FILE))
}

/// Directory for learned rules and the history window.
pub fn state_dir() -> io::Result<PathBuf> {
    Ok(base_dir("XDG_STATE_HOME", ".local/state")?.join(APP_DIR))
}

fn base_dir(env_var: &str, home_fallback: &str) -> io::Result<PathBuf> {
    if let Some(dir) = std::env::var_os(env_var) {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }

    let home = std::env::var_os("HOME")
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "HOME is not set"))?;
    Ok(PathBuf::from(home).join(home_fallback))
}

fn confy_err(e: confy::ConfyError) -> io::Error {
    io::Error::other(e)
}

pub fn load() -> io::Result<Config> {
    confy::load_path(config_path()?).map_err(confy_err)
}

pub fn save(cfg: &Config) -> io::Result<()> {
    confy::store_path(config_path()?, cfg).map_err(confy_err)
}
