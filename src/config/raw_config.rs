use serde::Deserialize;

use crate::config::{Model, PolishScope};
use crate::domain::Lang;

const MIN_PHRASE_IDLE_MS: u64 = 300;
const MAX_PHRASE_IDLE_MS: u64 = 500;

fn default_enabled() -> bool {
    true
}

fn default_languages() -> Vec<String> {
    vec!["en".to_string(), "ru".to_string()]
}

fn default_model() -> Model {
    Model::Embedded
}

fn default_api_url() -> String {
    "http://localhost:8080/v1/correct".to_string()
}

fn default_ai_timeout_ms() -> u64 {
    100
}

fn default_confidence_threshold() -> f64 {
    0.6
}

fn default_phrase_idle_delay_ms() -> u64 {
    350
}

fn default_polish_scope() -> PolishScope {
    PolishScope::Line
}

/// Unvalidated mirror of [`Config`](crate::config::Config). Every field
/// has a serde default so a partial file deserializes cleanly before
/// validation runs.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_languages")]
    pub languages: Vec<String>,

    #[serde(default = "default_model")]
    pub model: Model,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_ai_timeout_ms")]
    pub ai_timeout_ms: u64,

    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,

    #[serde(default = "default_phrase_idle_delay_ms")]
    pub phrase_idle_delay_ms: u64,

    #[serde(default = "default_polish_scope")]
    pub polish_scope: PolishScope,
}

impl RawConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.languages.is_empty() {
            return Err("languages must name at least one language".to_string());
        }
        for code in &self.languages {
            if Lang::from_code(code).is_none() {
                return Err(format!("unknown language code '{code}'"));
            }
        }

        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(format!(
                "confidence_threshold {} is outside 0.0..=1.0",
                self.confidence_threshold
            ));
        }

        if !(MIN_PHRASE_IDLE_MS..=MAX_PHRASE_IDLE_MS).contains(&self.phrase_idle_delay_ms) {
            return Err(format!(
                "phrase_idle_delay_ms {} is outside {MIN_PHRASE_IDLE_MS}..={MAX_PHRASE_IDLE_MS}",
                self.phrase_idle_delay_ms
            ));
        }

        if self.ai_timeout_ms == 0 {
            return Err("ai_timeout_ms must be positive".to_string());
        }

        if self.model == Model::Api && self.api_url.trim().is_empty() {
            return Err("api_url is required when model is \"api\"".to_string());
        }

        Ok(())
    }
}
