/// Translate interface - wire types shared with the remote translation service

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::DispatchError;

/// Context tag sent with every request when none is configured
pub const DEFAULT_CONTEXT: &str = "neutral";

/// Body of `POST /translate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub text: String,
    pub target_lang: String,
    pub context: String,
}

impl TranslationRequest {
    /// JSON body sent to every endpoint of a dispatch call
    pub fn to_json_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

/// Body of a successful `POST /translate` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationResponse {
    pub translation: String,
}

/// Which language of the pair is the translation target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// source -> target
    #[default]
    Forward,
    /// target -> source
    Reversed,
}

impl Direction {
    pub fn toggle(self) -> Self {
        match self {
            Direction::Forward => Direction::Reversed,
            Direction::Reversed => Direction::Forward,
        }
    }
}

/// The two languages a translator works between
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagePair {
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default = "default_target")]
    pub target: String,
}

fn default_source() -> String {
    "English".to_string()
}

fn default_target() -> String {
    "Danish".to_string()
}

impl Default for LanguagePair {
    fn default() -> Self {
        Self {
            source: default_source(),
            target: default_target(),
        }
    }
}

impl LanguagePair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// Language the text is translated into
    pub fn target_for(&self, direction: Direction) -> &str {
        match direction {
            Direction::Forward => &self.target,
            Direction::Reversed => &self.source,
        }
    }

    /// Language the input text is expected to be in
    pub fn source_for(&self, direction: Direction) -> &str {
        match direction {
            Direction::Forward => &self.source,
            Direction::Reversed => &self.target,
        }
    }

    /// e.g. "English to Danish"
    pub fn label(&self, direction: Direction) -> String {
        format!("{} to {}", self.source_for(direction), self.target_for(direction))
    }
}

/// Reachability of one configured endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointHealth {
    pub url: String,
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Anything that can turn text into its translation for a direction
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into the target language selected by `direction`
    async fn translate(&self, text: &str, direction: Direction) -> Result<String, DispatchError>;

    /// Language pair this translator serves
    fn languages(&self) -> &LanguagePair;

    /// Check the backing endpoints, if there are any
    async fn endpoint_health(&self) -> Vec<EndpointHealth> {
        Vec::new()
    }
}
