//! Global configuration for Pagelens.
//!
//! `AssistantConfig` represents the top-level `config.toml` controlling the
//! local runtime endpoint, per-capability model names, context word budgets,
//! language defaults, and the server bind address. All fields have sensible
//! defaults so an empty file (or no file at all) is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::capability::CapabilityKind;
use crate::context::{MAX_CONTEXT_WORDS, MIN_CONTEXT_WORDS};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub context: ContextConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Local model runtime (OpenAI-compatible endpoint) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Base URL of the on-device runtime.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model served for each capability. The runtime multiplexes one local
    /// model across capabilities by default; override per capability to
    /// pin a specialist model.
    #[serde(default)]
    pub models: ModelMap,
}

fn default_base_url() -> String {
    "http://localhost:11434/v1".to_string()
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            models: ModelMap::default(),
        }
    }
}

/// Per-capability model names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMap {
    #[serde(default = "default_model")]
    pub writer: String,
    #[serde(default = "default_model")]
    pub rewriter: String,
    #[serde(default = "default_model")]
    pub summarizer: String,
    #[serde(default = "default_model")]
    pub translator: String,
    #[serde(default = "default_model")]
    pub language_detector: String,
}

fn default_model() -> String {
    "gemma3n".to_string()
}

impl Default for ModelMap {
    fn default() -> Self {
        Self {
            writer: default_model(),
            rewriter: default_model(),
            summarizer: default_model(),
            translator: default_model(),
            language_detector: default_model(),
        }
    }
}

impl ModelMap {
    /// Model name serving the given capability.
    pub fn for_kind(&self, kind: CapabilityKind) -> &str {
        match kind {
            CapabilityKind::Writer => &self.writer,
            CapabilityKind::Rewriter => &self.rewriter,
            CapabilityKind::Summarizer => &self.summarizer,
            CapabilityKind::Translator => &self.translator,
            CapabilityKind::LanguageDetector => &self.language_detector,
        }
    }
}

/// Page-context extraction budgets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Maximum snapshot size in words.
    #[serde(default = "default_max_words")]
    pub max_words: usize,

    /// Snapshots below this word count are omitted from chat preambles.
    #[serde(default = "default_min_words")]
    pub min_words: usize,
}

fn default_max_words() -> usize {
    MAX_CONTEXT_WORDS
}

fn default_min_words() -> usize {
    MIN_CONTEXT_WORDS
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_words: default_max_words(),
            min_words: default_min_words(),
        }
    }
}

/// Chat behavior defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Source language assumed when auto-detection fails.
    #[serde(default = "default_language")]
    pub default_source_language: String,

    /// Whether new sessions start with page-context mode on.
    #[serde(default = "default_true")]
    pub page_context_enabled: bool,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_source_language: default_language(),
            page_context_enabled: default_true(),
        }
    }
}

/// HTTP/WebSocket server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:8471".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config: AssistantConfig = toml::from_str("").unwrap();
        assert_eq!(config.runtime.base_url, "http://localhost:11434/v1");
        assert_eq!(config.context.max_words, MAX_CONTEXT_WORDS);
        assert_eq!(config.context.min_words, MIN_CONTEXT_WORDS);
        assert_eq!(config.chat.default_source_language, "en");
        assert!(config.chat.page_context_enabled);
        assert_eq!(config.server.bind, "127.0.0.1:8471");
    }

    #[test]
    fn test_partial_toml_overrides() {
        let toml_str = r#"
[runtime]
base_url = "http://localhost:1234/v1"

[runtime.models]
summarizer = "qwen3:4b"

[context]
max_words = 1500

[chat]
page_context_enabled = false
"#;
        let config: AssistantConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.runtime.base_url, "http://localhost:1234/v1");
        assert_eq!(
            config.runtime.models.for_kind(CapabilityKind::Summarizer),
            "qwen3:4b"
        );
        // Unspecified models keep the default.
        assert_eq!(config.runtime.models.for_kind(CapabilityKind::Writer), "gemma3n");
        assert_eq!(config.context.max_words, 1500);
        assert!(!config.chat.page_context_enabled);
    }

    #[test]
    fn test_model_map_covers_every_kind() {
        let models = ModelMap::default();
        for kind in CapabilityKind::ALL {
            assert!(!models.for_kind(kind).is_empty());
        }
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = AssistantConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AssistantConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.server.bind, config.server.bind);
        assert_eq!(parsed.context.min_words, config.context.min_words);
    }
}
