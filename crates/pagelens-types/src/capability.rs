//! Capability kinds, availability states, and per-kind configurations.
//!
//! A "capability" is one of the host runtime's on-device AI features
//! (writer, rewriter, summarizer, translator, language detector). Each kind
//! carries its own strongly-typed configuration, fixed at session creation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The five on-device AI capabilities Pagelens orchestrates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    Writer,
    Rewriter,
    Summarizer,
    Translator,
    LanguageDetector,
}

impl CapabilityKind {
    /// All kinds, in probe order.
    pub const ALL: [CapabilityKind; 5] = [
        CapabilityKind::Writer,
        CapabilityKind::Rewriter,
        CapabilityKind::Summarizer,
        CapabilityKind::Translator,
        CapabilityKind::LanguageDetector,
    ];
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityKind::Writer => write!(f, "writer"),
            CapabilityKind::Rewriter => write!(f, "rewriter"),
            CapabilityKind::Summarizer => write!(f, "summarizer"),
            CapabilityKind::Translator => write!(f, "translator"),
            CapabilityKind::LanguageDetector => write!(f, "language_detector"),
        }
    }
}

impl FromStr for CapabilityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "writer" => Ok(CapabilityKind::Writer),
            "rewriter" => Ok(CapabilityKind::Rewriter),
            "summarizer" => Ok(CapabilityKind::Summarizer),
            "translator" => Ok(CapabilityKind::Translator),
            "language_detector" => Ok(CapabilityKind::LanguageDetector),
            other => Err(format!("invalid capability kind: '{other}'")),
        }
    }
}

/// Availability of a capability as reported by the host runtime.
///
/// `AfterDownload` means usable-but-slow: the first request triggers a
/// one-time model download whose progress is surfaced to the UI verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Availability {
    Unavailable,
    Available,
    AfterDownload,
}

impl Availability {
    /// Anything the runtime does not flag as unavailable counts as usable.
    pub fn is_usable(self) -> bool {
        !matches!(self, Availability::Unavailable)
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Availability::Unavailable => write!(f, "unavailable"),
            Availability::Available => write!(f, "available"),
            Availability::AfterDownload => write!(f, "after-download"),
        }
    }
}

/// Writer tone options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriterTone {
    Formal,
    #[default]
    Neutral,
    Casual,
}

/// Rewriter tone adjustment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RewriteTone {
    #[default]
    AsIs,
    MoreFormal,
    MoreCasual,
}

/// Desired output length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputLength {
    Short,
    #[default]
    Medium,
    Long,
}

/// Output formatting for writer output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    PlainText,
    #[default]
    Markdown,
}

/// Summary style options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SummaryStyle {
    #[default]
    KeyPoints,
    Tldr,
    Teaser,
    Headline,
}

/// A BCP-47 language tag (e.g., "en", "fr", "pt-BR").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageTag(String);

impl LanguageTag {
    /// Parse and lightly validate a language tag.
    ///
    /// Accepts ASCII letters, digits, and hyphens; rejects empty input.
    /// Full BCP-47 grammar validation is left to the runtime.
    pub fn new(tag: impl Into<String>) -> Result<Self, String> {
        let tag = tag.into();
        let valid = !tag.is_empty()
            && tag.len() <= 35
            && tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        if valid {
            Ok(Self(tag))
        } else {
            Err(format!("invalid language tag: '{tag}'"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for LanguageTag {
    /// English, the fallback when detection fails and no default is
    /// configured.
    fn default() -> Self {
        Self("en".to_string())
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LanguageTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Configuration fixed at capability session creation.
///
/// One variant per [`CapabilityKind`]; the dispatch switch matches these
/// exhaustively, so adding a kind without a config is a compile error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CapabilityConfig {
    Writer {
        #[serde(default)]
        tone: WriterTone,
        #[serde(default)]
        length: OutputLength,
        #[serde(default)]
        format: OutputFormat,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        shared_context: Option<String>,
    },
    Rewriter {
        #[serde(default)]
        tone: RewriteTone,
        #[serde(default)]
        length: OutputLength,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        shared_context: Option<String>,
    },
    Summarizer {
        #[serde(default)]
        style: SummaryStyle,
        #[serde(default)]
        length: OutputLength,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        shared_context: Option<String>,
    },
    Translator {
        source: LanguageTag,
        target: LanguageTag,
    },
    LanguageDetector,
}

impl CapabilityConfig {
    /// Which capability kind this configuration belongs to.
    pub fn kind(&self) -> CapabilityKind {
        match self {
            CapabilityConfig::Writer { .. } => CapabilityKind::Writer,
            CapabilityConfig::Rewriter { .. } => CapabilityKind::Rewriter,
            CapabilityConfig::Summarizer { .. } => CapabilityKind::Summarizer,
            CapabilityConfig::Translator { .. } => CapabilityKind::Translator,
            CapabilityConfig::LanguageDetector => CapabilityKind::LanguageDetector,
        }
    }

    /// Default writer configuration (markdown output, neutral tone).
    pub fn writer_default() -> Self {
        CapabilityConfig::Writer {
            tone: WriterTone::default(),
            length: OutputLength::default(),
            format: OutputFormat::default(),
            shared_context: None,
        }
    }

    /// Rewriter configuration for a given tone adjustment.
    pub fn rewriter(tone: RewriteTone) -> Self {
        CapabilityConfig::Rewriter {
            tone,
            length: OutputLength::default(),
            shared_context: None,
        }
    }

    /// Summarizer configuration for a given style.
    pub fn summarizer(style: SummaryStyle) -> Self {
        CapabilityConfig::Summarizer {
            style,
            length: OutputLength::default(),
            shared_context: None,
        }
    }
}

/// A single request against a capability session.
///
/// `context` carries the page-context preamble when page-grounded chat is
/// enabled; the model sees the context first, then the literal prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            context: None,
        }
    }

    pub fn with_context(prompt: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            context: Some(context.into()),
        }
    }

    /// The text actually sent to the model: context (if any), then prompt.
    pub fn full_prompt(&self) -> String {
        match &self.context {
            Some(context) => format!("{context}\n\n{}", self.prompt),
            None => self.prompt.clone(),
        }
    }
}

/// Errors from capability runtime operations.
#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    #[error("capability '{kind}' is unavailable on this device")]
    Unavailable { kind: CapabilityKind },

    #[error("failed to create '{kind}' session: {message}")]
    Creation {
        kind: CapabilityKind,
        message: String,
    },

    #[error("request error: {0}")]
    Request(String),

    #[error("stream error: {0}")]
    Stream(String),

    #[error("session was closed by a reset")]
    SessionClosed,

    #[error("invalid language: {0}")]
    InvalidLanguage(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_kind_roundtrip() {
        for kind in CapabilityKind::ALL {
            let s = kind.to_string();
            let parsed: CapabilityKind = s.parse().unwrap();
            assert_eq!(kind, parsed);
        }
    }

    #[test]
    fn test_availability_serde_kebab_case() {
        let json = serde_json::to_string(&Availability::AfterDownload).unwrap();
        assert_eq!(json, "\"after-download\"");
        let parsed: Availability = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Availability::AfterDownload);
    }

    #[test]
    fn test_availability_usable() {
        assert!(Availability::Available.is_usable());
        assert!(Availability::AfterDownload.is_usable());
        assert!(!Availability::Unavailable.is_usable());
    }

    #[test]
    fn test_language_tag_validation() {
        assert!(LanguageTag::new("en").is_ok());
        assert!(LanguageTag::new("pt-BR").is_ok());
        assert!(LanguageTag::new("").is_err());
        assert!(LanguageTag::new("no spaces").is_err());
    }

    #[test]
    fn test_config_kind_mapping() {
        assert_eq!(
            CapabilityConfig::writer_default().kind(),
            CapabilityKind::Writer
        );
        assert_eq!(
            CapabilityConfig::rewriter(RewriteTone::MoreFormal).kind(),
            CapabilityKind::Rewriter
        );
        assert_eq!(
            CapabilityConfig::LanguageDetector.kind(),
            CapabilityKind::LanguageDetector
        );
    }

    #[test]
    fn test_config_serde_tagged() {
        let config = CapabilityConfig::summarizer(SummaryStyle::Tldr);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"kind\":\"summarizer\""));
        assert!(json.contains("\"style\":\"tldr\""));
        let parsed: CapabilityConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_full_prompt_ordering() {
        let request = GenerationRequest::with_context("what is this page about?", "Page text");
        assert_eq!(request.full_prompt(), "Page text\n\nwhat is this page about?");

        let bare = GenerationRequest::new("hello");
        assert_eq!(bare.full_prompt(), "hello");
    }
}
