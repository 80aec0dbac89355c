//! Task kinds: the closed enum behind context-menu actions and chat input.
//!
//! Each variant carries its own strongly-typed configuration and maps to
//! exactly one capability kind. The older context-menu ids (`cover-letter`,
//! `email`, `social-post`) are preserved as writer-backed presets so both
//! menu generations dispatch through the same switch.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::capability::{CapabilityKind, LanguageTag, RewriteTone, SummaryStyle};

/// Writer-backed preset tasks kept from the earlier context-menu layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PresetKind {
    CoverLetter,
    Email,
    SocialPost,
}

impl PresetKind {
    /// Instruction preamble prepended to the selected text.
    pub fn instruction(self) -> &'static str {
        match self {
            PresetKind::CoverLetter => {
                "Write a professional cover letter based on the following:"
            }
            PresetKind::Email => "Write a professional email based on the following:",
            PresetKind::SocialPost => {
                "Write an engaging social media post based on the following:"
            }
        }
    }
}

impl fmt::Display for PresetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresetKind::CoverLetter => write!(f, "cover-letter"),
            PresetKind::Email => write!(f, "email"),
            PresetKind::SocialPost => write!(f, "social-post"),
        }
    }
}

/// A requested task, as triggered from the context menu or chat input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "task", rename_all = "snake_case")]
pub enum TaskKind {
    Rephrase {
        #[serde(default)]
        tone: RewriteTone,
    },
    Summarize {
        #[serde(default)]
        style: SummaryStyle,
    },
    Write,
    Translate {
        /// Absent until the user picks a target in the language-selection
        /// step that follows a translate context-menu action.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<LanguageTag>,
    },
    Custom,
    Preset {
        preset: PresetKind,
    },
}

impl TaskKind {
    /// The capability a task is served by.
    ///
    /// Translate additionally consults the language detector before the
    /// translator session is created; that step is owned by the dispatcher.
    pub fn capability(&self) -> CapabilityKind {
        match self {
            TaskKind::Rephrase { .. } => CapabilityKind::Rewriter,
            TaskKind::Summarize { .. } => CapabilityKind::Summarizer,
            TaskKind::Write | TaskKind::Custom | TaskKind::Preset { .. } => CapabilityKind::Writer,
            TaskKind::Translate { .. } => CapabilityKind::Translator,
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Rephrase { .. } => write!(f, "rephrase"),
            TaskKind::Summarize { .. } => write!(f, "summarize"),
            TaskKind::Write => write!(f, "write"),
            TaskKind::Translate { .. } => write!(f, "translate"),
            TaskKind::Custom => write!(f, "custom"),
            TaskKind::Preset { preset } => write!(f, "{preset}"),
        }
    }
}

impl FromStr for TaskKind {
    type Err = String;

    /// Parse a context-menu item id, including the legacy aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rephrase" => Ok(TaskKind::Rephrase {
                tone: RewriteTone::default(),
            }),
            "summarize" => Ok(TaskKind::Summarize {
                style: SummaryStyle::default(),
            }),
            "write" => Ok(TaskKind::Write),
            "translate" => Ok(TaskKind::Translate { target: None }),
            "custom" => Ok(TaskKind::Custom),
            "cover-letter" => Ok(TaskKind::Preset {
                preset: PresetKind::CoverLetter,
            }),
            "email" => Ok(TaskKind::Preset {
                preset: PresetKind::Email,
            }),
            "social-post" => Ok(TaskKind::Preset {
                preset: PresetKind::SocialPost,
            }),
            other => Err(format!("unknown task kind: '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_mapping() {
        assert_eq!(
            "rephrase".parse::<TaskKind>().unwrap().capability(),
            CapabilityKind::Rewriter
        );
        assert_eq!(
            "summarize".parse::<TaskKind>().unwrap().capability(),
            CapabilityKind::Summarizer
        );
        assert_eq!(
            "write".parse::<TaskKind>().unwrap().capability(),
            CapabilityKind::Writer
        );
        assert_eq!(
            "custom".parse::<TaskKind>().unwrap().capability(),
            CapabilityKind::Writer
        );
        assert_eq!(
            "translate".parse::<TaskKind>().unwrap().capability(),
            CapabilityKind::Translator
        );
    }

    #[test]
    fn test_legacy_aliases_map_to_writer_presets() {
        for (id, preset) in [
            ("cover-letter", PresetKind::CoverLetter),
            ("email", PresetKind::Email),
            ("social-post", PresetKind::SocialPost),
        ] {
            let task: TaskKind = id.parse().unwrap();
            assert_eq!(task, TaskKind::Preset { preset });
            assert_eq!(task.capability(), CapabilityKind::Writer);
            assert_eq!(task.to_string(), id);
        }
    }

    #[test]
    fn test_unknown_task_rejected() {
        assert!("polish".parse::<TaskKind>().is_err());
    }

    #[test]
    fn test_task_serde_tagged() {
        let task = TaskKind::Translate {
            target: Some(LanguageTag::new("fr").unwrap()),
        };
        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"task\":\"translate\""));
        assert!(json.contains("\"fr\""));
        let parsed: TaskKind = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, task);
    }
}
