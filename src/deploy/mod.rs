//! Deployment planning and execution.
//!
//! The pipeline turns an artifact manifest into concrete file writes:
//!
//! 1. [`planner`] resolves manifest placeholders into an ordered plan.
//! 2. [`ops`] renders each artifact and classifies it against the real
//!    filesystem (existing? byte-identical?).
//! 3. [`policy`] aggregates per-category summaries and derives an execution
//!    policy (force / skip / prompt) from the global overwrite setting.
//! 4. [`conflict`] resolves prompt-policy conflicts interactively, with
//!    sticky per-category decisions.
//! 5. [`executor`] applies every operation, writing backups before
//!    overwrites, and tallies written/skipped counts.
//!
//! A dry run stops after step 3 and renders a [`report`] instead.

pub mod conflict;
pub mod executor;
pub mod ops;
pub mod planner;
pub mod policy;
pub mod report;

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::agents::AgentLayout;

/// Category identifier of the project-memory document. Append-on-conflict is
/// only offered for this category.
pub const CATEGORY_DOC: &str = "doc";

/// Languages the shipped templates are localized for.
pub const LANGUAGES: &[Language] = &[Language::En, Language::Ja, Language::ZhTw];

/// Template localization language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Language {
    En,
    Ja,
    ZhTw,
}

impl Language {
    /// Language code used in template paths and manifests.
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ja => "ja",
            Language::ZhTw => "zh-TW",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for Language {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "en" => Ok(Language::En),
            "ja" => Ok(Language::Ja),
            "zh-tw" => Ok(Language::ZhTw),
            _ => Err(crate::Error::InvalidInput(format!(
                "Unknown language '{}'. Supported: en, ja, zh-TW.",
                s
            ))),
        }
    }
}

/// Global overwrite setting for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverwritePolicy {
    /// Ask per conflicting file (degrades to skip without a terminal).
    Prompt,
    /// Leave every conflicting file untouched.
    Skip,
    /// Overwrite every conflicting file.
    Force,
}

impl std::fmt::Display for OverwritePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverwritePolicy::Prompt => write!(f, "prompt"),
            OverwritePolicy::Skip => write!(f, "skip"),
            OverwritePolicy::Force => write!(f, "force"),
        }
    }
}

impl std::str::FromStr for OverwritePolicy {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "prompt" => Ok(OverwritePolicy::Prompt),
            "skip" => Ok(OverwritePolicy::Skip),
            "force" => Ok(OverwritePolicy::Force),
            _ => Err(crate::Error::InvalidInput(format!(
                "Unknown overwrite mode: '{}'. Expected 'prompt', 'skip' or 'force'.",
                s
            ))),
        }
    }
}

/// Resolved inputs for placeholder substitution. Immutable for the duration
/// of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionContext {
    /// Commands directory (project-relative, or absolute for global installs).
    pub commands_dir: String,
    /// Agent metadata directory (project-relative).
    pub agent_dir: String,
    /// Project-memory document file name.
    pub doc_file: String,
    /// Selected template language.
    pub lang: Language,
    /// Root directory name for shared kiro settings and specs.
    pub kiro_dir: String,
    /// Whether commands target the per-user global directory.
    pub global_install: bool,
}

impl ResolutionContext {
    /// Build a context from an agent layout and run inputs.
    ///
    /// A global install requires the layout to define a global commands
    /// directory and the home directory to be resolvable; either missing is a
    /// [`crate::Error::Config`].
    pub fn new(
        layout: &AgentLayout,
        lang: Language,
        kiro_dir: impl Into<String>,
        global_install: bool,
    ) -> Result<Self> {
        let commands_dir = if global_install {
            let global = layout.global_commands_dir.ok_or_else(|| {
                crate::Error::Config(format!(
                    "Agent '{}' does not support global command installs",
                    layout.kind
                ))
            })?;
            expand_home(global)?
        } else {
            layout.commands_dir.to_string()
        };

        Ok(Self {
            commands_dir,
            agent_dir: layout.agent_dir.to_string(),
            doc_file: layout.doc_file.to_string(),
            lang,
            kiro_dir: kiro_dir.into(),
            global_install,
        })
    }
}

/// Expand a leading `~/` to the user's home directory.
fn expand_home(path: &str) -> Result<String> {
    match path.strip_prefix("~/") {
        Some(rest) => {
            let home = dirs::home_dir().ok_or_else(|| {
                crate::Error::Config("Could not determine home directory".to_string())
            })?;
            Ok(home.join(rest).to_string_lossy().into_owned())
        }
        None => Ok(path.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{AgentKind, layout};
    use std::str::FromStr;

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::En.code(), "en");
        assert_eq!(Language::ZhTw.code(), "zh-TW");
        assert_eq!(Language::from_str("ZH-TW").unwrap(), Language::ZhTw);
        assert!(Language::from_str("fr").is_err());
    }

    #[test]
    fn test_overwrite_policy_parse() {
        assert_eq!(
            OverwritePolicy::from_str("force").unwrap(),
            OverwritePolicy::Force
        );
        assert!(OverwritePolicy::from_str("ask").is_err());
    }

    #[test]
    fn test_context_project_install() {
        let layout = layout(AgentKind::ClaudeCode);
        let ctx = ResolutionContext::new(&layout, Language::En, ".kiro", false).unwrap();
        assert_eq!(ctx.commands_dir, ".claude/commands");
        assert_eq!(ctx.doc_file, "CLAUDE.md");
        assert!(!ctx.global_install);
    }

    #[test]
    fn test_context_global_install_expands_home() {
        let layout = layout(AgentKind::ClaudeCode);
        let ctx = ResolutionContext::new(&layout, Language::En, ".kiro", true).unwrap();
        assert!(!ctx.commands_dir.starts_with("~/"));
        assert!(ctx.commands_dir.ends_with(".claude/commands"));
    }

    #[test]
    fn test_context_global_install_unsupported() {
        let layout = layout(AgentKind::Cursor);
        let err = ResolutionContext::new(&layout, Language::En, ".kiro", true).unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }
}
