//! Agent profile registry.
//!
//! Each supported coding agent has a fixed directory layout describing where
//! command prompts, shared settings, and the project-memory document live.
//! The registry is static data keyed by agent identifier - layouts are tagged
//! records selected by [`AgentKind`], not a trait hierarchy, and nothing in
//! the registry mutates during a run.
//!
//! | Agent         | Commands dir         | Doc file   |
//! |---------------|----------------------|------------|
//! | claude-code   | .claude/commands     | CLAUDE.md  |
//! | cursor        | .cursor/commands     | AGENTS.md  |
//! | gemini-cli    | .gemini/commands     | GEMINI.md  |
//! | qwen-code     | .qwen/commands       | QWEN.md    |
//! | codex         | .codex/prompts       | AGENTS.md  |

use serde::{Deserialize, Serialize};

/// Agent identifiers recognized by the registry.
pub const AGENT_CLAUDE_CODE: &str = "claude-code";
pub const AGENT_CURSOR: &str = "cursor";
pub const AGENT_GEMINI_CLI: &str = "gemini-cli";
pub const AGENT_QWEN_CODE: &str = "qwen-code";
pub const AGENT_CODEX: &str = "codex";

/// All supported agent kinds, in display order.
pub const AGENT_KINDS: &[AgentKind] = &[
    AgentKind::ClaudeCode,
    AgentKind::Cursor,
    AgentKind::GeminiCli,
    AgentKind::QwenCode,
    AgentKind::Codex,
];

/// A supported target agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentKind {
    ClaudeCode,
    Cursor,
    GeminiCli,
    QwenCode,
    Codex,
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentKind::ClaudeCode => write!(f, "{}", AGENT_CLAUDE_CODE),
            AgentKind::Cursor => write!(f, "{}", AGENT_CURSOR),
            AgentKind::GeminiCli => write!(f, "{}", AGENT_GEMINI_CLI),
            AgentKind::QwenCode => write!(f, "{}", AGENT_QWEN_CODE),
            AgentKind::Codex => write!(f, "{}", AGENT_CODEX),
        }
    }
}

impl std::str::FromStr for AgentKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            AGENT_CLAUDE_CODE => Ok(AgentKind::ClaudeCode),
            AGENT_CURSOR => Ok(AgentKind::Cursor),
            AGENT_GEMINI_CLI => Ok(AgentKind::GeminiCli),
            AGENT_QWEN_CODE => Ok(AgentKind::QwenCode),
            AGENT_CODEX => Ok(AgentKind::Codex),
            _ => Err(crate::Error::InvalidInput(format!(
                "Unknown agent '{}'. Supported: {}.",
                s,
                AGENT_KINDS
                    .iter()
                    .map(|k| k.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }
}

/// Directory layout and presentation hints for one agent.
///
/// `global_commands_dir` uses a leading `~/` for home-relative paths and is
/// `None` for agents without a per-user commands directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentLayout {
    /// Agent identifier this layout belongs to.
    pub kind: AgentKind,
    /// Project-relative directory for command prompt files.
    pub commands_dir: &'static str,
    /// Per-user commands directory for global installs, if the agent has one.
    pub global_commands_dir: Option<&'static str>,
    /// Project-relative directory for agent metadata (settings, state).
    pub agent_dir: &'static str,
    /// File name of the project-memory document at the project root.
    pub doc_file: &'static str,
    /// What the agent calls its installed commands ("slash commands", etc).
    pub command_label: &'static str,
    /// Short post-install guide lines shown after a successful deploy.
    pub completion_guide: &'static [&'static str],
}

/// Look up the layout record for an agent.
pub fn layout(kind: AgentKind) -> AgentLayout {
    match kind {
        AgentKind::ClaudeCode => AgentLayout {
            kind,
            commands_dir: ".claude/commands",
            global_commands_dir: Some("~/.claude/commands"),
            agent_dir: ".claude",
            doc_file: "CLAUDE.md",
            command_label: "slash commands",
            completion_guide: &[
                "Run /kiro:spec-init in Claude Code to start a spec.",
                "Shared settings live under the kiro directory.",
            ],
        },
        AgentKind::Cursor => AgentLayout {
            kind,
            commands_dir: ".cursor/commands",
            global_commands_dir: None,
            agent_dir: ".cursor",
            doc_file: "AGENTS.md",
            command_label: "custom commands",
            completion_guide: &[
                "Open Cursor and invoke the kiro commands from the command palette.",
            ],
        },
        AgentKind::GeminiCli => AgentLayout {
            kind,
            commands_dir: ".gemini/commands",
            global_commands_dir: Some("~/.gemini/commands"),
            agent_dir: ".gemini",
            doc_file: "GEMINI.md",
            command_label: "custom commands",
            completion_guide: &["Run gemini and invoke /kiro:spec-init to start a spec."],
        },
        AgentKind::QwenCode => AgentLayout {
            kind,
            commands_dir: ".qwen/commands",
            global_commands_dir: Some("~/.qwen/commands"),
            agent_dir: ".qwen",
            doc_file: "QWEN.md",
            command_label: "custom commands",
            completion_guide: &["Run qwen and invoke /kiro:spec-init to start a spec."],
        },
        AgentKind::Codex => AgentLayout {
            kind,
            commands_dir: ".codex/prompts",
            global_commands_dir: Some("~/.codex/prompts"),
            agent_dir: ".codex",
            doc_file: "AGENTS.md",
            command_label: "prompts",
            completion_guide: &["Run codex and invoke the kiro prompts to start a spec."],
        },
    }
}

/// Get all layouts in display order.
pub fn all_layouts() -> Vec<AgentLayout> {
    AGENT_KINDS.iter().map(|k| layout(*k)).collect()
}
