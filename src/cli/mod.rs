//! CLI argument definitions for sdd.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::agents::AgentKind;
use crate::deploy::{Language, OverwritePolicy};

/// Sdd - scaffold spec-driven development artifacts for AI coding agents.
///
/// Deploys command prompts, shared kiro settings, and a project-memory
/// document into a project tree, per agent profile and language.
#[derive(Parser, Debug)]
#[command(name = "sdd")]
#[command(
    author,
    version,
    long_version = concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("SDD_GIT_COMMIT"), " ", env!("SDD_BUILD_TIMESTAMP"), ")"
    ),
    about = "Scaffold spec-driven development artifacts into AI agent projects",
    long_about = None
)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Run as if sdd was started in <path> instead of the current directory.
    /// The path must exist. Can also be set via SDD_PROJECT environment variable.
    #[arg(short = 'C', long = "project", global = true, env = "SDD_PROJECT")]
    pub project_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deploy artifacts into the project tree
    Deploy {
        /// Target agent profile
        #[arg(short, long, default_value = "claude-code")]
        agent: AgentKind,

        /// Template language (en, ja, zh-TW); untranslated templates fall back to en
        #[arg(short, long, default_value = "en")]
        lang: Language,

        /// Root directory for shared settings and specs
        #[arg(long = "kiro-dir", default_value = ".kiro")]
        kiro_dir: String,

        /// What to do with existing files that differ (prompt, skip, force)
        #[arg(short, long, default_value = "prompt")]
        overwrite: OverwritePolicy,

        /// Install commands into the agent's per-user directory instead of the project
        #[arg(short, long)]
        global: bool,

        /// Back up files before overwriting them
        #[arg(short, long)]
        backup: bool,

        /// Backup destination (default: <project>/.sdd-backup/<timestamp>)
        #[arg(long = "backup-dir", requires = "backup")]
        backup_dir: Option<PathBuf>,

        /// Report planned actions without writing anything
        #[arg(long = "dry-run")]
        dry_run: bool,

        /// Never prompt, even on a terminal (conflicts are skipped)
        #[arg(long = "no-input")]
        no_input: bool,

        /// Deploy from a custom manifest file instead of the embedded payload
        #[arg(long, requires = "templates")]
        manifest: Option<PathBuf>,

        /// Template directory for a custom manifest
        #[arg(long, requires = "manifest")]
        templates: Option<PathBuf>,
    },

    /// List supported agent profiles and their layouts
    Agents,
}
