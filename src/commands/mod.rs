//! Command implementations for the sdd CLI.
//!
//! This module wires the deployment pipeline together: manifest -> plan ->
//! operations -> summaries -> policies (-> conflict prompts) -> executor,
//! and shapes the outcome for JSON or human output.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::Result;
use crate::agents::{self, AgentKind};
use crate::deploy::conflict::{ConflictHandler, ConflictSession, PromptHandler};
use crate::deploy::executor::{self, ExecOptions, FileError};
use crate::deploy::ops::build_operations;
use crate::deploy::planner::{Manifest, Plan};
use crate::deploy::policy::{self, CategoryPolicy};
use crate::deploy::report::DryRunReport;
use crate::deploy::{Language, OverwritePolicy, ResolutionContext};
use crate::templates::{DEFAULT_MANIFEST, DirTemplates, EmbeddedTemplates, TemplateStore};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait CommandResult {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

/// Inputs for one deploy run, assembled by the CLI layer.
#[derive(Debug)]
pub struct DeployArgs {
    pub agent: AgentKind,
    pub lang: Language,
    pub kiro_dir: String,
    pub overwrite: OverwritePolicy,
    pub global: bool,
    pub backup: bool,
    pub backup_dir: Option<PathBuf>,
    pub dry_run: bool,
    pub no_input: bool,
    pub manifest: Option<PathBuf>,
    pub templates: Option<PathBuf>,
}

/// Outcome of `sdd deploy`.
pub enum DeployOutput {
    DryRun(DryRunReport),
    Applied(DeploySummary),
}

/// Final tallies of an applied run.
#[derive(Debug, Serialize)]
pub struct DeploySummary {
    pub agent: String,
    pub written: usize,
    pub skipped: usize,
    pub errors: Vec<FileError>,
    pub warnings: Vec<String>,
    pub backup_dir: Option<String>,
    pub guide: Vec<String>,
}

impl CommandResult for DeployOutput {
    fn to_json(&self) -> String {
        let json = match self {
            DeployOutput::DryRun(report) => serde_json::to_string(report),
            DeployOutput::Applied(summary) => serde_json::to_string(summary),
        };
        json.unwrap_or_else(|_| "{}".to_string())
    }

    fn to_human(&self) -> String {
        match self {
            DeployOutput::DryRun(report) => report.to_human(),
            DeployOutput::Applied(summary) => {
                let mut out = format!(
                    "Deployed for {}: {} written, {} skipped.\n",
                    summary.agent, summary.written, summary.skipped
                );
                if let Some(dir) = &summary.backup_dir {
                    out.push_str(&format!("Backups in {}\n", dir));
                }
                for warning in &summary.warnings {
                    out.push_str(&format!("Warning: {}\n", warning));
                }
                for error in &summary.errors {
                    out.push_str(&format!("Error: {}: {}\n", error.path, error.message));
                }
                if !summary.guide.is_empty() {
                    out.push_str("\nNext steps:\n");
                    for line in &summary.guide {
                        out.push_str(&format!("  - {}\n", line));
                    }
                }
                out
            }
        }
    }
}

/// Run a deploy with an auto-detected interactive surface.
pub fn deploy(root: &Path, args: &DeployArgs) -> Result<DeployOutput> {
    let interactive =
        !args.no_input && std::io::stdin().is_terminal() && std::io::stderr().is_terminal();
    let mut handler;
    let handler_ref: Option<&mut dyn ConflictHandler> = if interactive {
        handler = PromptHandler::stdio();
        Some(&mut handler)
    } else {
        None
    };
    deploy_with(root, args, interactive, handler_ref)
}

/// Run a deploy with an explicit interactivity flag and conflict handler.
///
/// Split out from [`deploy`] so tests can drive the full pipeline with a
/// scripted handler.
pub fn deploy_with(
    root: &Path,
    args: &DeployArgs,
    interactive: bool,
    handler: Option<&mut dyn ConflictHandler>,
) -> Result<DeployOutput> {
    let layout = agents::layout(args.agent);
    let ctx = ResolutionContext::new(&layout, args.lang, args.kiro_dir.clone(), args.global)?;

    let manifest = match &args.manifest {
        Some(path) => Manifest::load(path)?,
        None => Manifest::parse(DEFAULT_MANIFEST)?,
    };
    let store: Box<dyn TemplateStore> = match &args.templates {
        Some(dir) => Box::new(DirTemplates::new(dir)),
        None => Box::new(EmbeddedTemplates),
    };

    let plan = Plan::resolve(&manifest, &ctx)?;
    let ops = build_operations(&plan, root, store.as_ref(), &ctx)?;
    let summaries = policy::summarize(&ops);
    let policies = policy::resolve(&summaries, args.overwrite, interactive);

    if args.dry_run {
        return Ok(DeployOutput::DryRun(DryRunReport::new(
            &ops, summaries, &policies,
        )));
    }

    let backup_root = if args.backup {
        Some(args.backup_dir.clone().unwrap_or_else(|| {
            let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
            root.join(".sdd-backup").join(stamp.to_string())
        }))
    } else {
        None
    };

    // Only wire the handler through when some category can actually prompt.
    let prompting = policies
        .policies
        .values()
        .any(|p| *p == CategoryPolicy::Prompt);
    let handler = if prompting { handler } else { None };

    let mut session = ConflictSession::new();
    let mut result = executor::execute(
        &ops,
        &policies,
        &mut session,
        handler,
        &ExecOptions { backup_root: backup_root.clone() },
    );
    result.warnings.extend(policies.warnings.clone());

    Ok(DeployOutput::Applied(DeploySummary {
        agent: layout.kind.to_string(),
        written: result.written,
        skipped: result.skipped,
        errors: result.errors,
        warnings: result.warnings,
        backup_dir: backup_root.map(|p| p.display().to_string()),
        guide: layout
            .completion_guide
            .iter()
            .map(|s| s.to_string())
            .collect(),
    }))
}

/// One row of `sdd agents` output.
#[derive(Debug, Serialize)]
pub struct AgentInfo {
    pub id: String,
    pub commands_dir: String,
    pub global_commands_dir: Option<String>,
    pub agent_dir: String,
    pub doc_file: String,
    pub command_label: String,
}

/// Output of `sdd agents`.
#[derive(Debug, Serialize)]
pub struct AgentListing {
    pub agents: Vec<AgentInfo>,
}

impl CommandResult for AgentListing {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    fn to_human(&self) -> String {
        let mut out = String::from("Supported agents:\n");
        for agent in &self.agents {
            out.push_str(&format!(
                "  {:<12} commands: {:<18} doc: {:<10} ({})\n",
                agent.id, agent.commands_dir, agent.doc_file, agent.command_label
            ));
        }
        out
    }
}

/// List the agent profile registry.
pub fn list_agents() -> AgentListing {
    AgentListing {
        agents: agents::all_layouts()
            .into_iter()
            .map(|layout| AgentInfo {
                id: layout.kind.to_string(),
                commands_dir: layout.commands_dir.to_string(),
                global_commands_dir: layout.global_commands_dir.map(|s| s.to_string()),
                agent_dir: layout.agent_dir.to_string(),
                doc_file: layout.doc_file.to_string(),
                command_label: layout.command_label.to_string(),
            })
            .collect(),
    }
}
