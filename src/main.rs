//! Sdd CLI - scaffold spec-driven development artifacts for AI coding agents.

use clap::Parser;
use sdd::cli::{Cli, Commands};
use sdd::commands::{self, CommandResult, DeployArgs};
use std::env;
use std::path::PathBuf;
use std::process;

fn main() {
    let cli = Cli::parse();
    let human = cli.human_readable;

    // Determine project root: --project flag > SDD_PROJECT env > cwd
    let root = resolve_project_path(cli.project_path, human);

    let result = run_command(cli.command, &root, human);

    if let Err(e) = result {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!(r#"{{"error": "{}"}}"#, e);
        }
        process::exit(1);
    }
}

/// Resolve the project root from the explicit flag, environment variable, or
/// the current working directory. An explicit path must exist.
fn resolve_project_path(explicit_path: Option<PathBuf>, human: bool) -> PathBuf {
    match explicit_path {
        Some(path) => {
            if !path.exists() {
                if human {
                    eprintln!(
                        "Error: Specified project path does not exist: {}",
                        path.display()
                    );
                } else {
                    eprintln!(
                        r#"{{"error": "Specified project path does not exist: {}"}}"#,
                        path.display()
                    );
                }
                process::exit(1);
            }
            path
        }
        None => env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

fn run_command(command: Commands, root: &std::path::Path, human: bool) -> Result<(), sdd::Error> {
    match command {
        Commands::Deploy {
            agent,
            lang,
            kiro_dir,
            overwrite,
            global,
            backup,
            backup_dir,
            dry_run,
            no_input,
            manifest,
            templates,
        } => {
            let args = DeployArgs {
                agent,
                lang,
                kiro_dir,
                overwrite,
                global,
                backup,
                backup_dir,
                dry_run,
                no_input,
                manifest,
                templates,
            };
            let result = commands::deploy(root, &args)?;
            output(&result, human);
            Ok(())
        }
        Commands::Agents => {
            let result = commands::list_agents();
            output(&result, human);
            Ok(())
        }
    }
}

/// Print output in JSON or human-readable format.
fn output<T: CommandResult>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
