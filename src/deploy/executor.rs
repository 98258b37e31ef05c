//! Plan execution.
//!
//! Applies every file operation sequentially in plan order and tallies the
//! outcome. Per-operation state machine:
//!
//! - absent target: write (counted as written)
//! - existing, identical: no-op (counted as neither)
//! - existing, differing: per category policy - force overwrites (after a
//!   backup when enabled), skip leaves it untouched, prompt asks the
//!   conflict handler (overwrite / skip / append)
//!
//! A failed backup aborts that one file's overwrite and is reported as an
//! error; the original is never replaced without a successful backup.
//! Other per-file I/O errors are accumulated and the run continues - partial
//! application is reported, not rolled back.

use std::fs;
use std::io::Write as _;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::deploy::CATEGORY_DOC;
use crate::deploy::conflict::{ConflictHandler, ConflictSession, Decision};
use crate::deploy::ops::FileOp;
use crate::deploy::planner::SourceMode;
use crate::deploy::policy::{CategoryPolicy, ResolvedPolicies};
use crate::Error;

/// Separator written between old and appended content.
pub const APPEND_DELIMITER: &str = "\n\n---\n\n";

/// Execution options.
#[derive(Debug, Default)]
pub struct ExecOptions {
    /// When set, pre-overwrite content is copied here (same relative path)
    /// before the file is replaced.
    pub backup_root: Option<PathBuf>,
}

/// One per-file failure, reported without aborting the run.
#[derive(Debug, Clone, Serialize)]
pub struct FileError {
    pub path: String,
    pub message: String,
}

/// Final tallies for one run.
#[derive(Debug, Default, Serialize)]
pub struct RunResult {
    pub written: usize,
    pub skipped: usize,
    pub errors: Vec<FileError>,
    pub warnings: Vec<String>,
}

/// Whether append may be offered for an operation: project-memory document
/// only, and never for structured template-plus-values sources.
pub fn append_allowed(op: &FileOp) -> bool {
    op.category == CATEGORY_DOC && op.source_mode != SourceMode::TemplateJson
}

/// Apply every operation and return the run tallies.
pub fn execute(
    ops: &[FileOp],
    policies: &ResolvedPolicies,
    session: &mut ConflictSession,
    mut handler: Option<&mut dyn ConflictHandler>,
    opts: &ExecOptions,
) -> RunResult {
    let mut result = RunResult::default();

    for op in ops {
        if let Some(message) = &op.read_error {
            // The target could not be read at classification time; replacing
            // or appending to it would bypass the conflict machinery.
            result.errors.push(FileError {
                path: op.rel.display().to_string(),
                message: format!("cannot read existing target: {}", message),
            });
            continue;
        }
        if !op.existing {
            match write_file(&op.path, &op.content) {
                Ok(()) => result.written += 1,
                Err(e) => push_error(&mut result, op, &e),
            }
            continue;
        }
        if op.identical {
            // Already satisfied; neither written nor skipped.
            continue;
        }

        let decision = match policies.for_category(&op.category) {
            CategoryPolicy::Force => Decision::Overwrite,
            CategoryPolicy::Skip => Decision::Skip,
            CategoryPolicy::Prompt => match session.get(&op.category) {
                Some(sticky) => sticky,
                None => match handler.as_deref_mut() {
                    Some(h) => match h.resolve(op, append_allowed(op)) {
                        Ok(choice) => {
                            if choice.apply_to_rest {
                                session.set(&op.category, choice.decision);
                            }
                            choice.decision
                        }
                        Err(e) => {
                            push_error(&mut result, op, &e);
                            continue;
                        }
                    },
                    // No interactive surface left: safe default.
                    None => Decision::Skip,
                },
            },
        };

        match decision {
            Decision::Skip => result.skipped += 1,
            Decision::Overwrite => {
                if let Some(backup_root) = &opts.backup_root {
                    if let Err(e) = back_up(&op.path, &op.rel, backup_root) {
                        // Never overwrite without a successful backup.
                        push_error(&mut result, op, &e);
                        continue;
                    }
                }
                match write_file(&op.path, &op.content) {
                    Ok(()) => result.written += 1,
                    Err(e) => push_error(&mut result, op, &e),
                }
            }
            Decision::Append => {
                if !append_allowed(op) {
                    push_error(
                        &mut result,
                        op,
                        &Error::InvalidInput(format!(
                            "append is not supported for category '{}'",
                            op.category
                        )),
                    );
                    continue;
                }
                match append_file(&op.path, &op.content) {
                    Ok(()) => result.written += 1,
                    Err(e) => push_error(&mut result, op, &e),
                }
            }
        }
    }

    result
}

fn push_error(result: &mut RunResult, op: &FileOp, error: &Error) {
    result.errors.push(FileError {
        path: op.rel.display().to_string(),
        message: error.to_string(),
    });
}

fn write_file(path: &Path, content: &str) -> crate::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

fn append_file(path: &Path, content: &str) -> crate::Result<()> {
    let mut file = fs::OpenOptions::new().append(true).open(path)?;
    file.write_all(APPEND_DELIMITER.as_bytes())?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

/// Copy the pre-overwrite file to `<backup_root>/<relative path>`.
fn back_up(path: &Path, rel: &Path, backup_root: &Path) -> crate::Result<()> {
    // Absolute targets (global installs) keep only their normal components
    // so the backup stays inside the backup root.
    let rel: PathBuf = rel
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect();
    let destination = backup_root.join(rel);

    let copy = || -> std::io::Result<()> {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(path, &destination)?;
        Ok(())
    };

    copy().map_err(|source| Error::Backup {
        path: path.to_path_buf(),
        source,
    })
}
