//! File operation building.
//!
//! For each planned artifact this renders the final content and classifies
//! the target path against the real filesystem: absent, existing-identical,
//! or existing-differing. This stage is strictly read-only (stat + read);
//! a target whose parent directory does not exist yet is simply absent.
//! Any other read failure (permissions, a directory in the way) marks the
//! operation unreadable so the executor reports it instead of treating the
//! target as fresh.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::deploy::planner::{Plan, ProcessedArtifact, SourceMode};
use crate::deploy::ResolutionContext;
use crate::templates::TemplateStore;
use crate::{Error, Result};

/// One concrete file operation, classified against the filesystem.
#[derive(Debug, Clone)]
pub struct FileOp {
    /// Target path as resolved from the manifest (relative to the working
    /// root, or absolute for global installs).
    pub rel: PathBuf,
    /// Absolute target path.
    pub path: PathBuf,
    pub category: String,
    pub source_mode: SourceMode,
    /// Whether a file already exists at the target path.
    pub existing: bool,
    /// Whether the existing file's bytes equal the rendered content.
    /// Always false when `existing` is false.
    pub identical: bool,
    /// Read failure while classifying an existing target. The executor
    /// reports it per-operation and leaves the target untouched.
    pub read_error: Option<String>,
    /// The rendered content that would be written.
    pub content: String,
}

impl FileOp {
    /// An existing file whose content differs from the rendered output.
    pub fn conflicting(&self) -> bool {
        self.existing && !self.identical
    }
}

/// Build one [`FileOp`] per planned artifact, in plan order.
pub fn build_operations(
    plan: &Plan,
    root: &Path,
    store: &dyn TemplateStore,
    ctx: &ResolutionContext,
) -> Result<Vec<FileOp>> {
    plan.artifacts
        .iter()
        .map(|artifact| build_one(artifact, root, store, ctx))
        .collect()
}

fn build_one(
    artifact: &ProcessedArtifact,
    root: &Path,
    store: &dyn TemplateStore,
    ctx: &ResolutionContext,
) -> Result<FileOp> {
    let content = render(artifact, store, ctx)?;

    // Path::join keeps an absolute component absolute, which is exactly the
    // global-install behavior we want.
    let path = root.join(&artifact.target);

    // Strict byte comparison decides `identical`; no line-ending
    // normalization. Only NotFound means absent - anything else is an
    // existing target we could not read and must never blindly replace.
    let (existing, identical, read_error) = match fs::read(&path) {
        Ok(bytes) => (true, bytes == content.as_bytes(), None),
        Err(e) if e.kind() == io::ErrorKind::NotFound => (false, false, None),
        Err(e) => (true, false, Some(e.to_string())),
    };

    Ok(FileOp {
        rel: artifact.target.clone(),
        path,
        category: artifact.category.clone(),
        source_mode: artifact.source_mode,
        existing,
        identical,
        read_error,
        content,
    })
}

/// Render an artifact's final content.
///
/// `TemplateJson` sources first substitute the keys of the sibling
/// `<source>.json` values document, then context tokens. Unrecognized
/// `{{...}}` sequences in *content* are left alone - prompt text may
/// legitimately contain braces; the closed-token validation applies to
/// manifest path patterns only.
fn render(
    artifact: &ProcessedArtifact,
    store: &dyn TemplateStore,
    ctx: &ResolutionContext,
) -> Result<String> {
    let mut content = store.read(&artifact.source)?;

    if artifact.source_mode == SourceMode::TemplateJson {
        let values_path = format!("{}.json", artifact.source);
        let raw = store.read(&values_path)?;
        let values: HashMap<String, String> = serde_json::from_str(&raw).map_err(|e| {
            Error::Manifest(format!("unparseable values file '{}': {}", values_path, e))
        })?;
        for (key, value) in &values {
            content = content.replace(&format!("{{{{{}}}}}", key), value);
        }
    }

    Ok(content
        .replace("{{COMMANDS_DIR}}", &ctx.commands_dir)
        .replace("{{AGENT_DIR}}", &ctx.agent_dir)
        .replace("{{DOC_FILE}}", &ctx.doc_file)
        .replace("{{LANG}}", ctx.lang.code())
        .replace("{{KIRO_DIR}}", &ctx.kiro_dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{AgentKind, layout};
    use crate::deploy::planner::Manifest;
    use crate::deploy::Language;
    use crate::templates::EmbeddedTemplates;
    use tempfile::TempDir;

    fn ctx() -> ResolutionContext {
        ResolutionContext::new(&layout(AgentKind::ClaudeCode), Language::En, ".kiro", false)
            .unwrap()
    }

    fn default_plan() -> Plan {
        let manifest = Manifest::parse(crate::templates::DEFAULT_MANIFEST).unwrap();
        Plan::resolve(&manifest, &ctx()).unwrap()
    }

    #[test]
    fn test_empty_root_all_new() {
        let root = TempDir::new().unwrap();
        let ops = build_operations(&default_plan(), root.path(), &EmbeddedTemplates, &ctx()).unwrap();

        assert_eq!(ops.len(), 7);
        for op in &ops {
            assert!(!op.existing);
            assert!(!op.identical, "identical must be false when absent");
            assert!(!op.content.is_empty());
        }
    }

    #[test]
    fn test_classifies_identical_and_differing() {
        let root = TempDir::new().unwrap();
        let plan = default_plan();
        let ops = build_operations(&plan, root.path(), &EmbeddedTemplates, &ctx()).unwrap();

        // Materialize one file byte-for-byte and one with drift.
        fs::create_dir_all(ops[0].path.parent().unwrap()).unwrap();
        fs::write(&ops[0].path, &ops[0].content).unwrap();
        fs::create_dir_all(ops[1].path.parent().unwrap()).unwrap();
        fs::write(&ops[1].path, "local edits").unwrap();

        let ops = build_operations(&plan, root.path(), &EmbeddedTemplates, &ctx()).unwrap();
        assert!(ops[0].existing && ops[0].identical);
        assert!(!ops[0].conflicting());
        assert!(ops[1].existing && !ops[1].identical);
        assert!(ops[1].conflicting());
        assert!(!ops[2].existing);
    }

    #[test]
    fn test_renders_context_tokens_in_content() {
        let root = TempDir::new().unwrap();
        let ops = build_operations(&default_plan(), root.path(), &EmbeddedTemplates, &ctx()).unwrap();
        let init = &ops[0];
        assert!(init.content.contains(".kiro/specs/"));
        assert!(!init.content.contains("{{KIRO_DIR}}"));
    }

    #[test]
    fn test_renders_template_json_values() {
        let root = TempDir::new().unwrap();
        let ops = build_operations(&default_plan(), root.path(), &EmbeddedTemplates, &ctx()).unwrap();
        let settings = ops
            .iter()
            .find(|op| op.category == "settings")
            .unwrap();
        assert!(settings.content.contains("human approval required"));
        assert!(!settings.content.contains("{{WORKFLOW}}"));
        assert!(!settings.content.contains("{{PRINCIPLES}}"));
    }

    #[test]
    fn test_unreadable_target_is_not_classified_absent() {
        let root = TempDir::new().unwrap();
        let plan = default_plan();
        // A directory squatting on the doc target makes the read fail for
        // any user, root included.
        fs::create_dir(root.path().join("CLAUDE.md")).unwrap();

        let ops = build_operations(&plan, root.path(), &EmbeddedTemplates, &ctx()).unwrap();
        let doc = ops.iter().find(|op| op.category == "doc").unwrap();

        assert!(doc.existing, "unreadable target must not look absent");
        assert!(!doc.identical);
        assert!(doc.read_error.is_some());
        // The rest of the plan is unaffected; classification continues.
        assert!(ops.iter().filter(|op| op.read_error.is_none()).count() > 0);
    }

    #[test]
    fn test_missing_parent_dir_is_not_an_error() {
        let root = TempDir::new().unwrap();
        // Nothing under root exists; deep targets classify as absent.
        let ops = build_operations(&default_plan(), root.path(), &EmbeddedTemplates, &ctx()).unwrap();
        assert!(ops.iter().all(|op| !op.existing));
    }
}
