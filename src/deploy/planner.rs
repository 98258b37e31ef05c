//! Manifest loading and plan resolution.
//!
//! A manifest is an ordered set of categories, each with artifact
//! descriptors whose source and target patterns may contain placeholder
//! tokens (`{{COMMANDS_DIR}}`, `{{AGENT_DIR}}`, `{{DOC_FILE}}`, `{{LANG}}`,
//! `{{KIRO_DIR}}`). Resolution substitutes every token from the
//! [`ResolutionContext`] and fails fast on anything unrecognized - a plan is
//! produced whole or not at all, before any filesystem access.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::deploy::ResolutionContext;
use crate::{Error, Result};

/// How a category's artifact content is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMode {
    /// Raw template file; only context tokens are substituted.
    Template,
    /// Template plus a sibling `<source>.json` document of values that are
    /// substituted into the template before context tokens.
    TemplateJson,
}

/// One artifact: where its content comes from and where it lands.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactDescriptor {
    /// Template source path pattern (relative to the template store root).
    pub source: String,
    /// Target path pattern (relative to the working root).
    pub target: String,
}

/// A manifest category: artifacts sharing one overwrite policy.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryEntry {
    /// Category identifier, unique within the manifest.
    pub id: String,
    pub source_mode: SourceMode,
    pub artifacts: Vec<ArtifactDescriptor>,
}

/// The parsed manifest document.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub categories: Vec<CategoryEntry>,
}

impl Manifest {
    /// Parse a manifest from JSON text.
    pub fn parse(json: &str) -> Result<Self> {
        let manifest: Manifest = serde_json::from_str(json)
            .map_err(|e| Error::Manifest(format!("unparseable manifest: {}", e)))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Load and parse a manifest file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| {
            Error::Manifest(format!("cannot read manifest '{}': {}", path.display(), e))
        })?;
        Self::parse(&json)
    }

    fn validate(&self) -> Result<()> {
        for (i, entry) in self.categories.iter().enumerate() {
            if self.categories[..i].iter().any(|c| c.id == entry.id) {
                return Err(Error::Manifest(format!(
                    "duplicate category id '{}'",
                    entry.id
                )));
            }
        }
        Ok(())
    }
}

/// An artifact with every placeholder substituted. Read-only once created.
#[derive(Debug, Clone)]
pub struct ProcessedArtifact {
    pub category: String,
    pub source_mode: SourceMode,
    /// Concrete template source path.
    pub source: String,
    /// Concrete target path, relative to the working root (absolute for
    /// global installs).
    pub target: PathBuf,
}

/// The resolved deployment plan, in manifest declaration order.
#[derive(Debug, Clone)]
pub struct Plan {
    pub artifacts: Vec<ProcessedArtifact>,
}

impl Plan {
    /// Resolve a manifest against a context into a concrete plan.
    pub fn resolve(manifest: &Manifest, ctx: &ResolutionContext) -> Result<Self> {
        let mut artifacts = Vec::new();
        for entry in &manifest.categories {
            for descriptor in &entry.artifacts {
                artifacts.push(ProcessedArtifact {
                    category: entry.id.clone(),
                    source_mode: entry.source_mode,
                    source: substitute(&descriptor.source, ctx)?,
                    target: PathBuf::from(substitute(&descriptor.target, ctx)?),
                });
            }
        }
        Ok(Plan { artifacts })
    }

    /// Category ids in plan order, deduplicated.
    pub fn category_order(&self) -> Vec<String> {
        let mut order: Vec<String> = Vec::new();
        for artifact in &self.artifacts {
            if !order.contains(&artifact.category) {
                order.push(artifact.category.clone());
            }
        }
        order
    }
}

/// Substitute every recognized `{{TOKEN}}` in a path pattern.
///
/// The token set is closed: any `{{...}}` left after substitution is a fatal
/// [`Error::Manifest`], so resolution failures surface before I/O begins.
pub fn substitute(pattern: &str, ctx: &ResolutionContext) -> Result<String> {
    let resolved = pattern
        .replace("{{COMMANDS_DIR}}", &ctx.commands_dir)
        .replace("{{AGENT_DIR}}", &ctx.agent_dir)
        .replace("{{DOC_FILE}}", &ctx.doc_file)
        .replace("{{LANG}}", ctx.lang.code())
        .replace("{{KIRO_DIR}}", &ctx.kiro_dir);

    if let Some(start) = resolved.find("{{") {
        let token: String = resolved[start..]
            .chars()
            .take_while(|c| *c != '}')
            .chain("}}".chars())
            .collect();
        return Err(Error::Manifest(format!(
            "unresolved placeholder '{}' in '{}'",
            token, pattern
        )));
    }
    Ok(resolved)
}
