//! Template sources.
//!
//! Artifact content comes from a [`TemplateStore`]: either the payload
//! compiled into the binary ([`EmbeddedTemplates`], the default) or a
//! directory on disk ([`DirTemplates`], used with `--templates` and by
//! tests). Store keys are the manifest's source paths after placeholder
//! substitution, e.g. `commands/en/spec-init.md`.
//!
//! Localized templates fall back to English: a missing `commands/ja/...`
//! resolves to `commands/en/...` so partially translated payloads still
//! deploy completely.

use std::fs;
use std::path::PathBuf;

use crate::deploy::LANGUAGES;
use crate::{Error, Result};

/// The default manifest describing the shipped payload.
pub const DEFAULT_MANIFEST: &str = include_str!("embedded/manifest.json");

// Embedded payload (included at compile time)
const CMD_EN_SPEC_INIT: &str = include_str!("embedded/commands/en/spec-init.md");
const CMD_EN_SPEC_REQUIREMENTS: &str = include_str!("embedded/commands/en/spec-requirements.md");
const CMD_EN_SPEC_DESIGN: &str = include_str!("embedded/commands/en/spec-design.md");
const CMD_EN_SPEC_TASKS: &str = include_str!("embedded/commands/en/spec-tasks.md");
const CMD_EN_SPEC_STATUS: &str = include_str!("embedded/commands/en/spec-status.md");
const CMD_JA_SPEC_INIT: &str = include_str!("embedded/commands/ja/spec-init.md");
const SETTINGS_KIRO: &str = include_str!("embedded/settings/kiro-settings.md");
const SETTINGS_KIRO_VALUES: &str = include_str!("embedded/settings/kiro-settings.md.json");
const DOC_EN_PROJECT_MEMORY: &str = include_str!("embedded/doc/en/project-memory.md");
const DOC_JA_PROJECT_MEMORY: &str = include_str!("embedded/doc/ja/project-memory.md");

/// Read-only source of template content, keyed by resolved source path.
pub trait TemplateStore {
    /// Fetch the template at `rel`, applying the language fallback.
    ///
    /// A missing template is an [`Error::Manifest`]: the manifest referenced
    /// content that does not exist, and that must surface before any write.
    fn read(&self, rel: &str) -> Result<String>;
}

/// Templates compiled into the binary.
pub struct EmbeddedTemplates;

impl EmbeddedTemplates {
    fn get(rel: &str) -> Option<&'static str> {
        match rel {
            "commands/en/spec-init.md" => Some(CMD_EN_SPEC_INIT),
            "commands/en/spec-requirements.md" => Some(CMD_EN_SPEC_REQUIREMENTS),
            "commands/en/spec-design.md" => Some(CMD_EN_SPEC_DESIGN),
            "commands/en/spec-tasks.md" => Some(CMD_EN_SPEC_TASKS),
            "commands/en/spec-status.md" => Some(CMD_EN_SPEC_STATUS),
            "commands/ja/spec-init.md" => Some(CMD_JA_SPEC_INIT),
            "settings/kiro-settings.md" => Some(SETTINGS_KIRO),
            "settings/kiro-settings.md.json" => Some(SETTINGS_KIRO_VALUES),
            "doc/en/project-memory.md" => Some(DOC_EN_PROJECT_MEMORY),
            "doc/ja/project-memory.md" => Some(DOC_JA_PROJECT_MEMORY),
            _ => None,
        }
    }
}

impl TemplateStore for EmbeddedTemplates {
    fn read(&self, rel: &str) -> Result<String> {
        if let Some(content) = Self::get(rel) {
            return Ok(content.to_string());
        }
        if let Some(fallback) = english_fallback(rel) {
            if let Some(content) = Self::get(&fallback) {
                return Ok(content.to_string());
            }
        }
        Err(Error::Manifest(format!("template not found: {}", rel)))
    }
}

/// Templates read from a directory tree.
pub struct DirTemplates {
    root: PathBuf,
}

impl DirTemplates {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl TemplateStore for DirTemplates {
    fn read(&self, rel: &str) -> Result<String> {
        let path = self.root.join(rel);
        if path.is_file() {
            return Ok(fs::read_to_string(&path)?);
        }
        if let Some(fallback) = english_fallback(rel) {
            let path = self.root.join(&fallback);
            if path.is_file() {
                return Ok(fs::read_to_string(&path)?);
            }
        }
        Err(Error::Manifest(format!("template not found: {}", rel)))
    }
}

/// Rewrite `<dir>/<lang>/<rest>` to `<dir>/en/<rest>` when `<lang>` is a
/// recognized non-English language code. Returns `None` when no fallback
/// applies.
fn english_fallback(rel: &str) -> Option<String> {
    let mut parts = rel.splitn(3, '/');
    let dir = parts.next()?;
    let lang = parts.next()?;
    let rest = parts.next()?;
    let localized = LANGUAGES
        .iter()
        .any(|l| l.code() != "en" && l.code() == lang);
    if localized {
        Some(format!("{}/en/{}", dir, rest))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_exact_hit() {
        let content = EmbeddedTemplates.read("commands/en/spec-init.md").unwrap();
        assert!(content.contains("spec-init"));
    }

    #[test]
    fn test_embedded_localized_hit() {
        let content = EmbeddedTemplates.read("commands/ja/spec-init.md").unwrap();
        assert!(content.contains("spec-init"));
        assert!(content.contains("specs"));
    }

    #[test]
    fn test_embedded_language_fallback() {
        // Only spec-init is translated to Japanese; the rest fall back.
        let ja = EmbeddedTemplates
            .read("commands/ja/spec-design.md")
            .unwrap();
        let en = EmbeddedTemplates
            .read("commands/en/spec-design.md")
            .unwrap();
        assert_eq!(ja, en);
    }

    #[test]
    fn test_embedded_missing_is_manifest_error() {
        let err = EmbeddedTemplates.read("commands/en/no-such.md").unwrap_err();
        assert!(matches!(err, Error::Manifest(_)));
    }

    #[test]
    fn test_default_manifest_parses() {
        let value: serde_json::Value = serde_json::from_str(DEFAULT_MANIFEST).unwrap();
        assert!(value["categories"].is_array());
    }

    #[test]
    fn test_dir_templates_fallback() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("doc/en")).unwrap();
        std::fs::write(dir.path().join("doc/en/memory.md"), "remember").unwrap();

        let store = DirTemplates::new(dir.path());
        assert_eq!(store.read("doc/en/memory.md").unwrap(), "remember");
        assert_eq!(store.read("doc/zh-TW/memory.md").unwrap(), "remember");
        assert!(store.read("doc/en/other.md").is_err());
    }

    #[test]
    fn test_fallback_only_for_known_languages() {
        assert_eq!(
            english_fallback("commands/ja/spec-init.md").as_deref(),
            Some("commands/en/spec-init.md")
        );
        assert!(english_fallback("commands/en/spec-init.md").is_none());
        assert!(english_fallback("settings/kiro-settings.md").is_none());
        assert!(english_fallback("flat.md").is_none());
    }
}
