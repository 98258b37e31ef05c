//! Dry-run reporting.
//!
//! Renders the resolved plan and category summaries without touching the
//! filesystem: every operation is labeled with the action the executor
//! *would* take under the resolved policies.

use serde::Serialize;

use crate::deploy::ops::FileOp;
use crate::deploy::policy::{CategoryPolicy, CategorySummary, ResolvedPolicies};

/// Action the executor would take for one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlannedAction {
    /// Target absent; file would be written.
    Write,
    /// Target identical; nothing to do.
    Unchanged,
    /// Conflict under a force policy; file would be overwritten.
    Overwrite,
    /// Conflict under a skip policy; file would be left untouched.
    Skip,
    /// Conflict under a prompt policy; the user would be asked.
    Ask,
    /// Target exists but could not be read; the executor would report an
    /// error and leave it untouched.
    Unreadable,
}

impl std::fmt::Display for PlannedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlannedAction::Write => write!(f, "write"),
            PlannedAction::Unchanged => write!(f, "unchanged"),
            PlannedAction::Overwrite => write!(f, "overwrite"),
            PlannedAction::Skip => write!(f, "skip"),
            PlannedAction::Ask => write!(f, "ask"),
            PlannedAction::Unreadable => write!(f, "unreadable"),
        }
    }
}

/// One plan line of the dry-run report.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedFile {
    pub target: String,
    pub category: String,
    pub action: PlannedAction,
}

/// The full dry-run report, in plan order.
#[derive(Debug, Clone, Serialize)]
pub struct DryRunReport {
    pub files: Vec<PlannedFile>,
    pub categories: Vec<CategorySummary>,
    pub warnings: Vec<String>,
}

impl DryRunReport {
    /// Build a report from classified operations and resolved policies.
    pub fn new(
        ops: &[FileOp],
        summaries: Vec<CategorySummary>,
        policies: &ResolvedPolicies,
    ) -> Self {
        let files = ops
            .iter()
            .map(|op| PlannedFile {
                target: op.rel.display().to_string(),
                category: op.category.clone(),
                action: planned_action(op, policies.for_category(&op.category)),
            })
            .collect();
        Self {
            files,
            categories: summaries,
            warnings: policies.warnings.clone(),
        }
    }

    /// Human-readable rendering.
    pub fn to_human(&self) -> String {
        let mut out = String::from("Dry run - no files were written.\n\n");
        for file in &self.files {
            out.push_str(&format!(
                "  {:<9} {} [{}]\n",
                file.action.to_string(),
                file.target,
                file.category
            ));
        }
        out.push('\n');
        for summary in &self.categories {
            out.push_str(&format!(
                "  {}: {} file(s), {} existing, {} identical, {} conflicting\n",
                summary.category,
                summary.total,
                summary.existing,
                summary.identical,
                summary.conflicting()
            ));
        }
        for warning in &self.warnings {
            out.push_str(&format!("\nWarning: {}\n", warning));
        }
        out
    }
}

fn planned_action(op: &FileOp, policy: CategoryPolicy) -> PlannedAction {
    if op.read_error.is_some() {
        return PlannedAction::Unreadable;
    }
    if !op.existing {
        return PlannedAction::Write;
    }
    if op.identical {
        return PlannedAction::Unchanged;
    }
    match policy {
        CategoryPolicy::Force => PlannedAction::Overwrite,
        CategoryPolicy::Skip => PlannedAction::Skip,
        CategoryPolicy::Prompt => PlannedAction::Ask,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deploy::OverwritePolicy;
    use crate::deploy::planner::SourceMode;
    use crate::deploy::policy::{resolve, summarize};
    use std::path::PathBuf;

    fn op(rel: &str, category: &str, existing: bool, identical: bool) -> FileOp {
        FileOp {
            rel: PathBuf::from(rel),
            path: PathBuf::from("/tmp").join(rel),
            category: category.to_string(),
            source_mode: SourceMode::Template,
            existing,
            identical,
            read_error: None,
            content: String::new(),
        }
    }

    #[test]
    fn test_actions_per_policy() {
        let ops = vec![
            op("new.md", "commands", false, false),
            op("same.md", "commands", true, true),
            op("diff.md", "commands", true, false),
        ];
        let summaries = summarize(&ops);

        let forced = resolve(&summaries, OverwritePolicy::Force, true);
        let report = DryRunReport::new(&ops, summaries.clone(), &forced);
        assert_eq!(report.files[0].action, PlannedAction::Write);
        assert_eq!(report.files[1].action, PlannedAction::Unchanged);
        assert_eq!(report.files[2].action, PlannedAction::Overwrite);

        let prompted = resolve(&summaries, OverwritePolicy::Prompt, true);
        let report = DryRunReport::new(&ops, summaries, &prompted);
        assert_eq!(report.files[2].action, PlannedAction::Ask);
    }

    #[test]
    fn test_unreadable_target_reported_as_such() {
        let mut broken = op("broken.md", "commands", true, false);
        broken.read_error = Some("Is a directory (os error 21)".to_string());
        let ops = vec![broken];
        let summaries = summarize(&ops);
        let policies = resolve(&summaries, OverwritePolicy::Force, true);
        let report = DryRunReport::new(&ops, summaries, &policies);

        // Force must not mask the read failure.
        assert_eq!(report.files[0].action, PlannedAction::Unreadable);
        assert!(report.to_human().contains("unreadable"));
    }

    #[test]
    fn test_human_rendering() {
        let ops = vec![op("diff.md", "doc", true, false)];
        let summaries = summarize(&ops);
        let policies = resolve(&summaries, OverwritePolicy::Prompt, false);
        let report = DryRunReport::new(&ops, summaries, &policies);
        let text = report.to_human();

        assert!(text.contains("Dry run"));
        assert!(text.contains("skip"));
        assert!(text.contains("doc: 1 file(s), 1 existing, 0 identical, 1 conflicting"));
        assert!(text.contains("Warning:"));
    }
}
