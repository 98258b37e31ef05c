//! Category summaries and policy derivation.
//!
//! File operations aggregate into per-category summaries, and each category
//! gets one execution policy for the run:
//!
//! | global setting | no real conflicts | conflicting files |
//! |----------------|-------------------|-------------------|
//! | force          | force             | force             |
//! | skip           | skip              | skip              |
//! | prompt         | skip              | prompt            |
//!
//! Without an interactive surface, `prompt` degrades to `skip` and a warning
//! is recorded - execution never blocks waiting for input it cannot receive.

use std::collections::HashMap;

use serde::Serialize;

use crate::deploy::OverwritePolicy;
use crate::deploy::ops::FileOp;

/// Aggregated counts for one category's operations.
#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    pub category: String,
    pub total: usize,
    pub existing: usize,
    pub identical: usize,
}

impl CategorySummary {
    /// Files that exist with differing content.
    pub fn conflicting(&self) -> usize {
        self.existing - self.identical
    }
}

/// Execution policy assigned to one category for the current run.
///
/// Once a category resolves to `Force` or `Skip`, no interactive prompt is
/// ever issued for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryPolicy {
    Force,
    Skip,
    Prompt,
}

/// Per-category policies plus any degradation warnings.
#[derive(Debug, Clone)]
pub struct ResolvedPolicies {
    pub policies: HashMap<String, CategoryPolicy>,
    pub warnings: Vec<String>,
}

impl ResolvedPolicies {
    /// Policy for a category. Categories unknown to the resolver (none in
    /// practice, since summaries cover every operation) default to skip.
    pub fn for_category(&self, category: &str) -> CategoryPolicy {
        self.policies
            .get(category)
            .copied()
            .unwrap_or(CategoryPolicy::Skip)
    }
}

/// Aggregate operations into summaries, in first-seen category order.
pub fn summarize(ops: &[FileOp]) -> Vec<CategorySummary> {
    let mut summaries: Vec<CategorySummary> = Vec::new();
    for op in ops {
        let idx = match summaries.iter().position(|s| s.category == op.category) {
            Some(i) => i,
            None => {
                summaries.push(CategorySummary {
                    category: op.category.clone(),
                    total: 0,
                    existing: 0,
                    identical: 0,
                });
                summaries.len() - 1
            }
        };
        let summary = &mut summaries[idx];
        summary.total += 1;
        if op.existing {
            summary.existing += 1;
        }
        if op.identical {
            summary.identical += 1;
        }
    }
    summaries
}

/// Derive one policy per category from the global overwrite setting.
pub fn resolve(
    summaries: &[CategorySummary],
    global: OverwritePolicy,
    interactive: bool,
) -> ResolvedPolicies {
    let mut policies = HashMap::new();
    let mut warnings = Vec::new();

    for summary in summaries {
        let policy = match global {
            OverwritePolicy::Force => CategoryPolicy::Force,
            OverwritePolicy::Skip => CategoryPolicy::Skip,
            OverwritePolicy::Prompt => {
                if summary.conflicting() == 0 {
                    // Nothing to ask; identical or new files need no choice.
                    CategoryPolicy::Skip
                } else if interactive {
                    CategoryPolicy::Prompt
                } else {
                    warnings.push(format!(
                        "category '{}' has {} conflicting file(s) but no terminal is attached; skipping them (use --overwrite force to overwrite)",
                        summary.category,
                        summary.conflicting()
                    ));
                    CategoryPolicy::Skip
                }
            }
        };
        policies.insert(summary.category.clone(), policy);
    }

    ResolvedPolicies { policies, warnings }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deploy::planner::SourceMode;
    use std::path::PathBuf;

    fn op(category: &str, existing: bool, identical: bool) -> FileOp {
        FileOp {
            rel: PathBuf::from("x"),
            path: PathBuf::from("/tmp/x"),
            category: category.to_string(),
            source_mode: SourceMode::Template,
            existing,
            identical,
            read_error: None,
            content: String::new(),
        }
    }

    #[test]
    fn test_summarize_counts() {
        let ops = vec![
            op("commands", false, false),
            op("commands", true, true),
            op("commands", true, false),
            op("doc", true, false),
        ];
        let summaries = summarize(&ops);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].category, "commands");
        assert_eq!(summaries[0].total, 3);
        assert_eq!(summaries[0].existing, 2);
        assert_eq!(summaries[0].identical, 1);
        assert_eq!(summaries[0].conflicting(), 1);
        assert_eq!(summaries[1].conflicting(), 1);
    }

    #[test]
    fn test_force_and_skip_apply_everywhere() {
        let ops = vec![op("a", true, false), op("b", false, false)];
        let summaries = summarize(&ops);

        let forced = resolve(&summaries, OverwritePolicy::Force, true);
        assert_eq!(forced.for_category("a"), CategoryPolicy::Force);
        assert_eq!(forced.for_category("b"), CategoryPolicy::Force);

        let skipped = resolve(&summaries, OverwritePolicy::Skip, true);
        assert_eq!(skipped.for_category("a"), CategoryPolicy::Skip);
        assert!(skipped.warnings.is_empty());
    }

    #[test]
    fn test_prompt_only_for_real_conflicts() {
        let ops = vec![
            op("clean", true, true),
            op("clean", false, false),
            op("dirty", true, false),
        ];
        let resolved = resolve(&summarize(&ops), OverwritePolicy::Prompt, true);
        assert_eq!(resolved.for_category("clean"), CategoryPolicy::Skip);
        assert_eq!(resolved.for_category("dirty"), CategoryPolicy::Prompt);
        assert!(resolved.warnings.is_empty());
    }

    #[test]
    fn test_prompt_degrades_without_terminal() {
        let ops = vec![op("dirty", true, false)];
        let resolved = resolve(&summarize(&ops), OverwritePolicy::Prompt, false);
        assert_eq!(resolved.for_category("dirty"), CategoryPolicy::Skip);
        assert_eq!(resolved.warnings.len(), 1);
        assert!(resolved.warnings[0].contains("dirty"));
    }

    #[test]
    fn test_unknown_category_defaults_to_skip() {
        let resolved = resolve(&[], OverwritePolicy::Force, true);
        assert_eq!(resolved.for_category("ghost"), CategoryPolicy::Skip);
    }
}
