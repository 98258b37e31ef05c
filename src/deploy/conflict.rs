//! Interactive conflict resolution.
//!
//! Categories whose policy resolved to `prompt` get one question per
//! conflicting file, in plan order. The user picks overwrite / skip / append
//! (append only for the project-memory document) and may apply the choice to
//! every remaining conflict in the same category - that sticky decision
//! lives in an explicit [`ConflictSession`] passed through the executor, so
//! tests can substitute a [`ScriptedHandler`] and assert prompt counts.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::io::{BufRead, Write};

use crate::deploy::ops::FileOp;
use crate::Result;

/// Resolution of one conflicting file operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Overwrite,
    Skip,
    Append,
}

/// A decision plus whether it should stick for the rest of the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConflictChoice {
    pub decision: Decision,
    pub apply_to_rest: bool,
}

/// Per-category sticky decision cache for one run.
#[derive(Debug, Default)]
pub struct ConflictSession {
    sticky: HashMap<String, Decision>,
}

impl ConflictSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sticky decision previously recorded for a category, if any.
    pub fn get(&self, category: &str) -> Option<Decision> {
        self.sticky.get(category).copied()
    }

    /// Record a decision for all remaining conflicts in a category.
    pub fn set(&mut self, category: &str, decision: Decision) {
        self.sticky.insert(category.to_string(), decision);
    }
}

/// Source of conflict decisions.
pub trait ConflictHandler {
    /// Resolve one conflicting operation. `allow_append` is true only for
    /// the project-memory category with a raw template source.
    fn resolve(&mut self, op: &FileOp, allow_append: bool) -> Result<ConflictChoice>;
}

/// Terminal-backed handler reading answers from stdin.
pub struct PromptHandler {
    input: Box<dyn BufRead>,
    output: Box<dyn Write>,
}

impl PromptHandler {
    /// Handler wired to the process stdin/stderr.
    ///
    /// Prompts go to stderr so JSON output on stdout stays machine-parseable.
    pub fn stdio() -> Self {
        Self {
            input: Box::new(std::io::stdin().lock()),
            output: Box::new(std::io::stderr()),
        }
    }

    /// Handler over arbitrary streams (unit tests).
    pub fn new(input: Box<dyn BufRead>, output: Box<dyn Write>) -> Self {
        Self { input, output }
    }

    fn parse(answer: &str, allow_append: bool) -> Option<ConflictChoice> {
        let answer = answer.trim().to_lowercase();
        let (answer, apply_to_rest) = match answer.strip_suffix('!') {
            Some(rest) => (rest.trim().to_string(), true),
            None => (answer, false),
        };
        let decision = match answer.as_str() {
            "o" | "overwrite" => Decision::Overwrite,
            "s" | "skip" | "" => Decision::Skip,
            "a" | "append" if allow_append => Decision::Append,
            _ => return None,
        };
        Some(ConflictChoice {
            decision,
            apply_to_rest,
        })
    }
}

impl ConflictHandler for PromptHandler {
    fn resolve(&mut self, op: &FileOp, allow_append: bool) -> Result<ConflictChoice> {
        let choices = if allow_append {
            "[o]verwrite / [s]kip / [a]ppend"
        } else {
            "[o]verwrite / [s]kip"
        };
        writeln!(
            self.output,
            "File exists and differs: {}",
            op.rel.display()
        )?;

        loop {
            write!(
                self.output,
                "  {} (append '!' to apply to all '{}' files) [s]: ",
                choices, op.category
            )?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                // Stdin closed mid-run: fall back to the safe default.
                return Ok(ConflictChoice {
                    decision: Decision::Skip,
                    apply_to_rest: true,
                });
            }
            if let Some(choice) = Self::parse(&line, allow_append) {
                return Ok(choice);
            }
            writeln!(self.output, "  Unrecognized answer: {}", line.trim())?;
        }
    }
}

/// Pre-programmed handler for tests; records how often it was consulted.
#[derive(Debug, Default)]
pub struct ScriptedHandler {
    script: VecDeque<ConflictChoice>,
    pub prompts: usize,
}

impl ScriptedHandler {
    pub fn new(choices: impl IntoIterator<Item = ConflictChoice>) -> Self {
        Self {
            script: choices.into_iter().collect(),
            prompts: 0,
        }
    }
}

impl ConflictHandler for ScriptedHandler {
    fn resolve(&mut self, _op: &FileOp, _allow_append: bool) -> Result<ConflictChoice> {
        self.prompts += 1;
        Ok(self.script.pop_front().unwrap_or(ConflictChoice {
            decision: Decision::Skip,
            apply_to_rest: false,
        }))
    }
}
