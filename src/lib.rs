//! Sdd - a scaffolder for spec-driven development artifacts.
//!
//! This library provides the core functionality for the `sdd` CLI tool:
//! resolving an artifact manifest into a deployment plan, classifying the
//! plan against the existing project tree, and executing it with per-category
//! overwrite policies, interactive conflict resolution, and optional backups.

pub mod agents;
pub mod cli;
pub mod commands;
pub mod deploy;
pub mod templates;

use std::path::PathBuf;

/// Library-level error type for sdd operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Manifest missing, unparseable, or referencing an unresolved placeholder
    /// or nonexistent template. Always fatal before any write happens.
    #[error("Manifest error: {0}")]
    Manifest(String),

    /// Contradictory or invalid run inputs (e.g. a global install for an
    /// agent with no global commands directory). Fatal before planning.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A backup copy could not be written. The file it guards is never
    /// overwritten when this occurs.
    #[error("Backup of '{path}' failed: {source}")]
    Backup {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for sdd operations.
pub type Result<T> = std::result::Result<T, Error>;
