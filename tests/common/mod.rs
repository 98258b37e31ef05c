//! Common test utilities for sdd integration tests.
//!
//! Provides `TestEnv` for isolated project directories so tests never touch
//! the developer's real project tree or home directory.

#![allow(dead_code)]

use assert_cmd::Command;
pub use tempfile::TempDir;

/// A test environment with an isolated project directory.
///
/// The `sdd()` method returns a `Command` running the real binary with the
/// temp directory as its working directory, making tests parallel-safe.
pub struct TestEnv {
    pub project_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with an empty project directory.
    pub fn new() -> Self {
        Self {
            project_dir: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the sdd binary rooted in the project directory.
    pub fn sdd(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_sdd"));
        cmd.current_dir(self.project_dir.path());
        cmd
    }

    /// Get the path to the project directory.
    pub fn path(&self) -> &std::path::Path {
        self.project_dir.path()
    }

    /// Read a project file to a string.
    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path().join(rel)).unwrap()
    }

    /// Write a project file, creating parent directories.
    pub fn write(&self, rel: &str, content: &str) {
        let path = self.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
