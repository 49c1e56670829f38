//! Shared helpers for the integration suite.

use assert_cmd::Command;
use std::path::Path;

use pipeline_structure::config::{CONFIG_NAME_ENV, CONFIG_PATH_ENV, PIPELINE_FOLDER_ENV};

/// Command output helper
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub code: Option<i32>,
}

impl CommandOutput {
    /// Assert the command succeeded
    pub fn assert_success(&self) -> &Self {
        assert!(self.success, "Command failed with code {:?}\nStderr: {}", self.code, self.stderr);
        self
    }

    /// Assert the command failed
    pub fn assert_failure(&self) -> &Self {
        assert!(!self.success, "Command unexpectedly succeeded\nStdout: {}", self.stdout);
        self
    }

    /// Assert stdout contains the given text
    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "Expected stdout to contain '{}'\nActual stdout: {}",
            text,
            self.stdout
        );
        self
    }

    /// Assert stderr contains the given text
    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "Expected stderr to contain '{}'\nActual stderr: {}",
            text,
            self.stderr
        );
        self
    }

    /// Parse stdout as JSON
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout)
            .unwrap_or_else(|e| panic!("stdout is not JSON ({e}):\n{}", self.stdout))
    }
}

/// A `pstruct` command running in `dir` with a clean environment.
pub fn pstruct(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pstruct").unwrap();
    cmd.current_dir(dir)
        .env_remove(PIPELINE_FOLDER_ENV)
        .env_remove(CONFIG_NAME_ENV)
        .env_remove(CONFIG_PATH_ENV)
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

/// Runs `pstruct args...` in `dir` and captures its output.
pub fn run_pstruct(dir: &Path, args: &[&str]) -> CommandOutput {
    let output = pstruct(dir).args(args).output().unwrap();
    CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        success: output.status.success(),
        code: output.status.code(),
    }
}
