// Shared helpers for integration tests.
//
// Provides a temporary filesystem root, CLI parsing helpers and executors
// that stand in for the host's package tools.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::Path;
use std::sync::Mutex;

use clap::Parser;
use curator_repo::cli::Cli;
use curator_repo::exec::{ExecResult, Executor};

/// An isolated filesystem root backed by a [`tempfile::TempDir`].
pub struct TestRoot {
    /// Temporary directory standing in for `/`.
    pub dir: tempfile::TempDir,
}

impl TestRoot {
    /// Create an empty root.
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    /// Create a root whose `etc/os-release` has the given `ID` and `VERSION_ID`.
    pub fn with_os_release(id: &str, version_id: &str) -> Self {
        let root = Self::new();
        root.write(
            "etc/os-release",
            &format!("NAME=\"Test\"\nID=\"{id}\"\nVERSION_ID=\"{version_id}\"\n"),
        );
        root
    }

    /// Path to the root directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        std::fs::write(path, content).expect("write file");
    }

    /// Read `relative`, or `None` when it does not exist.
    pub fn read(&self, relative: &str) -> Option<String> {
        std::fs::read_to_string(self.path().join(relative)).ok()
    }

    /// Parse a command line with `--root` pointing at this directory.
    pub fn cli(&self, args: &[&str]) -> Cli {
        let root = self.path().to_string_lossy().to_string();
        let argv = ["curator", "--root", root.as_str()]
            .into_iter()
            .chain(args.iter().copied());
        Cli::try_parse_from(argv).expect("parse command line")
    }
}

/// Executor that answers by command-line prefix and records every call.
///
/// Calls matching no rule succeed with empty output.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    rules: Vec<(String, i32, String)>,
    programs: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer calls whose command line starts with `prefix`.
    pub fn respond(mut self, prefix: &str, code: i32, stdout: &str) -> Self {
        self.rules
            .push((prefix.to_string(), code, stdout.to_string()));
        self
    }

    /// Programs reported as present by [`Executor::which`].
    pub fn with_programs(mut self, programs: &[&str]) -> Self {
        self.programs = programs.iter().map(|p| (*p).to_string()).collect();
        self
    }

    /// Every command line issued so far, space-joined.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    /// Position of the first call starting with `prefix`.
    pub fn position(&self, prefix: &str) -> Option<usize> {
        self.calls().iter().position(|c| c.starts_with(prefix))
    }

    fn answer(&self, program: &str, args: &[&str]) -> ExecResult {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        let (code, stdout) = self
            .rules
            .iter()
            .find(|(prefix, _, _)| line.starts_with(prefix.as_str()))
            .map_or((0, String::new()), |(_, code, out)| (*code, out.clone()));
        self.calls.lock().expect("calls lock").push(line);
        ExecResult {
            stdout,
            stderr: String::new(),
            success: code == 0,
            code: Some(code),
        }
    }
}

impl Executor for RecordingExecutor {
    fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        let result = self.answer(program, args);
        if !result.success {
            anyhow::bail!("{program} failed (exit {})", result.code.unwrap_or(-1));
        }
        Ok(result)
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        Ok(self.answer(program, args))
    }

    fn which(&self, program: &str) -> bool {
        self.programs.iter().any(|p| p == program)
    }
}

mockall::mock! {
    /// Mock executor for asserting which calls may happen at all.
    pub Exec {}

    impl Executor for Exec {
        fn run<'a, 'b>(&self, program: &str, args: &'a [&'b str]) -> anyhow::Result<ExecResult>;
        fn run_unchecked<'a, 'b>(&self, program: &str, args: &'a [&'b str]) -> anyhow::Result<ExecResult>;
        fn which(&self, program: &str) -> bool;
    }
}

impl std::fmt::Debug for MockExec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockExec").finish_non_exhaustive()
    }
}

/// An [`ExecResult`] with the given exit code and no output.
pub fn exit(code: i32) -> ExecResult {
    ExecResult {
        stdout: String::new(),
        stderr: String::new(),
        success: code == 0,
        code: Some(code),
    }
}
