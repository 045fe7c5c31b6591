//! External command execution.
//!
//! Commands run in the session's working directory with the host
//! environment, with stdout and stderr collected in full before returning.
//! There is no sandboxing and no timeout.

use crate::error::ShellError;
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use tracing::{error, info, warn};

/// Captured result of one external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    fn from_output(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        }
    }
}

// =============================================================================
// Traits for Dependency Injection
// =============================================================================

/// Trait for running system processes.
///
/// This abstraction enables testing without spawning real processes.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Runs `program` with `args` in `cwd` and waits for it to finish.
    async fn run(&self, program: &Path, args: &[String], cwd: &Path) -> io::Result<Output>;

    /// Checks whether `program` resolves to an executable from `cwd`.
    fn program_exists(&self, program: &str, cwd: &Path) -> bool;
}

/// Default process runner using tokio::process::Command.
pub struct SystemProcessRunner;

#[async_trait]
impl ProcessRunner for SystemProcessRunner {
    async fn run(&self, program: &Path, args: &[String], cwd: &Path) -> io::Result<Output> {
        tokio::process::Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
    }

    fn program_exists(&self, program: &str, cwd: &Path) -> bool {
        which::which_in(program, std::env::var_os("PATH"), cwd).is_ok()
    }
}

// =============================================================================
// Executor Implementation
// =============================================================================

pub struct ProcessExecutor {
    runner: Box<dyn ProcessRunner>,
}

impl ProcessExecutor {
    pub fn new() -> Self {
        Self::with_runner(Box::new(SystemProcessRunner))
    }

    /// Creates an executor with an injected runner (for testing).
    pub fn with_runner(runner: Box<dyn ProcessRunner>) -> Self {
        Self { runner }
    }

    /// Runs `argv[0]` with the remaining tokens as arguments.
    ///
    /// A non-zero exit status is not an error; it is reported in the
    /// returned [`ExecutionResult`].
    ///
    /// # Errors
    ///
    /// - [`ShellError::ProgramNotFound`] if the program cannot be resolved
    /// - [`ShellError::PermissionDenied`] if it exists but cannot be executed
    /// - [`ShellError::Execution`] for any other launch failure, including
    ///   an empty `argv`
    pub async fn run(
        &self,
        argv: &[String],
        working_directory: &Path,
    ) -> Result<ExecutionResult, ShellError> {
        let Some((program, args)) = argv.split_first() else {
            return Err(ShellError::execution("", "No command provided"));
        };

        let program_path = resolve_program(program, working_directory);
        info!("Executing: {} {:?} in {}", program, args, working_directory.display());

        match self.runner.run(&program_path, args, working_directory).await {
            Ok(output) => {
                let result = ExecutionResult::from_output(output);
                if !result.success() {
                    warn!("{} exited with {:?}", program, result.exit_code);
                }
                Ok(result)
            }
            Err(e) => Err(self.map_spawn_error(program, working_directory, e)),
        }
    }

    fn map_spawn_error(&self, program: &str, working_directory: &Path, e: io::Error) -> ShellError {
        error!("Failed to launch {}: {}", program, e);
        match e.kind() {
            // ENOENT also comes back when the working directory itself has vanished,
            // or when a script's interpreter is missing.
            io::ErrorKind::NotFound if !working_directory.is_dir() => ShellError::execution(
                program,
                format!("working directory {} is unavailable", working_directory.display()),
            ),
            io::ErrorKind::NotFound if self.runner.program_exists(program, working_directory) => {
                ShellError::execution(program, "could not be started (missing interpreter?)")
            }
            io::ErrorKind::NotFound => ShellError::ProgramNotFound(program.to_string()),
            io::ErrorKind::PermissionDenied => ShellError::PermissionDenied(program.to_string()),
            _ => ShellError::execution(program, e.to_string()),
        }
    }
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Programs given with a path are resolved against the session directory;
/// bare names are left for PATH lookup.
fn resolve_program(program: &str, working_directory: &Path) -> PathBuf {
    let path = Path::new(program);
    if program.contains(std::path::MAIN_SEPARATOR) && path.is_relative() {
        working_directory.join(path)
    } else {
        path.to_path_buf()
    }
}
