use std::{
    ffi::{OsStr, OsString},
    fmt, fs,
    future::Future,
    io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
    time::Instant,
};

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

use crate::paths::ScratchFile;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{command}` exited with {}: {stderr}", exit_code_label(.code))]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

/// A single invocation of an external tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl ToolCommand {
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|arg| arg.as_ref().to_os_string()));
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }

    /// Arguments as UTF-8 strings, lossy for non-UTF-8 paths
    pub fn arguments_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Executes [`ToolCommand`]s.
///
/// Every operation in this crate goes through a runner, so swapping the
/// runner is enough to observe command lines without the external binaries
/// installed. Runners also own the filesystem side effects that precede a
/// command, so a runner that executes nothing leaves the disk untouched.
pub trait CommandRunner {
    fn run(&self, command: &ToolCommand) -> impl Future<Output = Result<(), CommandError>> + Send;

    /// Make sure `dir` exists before a tool writes into it.
    fn prepare_output_dir(&self, dir: &Path) -> io::Result<()> {
        fs::create_dir_all(dir)
    }

    /// Intermediate file in `dir` passed from one command to the next.
    fn scratch_file(&self, dir: &Path, prefix: &str, suffix: &str) -> io::Result<ScratchFile> {
        ScratchFile::create(dir, prefix, suffix)
    }
}

/// Runs commands as child processes and checks their exit status.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &ToolCommand) -> Result<(), CommandError> {
        info!("{command}");
        let started = Instant::now();

        let output = Command::new(command.program())
            .args(command.arguments())
            .output()
            .await
            .map_err(|source| CommandError::Spawn {
                program: command.program().display().to_string(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            status = %output.status,
            "{} finished",
            command.program().display()
        );
        if !stdout.is_empty() {
            debug!(%stdout);
        }
        if !stderr.is_empty() {
            debug!(%stderr);
        }

        if !output.status.success() {
            return Err(CommandError::Failed {
                command: command.to_string(),
                code: output.status.code(),
                stderr,
            });
        }
        Ok(())
    }
}

/// Records commands instead of running them.
///
/// Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct DryRunRunner {
    recorded: Arc<Mutex<Vec<ToolCommand>>>,
}

impl DryRunRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<ToolCommand> {
        self.recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl CommandRunner for DryRunRunner {
    async fn run(&self, command: &ToolCommand) -> Result<(), CommandError> {
        info!("[dry-run] {command}");
        self.recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(command.clone());
        Ok(())
    }

    fn prepare_output_dir(&self, dir: &Path) -> io::Result<()> {
        debug!("[dry-run] would create {}", dir.display());
        Ok(())
    }

    fn scratch_file(&self, dir: &Path, prefix: &str, suffix: &str) -> io::Result<ScratchFile> {
        Ok(ScratchFile::planned(dir, prefix, suffix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_program_and_arguments() {
        let command = ToolCommand::new("wb_command")
            .arg("-cifti-convert")
            .args(["-to-text", "in.dlabel.nii", "out.txt"]);
        assert_eq!(
            command.to_string(),
            "wb_command -cifti-convert -to-text in.dlabel.nii out.txt"
        );
        assert_eq!(command.arguments().len(), 4);
    }

    #[tokio::test]
    async fn dry_run_records_in_order_across_clones() {
        let runner = DryRunRunner::new();
        let shared = runner.clone();
        runner.run(&ToolCommand::new("a")).await.unwrap();
        shared.run(&ToolCommand::new("b").arg("x")).await.unwrap();

        let recorded = runner.commands();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[0].program(), Path::new("a"));
        assert_eq!(recorded[1].arguments_lossy(), vec!["x"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn process_runner_reports_exit_status() {
        ProcessRunner.run(&ToolCommand::new("true")).await.unwrap();

        let err = ProcessRunner
            .run(&ToolCommand::new("false"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Failed { code: Some(1), .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn process_runner_consumes_tool_stdout() {
        // wb_command reports progress on stdout; a chatty tool still succeeds
        ProcessRunner
            .run(&ToolCommand::new("echo").arg("Info: reading input"))
            .await
            .unwrap();

        let err = ProcessRunner
            .run(&ToolCommand::new("sh").args(["-c", "echo partial; echo broken >&2; exit 3"]))
            .await
            .unwrap_err();
        match err {
            CommandError::Failed { code, stderr, .. } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "broken");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn dry_run_leaves_filesystem_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("maps").join("lh");
        let runner = DryRunRunner::new();

        runner.prepare_output_dir(&nested).unwrap();
        let scratch = runner.scratch_file(&nested, "tmp_vertices", ".txt").unwrap();

        assert!(!scratch.is_on_disk());
        assert_eq!(scratch.path(), nested.join("tmp_vertices.txt"));
        assert!(!dir.path().join("maps").exists());
    }

    #[test]
    fn process_runner_creates_output_dir_and_scratch_file() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("maps").join("lh");

        ProcessRunner.prepare_output_dir(&nested).unwrap();
        let scratch = ProcessRunner.scratch_file(&nested, "tmp", ".shape.gii").unwrap();

        assert!(nested.is_dir());
        assert!(scratch.path().is_file());
        assert_eq!(scratch.path().parent(), Some(nested.as_path()));
    }

    #[tokio::test]
    async fn process_runner_reports_missing_binary() {
        let err = ProcessRunner
            .run(&ToolCommand::new("definitely-not-a-wb-command-binary"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Spawn { .. }));
    }
}
