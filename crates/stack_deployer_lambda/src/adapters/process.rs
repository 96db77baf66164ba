use std::process::{Command, Stdio};
use std::thread;

use tracing::{info, warn};

use crate::runtime::command::{CommandExecutionResult, CommandSpec};

pub trait CommandRunner {
    /// Runs the command to completion and captures its output.
    fn run(&self, command: &CommandSpec) -> std::io::Result<CommandExecutionResult>;

    /// Starts the command and returns its pid without waiting for it.
    fn launch(&self, command: &CommandSpec) -> std::io::Result<u32>;
}

/// Runs commands as child processes of the current runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessCommandRunner;

impl CommandRunner for ProcessCommandRunner {
    fn run(&self, command: &CommandSpec) -> std::io::Result<CommandExecutionResult> {
        let output = to_process(command).stdin(Stdio::null()).output()?;
        Ok(CommandExecutionResult {
            command: command.display(),
            stdout: output.stdout,
            stderr: output.stderr,
            exit_code: output.status.code(),
        })
    }

    fn launch(&self, command: &CommandSpec) -> std::io::Result<u32> {
        // Output goes straight to the function's log stream.
        let mut child = to_process(command)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()?;
        let pid = child.id();
        let rendered = command.display();

        // Reaped off-thread so a warm environment does not collect zombies.
        thread::spawn(move || match child.wait() {
            Ok(status) => info!(
                pid,
                command = %rendered,
                exit_code = ?status.code(),
                "detached command exited"
            ),
            Err(error) => warn!(
                pid,
                command = %rendered,
                error = %error,
                "failed to reap detached command"
            ),
        });
        Ok(pid)
    }
}

fn to_process(spec: &CommandSpec) -> Command {
    let mut process = Command::new(&spec.program);
    process
        .args(&spec.args)
        .current_dir(&spec.working_dir)
        .envs(spec.envs.iter().map(|(key, value)| (key, value)));
    process
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell(script: &str, working_dir: &std::path::Path) -> CommandSpec {
        CommandSpec {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            working_dir: working_dir.to_path_buf(),
            envs: vec![("HOME".to_string(), "/staging-home".to_string())],
        }
    }

    #[test]
    fn run_captures_streams_and_exit_code() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = ProcessCommandRunner
            .run(&shell("printf out; printf err >&2; exit 3", dir.path()))
            .expect("command should run");

        assert_eq!(result.stdout, b"out");
        assert_eq!(result.stderr, b"err");
        assert_eq!(result.exit_code, Some(3));
        assert!(!result.succeeded());
        assert!(result.command.starts_with("sh -c"));
    }

    #[test]
    fn run_applies_working_dir_and_env() {
        let dir = tempfile::tempdir().expect("tempdir");
        let canonical = dir.path().canonicalize().expect("canonical tempdir");
        let result = ProcessCommandRunner
            .run(&shell("printf '%s|%s' \"$(pwd -P)\" \"$HOME\"", &canonical))
            .expect("command should run");

        let stdout = String::from_utf8(result.stdout).expect("utf8 stdout");
        assert_eq!(stdout, format!("{}|/staging-home", canonical.display()));
        assert!(result.exit_code == Some(0));
    }

    #[test]
    fn launch_reports_missing_program() {
        let dir = tempfile::tempdir().expect("tempdir");
        let spec = CommandSpec {
            program: "definitely-not-a-deployment-tool".to_string(),
            args: Vec::new(),
            working_dir: dir.path().to_path_buf(),
            envs: Vec::new(),
        };

        let error = ProcessCommandRunner
            .launch(&spec)
            .expect_err("missing program should fail to launch");
        assert_eq!(error.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn launch_returns_without_waiting() {
        let dir = tempfile::tempdir().expect("tempdir");
        let started = std::time::Instant::now();
        let pid = ProcessCommandRunner
            .launch(&shell("sleep 2", dir.path()))
            .expect("command should launch");

        assert!(pid > 0);
        assert!(started.elapsed() < std::time::Duration::from_secs(2));
    }

    #[test]
    fn launched_command_is_reaped_after_exit() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pid = ProcessCommandRunner
            .launch(&shell("exit 0", dir.path()))
            .expect("command should launch");

        // An unreaped child keeps its /proc entry as a zombie.
        let proc_entry = std::path::PathBuf::from(format!("/proc/{pid}"));
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while proc_entry.exists() && std::time::Instant::now() < deadline {
            std::thread::sleep(std::time::Duration::from_millis(20));
        }
        assert!(!proc_entry.exists(), "pid {pid} was never reaped");
    }
}
