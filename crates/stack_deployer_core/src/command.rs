use std::path::{Path, PathBuf};

use crate::stack::StackIdentity;

pub const DEFAULT_SAM_PROGRAM: &str = "sam";
pub const HOME_ENV_VAR: &str = "HOME";

/// A fully structured external command. Arguments are passed to the process
/// as discrete values and never through a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    pub envs: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn display(&self) -> String {
        let mut rendered = self.program.clone();
        for arg in &self.args {
            rendered.push(' ');
            rendered.push_str(arg);
        }
        rendered
    }

    pub fn env(&self, name: &str) -> Option<&str> {
        self.envs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Outcome of one external command. `exit_code` is `None` for a command that
/// was launched without being awaited, or that was terminated by a signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandExecutionResult {
    pub command: String,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub exit_code: Option<i32>,
}

impl CommandExecutionResult {
    pub fn launched(command: String) -> Self {
        Self {
            command,
            stdout: Vec::new(),
            stderr: Vec::new(),
            exit_code: None,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

pub fn sam_deploy_args(
    stack: &StackIdentity,
    environment_name: &str,
    application_name: &str,
) -> Vec<String> {
    vec![
        "deploy".to_string(),
        "--no-confirm-changeset".to_string(),
        "--no-fail-on-empty-changeset".to_string(),
        "--capabilities".to_string(),
        "CAPABILITY_IAM".to_string(),
        "--resolve-s3".to_string(),
        "--stack-name".to_string(),
        stack.to_string(),
        "--parameter-overrides".to_string(),
        format!("Env={environment_name}"),
        "--tags".to_string(),
        format!("app={application_name}"),
        format!("env={environment_name}"),
        format!("user:poja={application_name}"),
    ]
}

/// `sam deploy` run from the staging root, which also serves as `HOME` for
/// the tool's cache and config.
pub fn sam_deploy_command(
    program: &str,
    staging_root: &Path,
    stack: &StackIdentity,
    environment_name: &str,
    application_name: &str,
) -> CommandSpec {
    CommandSpec {
        program: program.to_string(),
        args: sam_deploy_args(stack, environment_name, application_name),
        working_dir: staging_root.to_path_buf(),
        envs: vec![home_env(staging_root)],
    }
}

pub fn sam_build_command(program: &str, project_dir: &Path, home: &Path) -> CommandSpec {
    CommandSpec {
        program: program.to_string(),
        args: vec!["build".to_string()],
        working_dir: project_dir.to_path_buf(),
        envs: vec![home_env(home)],
    }
}

fn home_env(home: &Path) -> (String, String) {
    (HOME_ENV_VAR.to_string(), home.to_string_lossy().into_owned())
}
