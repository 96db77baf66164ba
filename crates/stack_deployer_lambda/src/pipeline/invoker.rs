use std::path::Path;

use tracing::{error, info};

use crate::adapters::process::CommandRunner;
use crate::errors::PipelineError;
use crate::runtime::command::{sam_deploy_command, CommandExecutionResult};
use crate::runtime::stack::StackIdentity;

pub struct DeploymentInvoker<'a> {
    runner: &'a dyn CommandRunner,
    program: &'a str,
    staging_root: &'a Path,
    wait_for_completion: bool,
}

impl<'a> DeploymentInvoker<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        program: &'a str,
        staging_root: &'a Path,
        wait_for_completion: bool,
    ) -> Self {
        Self {
            runner,
            program,
            staging_root,
            wait_for_completion,
        }
    }

    /// Starts `sam deploy` for `stack`. Unless configured to wait, the process
    /// is launched and not awaited: a successful return means the command
    /// started, not that the stack finished deploying.
    pub fn invoke(
        &self,
        stack: &StackIdentity,
        environment_name: &str,
        application_name: &str,
    ) -> Result<CommandExecutionResult, PipelineError> {
        let command = sam_deploy_command(
            self.program,
            self.staging_root,
            stack,
            environment_name,
            application_name,
        );
        let rendered = command.display();
        info!(stack_name = %stack, command = %rendered, "deploying stack");

        let launch_error = |source: std::io::Error| {
            error!(stack_name = %stack, error = %source, "failed to launch deployment");
            PipelineError::ToolInvocation {
                command: rendered.clone(),
                source,
            }
        };

        if self.wait_for_completion {
            let result = self.runner.run(&command).map_err(&launch_error)?;
            if result.succeeded() {
                info!(stack_name = %stack, exit_code = ?result.exit_code, "deployment finished");
            } else {
                error!(
                    stack_name = %stack,
                    exit_code = ?result.exit_code,
                    stderr = %String::from_utf8_lossy(&result.stderr),
                    "deployment command exited unsuccessfully"
                );
            }
            return Ok(result);
        }

        let pid = self.runner.launch(&command).map_err(&launch_error)?;
        info!(stack_name = %stack, pid, "deployment launched, completion is not tracked");
        Ok(CommandExecutionResult::launched(rendered))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::runtime::command::{CommandSpec, HOME_ENV_VAR};

    #[derive(Default)]
    struct RecordingRunner {
        launched: Mutex<Vec<CommandSpec>>,
        ran: Mutex<Vec<CommandSpec>>,
        fail_launch: bool,
    }

    impl CommandRunner for RecordingRunner {
        fn run(&self, command: &CommandSpec) -> std::io::Result<CommandExecutionResult> {
            self.ran
                .lock()
                .expect("poisoned mutex")
                .push(command.clone());
            Ok(CommandExecutionResult {
                command: command.display(),
                stdout: b"Successfully created/updated stack".to_vec(),
                stderr: Vec::new(),
                exit_code: Some(1),
            })
        }

        fn launch(&self, command: &CommandSpec) -> std::io::Result<u32> {
            if self.fail_launch {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "sam: not found",
                ));
            }
            self.launched
                .lock()
                .expect("poisoned mutex")
                .push(command.clone());
            Ok(4242)
        }
    }

    #[test]
    fn launches_detached_deploy_for_stack() {
        let runner = RecordingRunner::default();
        let invoker = DeploymentInvoker::new(&runner, "sam", Path::new("/tmp"), false);

        let result = invoker
            .invoke(&StackIdentity::derive("prod", "myapp"), "prod", "myapp")
            .expect("invoke should succeed");

        assert_eq!(result.exit_code, None);
        assert!(result.command.contains("--stack-name prod-compute-myapp"));
        let launched = runner.launched.lock().expect("poisoned mutex");
        assert_eq!(launched.len(), 1);
        assert_eq!(launched[0].working_dir, Path::new("/tmp"));
        assert_eq!(launched[0].env(HOME_ENV_VAR), Some("/tmp"));
        assert!(launched[0].args.contains(&"Env=prod".to_string()));
        assert!(launched[0].args.contains(&"user:poja=myapp".to_string()));
        assert!(runner.ran.lock().expect("poisoned mutex").is_empty());
    }

    #[test]
    fn waits_when_configured_and_tolerates_failed_exit() {
        let runner = RecordingRunner::default();
        let invoker = DeploymentInvoker::new(&runner, "/opt/sam/bin/sam", Path::new("/tmp"), true);

        let result = invoker
            .invoke(&StackIdentity::derive("dev", "api"), "dev", "api")
            .expect("non-zero exit is not fatal");

        assert_eq!(result.exit_code, Some(1));
        let ran = runner.ran.lock().expect("poisoned mutex");
        assert_eq!(ran[0].program, "/opt/sam/bin/sam");
        assert!(runner.launched.lock().expect("poisoned mutex").is_empty());
    }

    #[test]
    fn launch_failure_is_a_tool_invocation_error() {
        let runner = RecordingRunner {
            fail_launch: true,
            ..RecordingRunner::default()
        };
        let invoker = DeploymentInvoker::new(&runner, "sam", Path::new("/tmp"), false);

        let error = invoker
            .invoke(&StackIdentity::derive("prod", "myapp"), "prod", "myapp")
            .expect_err("launch failure should propagate");

        assert!(matches!(error, PipelineError::ToolInvocation { .. }));
        assert!(error.to_string().starts_with("Failed to launch `sam deploy"));
    }
}
