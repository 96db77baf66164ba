//! Deployment trigger pipeline: fetch, install, invoke, check and notify.
//!
//! Every run is a sequential chain of blocking steps. The first failing step
//! aborts the run, so nothing downstream of a failure (subprocess launch,
//! event publication) ever happens.

pub mod fetcher;
pub mod installer;
pub mod integrity;
pub mod invoker;
pub mod notifier;

use tracing::{info, instrument};

use crate::adapters::event_bus::EventPublisher;
use crate::adapters::object_store::ArtifactStore;
use crate::adapters::process::CommandRunner;
use crate::config::DeployerConfig;
use crate::errors::PipelineError;
use crate::runtime::contract::{DeploymentRequest, IntegrityCheckRequest, PipelineTask};
use crate::runtime::events::StatusEvent;
use crate::runtime::stack::StackIdentity;

use fetcher::ArtifactFetcher;
use integrity::IntegrityChecker;
use invoker::DeploymentInvoker;
use notifier::EventNotifier;

/// Build output directory of the deployment tool, relative to a project root.
pub const SAM_BUILD_DIR: &str = ".aws-sam";

pub struct DeploymentPipeline<'a> {
    config: &'a DeployerConfig,
    store: &'a dyn ArtifactStore,
    runner: &'a dyn CommandRunner,
    publisher: &'a dyn EventPublisher,
}

impl<'a> DeploymentPipeline<'a> {
    pub fn new(
        config: &'a DeployerConfig,
        store: &'a dyn ArtifactStore,
        runner: &'a dyn CommandRunner,
        publisher: &'a dyn EventPublisher,
    ) -> Self {
        Self {
            config,
            store,
            runner,
            publisher,
        }
    }

    pub fn run(&self, task: &PipelineTask) -> Result<Option<StatusEvent>, PipelineError> {
        match task {
            PipelineTask::Deploy(request) => self.deploy(request),
            PipelineTask::IntegrityCheck(request) => self.check_integrity(request).map(Some),
        }
    }

    /// Stages the artifact and launches `sam deploy`. The returned event is
    /// `None` for requests without an owner, which publish nothing.
    #[instrument(
        skip_all,
        fields(
            application = %request.application_name,
            environment = %request.environment_name,
        )
    )]
    pub fn deploy(&self, request: &DeploymentRequest) -> Result<Option<StatusEvent>, PipelineError> {
        let staging_root = &self.config.staging_root;
        let archive = self.fetcher().fetch(&request.artifact_key)?;
        installer::install(&archive, staging_root)?;
        installer::normalize_permissions(&staging_root.join(SAM_BUILD_DIR))?;

        let stack = StackIdentity::derive(&request.environment_name, &request.application_name);
        self.invoker()
            .invoke(&stack, &request.environment_name, &request.application_name)?;

        let Some(owner) = &request.owner else {
            info!(stack_name = %stack, "request has no owner, skipping status event");
            return Ok(None);
        };

        let event = StatusEvent::StackCrupdated {
            user_id: owner.user_id.clone(),
            app_id: owner.application_id.clone(),
            env_id: owner.environment_id.clone(),
            stack_name: stack,
        };
        self.notifier().publish(&event)?;
        Ok(Some(event))
    }

    #[instrument(
        skip_all,
        fields(deployment_config_id = %request.deployment_config_id)
    )]
    pub fn check_integrity(
        &self,
        request: &IntegrityCheckRequest,
    ) -> Result<StatusEvent, PipelineError> {
        let mock_project = self.config.mock_project()?;
        let fetcher = self.fetcher();
        let checker = IntegrityChecker::new(
            &fetcher,
            self.runner,
            &self.config.sam_program,
            &self.config.staging_root,
            mock_project,
        );
        let report = checker.check(request)?;

        let event = StatusEvent::IntegrityCheckDone {
            user_id: request.user_id.clone(),
            app_id: request.application_id.clone(),
            env_id: request.environment_id.clone(),
            built_env_info: request.built_env_info.clone(),
            deployment_conf_id: request.deployment_config_id.clone(),
            status: report.status,
        };
        self.notifier().publish(&event)?;
        Ok(event)
    }

    fn fetcher(&self) -> ArtifactFetcher<'_> {
        ArtifactFetcher::new(self.store, &self.config.staging_root)
    }

    fn invoker(&self) -> DeploymentInvoker<'_> {
        DeploymentInvoker::new(
            self.runner,
            &self.config.sam_program,
            &self.config.staging_root,
            self.config.wait_for_deploy,
        )
    }

    fn notifier(&self) -> EventNotifier<'_> {
        EventNotifier::new(self.publisher, &self.config.event_bus_name)
    }
}
