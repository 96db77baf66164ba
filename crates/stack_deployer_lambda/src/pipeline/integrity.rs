use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::adapters::process::CommandRunner;
use crate::config::MockProjectConfig;
use crate::errors::PipelineError;
use crate::pipeline::fetcher::ArtifactFetcher;
use crate::pipeline::installer;
use crate::runtime::command::sam_build_command;
use crate::runtime::contract::IntegrityCheckRequest;
use crate::runtime::integrity::{classify_templates, template_digest, IntegrityStatus};

pub const TEMPLATE_FILE_NAME: &str = "template.yml";
pub const BUILT_TEMPLATE_PATH: &str = ".aws-sam/build/template.yaml";
pub const BUILT_PROJECT_DIR: &str = "built-project";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityReport {
    pub status: IntegrityStatus,
    pub reference_digest: String,
    pub deployed_digest: Option<String>,
}

/// Rebuilds the reference template from the trusted mock project plus the
/// supplied fragment and compares it with the template of the built project.
pub struct IntegrityChecker<'a> {
    fetcher: &'a ArtifactFetcher<'a>,
    runner: &'a dyn CommandRunner,
    program: &'a str,
    staging_root: &'a Path,
    mock_project: MockProjectConfig,
}

impl<'a> IntegrityChecker<'a> {
    pub fn new(
        fetcher: &'a ArtifactFetcher<'a>,
        runner: &'a dyn CommandRunner,
        program: &'a str,
        staging_root: &'a Path,
        mock_project: MockProjectConfig,
    ) -> Self {
        Self {
            fetcher,
            runner,
            program,
            staging_root,
            mock_project,
        }
    }

    pub fn check(&self, request: &IntegrityCheckRequest) -> Result<IntegrityReport, PipelineError> {
        let mock_dir = self.prepare_mock_project()?;

        let fragment = self.fetcher.fetch(&request.template_fragment_key)?;
        fs::copy(&fragment, mock_dir.join(TEMPLATE_FILE_NAME))?;

        self.build_reference(&mock_dir)?;

        let built_dir = self.staging_root.join(BUILT_PROJECT_DIR);
        remove_dir_if_present(&built_dir)?;
        let built_archive = self.fetcher.fetch(&request.built_project_artifact_key)?;
        installer::install(&built_archive, &built_dir)?;

        let reference_path = mock_dir.join(BUILT_TEMPLATE_PATH);
        let reference = match fs::read(&reference_path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Err(PipelineError::TemplateUnavailable(
                    reference_path.display().to_string(),
                ));
            }
            Err(error) => return Err(error.into()),
        };
        let deployed = read_optional(&built_dir.join(BUILT_TEMPLATE_PATH))?;

        let report = IntegrityReport {
            status: classify_templates(&reference, deployed.as_deref()),
            reference_digest: template_digest(&reference),
            deployed_digest: deployed.as_deref().map(template_digest),
        };
        info!(
            status = report.status.as_str(),
            reference_digest = %report.reference_digest,
            deployed_digest = ?report.deployed_digest,
            "template integrity checked"
        );
        Ok(report)
    }

    fn prepare_mock_project(&self) -> Result<PathBuf, PipelineError> {
        let archive = self.fetcher.fetch(&self.mock_project.bucket_key)?;
        let mock_dir = self.staging_root.join(&self.mock_project.folder_name);
        // A warm execution environment may still hold a previous build.
        remove_dir_if_present(&mock_dir)?;
        installer::install(&archive, self.staging_root)?;

        if !mock_dir.is_dir() {
            return Err(PipelineError::Extraction(format!(
                "mock project archive has no folder '{}'",
                self.mock_project.folder_name
            )));
        }
        Ok(mock_dir)
    }

    fn build_reference(&self, mock_dir: &Path) -> Result<(), PipelineError> {
        let command = sam_build_command(self.program, mock_dir, self.staging_root);
        let rendered = command.display();
        info!(command = %rendered, project = %mock_dir.display(), "building reference template");

        let result = self
            .runner
            .run(&command)
            .map_err(|source| PipelineError::ToolInvocation {
                command: rendered,
                source,
            })?;
        if !result.succeeded() {
            // Not fatal: a missing reference template is reported below.
            warn!(
                exit_code = ?result.exit_code,
                stderr = %String::from_utf8_lossy(&result.stderr),
                "reference build exited unsuccessfully"
            );
        }
        Ok(())
    }
}

fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, PipelineError> {
    match fs::read(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(error) => Err(error.into()),
    }
}

fn remove_dir_if_present(path: &Path) -> Result<(), PipelineError> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(error) => Err(error.into()),
    }
}
