use std::path::PathBuf;

use crate::errors::PipelineError;
use crate::runtime::command::DEFAULT_SAM_PROGRAM;

pub const BUCKET_ENV: &str = "AWS_S3_BUCKET_NAME";
pub const EVENT_BUS_ENV: &str = "AWS_EVENTBRIDGE_BUS";
pub const STAGING_DIR_ENV: &str = "STAGING_DIR";
pub const SAM_CLI_PATH_ENV: &str = "SAM_CLI_PATH";
pub const MOCK_PROJECT_KEY_ENV: &str = "MOCK_PROJECT_BUCKET_KEY";
pub const MOCK_PROJECT_FOLDER_ENV: &str = "MOCK_PROJECT_FOLDER_NAME";
pub const DEPLOY_WAIT_ENV: &str = "DEPLOY_WAIT_FOR_COMPLETION";
pub const DEFAULT_STAGING_DIR: &str = "/tmp";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockProjectConfig {
    pub bucket_key: String,
    pub folder_name: String,
}

/// Startup configuration of the deployer runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployerConfig {
    pub bucket: String,
    pub event_bus_name: String,
    pub staging_root: PathBuf,
    pub sam_program: String,
    pub mock_project_key: Option<String>,
    pub mock_project_folder: Option<String>,
    pub wait_for_deploy: bool,
}

impl DeployerConfig {
    pub fn from_env() -> Result<Self, PipelineError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, PipelineError> {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let required = |name: &str| {
            read(name).ok_or_else(|| PipelineError::Config(format!("{name} must be configured")))
        };

        let wait_for_deploy = match read(DEPLOY_WAIT_ENV) {
            None => false,
            Some(value) => parse_flag(&value).ok_or_else(|| {
                PipelineError::Config(format!(
                    "{DEPLOY_WAIT_ENV} must be a boolean, got '{value}'"
                ))
            })?,
        };

        Ok(Self {
            bucket: required(BUCKET_ENV)?,
            event_bus_name: required(EVENT_BUS_ENV)?,
            staging_root: PathBuf::from(
                read(STAGING_DIR_ENV).unwrap_or_else(|| DEFAULT_STAGING_DIR.to_string()),
            ),
            sam_program: read(SAM_CLI_PATH_ENV).unwrap_or_else(|| DEFAULT_SAM_PROGRAM.to_string()),
            mock_project_key: read(MOCK_PROJECT_KEY_ENV),
            mock_project_folder: read(MOCK_PROJECT_FOLDER_ENV),
            wait_for_deploy,
        })
    }

    /// The mock project is only needed by integrity checks, so its absence is
    /// reported when a check asks for it rather than at startup.
    pub fn mock_project(&self) -> Result<MockProjectConfig, PipelineError> {
        let bucket_key = self.mock_project_key.clone().ok_or_else(|| {
            PipelineError::Config(format!("{MOCK_PROJECT_KEY_ENV} must be configured"))
        })?;
        let folder_name = self.mock_project_folder.clone().ok_or_else(|| {
            PipelineError::Config(format!("{MOCK_PROJECT_FOLDER_ENV} must be configured"))
        })?;
        Ok(MockProjectConfig {
            bucket_key,
            folder_name,
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
