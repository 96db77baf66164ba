use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEPLOY_SOURCE_SUFFIX: &str = "deployer.event.deploy";
pub const INTEGRITY_CHECK_SOURCE_SUFFIX: &str = "deployer.event.check_template_integrity";
pub const ACKNOWLEDGEMENT_MESSAGE: &str = "Deployment successfully triggered";

/// Envelope carried by queue records and bus events. `source` selects the
/// capability, `detail` carries its payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InboundEnvelope {
    pub source: String,
    #[serde(default)]
    pub detail: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeployDetail {
    pub app_name: String,
    pub environment_type: String,
    pub formatted_bucket_key: String,
    pub app_id: String,
    pub user_id: String,
    pub env_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IntegrityCheckDetail {
    pub built_project_bucket_key: String,
    pub template_file_bucket_key: String,
    pub user_id: String,
    pub app_id: String,
    pub env_id: String,
    #[serde(default)]
    pub built_env_info: Value,
    pub deployment_conf_id: String,
}

/// Query parameters of an HTTP-style invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpDeployQuery {
    pub app_name: Option<String>,
    pub env: Option<String>,
    pub bucket_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeploymentOwner {
    pub user_id: String,
    pub application_id: String,
    pub environment_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeploymentRequest {
    pub application_name: String,
    pub environment_name: String,
    pub artifact_key: String,
    pub owner: Option<DeploymentOwner>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IntegrityCheckRequest {
    pub built_project_artifact_key: String,
    pub template_fragment_key: String,
    pub user_id: String,
    pub application_id: String,
    pub environment_id: String,
    pub built_env_info: Value,
    pub deployment_config_id: String,
}

/// Capability selected for one inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineTask {
    Deploy(DeploymentRequest),
    IntegrityCheck(IntegrityCheckRequest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

pub fn route_envelope(envelope: InboundEnvelope) -> Result<PipelineTask, ValidationError> {
    let source = envelope.source.trim();
    if source.ends_with(DEPLOY_SOURCE_SUFFIX) {
        let detail: DeployDetail = serde_json::from_value(envelope.detail)
            .map_err(|error| ValidationError::new(format!("Malformed deploy detail: {error}")))?;
        return normalize_deploy_detail(detail).map(PipelineTask::Deploy);
    }

    if source.ends_with(INTEGRITY_CHECK_SOURCE_SUFFIX) {
        let detail: IntegrityCheckDetail =
            serde_json::from_value(envelope.detail).map_err(|error| {
                ValidationError::new(format!("Malformed integrity check detail: {error}"))
            })?;
        return normalize_integrity_check_detail(detail).map(PipelineTask::IntegrityCheck);
    }

    Err(ValidationError::new(format!(
        "Unsupported event source '{source}'"
    )))
}

pub fn normalize_deploy_detail(detail: DeployDetail) -> Result<DeploymentRequest, ValidationError> {
    let mut request = normalize_target(
        &detail.app_name,
        &detail.environment_type,
        &detail.formatted_bucket_key,
    )?;
    request.owner = Some(DeploymentOwner {
        user_id: detail.user_id,
        application_id: detail.app_id,
        environment_id: detail.env_id,
    });
    Ok(request)
}

pub fn normalize_http_query(query: HttpDeployQuery) -> Result<DeploymentRequest, ValidationError> {
    let app_name = require_param(query.app_name, "app_name")?;
    let env = require_param(query.env, "env")?;
    let bucket_key = require_param(query.bucket_key, "bucket_key")?;
    normalize_target(&app_name, &env, &bucket_key)
}

pub fn normalize_integrity_check_detail(
    detail: IntegrityCheckDetail,
) -> Result<IntegrityCheckRequest, ValidationError> {
    let built_project_artifact_key = non_empty(
        &detail.built_project_bucket_key,
        "built_project_bucket_key cannot be empty",
    )?;
    let template_fragment_key = non_empty(
        &detail.template_file_bucket_key,
        "template_file_bucket_key cannot be empty",
    )?;

    Ok(IntegrityCheckRequest {
        built_project_artifact_key,
        template_fragment_key,
        user_id: detail.user_id,
        application_id: detail.app_id,
        environment_id: detail.env_id,
        built_env_info: detail.built_env_info,
        deployment_config_id: detail.deployment_conf_id,
    })
}

fn normalize_target(
    app_name: &str,
    environment: &str,
    artifact_key: &str,
) -> Result<DeploymentRequest, ValidationError> {
    let application_name = non_empty(app_name, "app_name cannot be empty")?;
    let environment_name = non_empty(environment, "environment cannot be empty")?.to_lowercase();
    let artifact_key = non_empty(artifact_key, "artifact key cannot be empty")?;

    Ok(DeploymentRequest {
        application_name,
        environment_name,
        artifact_key,
        owner: None,
    })
}

fn require_param(value: Option<String>, name: &str) -> Result<String, ValidationError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ValidationError::new(format!(
            "Missing query parameter '{name}'"
        ))),
    }
}

fn non_empty(value: &str, message: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(message));
    }
    Ok(trimmed.to_string())
}
