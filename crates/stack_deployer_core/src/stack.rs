use serde::{Deserialize, Serialize};

/// Name of the provisioned infrastructure unit for one application in one
/// environment. Always `"{environment}-compute-{application}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StackIdentity(String);

impl StackIdentity {
    pub fn derive(environment_name: &str, application_name: &str) -> Self {
        Self(format!("{environment_name}-compute-{application_name}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StackIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
