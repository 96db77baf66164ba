use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::integrity::IntegrityStatus;
use crate::stack::StackIdentity;

pub const EVENT_SOURCE: &str = "api.jcloudify.app.event1";
pub const EVENT_STACK_TARGET: &str = "EVENT_STACK_1";
pub const DETAIL_TYPE_PREFIX: &str = "api.jcloudify.app.endpoint.event.model.";

/// Outcome reported to the event bus once a pipeline run succeeds.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusEvent {
    StackCrupdated {
        user_id: String,
        app_id: String,
        env_id: String,
        stack_name: StackIdentity,
    },
    IntegrityCheckDone {
        user_id: String,
        app_id: String,
        env_id: String,
        built_env_info: Value,
        deployment_conf_id: String,
        status: IntegrityStatus,
    },
}

/// A single entry ready to hand to the bus collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BusEntry {
    pub source: String,
    pub detail_type: String,
    pub detail: String,
    pub event_bus_name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StackCrupdatedDetail<'a> {
    user_id: &'a str,
    app_id: &'a str,
    env_id: &'a str,
    stack_name: &'a StackIdentity,
    event_source: &'static str,
    event_stack: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IntegrityCheckDoneDetail<'a> {
    user_id: &'a str,
    app_id: &'a str,
    env_id: &'a str,
    built_env_info: &'a Value,
    deployment_conf_id: &'a str,
    status: IntegrityStatus,
    event_source: &'static str,
    event_stack: &'static str,
}

impl StatusEvent {
    pub fn schema_name(&self) -> &'static str {
        match self {
            Self::StackCrupdated { .. } => "ComputeStackCrupdated",
            Self::IntegrityCheckDone { .. } => "TemplateIntegrityCheckDone",
        }
    }

    pub fn detail_type(&self) -> String {
        format!("{DETAIL_TYPE_PREFIX}{}", self.schema_name())
    }

    pub fn detail(&self) -> Result<Value, serde_json::Error> {
        match self {
            Self::StackCrupdated {
                user_id,
                app_id,
                env_id,
                stack_name,
            } => serde_json::to_value(StackCrupdatedDetail {
                user_id,
                app_id,
                env_id,
                stack_name,
                event_source: EVENT_SOURCE,
                event_stack: EVENT_STACK_TARGET,
            }),
            Self::IntegrityCheckDone {
                user_id,
                app_id,
                env_id,
                built_env_info,
                deployment_conf_id,
                status,
            } => serde_json::to_value(IntegrityCheckDoneDetail {
                user_id,
                app_id,
                env_id,
                built_env_info,
                deployment_conf_id,
                status: *status,
                event_source: EVENT_SOURCE,
                event_stack: EVENT_STACK_TARGET,
            }),
        }
    }

    pub fn to_bus_entry(&self, event_bus_name: &str) -> Result<BusEntry, serde_json::Error> {
        Ok(BusEntry {
            source: EVENT_SOURCE.to_string(),
            detail_type: self.detail_type(),
            detail: serde_json::to_string(&self.detail()?)?,
            event_bus_name: event_bus_name.to_string(),
        })
    }
}
