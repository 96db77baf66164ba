use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::runtime::contract::ACKNOWLEDGEMENT_MESSAGE;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    pub body: String,
}

/// Fixed acknowledgement returned once the pipeline has run. For deployments
/// it only means the deployment command was launched.
pub fn acknowledgement() -> ApiGatewayResponse {
    json_response(200, json!({ "message": ACKNOWLEDGEMENT_MESSAGE }))
}

pub fn validation_error_response(message: &str) -> ApiGatewayResponse {
    json_response(
        400,
        json!({
            "error": "validation_error",
            "message": message,
        }),
    )
}

fn json_response(status_code: u16, payload: Value) -> ApiGatewayResponse {
    ApiGatewayResponse {
        status_code,
        headers: json!({"Content-Type": "application/json"}),
        body: payload.to_string(),
    }
}
