use serde_json::Value;
use tracing::{info, warn};

use crate::errors::PipelineError;
use crate::handlers::response::{acknowledgement, validation_error_response, ApiGatewayResponse};
use crate::pipeline::DeploymentPipeline;
use crate::runtime::contract::{
    normalize_http_query, route_envelope, HttpDeployQuery, InboundEnvelope, PipelineTask,
    ValidationError,
};

/// Shape of one Lambda invocation payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    /// Raw SQS record bodies, decoded one at a time while processing.
    Queue(Vec<Value>),
    Bus(InboundEnvelope),
    Http(HttpDeployQuery),
}

/// Runs the pipeline for every message in `event`. Queue records run in
/// order and the first failure aborts the invocation, leaving redrive to the
/// platform.
pub fn handle_event(
    event: Value,
    pipeline: &DeploymentPipeline<'_>,
) -> Result<ApiGatewayResponse, PipelineError> {
    match classify_event(event)? {
        Invocation::Queue(bodies) => {
            info!(records = bodies.len(), "received queue batch");
            for body in &bodies {
                let task = route_envelope(decode_envelope(body)?)?;
                run_task(pipeline, &task)?;
            }
            Ok(acknowledgement())
        }
        Invocation::Bus(envelope) => {
            info!(source = %envelope.source, "received bus event");
            run_task(pipeline, &route_envelope(envelope)?)?;
            Ok(acknowledgement())
        }
        Invocation::Http(query) => {
            let request = match normalize_http_query(query) {
                Ok(request) => request,
                Err(error) => {
                    warn!(error = %error, "rejected http invocation");
                    return Ok(validation_error_response(error.message()));
                }
            };
            info!(artifact_key = %request.artifact_key, "received http invocation");
            pipeline.deploy(&request)?;
            Ok(acknowledgement())
        }
    }
}

pub fn classify_event(event: Value) -> Result<Invocation, ValidationError> {
    if is_sqs_event(&event) {
        return decode_sqs_bodies(&event).map(Invocation::Queue);
    }
    if is_empty_batch(&event) {
        return Ok(Invocation::Queue(Vec::new()));
    }

    let Value::Object(mut object) = event else {
        return Err(ValidationError::new("Invocation payload must be a JSON object"));
    };

    if object.contains_key("source") && object.contains_key("detail") {
        let envelope = serde_json::from_value(Value::Object(object))
            .map_err(|error| ValidationError::new(format!("Malformed bus event: {error}")))?;
        return Ok(Invocation::Bus(envelope));
    }

    if let Some(parameters) = object.remove("queryStringParameters") {
        let query = match parameters {
            Value::Null => HttpDeployQuery::default(),
            other => serde_json::from_value(other).map_err(|error| {
                ValidationError::new(format!("Malformed query parameters: {error}"))
            })?,
        };
        return Ok(Invocation::Http(query));
    }

    Err(ValidationError::new("Unsupported invocation event shape"))
}

pub fn is_sqs_event(event: &Value) -> bool {
    event
        .get("Records")
        .and_then(Value::as_array)
        .map(|records| {
            !records.is_empty()
                && records.iter().all(|record| {
                    record
                        .get("eventSource")
                        .and_then(Value::as_str)
                        .map(|source| source == "aws:sqs")
                        .unwrap_or(false)
                })
        })
        .unwrap_or(false)
}

fn is_empty_batch(event: &Value) -> bool {
    event
        .get("Records")
        .and_then(Value::as_array)
        .map(Vec::is_empty)
        .unwrap_or(false)
}

fn decode_sqs_bodies(event: &Value) -> Result<Vec<Value>, ValidationError> {
    let records = event
        .get("Records")
        .and_then(Value::as_array)
        .ok_or_else(|| ValidationError::new("SQS event must include Records array"))?;

    records
        .iter()
        .map(|record| {
            record
                .get("body")
                .and_then(Value::as_str)
                .map(|body| Value::String(body.to_string()))
                .ok_or_else(|| ValidationError::new("SQS record body must be a string"))
        })
        .collect()
}

fn decode_envelope(body: &Value) -> Result<InboundEnvelope, ValidationError> {
    let text = body
        .as_str()
        .ok_or_else(|| ValidationError::new("SQS record body must be a string"))?;
    serde_json::from_str(text)
        .map_err(|error| ValidationError::new(format!("invalid inbound envelope: {error}")))
}

fn run_task(pipeline: &DeploymentPipeline<'_>, task: &PipelineTask) -> Result<(), PipelineError> {
    let event = pipeline.run(task)?;
    if let Some(event) = event {
        info!(schema = event.schema_name(), "pipeline run completed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn detects_sqs_event_shape() {
        let event = json!({
            "Records": [
                {"eventSource": "aws:sqs", "body": "{}"}
            ]
        });
        assert!(is_sqs_event(&event));
    }

    #[test]
    fn rejects_non_sqs_records() {
        let event = json!({
            "Records": [
                {"eventSource": "aws:s3", "body": "{}"}
            ]
        });
        assert!(!is_sqs_event(&event));
        let error = classify_event(event).expect_err("s3 records are unsupported");
        assert_eq!(error.message(), "Unsupported invocation event shape");
    }

    #[test]
    fn rejects_record_without_body_string() {
        let event = json!({
            "Records": [
                {"eventSource": "aws:sqs", "body": 42}
            ]
        });

        let error = classify_event(event).expect_err("non-string body should fail");
        assert_eq!(error.message(), "SQS record body must be a string");
    }

    #[test]
    fn rejects_invalid_envelope_json() {
        let error = decode_envelope(&Value::String("{\"detail\":{}}".to_string()))
            .expect_err("envelope without source should fail");
        assert!(error.message().contains("invalid inbound envelope"));
    }

    #[test]
    fn classifies_direct_bus_event() {
        let invocation = classify_event(json!({
            "version": "0",
            "source": "app.jcloudify.deployer.event.deploy",
            "detail-type": "DeployRequested",
            "detail": {"app_name": "orders"}
        }))
        .expect("bus event should classify");

        let Invocation::Bus(envelope) = invocation else {
            panic!("expected bus invocation");
        };
        assert_eq!(envelope.source, "app.jcloudify.deployer.event.deploy");
        assert_eq!(envelope.detail["app_name"], "orders");
    }

    #[test]
    fn classifies_http_query_including_null_parameters() {
        let invocation = classify_event(json!({
            "queryStringParameters": {
                "app_name": "orders",
                "env": "prod",
                "bucket_key": "builds/orders/1.zip"
            }
        }))
        .expect("http event should classify");
        assert_eq!(
            invocation,
            Invocation::Http(HttpDeployQuery {
                app_name: Some("orders".to_string()),
                env: Some("prod".to_string()),
                bucket_key: Some("builds/orders/1.zip".to_string()),
            })
        );

        let empty = classify_event(json!({"queryStringParameters": null}))
            .expect("null parameters classify as empty query");
        assert_eq!(empty, Invocation::Http(HttpDeployQuery::default()));
    }

    #[test]
    fn empty_record_batch_is_an_empty_queue() {
        let invocation =
            classify_event(json!({"Records": []})).expect("empty batch should classify");
        assert_eq!(invocation, Invocation::Queue(Vec::new()));
    }

    #[test]
    fn rejects_scalar_payload() {
        let error = classify_event(json!("deploy")).expect_err("scalar should fail");
        assert_eq!(error.message(), "Invocation payload must be a JSON object");
    }
}
