use std::path::Path;

use aws_sdk_eventbridge::types::PutEventsRequestEntry;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use stack_deployer_lambda::adapters::event_bus::EventPublisher;
use stack_deployer_lambda::adapters::object_store::{ArtifactStore, StoreError};
use stack_deployer_lambda::adapters::process::ProcessCommandRunner;
use stack_deployer_lambda::config::DeployerConfig;
use stack_deployer_lambda::handlers::handle_event;
use stack_deployer_lambda::logging::init_logging;
use stack_deployer_lambda::pipeline::DeploymentPipeline;
use stack_deployer_lambda::runtime::events::BusEntry;
use tracing::error;

struct S3ArtifactStore {
    bucket: String,
    s3_client: aws_sdk_s3::Client,
}

impl ArtifactStore for S3ArtifactStore {
    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let bucket = self.bucket.clone();
        let object_key = key.to_string();
        let client = self.s3_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                match client.head_object().bucket(bucket).key(object_key).send().await {
                    Ok(_) => Ok(true),
                    Err(error)
                        if error
                            .as_service_error()
                            .map(|service| service.is_not_found())
                            .unwrap_or(false) =>
                    {
                        Ok(false)
                    }
                    Err(error) => Err(StoreError::Transport(format!(
                        "failed to probe object in s3: {error}"
                    ))),
                }
            })
        })
    }

    fn download(&self, key: &str, destination: &Path) -> Result<(), StoreError> {
        let bucket = self.bucket.clone();
        let object_key = key.to_string();
        let target = destination.to_path_buf();
        let client = self.s3_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let output = client
                    .get_object()
                    .bucket(bucket)
                    .key(&object_key)
                    .send()
                    .await
                    .map_err(|error| {
                        if error
                            .as_service_error()
                            .map(|service| service.is_no_such_key())
                            .unwrap_or(false)
                        {
                            StoreError::NotFound {
                                key: object_key.clone(),
                            }
                        } else {
                            StoreError::Transport(format!(
                                "failed to read object from s3: {error}"
                            ))
                        }
                    })?;

                let mut body = output.body.into_async_read();
                let mut file = tokio::fs::File::create(&target).await.map_err(|error| {
                    StoreError::Transport(format!(
                        "failed to create {}: {error}",
                        target.display()
                    ))
                })?;
                tokio::io::copy(&mut body, &mut file)
                    .await
                    .map(|_| ())
                    .map_err(|error| {
                        StoreError::Transport(format!("failed to stream object from s3: {error}"))
                    })
            })
        })
    }
}

struct EventBridgePublisher {
    client: aws_sdk_eventbridge::Client,
}

impl EventPublisher for EventBridgePublisher {
    fn publish(&self, entry: &BusEntry) -> Result<String, String> {
        let request_entry = PutEventsRequestEntry::builder()
            .source(entry.source.clone())
            .detail_type(entry.detail_type.clone())
            .detail(entry.detail.clone())
            .event_bus_name(entry.event_bus_name.clone())
            .build();
        let client = self.client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let output = client
                    .put_events()
                    .entries(request_entry)
                    .send()
                    .await
                    .map_err(|error| format!("failed to put event on bus: {error}"))?;

                let result = output.entries().first();
                if output.failed_entry_count() > 0 {
                    let code = result.and_then(|entry| entry.error_code()).unwrap_or("unknown");
                    let message = result
                        .and_then(|entry| entry.error_message())
                        .unwrap_or("no error message");
                    return Err(format!("event bus rejected entry: {code}: {message}"));
                }

                result
                    .and_then(|entry| entry.event_id())
                    .map(str::to_string)
                    .ok_or_else(|| "event bus returned no event id".to_string())
            })
        })
    }
}

async fn handle_request(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let config = DeployerConfig::from_env()?;
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let store = S3ArtifactStore {
        bucket: config.bucket.clone(),
        s3_client: aws_sdk_s3::Client::new(&aws_config),
    };
    let publisher = EventBridgePublisher {
        client: aws_sdk_eventbridge::Client::new(&aws_config),
    };
    let runner = ProcessCommandRunner;

    let pipeline = DeploymentPipeline::new(&config, &store, &runner, &publisher);
    let response = handle_event(event.payload, &pipeline).map_err(|failure| {
        error!(error = %failure, "invocation failed");
        Error::from(failure)
    })?;

    serde_json::to_value(response)
        .map_err(|error| Error::from(format!("failed to serialize api response: {error}")))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_logging()?;
    lambda_runtime::run(service_fn(handle_request)).await
}
