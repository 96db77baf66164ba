use tracing::{error, info};

use crate::adapters::event_bus::EventPublisher;
use crate::errors::PipelineError;
use crate::runtime::events::StatusEvent;

pub struct EventNotifier<'a> {
    publisher: &'a dyn EventPublisher,
    event_bus_name: &'a str,
}

impl<'a> EventNotifier<'a> {
    pub fn new(publisher: &'a dyn EventPublisher, event_bus_name: &'a str) -> Self {
        Self {
            publisher,
            event_bus_name,
        }
    }

    /// Publishes `event` once and returns the bus event id. Nothing is
    /// retried.
    pub fn publish(&self, event: &StatusEvent) -> Result<String, PipelineError> {
        let entry = event.to_bus_entry(self.event_bus_name)?;
        info!(
            detail_type = %entry.detail_type,
            detail = %entry.detail,
            event_bus = %entry.event_bus_name,
            "publishing status event"
        );

        match self.publisher.publish(&entry) {
            Ok(event_id) => {
                info!(event_id = %event_id, "status event published");
                Ok(event_id)
            }
            Err(message) => {
                error!(detail_type = %entry.detail_type, error = %message, "status event publish failed");
                Err(PipelineError::Transport(message))
            }
        }
    }
}
