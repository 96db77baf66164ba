use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::errors::PipelineError;

pub const DEFAULT_LOG_FILTER: &str = "info";

/// Installs the JSON log subscriber. `RUST_LOG` overrides the default filter.
pub fn init_logging() -> Result<(), PipelineError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .json()
                .with_current_span(false)
                .with_target(false),
        )
        .try_init()
        .map_err(|error| PipelineError::Config(format!("failed to install logger: {error}")))
}
