use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

pub const HTTP_REQUESTS_TOTAL: &str = "hackerthink_admin_http_requests_total";
pub const HTTP_REQUEST_FAILURES_TOTAL: &str = "hackerthink_admin_http_request_failures_total";
pub const HTTP_REQUEST_MS: &str = "hackerthink_admin_http_request_ms";

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber writing to stderr, so stdout stays
/// free for command output.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

pub fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            HTTP_REQUESTS_TOTAL,
            Unit::Count,
            "Total number of admin API requests, labelled by method and collection."
        );
        describe_counter!(
            HTTP_REQUEST_FAILURES_TOTAL,
            Unit::Count,
            "Admin API requests that failed in transport or returned a non-success status."
        );
        describe_histogram!(
            HTTP_REQUEST_MS,
            Unit::Milliseconds,
            "Admin API request latency in milliseconds."
        );
    });
}
