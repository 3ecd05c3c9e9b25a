//! Tracing initialization and subscriber setup.

use super::file_writer::FileWriter;
use super::tracer;
use crate::Config;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_sdk::resource::Resource;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Service and scope name in exported traces.
const SERVICE_NAME: &str = "bookshelf";

/// Human-readable log file name in the data directory.
pub const LOG_FILE_NAME: &str = "bookshelf.log";

/// OTLP trace file name in the data directory.
pub const TRACE_FILE_NAME: &str = "bookshelf-otlp.json";

/// Installs the global subscriber: an [`EnvFilter`], a plain-text log layer and an
/// OpenTelemetry layer, both writing to rotating files in the data directory.
///
/// `RUST_LOG` takes precedence over `config.trace_level`, which defaults to
/// `"info"`. Nothing is written to the terminal, which the host owns for
/// rendering.
///
/// Observability is optional: if the data directory cannot be created the
/// function returns without installing anything. Calling it twice is harmless.
///
/// # Example
///
/// ```rust
/// use bookshelf::observability::init_tracing;
/// use bookshelf::Config;
///
/// let config = Config {
///     trace_level: Some("debug".to_string()),
///     ..Default::default()
/// };
///
/// init_tracing(&config);
/// tracing::debug!("tracing is now active");
/// ```
pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(config.trace_level.as_deref().unwrap_or("info"))
    });

    let data_dir = crate::infrastructure::get_data_dir();
    if std::fs::create_dir_all(&data_dir).is_err() {
        return;
    }

    let resource = Resource::new(vec![
        KeyValue::new("service.name", SERVICE_NAME),
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
    ]);
    let provider = tracer::create_tracer_provider(
        FileWriter::new(data_dir.join(TRACE_FILE_NAME)),
        resource,
        SERVICE_NAME,
    );
    let otel_layer = OpenTelemetryLayer::new(provider.tracer(SERVICE_NAME));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(FileWriter::new(data_dir.join(LOG_FILE_NAME)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(otel_layer)
        .try_init();
}
