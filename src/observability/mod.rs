//! Logging and OpenTelemetry tracing to local files.
//!
//! ```text
//! tracing macros ─┬→ fmt layer ───────────────────────────→ bookshelf.log
//!                 └→ tracing-opentelemetry → FileSpanExporter → bookshelf-otlp.json
//! ```
//!
//! Both files live in the platform data directory and rotate at 10MB with three
//! backups. Store requests carry the caller's trace context, so the span of a
//! user action and the span of the HTTP call it caused share one trace.
//!
//! # Configuration
//!
//! The filter is taken from:
//! 1. `RUST_LOG` (highest priority)
//! 2. `trace_level` in the configuration
//! 3. Default: `"info"`

mod file_writer;
mod init;
mod span_formatter;
mod tracer;

pub use file_writer::FileWriter;
pub use init::{init_tracing, LOG_FILE_NAME, TRACE_FILE_NAME};
