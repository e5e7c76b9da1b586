//! Logging configuration and setup for the NEAR payments backend
//!
//! This module provides custom logging infrastructure:
//! - The choice between JSON logging using Bunyan format or human-readable text logging
//! - Auto-detection based on whether the output is a TTY (JSON if non-TTY, Text if TTY)
//! - A custom writer that replaces "log." prefix with "indexer_log." in Bunyan logs
//! to avoid conflicts with reserved fields in log ingestion tools

use std::io::Write;

use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{
    fmt::MakeWriter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::config::LogFormat;

/// Name under which the Bunyan layer reports
const SERVICE_NAME: &str = "near-payments-backend";

/// Custom writer that replaces "log." prefix with "indexer_log." in Bunyan logs
struct PrefixReplacingWriter<W: Write> {
    inner: W,
}

impl<W: Write> PrefixReplacingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<W: Write> Write for PrefixReplacingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match std::str::from_utf8(buf) {
            Ok(s) => {
                self.inner
                    .write_all(replace_log_prefix(s).as_bytes())?;
                Ok(buf.len())
            }
            // not valid UTF-8, write as-is
            Err(_) => self.inner.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

fn replace_log_prefix(line: &str) -> String {
    line.replace("\"log.", "\"indexer_log.")
}

struct PrefixReplacingMakeWriter;

impl<'a> MakeWriter<'a> for PrefixReplacingMakeWriter {
    type Writer = PrefixReplacingWriter<std::io::Stdout>;

    fn make_writer(&'a self) -> Self::Writer {
        PrefixReplacingWriter::new(std::io::stdout())
    }
}

/// Initialize logging with the specified format
///
/// Installs the global tracing subscriber, filtered through `RUST_LOG`.
/// Must be called at most once per process.
pub fn initialize_logging(log_format: LogFormat) {
    let env_filter = EnvFilter::from_default_env();

    match log_format.resolve() {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(JsonStorageLayer)
                .with(BunyanFormattingLayer::new(
                    SERVICE_NAME.to_string(),
                    PrefixReplacingMakeWriter,
                ))
                .init();
        }
        // `resolve` never yields `Auto`
        LogFormat::Text | LogFormat::Auto => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}
