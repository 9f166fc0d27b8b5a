//! Logging setup: stamped file channels plus a configurable console layer.
//!
//! Two rolling daily files live under the configured directory. `taskd.log`
//! receives everything the level filter lets through except errors, and
//! `taskd.error.log` receives errors only, so operational noise and failures
//! can be tailed separately. File lines are prefixed with a [`Stamp`] so
//! entries can be correlated across both channels.

use anyhow::{Context, Result};
use taskd_core::stamp::Stamp;
use tracing::{Event, Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::{filter_fn, LevelFilter},
    fmt::{self, format::Writer, FmtContext, FormatEvent, FormatFields},
    layer::{Layer, SubscriberExt},
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

use crate::config::{LogFormat, LoggingConfig};

/// Event formatter for the file channels.
///
/// Renders `<stamp> LEVEL target: fields` on a single line.
pub struct StampedFormat;

impl<S, N> FormatEvent<S, N> for StampedFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        write!(
            writer,
            "{} {:>5} {}: ",
            Stamp::next(),
            metadata.level(),
            metadata.target()
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Keeps the non-blocking file writers alive; dropping this flushes and
/// stops them.
pub struct LogGuards {
    _info: WorkerGuard,
    _error: WorkerGuard,
}

/// Initialize the tracing subscriber: two file channels plus the console
pub fn init_logging(config: &LoggingConfig) -> Result<LogGuards> {
    std::fs::create_dir_all(&config.dir)
        .with_context(|| format!("Failed to create log directory {}", config.dir))?;

    // RUST_LOG wins over the configured level when set
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .context("Invalid log level configuration")?;

    let (info_writer, info_guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(&config.dir, "taskd.log"));
    let (error_writer, error_guard) = tracing_appender::non_blocking(
        tracing_appender::rolling::daily(&config.dir, "taskd.error.log"),
    );

    let info_file_layer = fmt::layer()
        .event_format(StampedFormat)
        .with_writer(info_writer)
        .with_ansi(false)
        .with_filter(filter_fn(|metadata| *metadata.level() != Level::ERROR));

    let error_file_layer = fmt::layer()
        .event_format(StampedFormat)
        .with_writer(error_writer)
        .with_ansi(false)
        .with_filter(LevelFilter::ERROR);

    let registry = Registry::default()
        .with(env_filter)
        .with(info_file_layer)
        .with(error_file_layer);

    // Configure the console formatter based on the selected format
    match config.format {
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .pretty()
                .with_target(true)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_file(true)
                .with_line_number(true);

            registry.with(fmt_layer).init();
        }
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_file(true)
                .with_line_number(true)
                .with_span_list(true)
                .flatten_event(true);

            registry.with(fmt_layer).init();
        }
        LogFormat::Compact => {
            let fmt_layer = fmt::layer()
                .compact()
                .with_target(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_file(false)
                .with_line_number(false);

            registry.with(fmt_layer).init();
        }
    }

    tracing::info!(
        log_level = %config.level,
        log_format = ?config.format,
        log_dir = %config.dir,
        "Logging initialized"
    );

    Ok(LogGuards {
        _info: info_guard,
        _error: error_guard,
    })
}

/// Log server startup information
pub fn log_startup_info(config: &crate::config::Config) {
    tracing::info!(
        server_address = %config.server_address(),
        database_url = %config.database_url(),
        token_ttl_secs = config.auth.token_ttl_secs,
        "Server starting up"
    );
}

/// Log server shutdown information
pub fn log_shutdown_info() {
    tracing::info!("Server shut down gracefully");
}

/// Log configuration validation
pub fn log_config_validation(config: &crate::config::Config) {
    match config.validate() {
        Ok(()) => {
            tracing::info!("Configuration validation passed");
        }
        Err(e) => {
            tracing::error!(error = %e, "Configuration validation failed");
        }
    }
}
