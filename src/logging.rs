// ABOUTME: Structured logging for the smsgate binary, built on tracing-subscriber
// ABOUTME: Console logging starts first; the JSON file layer attaches once config names a log dir

use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::format::{Format, Json, JsonFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

/// File name prefix; the appender adds `.YYYY-MM-DD`
const LOG_FILE_PREFIX: &str = "smsgate.log";

type JsonFileLayer = fmt::Layer<Registry, JsonFields, Format<Json>, NonBlocking>;

/// Handle to the process-wide subscriber.
///
/// Keep it alive until exit: dropping it flushes and closes the log file.
pub struct Logging {
    file_layer: reload::Handle<Option<JsonFileLayer>, Registry>,
    file_guard: Option<WorkerGuard>,
}

/// Install console logging on stderr, filtered by `RUST_LOG` (default: `info`).
///
/// Call this before loading config so config discovery is logged too.
pub fn init() -> Logging {
    let (file_layer, handle) = reload::Layer::new(None::<JsonFileLayer>);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    Logging {
        file_layer: handle,
        file_guard: None,
    }
}

impl Logging {
    /// Also write JSON events to a daily-rotated file in `dir`
    pub fn write_json_to(&mut self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

        let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer().json().with_writer(writer);

        self.file_layer
            .reload(Some(layer))
            .context("Failed to attach the JSON log file")?;
        self.file_guard = Some(guard);

        tracing::info!(dir = %dir.display(), "Writing JSON logs");
        Ok(())
    }
}
