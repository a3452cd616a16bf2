//! Logging for the miner.
//!
//! A [`Logger`] owns a `tracing` dispatcher that writes to stdout and, when a
//! directory is given, to a daily-rolled `miner.log` in that directory. It is
//! passed explicitly to the code that reports progress instead of being
//! installed as a process-global subscriber, and its dispatcher can be
//! attached to a future so library events land in the same sink.
//!
//! ```rust,no_run
//! use nova_miner::config::MinerConfig;
//! use nova_miner::logging::Logger;
//!
//! let config = MinerConfig::default();
//! let logger = Logger::from_config(&config).unwrap();
//! logger.info("Setting up Bittensor objects.");
//! ```

pub mod format;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{Dispatch, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriter};
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::registry::{LookupSpan, Registry};
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::{LoggingConfig, MinerConfig};
use crate::errors::ConfigError;

pub use format::{LineStyle, MinerFormatter};

/// Target of every event the miner emits itself
pub const LOG_TARGET: &str = "miner";

/// Log file name inside the logging directory
pub const LOG_FILE_NAME: &str = "miner.log";

type FilteredRegistry = Layered<EnvFilter, Registry>;
type BoxedLayer = Box<dyn Layer<FilteredRegistry> + Send + Sync>;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format with timestamps
    /// Format: `YYYY-MM-DD HH:MM:SS.mmm |  LEVEL  | message`
    #[default]
    Text,
    /// JSON format for structured logging and log aggregation
    Json,
    /// Compact format for development: `[LEVEL] message`
    Compact,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
            LogFormat::Compact => write!(f, "compact"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!(
                "Invalid log format '{}'. Valid options: text, json, compact",
                s
            )),
        }
    }
}

/// Effective log level based on configuration
fn get_level(config: &LoggingConfig) -> Level {
    if config.trace {
        Level::TRACE
    } else if config.debug {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

/// `RUST_LOG` overrides the configured level.
fn env_filter(config: &LoggingConfig) -> EnvFilter {
    if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(format!(
            "{},jsonrpsee=warn,soketto=warn,hyper=warn",
            get_level(config)
        ))
    }
}

fn fmt_layer<S, W>(format: LogFormat, writer: W, ansi: bool) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    match format {
        LogFormat::Text => fmt::layer()
            .event_format(MinerFormatter::timestamped())
            .with_writer(writer)
            .with_ansi(ansi)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(writer)
            .with_ansi(false)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .event_format(MinerFormatter::compact())
            .with_writer(writer)
            .with_ansi(ansi)
            .boxed(),
    }
}

/// Logging handle threaded through the miner.
pub struct Logger {
    dispatch: Dispatch,
    console: BoxMakeWriter,
    log_dir: Option<PathBuf>,
    _guard: Option<WorkerGuard>,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("log_dir", &self.log_dir)
            .finish_non_exhaustive()
    }
}

impl Logger {
    /// Logger writing to stdout and to `miner.log` under the config's
    /// derived logging directory.
    pub fn from_config(config: &MinerConfig) -> Result<Self, ConfigError> {
        Self::new(&config.logging, Some(&config.full_path))
    }

    /// Logger writing to stdout, plus a daily-rolled file in `log_dir` if set.
    pub fn new(config: &LoggingConfig, log_dir: Option<&Path>) -> Result<Self, ConfigError> {
        let mut layers: Vec<BoxedLayer> = vec![fmt_layer(config.format, io::stdout, true)];

        let mut guard = None;
        if let Some(dir) = log_dir {
            crate::config::ensure_log_dir(dir)?;
            let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            let (non_blocking, worker_guard) = tracing_appender::non_blocking(file_appender);
            layers.push(fmt_layer(config.format, non_blocking, false));
            guard = Some(worker_guard);
        }

        let subscriber = tracing_subscriber::registry()
            .with(env_filter(config))
            .with(layers);

        Ok(Self {
            dispatch: Dispatch::new(subscriber),
            console: BoxMakeWriter::new(io::stdout),
            log_dir: log_dir.map(Path::to_path_buf),
            _guard: guard,
        })
    }

    /// Logger sending both log events and console prints to `writer`.
    pub fn with_writer<W>(config: &LoggingConfig, writer: W) -> Self
    where
        W: for<'a> MakeWriter<'a> + Clone + Send + Sync + 'static,
    {
        let subscriber = tracing_subscriber::registry()
            .with(env_filter(config))
            .with(vec![fmt_layer::<FilteredRegistry, _>(
                config.format,
                writer.clone(),
                false,
            )]);

        Self {
            dispatch: Dispatch::new(subscriber),
            console: BoxMakeWriter::new(writer),
            log_dir: None,
            _guard: None,
        }
    }

    /// The dispatcher, for attaching to futures or threads.
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Directory holding the log file, if file logging is on.
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }

    /// Run `f` with this logger as the current dispatcher.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    pub fn debug(&self, message: &str) {
        self.in_scope(|| tracing::debug!(target: LOG_TARGET, "{}", message));
    }

    pub fn info(&self, message: &str) {
        self.in_scope(|| tracing::info!(target: LOG_TARGET, "{}", message));
    }

    pub fn warn(&self, message: &str) {
        self.in_scope(|| tracing::warn!(target: LOG_TARGET, "{}", message));
    }

    pub fn error(&self, message: &str) {
        self.in_scope(|| tracing::error!(target: LOG_TARGET, "{}", message));
    }

    /// Write a line to the console, bypassing level filtering.
    pub fn print(&self, message: &str) {
        let mut out = self.console.make_writer();
        let _ = writeln!(out, "{}", message);
        let _ = out.flush();
    }

    /// Log at info level and print the same line to the console.
    pub fn announce(&self, message: &str) {
        self.info(message);
        self.print(message);
    }
}

/// In-memory log sink. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        let buf = self.buf.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl Write for MemoryWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for MemoryWriter {
    type Writer = MemoryWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
