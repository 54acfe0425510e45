//! # Logger
//!
//! Installs the process-wide `tracing` subscriber for the function host.
//!
//! The worker's stdout is collected by the functions host, so console output is
//! always available and can be switched to JSON lines. A rolling file can be added
//! for local runs. `RUST_LOG` is honoured unless an explicit filter is given.
//!
//! ## Example
//!
//! ```rust,no_run
//! use optbind_logger::{ConsoleFormat, LevelFilter, Logger};
//!
//! let _logger = Logger::builder()
//!     .name("optbind-function")
//!     .level(LevelFilter::DEBUG)
//!     .console_format(ConsoleFormat::Json)
//!     .init()?;
//! # Ok::<(), optbind_logger::LoggerError>(())
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use std::fs;
use std::marker::PhantomData;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

const DEFAULT_MAX_FILES: usize = 7;
const LOG_FILE_SUFFIX: &str = "log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Shape of console lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConsoleFormat {
    #[default]
    Compact,
    Pretty,
    /// One JSON object per line.
    Json,
    /// No console output.
    Off,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FileOutput {
    directory: PathBuf,
    rotation: Rotation,
    max_files: usize,
    json: bool,
}

#[derive(Debug)]
struct LoggerSettings {
    console: ConsoleFormat,
    level: LevelFilter,
    filter: Option<String>,
    file: Option<FileOutput>,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self { console: ConsoleFormat::Compact, level: LevelFilter::INFO, filter: None, file: None }
    }
}

#[derive(Debug)]
pub struct Unnamed;
#[derive(Debug)]
pub struct Named(String);

#[derive(Debug)]
pub struct NoFile;
#[derive(Debug)]
pub struct WithFile;

/// Builder for the global subscriber. A name is required before [`LoggerBuilder::init`].
#[derive(Debug)]
pub struct LoggerBuilder<N = Unnamed, F = NoFile> {
    settings: LoggerSettings,
    name: N,
    file: PhantomData<F>,
}

impl<F> LoggerBuilder<Unnamed, F> {
    /// Names the service. Also used as the log file prefix.
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<Named, F> {
        LoggerBuilder { settings: self.settings, name: Named(name.into()), file: PhantomData }
    }
}

impl<N, F> LoggerBuilder<N, F> {
    #[must_use]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.settings.level = level;
        self
    }

    /// Directive list such as `optbind_kernel=debug,tower_http=info`. Replaces `RUST_LOG`.
    #[must_use]
    pub fn env_filter(mut self, filter: impl Into<String>) -> Self {
        self.settings.filter = Some(filter.into());
        self
    }

    #[must_use]
    pub const fn console_format(mut self, format: ConsoleFormat) -> Self {
        self.settings.console = format;
        self
    }
}

impl<N> LoggerBuilder<N, NoFile> {
    /// Adds a daily rolling log file under `directory`.
    pub fn path(self, directory: impl Into<PathBuf>) -> LoggerBuilder<N, WithFile> {
        let mut settings = self.settings;
        settings.file = Some(FileOutput {
            directory: directory.into(),
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
            json: false,
        });
        LoggerBuilder { settings, name: self.name, file: PhantomData }
    }
}

impl<N> LoggerBuilder<N, WithFile> {
    #[must_use]
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        if let Some(file) = self.settings.file.as_mut() {
            file.rotation = rotation;
        }
        self
    }

    #[must_use]
    pub fn max_files(mut self, max: usize) -> Self {
        if let Some(file) = self.settings.file.as_mut() {
            file.max_files = max;
        }
        self
    }

    /// Writes the file as JSON lines.
    #[must_use]
    pub fn json(mut self) -> Self {
        if let Some(file) = self.settings.file.as_mut() {
            file.json = true;
        }
        self
    }
}

impl<F> LoggerBuilder<Named, F> {
    /// Installs the subscriber.
    ///
    /// Keep the returned [`Logger`] alive until shutdown; dropping it stops the
    /// background file writer.
    ///
    /// # Errors
    /// * [`LoggerError::InvalidConfiguration`] for an empty name, zero `max_files`,
    ///   a bad filter or when no output is enabled.
    /// * [`LoggerError::Io`] / [`LoggerError::Appender`] if the log file cannot be opened.
    /// * [`LoggerError::Subscriber`] if a global subscriber is already set.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let Named(name) = self.name;
        let settings = self.settings;
        validate(&settings, &name)?;

        let filter = build_filter(&settings)?;
        let mut layers: Vec<BoxedLayer> = Vec::new();

        match settings.console {
            ConsoleFormat::Compact => layers.push(layer().compact().boxed()),
            ConsoleFormat::Pretty => layers.push(layer().pretty().boxed()),
            ConsoleFormat::Json => layers.push(layer().json().with_ansi(false).boxed()),
            ConsoleFormat::Off => {},
        }

        let guard = match settings.file {
            Some(file) => {
                let (file_layer, guard) = file_layer(&name, file)?;
                layers.push(file_layer);
                Some(guard)
            },
            None => None,
        };

        if layers.is_empty() {
            return Err("No log output enabled; enable the console or a log file".into());
        }

        tracing_subscriber::registry()
            .with(layers)
            .with(filter)
            .try_init()
            .context("Global subscriber already installed")?;

        Ok(Logger { name, guard })
    }
}

fn file_layer(name: &str, file: FileOutput) -> Result<(BoxedLayer, WorkerGuard), LoggerError> {
    fs::create_dir_all(&file.directory)
        .context(format!("Failed to create {}", file.directory.display()))?;

    let appender = RollingFileAppender::builder()
        .rotation(file.rotation)
        .filename_prefix(name)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(file.max_files)
        .build(&file.directory)
        .context(format!("Failed to open log file in {}", file.directory.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(appender);
    let base = layer().with_writer(writer).with_ansi(false);
    let boxed = if file.json { base.json().boxed() } else { base.boxed() };

    Ok((boxed, guard))
}

/// Handle to the installed subscriber.
#[must_use = "dropping the logger stops the background file writer"]
#[derive(Debug)]
pub struct Logger {
    name: String,
    guard: Option<WorkerGuard>,
}

impl Logger {
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder { settings: LoggerSettings::default(), name: Unnamed, file: PhantomData }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `true` when a log file writer is running.
    #[must_use]
    pub const fn has_file_output(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::debug!(name = %self.name, "Flushing log file");
        }
    }
}

impl From<&'static str> for LoggerError {
    fn from(message: &'static str) -> Self {
        Self::InvalidConfiguration { message: message.into(), context: None }
    }
}

fn validate(settings: &LoggerSettings, name: &str) -> Result<(), LoggerError> {
    if name.trim().is_empty() {
        return Err("Logger name cannot be empty".into());
    }
    if settings.file.as_ref().is_some_and(|file| file.max_files == 0) {
        return Err("max_files must be greater than zero".into());
    }
    Ok(())
}

fn build_filter(settings: &LoggerSettings) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(settings.level.into());
    match settings.filter.as_deref() {
        None => Ok(builder.from_env_lossy()),
        Some(directives) => builder.parse(directives).map_err(|e| {
            LoggerError::InvalidConfiguration {
                message: format!("'{directives}': {e}").into(),
                context: Some("Invalid env filter".into()),
            }
        }),
    }
}
