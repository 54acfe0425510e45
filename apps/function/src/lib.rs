//! # Function host
//!
//! Custom-handler worker for the functions host: binds application settings once,
//! then serves the HTTP triggers on the port the host assigns.
//!
//! ## Example
//! ```no_run
//! use optbind_function::Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Server::builder().port(7071).build()?.run().await
//! }
//! ```

pub mod router;

use anyhow::{Context, Result, anyhow};
use axum_server::Handle;
use optbind::domain::config::{HostConfig, LogRotation, LoggingConfig};
use optbind::kernel::config::SettingsSource;
use optbind::kernel::server::AppState;
use optbind_logger::{ConsoleFormat, LevelFilter, Logger, Rotation};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Fluent builder for the [`Server`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    cfg: HostConfig,
    settings: Option<SettingsSource>,
}

impl ServerBuilder {
    pub fn config(mut self, cfg: HostConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.cfg.server.port = port;
        self
    }

    /// Uses an already built settings source instead of reading `cfg.settings`.
    pub fn settings(mut self, settings: SettingsSource) -> Self {
        self.settings = Some(settings);
        self
    }

    fn load_settings(&self) -> Result<SettingsSource> {
        let layers = &self.cfg.settings;
        let mut builder = SettingsSource::builder();
        if let Some(file) = &layers.file {
            builder = builder.json_file(file);
        }
        if layers.environment {
            builder = builder.environment();
        }
        builder.build().context("Failed to load application settings")
    }

    fn validate_ssl_config(&self) -> Result<()> {
        if let Some(ssl) = &self.cfg.server.ssl {
            if !ssl.cert.exists() {
                anyhow::bail!("SSL certificate not found at: {}", ssl.cert.display());
            }
            if !ssl.key.exists() {
                anyhow::bail!("SSL key not found at: {}", ssl.key.display());
            }
        }
        Ok(())
    }

    /// Reads the settings, binds every function slice and freezes the state.
    ///
    /// Binding happens here, strictly before [`Server::run`] accepts a connection.
    ///
    /// # Errors
    /// Fails if the SSL files are missing, the settings file is unreadable or
    /// malformed, or a settings section cannot be bound.
    pub fn build(self) -> Result<Server> {
        self.validate_ssl_config()?;

        let settings = match &self.settings {
            Some(settings) => settings.clone(),
            None => self.load_settings()?,
        };

        let state = optbind::init(&self.cfg, &settings)
            .map_err(|e| anyhow!("Function bootstrap failed: {e}"))?;

        info!(port = self.cfg.server.port, settings = settings.len(), "Function host initialized");
        Ok(Server { state })
    }
}

/// An initialized host ready to serve.
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct Server {
    state: AppState,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Serves until Ctrl+C or SIGTERM, then drains for up to 30 seconds.
    ///
    /// # Errors
    /// Returns an error if the address cannot be bound or TLS setup fails.
    pub async fn run(self) -> Result<()> {
        let cfg = self.state.config.clone();
        let address = SocketAddr::new(cfg.server.address, cfg.server.port);

        let app = router::init(self.state);

        let handle = Handle::<SocketAddr>::new();
        let shutdown_handle = handle.clone();

        tokio::spawn(async move {
            if let Err(e) = shutdown_signal().await {
                error!("Error while waiting for shutdown signal: {e}");
                return;
            }
            info!("Shutdown signal received, draining connections");
            shutdown_handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        });

        if let Some(ssl) = &cfg.server.ssl {
            info!("Listening on https://{address}");

            let tls_config =
                axum_server::tls_rustls::RustlsConfig::from_pem_file(&ssl.cert, &ssl.key)
                    .await
                    .context("Failed to load SSL/TLS certificates")?;

            axum_server::bind_rustls(address, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .context("HTTPS server failed")?;
        } else {
            info!("Listening on http://{address}");

            axum_server::bind(address)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .context("HTTP server failed")?;
        }

        info!("Function host stopped");
        Ok(())
    }

    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }
}

/// Installs the global subscriber described by the `logging` section.
///
/// # Errors
/// Fails on an unknown level, an unusable log directory or a second call.
pub fn init_logger(name: &str, cfg: &LoggingConfig) -> Result<Logger> {
    let level = cfg
        .level
        .parse::<LevelFilter>()
        .map_err(|e| anyhow!("Invalid log level '{}': {e}", cfg.level))?;
    let console = if cfg.json { ConsoleFormat::Json } else { ConsoleFormat::Compact };
    let builder = Logger::builder().name(name).level(level).console_format(console);

    let logger = match &cfg.directory {
        Some(directory) => {
            let builder =
                builder.path(directory).rotation(rotation(cfg.rotation)).max_files(cfg.max_files);
            if cfg.json { builder.json().init() } else { builder.init() }
        },
        None => builder.init(),
    };
    logger.context("Failed to initialize logging")
}

fn rotation(rotation: LogRotation) -> Rotation {
    match rotation {
        LogRotation::Minutely => Rotation::MINUTELY,
        LogRotation::Hourly => Rotation::HOURLY,
        LogRotation::Daily => Rotation::DAILY,
        LogRotation::Never => Rotation::NEVER,
    }
}

/// Resolves on Ctrl+C or, on unix, SIGTERM (sent by the functions host on scale-in).
async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("Failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<_, anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        res = ctrl_c => res?,
        res = terminate => res?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_maps_every_policy() {
        assert_eq!(rotation(LogRotation::Minutely), Rotation::MINUTELY);
        assert_eq!(rotation(LogRotation::Hourly), Rotation::HOURLY);
        assert_eq!(rotation(LogRotation::Daily), Rotation::DAILY);
        assert_eq!(rotation(LogRotation::Never), Rotation::NEVER);
    }
}
