//! Shared command setup: configuration, logging, runtime and service.

use std::future::Future;
use std::sync::Arc;

use emitscope::admin_cache::AdminCache;
use emitscope::clock::SystemClock;
use emitscope::config::{config_file_path, ConfigFile};
use emitscope::logging::{self, WorkerGuard};
use emitscope::source::{ApiConfig, ClimateTraceClient};
use emitscope::{InventoryService, ServiceConfig};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::CliError;

/// The service type used by the CLI.
pub type CliService = InventoryService<ClimateTraceClient, ClimateTraceClient, SystemClock>;

/// Per-invocation context for commands that talk to the API.
pub struct CliRunner {
    config: ConfigFile,
    runtime: tokio::runtime::Runtime,
    // Flushes the log file on drop.
    _log_guard: Option<WorkerGuard>,
}

impl CliRunner {
    /// Load configuration, install logging and start the runtime.
    ///
    /// `log_level` overrides the configured filter.
    pub fn new(log_level: Option<String>) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let mut options = config.logging_options();
        if let Some(level) = log_level {
            options = options.with_level(level);
        }
        let log_guard = logging::init(&options)?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| CliError::Runtime(format!("Failed to start runtime: {}", e)))?;

        Ok(Self {
            config,
            runtime,
            _log_guard: log_guard,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn log_startup(&self, command: &str) {
        info!(
            version = emitscope::VERSION,
            command,
            config = %config_file_path().display(),
            "emitscope starting"
        );
    }

    /// Build the service against the Climate TRACE API.
    pub fn create_service(
        &self,
        api: ApiConfig,
        service_config: ServiceConfig,
    ) -> Result<CliService, CliError> {
        let client = ClimateTraceClient::new(api).map_err(CliError::Client)?;
        let cache = Arc::new(AdminCache::new(
            self.config.admin_cache_ttl(),
            SystemClock,
        ));
        Ok(InventoryService::new(
            client.clone(),
            client,
            SystemClock,
            cache,
            service_config,
        ))
    }

    /// A token cancelled by Ctrl+C.
    pub fn cancel_on_ctrl_c(&self) -> Result<CancellationToken, CliError> {
        let cancel = CancellationToken::new();
        let handler_token = cancel.clone();
        ctrlc::set_handler(move || {
            eprintln!();
            eprintln!("Received interrupt, cancelling...");
            handler_token.cancel();
        })
        .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;
        Ok(cancel)
    }

    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}
