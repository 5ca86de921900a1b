//! Configuration resolution for dictionary-etl
//!
//! CLI arguments override the `[ingest]` table of the module TOML file, which
//! overrides compiled defaults.

use crate::error::{IngestError, IngestResult};
use dictionary_common::config::{IngestSettings, TomlConfig};
use std::path::{Path, PathBuf};
use tracing::info;

/// Module name used for TOML lookup and root folder resolution
pub const MODULE_NAME: &str = "dictionary-etl";

/// Default extract file name inside the root folder
pub const DEFAULT_INPUT_FILE: &str = "columnMeta.csv";

/// Default error report file name inside the root folder
pub const DEFAULT_REPORT_FILE: &str = "columnMetaErrors.csv";

/// Recognized error report extension
pub const REPORT_EXTENSION: &str = "csv";

/// Resolved pipeline settings
#[derive(Debug, Clone, PartialEq)]
pub struct IngestConfig {
    /// Store connection pool ceiling
    pub max_connections: u32,
    /// Connections held back from the worker pool
    pub connection_margin: u32,
    /// Work queue capacity (groups)
    pub queue_capacity: usize,
    /// Total time a write may spend retrying on a locked store
    pub max_lock_wait_ms: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self::from(&IngestSettings::default())
    }
}

impl From<&IngestSettings> for IngestConfig {
    fn from(settings: &IngestSettings) -> Self {
        Self {
            max_connections: settings.max_connections,
            connection_margin: settings.connection_margin,
            queue_capacity: settings.queue_capacity.max(1),
            max_lock_wait_ms: settings.max_lock_wait_ms,
        }
    }
}

impl IngestConfig {
    /// Resolve from TOML, applying an optional CLI connection override
    pub fn resolve(toml_config: &TomlConfig, max_connections_override: Option<u32>) -> Self {
        let mut config = Self::from(&toml_config.ingest);
        if let Some(max_connections) = max_connections_override {
            info!(max_connections, "Store connection ceiling overridden on command line");
            config.max_connections = max_connections;
        }
        config
    }

    /// Worker pool size: the connection ceiling minus the safety margin
    pub fn worker_count(&self) -> IngestResult<usize> {
        match self.max_connections.checked_sub(self.connection_margin) {
            Some(workers) if workers > 0 => Ok(workers as usize),
            _ => Err(IngestError::ResourceExhausted {
                max_connections: self.max_connections,
                margin: self.connection_margin,
            }),
        }
    }
}

/// Default extract location
pub fn default_input_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DEFAULT_INPUT_FILE)
}

/// Default error report location
pub fn default_report_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DEFAULT_REPORT_FILE)
}

/// Reject report paths without the `.csv` extension
pub fn validate_report_path(path: &Path) -> IngestResult<()> {
    let recognized = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(REPORT_EXTENSION))
        .unwrap_or(false);

    if recognized {
        Ok(())
    } else {
        Err(IngestError::InvalidReportPath(path.display().to_string()))
    }
}
