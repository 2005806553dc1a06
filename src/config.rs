use crate::domain::filter::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::error::{LedgerError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Engine tuning. Every field falls back to its default when absent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How many times a failed transaction may be sent back to pending.
    pub max_retries: u32,
    pub default_page_size: usize,
    pub max_page_size: usize,
    /// Budget for any single repository call.
    pub storage_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
            storage_timeout_ms: 5_000,
        }
    }
}

impl EngineConfig {
    /// Reads a JSON config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| LedgerError::ValidationError(format!("Invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_page_size == 0 || self.default_page_size == 0 {
            return Err(LedgerError::ValidationError(
                "page sizes must be positive".to_string(),
            ));
        }
        if self.default_page_size > self.max_page_size {
            return Err(LedgerError::ValidationError(
                "default_page_size exceeds max_page_size".to_string(),
            ));
        }
        if self.storage_timeout_ms == 0 {
            return Err(LedgerError::ValidationError(
                "storage_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn storage_timeout(&self) -> Duration {
        Duration::from_millis(self.storage_timeout_ms)
    }
}
