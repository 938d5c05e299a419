//! Configuration for the sync engine.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for a [`SyncOrchestrator`](crate::SyncOrchestrator).
///
/// Passed explicitly at construction; there is no process-wide context.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Path of the local data file.
    pub data_path: PathBuf,
    /// Trailing-debounce delay for coalescing local edits into one save.
    pub save_debounce: Duration,
}

impl SyncConfig {
    /// Creates a configuration for the given data file with defaults.
    #[must_use]
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            save_debounce: Duration::from_secs(1),
        }
    }

    /// Sets the save-debounce delay.
    #[must_use]
    pub fn with_save_debounce(mut self, delay: Duration) -> Self {
        self.save_debounce = delay;
        self
    }
}
