//! Store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when reading or writing learner data.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The data file exists but is not valid JSON for the expected layout.
    #[error("data file {} is corrupt", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The data file could not be read or written.
    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A fault injected by the mock store.
    #[error("injected failure: {0}")]
    Injected(String),
}
