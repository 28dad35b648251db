use std::path::PathBuf;

use crate::runtime::RuntimeError;

#[derive(Debug, thiserror::Error)]
pub enum GcError {
    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("Failed to parse volume config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Registry refused to remove volume {volume_id}: {source}")]
    RegistryDelete {
        volume_id: String,
        #[source]
        source: RuntimeError,
    },

    #[error("Filesystem operation '{operation}' failed at {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid volume id: {value:?}")]
    InvalidVolumeId { value: String },
}

impl GcError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GcError::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

pub type GcResult<T> = Result<T, GcError>;
