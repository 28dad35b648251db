use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::mounts::ContainerRecord;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The connected server or client is too old for the requested call.
    #[error("{operation} requires API version {required}, negotiated version is {negotiated}")]
    VersionMismatch {
        operation: String,
        required: String,
        negotiated: String,
    },

    /// The runtime answered, but in a shape this client cannot read faithfully.
    #[error("{operation} is not supported: {message}")]
    Unsupported { operation: String, message: String },

    #[error("Runtime API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Runtime connection error: {message}")]
    Transport { message: String },
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSummary {
    #[serde(rename = "Id")]
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeSummary {
    #[serde(rename = "Name")]
    pub name: String,
}

/// Registry answer to a volume listing; `volumes` is absent when the registry
/// has nothing to report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeListing {
    #[serde(rename = "Volumes", default)]
    pub volumes: Option<Vec<VolumeSummary>>,
}

/// The container runtime operations reconciliation needs.
///
/// `list_volumes` and `remove_volume` are capability checked and fail with
/// [`RuntimeError::VersionMismatch`] against runtimes without a volume registry.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    async fn list_containers(&self, include_stopped: bool) -> RuntimeResult<Vec<ContainerSummary>>;

    async fn inspect_container(&self, id: &str) -> RuntimeResult<ContainerRecord>;

    async fn list_volumes(&self) -> RuntimeResult<VolumeListing>;

    async fn remove_volume(&self, name: &str) -> RuntimeResult<()>;
}
