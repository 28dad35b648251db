/*!
# Docker Client

[`ContainerRuntime`] backed by the Docker Engine API through `bollard`.
*/

use async_trait::async_trait;
use bollard::container::{InspectContainerOptions, ListContainersOptions};
use bollard::errors::Error as BollardError;
use bollard::models::{ContainerInspectResponse, MountPoint};
use bollard::volume::{ListVolumesOptions, RemoveVolumeOptions};
use bollard::Docker;

use volume_core::runtime::RuntimeResult;
use volume_core::{
    ContainerRecord, ContainerRuntime, ContainerSummary, MountRecord, RuntimeError, VolumeListing,
    VolumeSummary,
};

/// First Docker API version with the `/volumes` endpoints.
pub const REGISTRY_API_VERSION: ApiVersion = ApiVersion { major: 1, minor: 21 };

/// First Docker API version reporting container mounts as the `Mounts` list.
/// Older daemons only send the `Volumes` map, which `bollard` does not model.
pub const MOUNTS_API_VERSION: ApiVersion = ApiVersion { major: 1, minor: 20 };

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ApiVersion {
    pub major: usize,
    pub minor: usize,
}

impl std::fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

pub struct DockerRuntime {
    docker: Docker,
    api_version: ApiVersion,
}

impl DockerRuntime {
    /// Connects through `DOCKER_HOST` or the local socket and negotiates the
    /// API version with the daemon.
    pub async fn connect() -> RuntimeResult<Self> {
        let docker = Docker::connect_with_local_defaults()
            .map_err(to_runtime_error)?
            .negotiate_version()
            .await
            .map_err(to_runtime_error)?;

        let client_version = docker.client_version();
        let api_version = ApiVersion {
            major: client_version.major_version,
            minor: client_version.minor_version,
        };
        tracing::info!("Connected to Docker, negotiated API version {}", api_version);

        Ok(Self { docker, api_version })
    }

    fn require_registry(&self, operation: &str) -> RuntimeResult<()> {
        check_version(operation, self.api_version)
    }
}

fn check_version(operation: &str, negotiated: ApiVersion) -> RuntimeResult<()> {
    if negotiated < REGISTRY_API_VERSION {
        return Err(RuntimeError::VersionMismatch {
            operation: operation.to_string(),
            required: REGISTRY_API_VERSION.to_string(),
            negotiated: negotiated.to_string(),
        });
    }
    Ok(())
}

/// Daemons older than the volume API answer its routes with a bare 404.
fn registry_error(operation: &str, negotiated: ApiVersion, error: BollardError) -> RuntimeError {
    match error {
        BollardError::DockerResponseServerError { status_code: 404, message }
            if message.contains("page not found") =>
        {
            RuntimeError::VersionMismatch {
                operation: operation.to_string(),
                required: REGISTRY_API_VERSION.to_string(),
                negotiated: negotiated.to_string(),
            }
        }
        other => to_runtime_error(other),
    }
}

fn to_runtime_error(error: BollardError) -> RuntimeError {
    match error {
        BollardError::DockerResponseServerError { status_code, message } => RuntimeError::Api {
            status: status_code,
            message,
        },
        other => RuntimeError::Transport {
            message: other.to_string(),
        },
    }
}

fn to_mount_record(mount: MountPoint) -> MountRecord {
    MountRecord {
        name: mount.name.filter(|name| !name.is_empty()),
        source: mount.source,
        destination: mount.destination,
    }
}

/// `bollard` models the `Mounts` list only. Below API 1.20 the daemon reports
/// volumes solely through the `Volumes` map, so an inspection at that version
/// is refused rather than returned without its volumes.
fn to_container_record(
    fallback_id: &str,
    response: ContainerInspectResponse,
    negotiated: ApiVersion,
) -> RuntimeResult<ContainerRecord> {
    let id = response.id.unwrap_or_else(|| fallback_id.to_string());
    if negotiated < MOUNTS_API_VERSION {
        return Err(RuntimeError::Unsupported {
            operation: "inspect_container".to_string(),
            message: format!(
                "container {} reports volumes through the Volumes map of API {}, which requires API {} to read",
                id, negotiated, MOUNTS_API_VERSION
            ),
        });
    }

    Ok(ContainerRecord {
        id,
        volumes: None,
        mounts: response
            .mounts
            .map(|mounts| mounts.into_iter().map(to_mount_record).collect()),
    })
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn list_containers(&self, include_stopped: bool) -> RuntimeResult<Vec<ContainerSummary>> {
        let options = ListContainersOptions::<String> {
            all: include_stopped,
            ..Default::default()
        };
        let containers = self
            .docker
            .list_containers(Some(options))
            .await
            .map_err(to_runtime_error)?;

        Ok(containers
            .into_iter()
            .filter_map(|container| container.id)
            .map(|id| ContainerSummary { id })
            .collect())
    }

    async fn inspect_container(&self, id: &str) -> RuntimeResult<ContainerRecord> {
        let response = self
            .docker
            .inspect_container(id, None::<InspectContainerOptions>)
            .await
            .map_err(to_runtime_error)?;
        to_container_record(id, response, self.api_version)
    }

    async fn list_volumes(&self) -> RuntimeResult<VolumeListing> {
        self.require_registry("list_volumes")?;
        let response = self
            .docker
            .list_volumes(None::<ListVolumesOptions<String>>)
            .await
            .map_err(|e| registry_error("list_volumes", self.api_version, e))?;

        Ok(VolumeListing {
            volumes: response.volumes.map(|volumes| {
                volumes
                    .into_iter()
                    .map(|volume| VolumeSummary { name: volume.name })
                    .collect()
            }),
        })
    }

    async fn remove_volume(&self, name: &str) -> RuntimeResult<()> {
        self.require_registry("remove_volume")?;
        self.docker
            .remove_volume(name, None::<RemoveVolumeOptions>)
            .await
            .map_err(|e| registry_error("remove_volume", self.api_version, e))
    }
}
