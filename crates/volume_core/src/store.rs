use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::error::{GcError, GcResult};
use crate::filesystem;
use crate::identity::{VolumeId, VolumeOrigin};
use crate::layout::StorageLayout;
use crate::runtime::{ContainerRuntime, RuntimeError};

/// Lists and deletes volumes through the registry API when the runtime has
/// one, and through the storage directories when it does not.
///
/// The capability probe runs once in [`VolumeStore::open`]; the answer lives
/// as long as the store.
pub struct VolumeStore<'a, R: ContainerRuntime + ?Sized> {
    runtime: &'a R,
    layout: &'a StorageLayout,
    registry_supported: bool,
}

impl<'a, R: ContainerRuntime + ?Sized> VolumeStore<'a, R> {
    pub async fn open(runtime: &'a R, layout: &'a StorageLayout) -> GcResult<Self> {
        let registry_supported = probe_registry_api(runtime).await?;
        Ok(Self {
            runtime,
            layout,
            registry_supported,
        })
    }

    pub fn supports_registry_api(&self) -> bool {
        self.registry_supported
    }

    pub fn origin(&self) -> VolumeOrigin {
        if self.registry_supported {
            VolumeOrigin::Registry
        } else {
            VolumeOrigin::Directory
        }
    }

    /// Every volume id the runtime knows about, bind mounts included.
    pub async fn list_managed_volume_ids(&self) -> GcResult<BTreeSet<VolumeId>> {
        if self.registry_supported {
            let listing = self.runtime.list_volumes().await?;
            listing
                .volumes
                .unwrap_or_default()
                .into_iter()
                .map(|volume| VolumeId::parse(volume.name))
                .collect()
        } else {
            filesystem::list_subdirectories(self.layout.volumes_root())
                .await?
                .into_iter()
                .map(VolumeId::parse)
                .collect()
        }
    }

    /// Deletes one volume. Returns the directories removed from disk, which is
    /// always empty when the registry performed the delete.
    pub async fn delete_volume(&self, id: &VolumeId) -> GcResult<Vec<PathBuf>> {
        if self.registry_supported {
            self.runtime
                .remove_volume(id.as_str())
                .await
                .map_err(|source| GcError::RegistryDelete {
                    volume_id: id.to_string(),
                    source,
                })?;
            tracing::info!("Removed volume {} through the registry", id);
            return Ok(Vec::new());
        }

        let mut removed = Vec::new();
        for path in [self.layout.legacy_content_dir(id), self.layout.volume_dir(id)] {
            if filesystem::remove_tree_if_present(&path).await? {
                tracing::info!("Removed {}", path.display());
                removed.push(path);
            }
        }
        Ok(removed)
    }
}

/// Whether `runtime` answers volume registry calls. A version mismatch means
/// no; any other failure is returned.
pub async fn probe_registry_api<R: ContainerRuntime + ?Sized>(runtime: &R) -> GcResult<bool> {
    match runtime.list_volumes().await {
        Ok(_) => {
            tracing::debug!("Volume registry API available");
            Ok(true)
        }
        Err(RuntimeError::VersionMismatch { negotiated, .. }) => {
            tracing::debug!(
                "Volume registry API unavailable at API version {}, using storage directories",
                negotiated
            );
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}
