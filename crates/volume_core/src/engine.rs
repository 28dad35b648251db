use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::error::GcResult;
use crate::identity::{VolumeId, VolumeOrigin};
use crate::layout::StorageLayout;
use crate::legacy::LegacyConfigReader;
use crate::mounts::extract_volume_ids;
use crate::runtime::ContainerRuntime;
use crate::store::VolumeStore;

/// Inputs and result of one orphan computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrphanScan {
    pub origin: VolumeOrigin,
    pub managed: BTreeSet<VolumeId>,
    pub in_use: BTreeSet<VolumeId>,
    pub orphans: BTreeSet<VolumeId>,
}

/// Outcome of [`ReconciliationEngine::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcReport {
    pub origin: VolumeOrigin,
    pub managed_count: usize,
    pub in_use_count: usize,
    pub removed_volumes: Vec<VolumeId>,
    pub removed_paths: Vec<PathBuf>,
}

pub struct ReconciliationEngine<R: ContainerRuntime> {
    runtime: R,
    layout: StorageLayout,
    legacy: LegacyConfigReader,
}

impl<R: ContainerRuntime> ReconciliationEngine<R> {
    pub fn new(runtime: R, layout: StorageLayout) -> Self {
        let legacy = LegacyConfigReader::new(layout.clone());
        Self {
            runtime,
            layout,
            legacy,
        }
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Probes the runtime's capabilities; the returned store is valid for one run.
    pub async fn open_store(&self) -> GcResult<VolumeStore<'_, R>> {
        VolumeStore::open(&self.runtime, &self.layout).await
    }

    /// Known volume ids minus bind mounts.
    ///
    /// Legacy metadata is checked even when the registry lists the volumes,
    /// since volumes migrated from the oldest generation keep their
    /// `config.json`.
    pub async fn compute_managed_volume_ids(&self, store: &VolumeStore<'_, R>) -> GcResult<BTreeSet<VolumeId>> {
        let mut managed = BTreeSet::new();
        for id in store.list_managed_volume_ids().await? {
            if self.legacy.is_managed_non_bind_volume(&id).await? {
                managed.insert(id);
            }
        }
        Ok(managed)
    }

    /// Volume ids referenced by any container, stopped ones included.
    ///
    /// A bind mount that a container references only by a host path outside
    /// both volume roots contributes nothing here.
    pub async fn compute_in_use_volume_ids(&self) -> GcResult<BTreeSet<VolumeId>> {
        let mut in_use = BTreeSet::new();
        for summary in self.runtime.list_containers(true).await? {
            let container = self.runtime.inspect_container(&summary.id).await?;
            let ids = extract_volume_ids(&container, &self.layout);
            tracing::debug!("Container {} references {} volume(s)", summary.id, ids.len());
            in_use.extend(ids);
        }
        Ok(in_use)
    }

    pub async fn compute_orphans(&self, store: &VolumeStore<'_, R>) -> GcResult<OrphanScan> {
        let managed = self.compute_managed_volume_ids(store).await?;
        let in_use = self.compute_in_use_volume_ids().await?;
        let orphans = managed.difference(&in_use).cloned().collect();

        Ok(OrphanScan {
            origin: store.origin(),
            managed,
            in_use,
            orphans,
        })
    }

    /// One full pass: find orphans and delete them one at a time. The first
    /// failed deletion ends the run.
    pub async fn run(&self) -> GcResult<GcReport> {
        let store = self.open_store().await?;
        let scan = self.compute_orphans(&store).await?;

        tracing::info!("Found {} volumes ({})", scan.managed.len(), scan.origin);
        tracing::info!("{} volumes in use by containers", scan.in_use.len());
        tracing::info!("{} orphaned volumes to remove", scan.orphans.len());

        let mut report = GcReport {
            origin: scan.origin,
            managed_count: scan.managed.len(),
            in_use_count: scan.in_use.len(),
            removed_volumes: Vec::with_capacity(scan.orphans.len()),
            removed_paths: Vec::new(),
        };

        for id in scan.orphans {
            let paths = store.delete_volume(&id).await?;
            report.removed_paths.extend(paths);
            report.removed_volumes.push(id);
        }

        tracing::info!("Volume cleanup complete, removed {} volumes", report.removed_volumes.len());
        Ok(report)
    }
}
