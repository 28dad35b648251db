/*!
# Volume Core

Reconciles the volumes a container runtime knows about against the volumes its
containers actually mount, and removes the ones nobody references.

Two on-disk generations are understood: the legacy `vfs/dir/<id>` content tree
and the per-volume `volumes/<id>/` layout, including volumes whose `_data`
was migrated into the newer layout as a symlink.
*/

pub mod config;
pub mod engine;
pub mod error;
pub mod filesystem;
pub mod identity;
pub mod layout;
pub mod legacy;
pub mod mounts;
pub mod runtime;
pub mod store;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use config::GcConfig;
pub use engine::{GcReport, OrphanScan, ReconciliationEngine};
pub use error::{GcError, GcResult};
pub use identity::{VolumeId, VolumeOrigin};
pub use layout::StorageLayout;
pub use legacy::{LegacyConfigReader, VolumeConfig};
pub use mounts::{extract_volume_ids, volume_id_from_host_path, ContainerRecord, MountRecord};
pub use runtime::{ContainerRuntime, ContainerSummary, RuntimeError, VolumeListing, VolumeSummary};
pub use store::VolumeStore;
