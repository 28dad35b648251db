use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::{Component, Path};

use crate::identity::VolumeId;
use crate::layout::StorageLayout;

/// Inspection result for one container.
///
/// Older runtimes report a `Volumes` map of container path to host path; newer
/// ones report a `Mounts` list whose named entries are volumes. Either field
/// may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRecord {
    #[serde(rename = "Id", default)]
    pub id: String,

    #[serde(rename = "Volumes", default, skip_serializing_if = "Option::is_none")]
    pub volumes: Option<HashMap<String, String>>,

    #[serde(rename = "Mounts", default, skip_serializing_if = "Option::is_none")]
    pub mounts: Option<Vec<MountRecord>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountRecord {
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "Source", default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(rename = "Destination", default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
}

/// The first path segment below whichever of `roots` contains `host_path`.
///
/// Prefixes match on whole components. Paths outside every root, or naming a
/// root itself, have no volume id.
pub fn volume_id_from_host_path(host_path: &str, roots: &[&Path]) -> Option<VolumeId> {
    let path = Path::new(host_path);
    roots.iter().find_map(|root| {
        let rest = path.strip_prefix(root).ok()?;
        match rest.components().next()? {
            Component::Normal(segment) => VolumeId::parse(segment.to_str()?).ok(),
            _ => None,
        }
    })
}

/// Every volume id `container` references, from both mount shapes.
pub fn extract_volume_ids(container: &ContainerRecord, layout: &StorageLayout) -> BTreeSet<VolumeId> {
    let mut ids = BTreeSet::new();
    let roots = layout.known_roots();

    if let Some(volumes) = &container.volumes {
        for (container_path, host_path) in volumes {
            match volume_id_from_host_path(host_path, &roots) {
                Some(id) => {
                    ids.insert(id);
                }
                None => tracing::debug!(
                    "Container {}: {} -> {} is outside the volume roots",
                    container.id,
                    container_path,
                    host_path
                ),
            }
        }
    }

    if let Some(mounts) = &container.mounts {
        for mount in mounts {
            let Some(name) = &mount.name else {
                continue;
            };
            match VolumeId::parse(name.as_str()) {
                Ok(id) => {
                    ids.insert(id);
                }
                Err(e) => tracing::warn!("Container {}: ignoring mount name: {}", container.id, e),
            }
        }
    }

    ids
}
