use serde::{Deserialize, Serialize};

use crate::error::{GcError, GcResult};
use crate::filesystem;
use crate::identity::VolumeId;
use crate::layout::StorageLayout;

/// Per-volume metadata written by the oldest runtime generation to
/// `volumes/<id>/config.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeConfig {
    #[serde(rename = "ID", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "Path", default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(rename = "IsBindMount", default)]
    pub is_bind_mount: bool,

    #[serde(rename = "Writable", default, skip_serializing_if = "Option::is_none")]
    pub writable: Option<bool>,
}

/// Reads legacy volume metadata to tell managed volumes from bind mounts.
#[derive(Debug, Clone)]
pub struct LegacyConfigReader {
    layout: StorageLayout,
}

impl LegacyConfigReader {
    pub fn new(layout: StorageLayout) -> Self {
        Self { layout }
    }

    pub async fn has_legacy_config(&self, id: &VolumeId) -> GcResult<bool> {
        filesystem::is_file(&self.layout.config_path(id)).await
    }

    pub async fn load_config(&self, id: &VolumeId) -> GcResult<Option<VolumeConfig>> {
        let path = self.layout.config_path(id);
        let Some(contents) = filesystem::read_optional(&path).await? else {
            return Ok(None);
        };

        let config = serde_json::from_str(&contents).map_err(|source| GcError::ConfigParse {
            path: path.clone(),
            source,
        })?;
        Ok(Some(config))
    }

    /// Only the oldest generation writes `config.json`; a volume without one
    /// was created by a newer runtime and is always managed.
    pub async fn is_managed_non_bind_volume(&self, id: &VolumeId) -> GcResult<bool> {
        match self.load_config(id).await? {
            Some(config) => {
                if config.is_bind_mount {
                    tracing::debug!("Volume {} is a bind mount, excluding it", id);
                }
                Ok(!config.is_bind_mount)
            }
            None => Ok(true),
        }
    }
}
