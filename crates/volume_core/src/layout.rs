use std::path::{Path, PathBuf};

use crate::identity::VolumeId;

pub const LEGACY_VFS_DIR: &str = "vfs/dir";
pub const VOLUMES_DIR: &str = "volumes";
pub const CONFIG_FILE: &str = "config.json";

/// On-disk layout of a runtime installation rooted at one data directory.
///
/// ```text
/// <root>/vfs/dir/<id>/             legacy content
/// <root>/volumes/<id>/config.json  legacy metadata (optional)
/// <root>/volumes/<id>/_data        content, possibly a symlink into vfs/dir
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    legacy_vfs_root: PathBuf,
    volumes_root: PathBuf,
}

impl StorageLayout {
    pub fn new(runtime_root: impl AsRef<Path>) -> Self {
        let runtime_root = runtime_root.as_ref();
        Self {
            legacy_vfs_root: runtime_root.join(LEGACY_VFS_DIR),
            volumes_root: runtime_root.join(VOLUMES_DIR),
        }
    }

    pub fn legacy_vfs_root(&self) -> &Path {
        &self.legacy_vfs_root
    }

    pub fn volumes_root(&self) -> &Path {
        &self.volumes_root
    }

    /// Both roots a host path may live under, legacy first.
    pub fn known_roots(&self) -> [&Path; 2] {
        [&self.legacy_vfs_root, &self.volumes_root]
    }

    pub fn legacy_content_dir(&self, id: &VolumeId) -> PathBuf {
        self.legacy_vfs_root.join(id.as_str())
    }

    pub fn volume_dir(&self, id: &VolumeId) -> PathBuf {
        self.volumes_root.join(id.as_str())
    }

    pub fn config_path(&self, id: &VolumeId) -> PathBuf {
        self.volume_dir(id).join(CONFIG_FILE)
    }
}
