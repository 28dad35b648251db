//! Shared fixtures for the volume-gc scenario tests.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Once;

use tempfile::TempDir;
use volume_core::{StorageLayout, VolumeId};

static TRACING: Once = Once::new();

pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A throwaway runtime root and its layout.
pub struct Installation {
    pub root: TempDir,
    pub layout: StorageLayout,
}

impl Installation {
    pub fn new() -> Self {
        let root = TempDir::new().expect("temp runtime root");
        let layout = StorageLayout::new(root.path());
        Self { root, layout }
    }

    /// `volumes/<name>/_data`, optionally with a `config.json`.
    pub async fn add_volume(&self, name: &str, config: Option<serde_json::Value>) {
        let id = volume(name);
        tokio::fs::create_dir_all(self.layout.volume_dir(&id).join("_data"))
            .await
            .expect("create volume dir");
        if let Some(config) = config {
            tokio::fs::write(self.layout.config_path(&id), config.to_string())
                .await
                .expect("write config.json");
        }
    }

    /// `vfs/dir/<name>` with one file in it.
    pub async fn add_legacy_content(&self, name: &str) {
        let dir = self.layout.legacy_content_dir(&volume(name));
        tokio::fs::create_dir_all(&dir).await.expect("create vfs dir");
        tokio::fs::write(dir.join("payload"), "data").await.expect("write payload");
    }

    pub fn host_path(&self, relative: &str) -> String {
        self.root.path().join(relative).to_string_lossy().into_owned()
    }

    pub fn exists(&self, path: &Path) -> bool {
        path.symlink_metadata().is_ok()
    }
}

impl Default for Installation {
    fn default() -> Self {
        Self::new()
    }
}

pub fn volume(name: &str) -> VolumeId {
    VolumeId::parse(name).expect("valid volume id")
}

pub fn volumes(names: &[&str]) -> BTreeSet<VolumeId> {
    names.iter().map(|name| volume(name)).collect()
}
