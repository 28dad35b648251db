use std::env;
use std::path::PathBuf;

use crate::layout::StorageLayout;

pub const DEFAULT_RUNTIME_ROOT: &str = "/var/lib/docker";
pub const RUNTIME_ROOT_ENV: &str = "VOLUME_GC_RUNTIME_ROOT";

/// Settings for one garbage-collection run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcConfig {
    /// Data directory of the runtime installation being cleaned.
    pub runtime_root: PathBuf,
}

impl Default for GcConfig {
    fn default() -> Self {
        Self {
            runtime_root: PathBuf::from(DEFAULT_RUNTIME_ROOT),
        }
    }
}

impl GcConfig {
    /// Defaults, with the runtime root overridden by `VOLUME_GC_RUNTIME_ROOT`
    /// when it is set to a non-empty value.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(root) = lookup(RUNTIME_ROOT_ENV).filter(|value| !value.trim().is_empty()) {
            config.runtime_root = PathBuf::from(root.trim());
        }
        config
    }

    pub fn layout(&self) -> StorageLayout {
        StorageLayout::new(&self.runtime_root)
    }
}
