use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{GcError, GcResult};

/// Identifier of a volume, unique within one runtime installation.
///
/// The same token names the volume in the registry API and is used verbatim as
/// a directory name under both storage roots, so it must be a single safe path
/// segment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VolumeId(String);

impl VolumeId {
    pub fn parse(value: impl Into<String>) -> GcResult<Self> {
        let value = value.into();
        if Self::is_path_segment(&value) {
            Ok(Self(value))
        } else {
            Err(GcError::InvalidVolumeId { value })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_path_segment(value: &str) -> bool {
        !value.is_empty()
            && value != "."
            && value != ".."
            && !value.contains(['/', '\\', '\0'])
    }
}

impl fmt::Display for VolumeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VolumeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for VolumeId {
    type Error = GcError;

    fn try_from(value: String) -> GcResult<Self> {
        Self::parse(value)
    }
}

impl From<VolumeId> for String {
    fn from(id: VolumeId) -> Self {
        id.0
    }
}

/// Where a run's volume ids were enumerated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeOrigin {
    /// Names reported by the runtime's volume registry API.
    Registry,
    /// Subdirectory names of the volumes root on disk.
    Directory,
}

impl fmt::Display for VolumeOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VolumeOrigin::Registry => f.write_str("registry"),
            VolumeOrigin::Directory => f.write_str("directory"),
        }
    }
}
