//! In-memory [`ContainerRuntime`] for tests.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

use crate::mounts::ContainerRecord;
use crate::runtime::{
    ContainerRuntime, ContainerSummary, RuntimeError, RuntimeResult, VolumeListing, VolumeSummary,
};

/// How the fake answers volume registry calls.
#[derive(Debug, Clone)]
pub enum RegistryState {
    /// Every registry call fails with a version mismatch.
    Unsupported,
    /// The registry answers without a `Volumes` collection.
    Absent,
    /// The registry reports these names.
    Names(Vec<String>),
    /// Every registry call fails with a server error.
    Failing,
}

impl RegistryState {
    pub fn names(names: &[&str]) -> Self {
        RegistryState::Names(names.iter().map(|n| n.to_string()).collect())
    }
}

pub struct FakeRuntime {
    registry: RegistryState,
    containers: Vec<ContainerRecord>,
    refused: HashSet<String>,
    unreadable: HashSet<String>,
    removed: Mutex<Vec<String>>,
    inspected: Mutex<Vec<String>>,
}

impl FakeRuntime {
    pub fn new(registry: RegistryState) -> Self {
        Self {
            registry,
            containers: Vec::new(),
            refused: HashSet::new(),
            unreadable: HashSet::new(),
            removed: Mutex::new(Vec::new()),
            inspected: Mutex::new(Vec::new()),
        }
    }

    pub fn with_container(mut self, container: ContainerRecord) -> Self {
        self.containers.push(container);
        self
    }

    /// Container built from an inspection payload.
    pub fn with_container_json(self, payload: serde_json::Value) -> Self {
        let container = serde_json::from_value(payload).expect("valid container payload");
        self.with_container(container)
    }

    pub fn refuse_removal_of(mut self, name: &str) -> Self {
        self.refused.insert(name.to_string());
        self
    }

    /// Inspecting `id` fails as it does for pre-`Mounts` daemons.
    pub fn unreadable_container(mut self, id: &str) -> Self {
        self.containers.push(ContainerRecord {
            id: id.to_string(),
            ..Default::default()
        });
        self.unreadable.insert(id.to_string());
        self
    }

    /// Names passed to successful `remove_volume` calls, in call order.
    pub fn removed_volumes(&self) -> Vec<String> {
        self.removed.lock().expect("removed lock").clone()
    }

    pub fn inspected_containers(&self) -> Vec<String> {
        self.inspected.lock().expect("inspected lock").clone()
    }

    fn check_registry(&self, operation: &str) -> RuntimeResult<()> {
        match self.registry {
            RegistryState::Unsupported => Err(RuntimeError::VersionMismatch {
                operation: operation.to_string(),
                required: "1.21".to_string(),
                negotiated: "1.19".to_string(),
            }),
            RegistryState::Failing => Err(RuntimeError::Api {
                status: 500,
                message: "internal server error".to_string(),
            }),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn list_containers(&self, include_stopped: bool) -> RuntimeResult<Vec<ContainerSummary>> {
        assert!(include_stopped, "stopped containers must be listed");
        Ok(self
            .containers
            .iter()
            .map(|c| ContainerSummary { id: c.id.clone() })
            .collect())
    }

    async fn inspect_container(&self, id: &str) -> RuntimeResult<ContainerRecord> {
        self.inspected.lock().expect("inspected lock").push(id.to_string());
        if self.unreadable.contains(id) {
            return Err(RuntimeError::Unsupported {
                operation: "inspect_container".to_string(),
                message: format!("container {} has no readable mount list", id),
            });
        }
        self.containers
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| RuntimeError::Api {
                status: 404,
                message: format!("No such container: {}", id),
            })
    }

    async fn list_volumes(&self) -> RuntimeResult<VolumeListing> {
        self.check_registry("list_volumes")?;
        let volumes = match &self.registry {
            RegistryState::Names(names) => Some(
                names
                    .iter()
                    .map(|name| VolumeSummary { name: name.clone() })
                    .collect(),
            ),
            _ => None,
        };
        Ok(VolumeListing { volumes })
    }

    async fn remove_volume(&self, name: &str) -> RuntimeResult<()> {
        self.check_registry("remove_volume")?;
        if self.refused.contains(name) {
            return Err(RuntimeError::Api {
                status: 409,
                message: format!("remove {}: volume is in use", name),
            });
        }
        self.removed.lock().expect("removed lock").push(name.to_string());
        Ok(())
    }
}
