use anyhow::Result;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::model::{Asset, AssetInstance, Id, Manufacturer, Project, Snapshot};
use crate::store::traits::{AssetStore, InstanceStore, ManufacturerStore, ProjectStore, SnapshotStore};

/// Store kept entirely in process memory, used when no database is configured
#[derive(Debug, Default)]
pub struct InMemoryStore {
    manufacturers: RwLock<HashMap<Id, Manufacturer>>,
    assets: RwLock<HashMap<Id, Asset>>,
    projects: RwLock<HashMap<Id, Project>>,
    snapshots: RwLock<HashMap<Id, Snapshot>>,
    /// Instances per snapshot, in insertion order
    instances: RwLock<HashMap<Id, Vec<AssetInstance>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ManufacturerStore for InMemoryStore {
    async fn get_manufacturer(&self, id: Id) -> Result<Option<Manufacturer>> {
        Ok(self.manufacturers.read().get(&id).cloned())
    }

    async fn list_manufacturers(&self) -> Result<Vec<Manufacturer>> {
        Ok(self.manufacturers.read().values().cloned().collect())
    }

    async fn upsert_manufacturer(&self, manufacturer: Manufacturer) -> Result<()> {
        self.manufacturers
            .write()
            .insert(manufacturer.id, manufacturer);
        Ok(())
    }
}

#[async_trait::async_trait]
impl AssetStore for InMemoryStore {
    async fn get_asset(&self, id: Id) -> Result<Option<Asset>> {
        Ok(self.assets.read().get(&id).cloned())
    }

    async fn list_assets(&self) -> Result<Vec<Asset>> {
        Ok(self.assets.read().values().cloned().collect())
    }

    async fn upsert_asset(&self, asset: Asset) -> Result<()> {
        self.assets.write().insert(asset.id, asset);
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProjectStore for InMemoryStore {
    async fn get_project(&self, id: Id) -> Result<Option<Project>> {
        Ok(self.projects.read().get(&id).cloned())
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        Ok(self.projects.read().values().cloned().collect())
    }

    async fn upsert_project(&self, project: Project) -> Result<()> {
        self.projects.write().insert(project.id, project);
        Ok(())
    }
}

#[async_trait::async_trait]
impl SnapshotStore for InMemoryStore {
    async fn get_snapshot(&self, id: Id) -> Result<Option<Snapshot>> {
        Ok(self.snapshots.read().get(&id).cloned())
    }

    async fn list_snapshots(&self, project_id: Option<Id>) -> Result<Vec<Snapshot>> {
        Ok(self
            .snapshots
            .read()
            .values()
            .filter(|snapshot| project_id.map_or(true, |id| snapshot.project_id == id))
            .cloned()
            .collect())
    }

    async fn upsert_snapshot(&self, snapshot: Snapshot) -> Result<()> {
        self.snapshots.write().insert(snapshot.id, snapshot);
        Ok(())
    }
}

#[async_trait::async_trait]
impl InstanceStore for InMemoryStore {
    async fn list_instances_for_snapshot(&self, snapshot_id: Id) -> Result<Vec<AssetInstance>> {
        Ok(self
            .instances
            .read()
            .get(&snapshot_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn upsert_instance(&self, snapshot_id: Id, mut instance: AssetInstance) -> Result<()> {
        instance.snapshot_id = Some(snapshot_id);

        let mut instances = self.instances.write();
        let snapshot_instances = instances.entry(snapshot_id).or_default();
        match snapshot_instances
            .iter_mut()
            .find(|existing| existing.id == instance.id)
        {
            Some(existing) => *existing = instance,
            None => snapshot_instances.push(instance),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn instance(id: Id, location: &str) -> AssetInstance {
        serde_json::from_value(json!({"id": id, "asset": 1, "location": location})).unwrap()
    }

    #[tokio::test]
    async fn test_instances_keep_insertion_order_and_replace_in_place() {
        let store = InMemoryStore::new();
        store.upsert_instance(7, instance(3, "Aisle 1")).await.unwrap();
        store.upsert_instance(7, instance(1, "Aisle 2")).await.unwrap();
        store.upsert_instance(7, instance(3, "Aisle 9")).await.unwrap();
        store.upsert_instance(8, instance(5, "Backroom")).await.unwrap();

        let listed = store.list_instances_for_snapshot(7).await.unwrap();
        let ids: Vec<Id> = listed.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(listed[0].location, "Aisle 9");
        assert_eq!(listed[0].snapshot_id, Some(7));

        assert!(store.list_instances_for_snapshot(99).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_snapshots_filtered_by_project() {
        let store = InMemoryStore::new();
        for (id, project_id) in [(1, 10), (2, 10), (3, 11)] {
            store
                .upsert_snapshot(Snapshot {
                    id,
                    project_id,
                    name: format!("Walk {}", id),
                    taken_at: chrono::Utc::now(),
                    notes: None,
                })
                .await
                .unwrap();
        }

        assert_eq!(store.list_snapshots(Some(10)).await.unwrap().len(), 2);
        assert_eq!(store.list_snapshots(None).await.unwrap().len(), 3);
        assert!(store.get_snapshot(3).await.unwrap().is_some());
        assert!(store.get_snapshot(4).await.unwrap().is_none());
    }
}
