use crate::model::{Asset, AssetInstance, Id, Manufacturer, Project, Snapshot};
use anyhow::Result;

#[async_trait::async_trait]
pub trait ManufacturerStore: Send + Sync {
    async fn get_manufacturer(&self, id: Id) -> Result<Option<Manufacturer>>;
    async fn list_manufacturers(&self) -> Result<Vec<Manufacturer>>;
    async fn upsert_manufacturer(&self, manufacturer: Manufacturer) -> Result<()>;
}

#[async_trait::async_trait]
pub trait AssetStore: Send + Sync {
    /// Get an asset as stored, component children unresolved
    async fn get_asset(&self, id: Id) -> Result<Option<Asset>>;
    async fn list_assets(&self) -> Result<Vec<Asset>>;
    async fn upsert_asset(&self, asset: Asset) -> Result<()>;
}

#[async_trait::async_trait]
pub trait ProjectStore: Send + Sync {
    async fn get_project(&self, id: Id) -> Result<Option<Project>>;
    async fn list_projects(&self) -> Result<Vec<Project>>;
    async fn upsert_project(&self, project: Project) -> Result<()>;
}

#[async_trait::async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn get_snapshot(&self, id: Id) -> Result<Option<Snapshot>>;
    /// List snapshots, optionally only those of one project
    async fn list_snapshots(&self, project_id: Option<Id>) -> Result<Vec<Snapshot>>;
    async fn upsert_snapshot(&self, snapshot: Snapshot) -> Result<()>;
}

/// Trait for the asset instances recorded in a snapshot
#[async_trait::async_trait]
pub trait InstanceStore: Send + Sync {
    /// Instances of a snapshot in insertion order, references unresolved
    async fn list_instances_for_snapshot(&self, snapshot_id: Id) -> Result<Vec<AssetInstance>>;
    async fn upsert_instance(&self, snapshot_id: Id, instance: AssetInstance) -> Result<()>;
}

pub trait Store:
    ManufacturerStore + AssetStore + ProjectStore + SnapshotStore + InstanceStore + Send + Sync
{
}

impl<T> Store for T where
    T: ManufacturerStore + AssetStore + ProjectStore + SnapshotStore + InstanceStore + Send + Sync
{
}
