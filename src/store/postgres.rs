use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use crate::model::{Asset, AssetInstance, Id, Manufacturer, Project, Snapshot};
use crate::store::traits::{AssetStore, InstanceStore, ManufacturerStore, ProjectStore, SnapshotStore};

/// Schema statements, applied in order by `migrate`
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS manufacturers (
        id BIGINT PRIMARY KEY,
        name TEXT NOT NULL,
        payload JSONB NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS assets (
        id BIGINT PRIMARY KEY,
        type_id TEXT NOT NULL,
        name TEXT NOT NULL,
        payload JSONB NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS projects (
        id BIGINT PRIMARY KEY,
        name TEXT NOT NULL,
        payload JSONB NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS snapshots (
        id BIGINT PRIMARY KEY,
        project_id BIGINT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        taken_at TIMESTAMPTZ NOT NULL,
        payload JSONB NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS asset_instances (
        snapshot_id BIGINT NOT NULL REFERENCES snapshots(id) ON DELETE CASCADE,
        id BIGINT NOT NULL,
        position BIGSERIAL,
        payload JSONB NOT NULL,
        PRIMARY KEY (snapshot_id, id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS snapshots_project_idx ON snapshots (project_id)",
];

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Create tables that do not exist yet
    pub async fn migrate(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("Failed to run database migrations")?;
        }
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn decode<T: DeserializeOwned>(row: &PgRow) -> Result<T> {
    let Json(value) = row
        .try_get::<Json<T>, _>("payload")
        .context("Failed to decode stored payload")?;
    Ok(value)
}

fn decode_all<T: DeserializeOwned>(rows: Vec<PgRow>) -> Result<Vec<T>> {
    rows.iter().map(decode).collect()
}

#[async_trait::async_trait]
impl ManufacturerStore for PostgresStore {
    async fn get_manufacturer(&self, id: Id) -> Result<Option<Manufacturer>> {
        let row = sqlx::query("SELECT payload FROM manufacturers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch manufacturer")?;

        row.as_ref().map(decode).transpose()
    }

    async fn list_manufacturers(&self) -> Result<Vec<Manufacturer>> {
        let rows = sqlx::query("SELECT payload FROM manufacturers ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list manufacturers")?;

        decode_all(rows)
    }

    async fn upsert_manufacturer(&self, manufacturer: Manufacturer) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO manufacturers (id, name, payload)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                payload = EXCLUDED.payload
            "#,
        )
        .bind(manufacturer.id)
        .bind(&manufacturer.name)
        .bind(Json(&manufacturer))
        .execute(&self.pool)
        .await
        .context("Failed to upsert manufacturer")?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl AssetStore for PostgresStore {
    async fn get_asset(&self, id: Id) -> Result<Option<Asset>> {
        let row = sqlx::query("SELECT payload FROM assets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch asset")?;

        row.as_ref().map(decode).transpose()
    }

    async fn list_assets(&self) -> Result<Vec<Asset>> {
        let rows = sqlx::query("SELECT payload FROM assets ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list assets")?;

        decode_all(rows)
    }

    async fn upsert_asset(&self, asset: Asset) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO assets (id, type_id, name, payload)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET
                type_id = EXCLUDED.type_id,
                name = EXCLUDED.name,
                payload = EXCLUDED.payload
            "#,
        )
        .bind(asset.id)
        .bind(&asset.type_id)
        .bind(&asset.name)
        .bind(Json(&asset))
        .execute(&self.pool)
        .await
        .context("Failed to upsert asset")?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl ProjectStore for PostgresStore {
    async fn get_project(&self, id: Id) -> Result<Option<Project>> {
        let row = sqlx::query("SELECT payload FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch project")?;

        row.as_ref().map(decode).transpose()
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        let rows = sqlx::query("SELECT payload FROM projects ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list projects")?;

        decode_all(rows)
    }

    async fn upsert_project(&self, project: Project) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO projects (id, name, payload)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                payload = EXCLUDED.payload
            "#,
        )
        .bind(project.id)
        .bind(&project.name)
        .bind(Json(&project))
        .execute(&self.pool)
        .await
        .context("Failed to upsert project")?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl SnapshotStore for PostgresStore {
    async fn get_snapshot(&self, id: Id) -> Result<Option<Snapshot>> {
        let row = sqlx::query("SELECT payload FROM snapshots WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch snapshot")?;

        row.as_ref().map(decode).transpose()
    }

    async fn list_snapshots(&self, project_id: Option<Id>) -> Result<Vec<Snapshot>> {
        let rows = sqlx::query(
            r#"
            SELECT payload FROM snapshots
            WHERE $1::BIGINT IS NULL OR project_id = $1
            ORDER BY taken_at, id
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list snapshots")?;

        decode_all(rows)
    }

    async fn upsert_snapshot(&self, snapshot: Snapshot) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO snapshots (id, project_id, name, taken_at, payload)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                project_id = EXCLUDED.project_id,
                name = EXCLUDED.name,
                taken_at = EXCLUDED.taken_at,
                payload = EXCLUDED.payload
            "#,
        )
        .bind(snapshot.id)
        .bind(snapshot.project_id)
        .bind(&snapshot.name)
        .bind(snapshot.taken_at)
        .bind(Json(&snapshot))
        .execute(&self.pool)
        .await
        .context("Failed to upsert snapshot")?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl InstanceStore for PostgresStore {
    async fn list_instances_for_snapshot(&self, snapshot_id: Id) -> Result<Vec<AssetInstance>> {
        let rows = sqlx::query(
            "SELECT payload FROM asset_instances WHERE snapshot_id = $1 ORDER BY position",
        )
        .bind(snapshot_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list asset instances")?;

        decode_all(rows)
    }

    async fn upsert_instance(&self, snapshot_id: Id, mut instance: AssetInstance) -> Result<()> {
        instance.snapshot_id = Some(snapshot_id);

        // Position is kept on conflict so replaced instances stay where they were
        sqlx::query(
            r#"
            INSERT INTO asset_instances (snapshot_id, id, payload)
            VALUES ($1, $2, $3)
            ON CONFLICT (snapshot_id, id) DO UPDATE SET
                payload = EXCLUDED.payload
            "#,
        )
        .bind(snapshot_id)
        .bind(instance.id)
        .bind(Json(&instance))
        .execute(&self.pool)
        .await
        .context("Failed to upsert asset instance")?;

        Ok(())
    }
}
