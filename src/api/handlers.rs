use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    Extension, Json as RequestJson,
};
use log::error;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::CatalogConfig;
use crate::logic::{
    build_catalog, BomAggregator, CatalogQuery, Expander, ListQuery, MerchandisingAllocator,
    QueryError,
};
use crate::model::{
    Asset, AssetInstance, BomResponse, Id, Manufacturer, MerchandisingSummary, Page, Project,
    Snapshot,
};
use crate::store::traits::Store;

pub type AppState<S> = Arc<S>;

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<Json<T>, ApiError>;

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MerchandisingQuery {
    pub top_n: Option<usize>,
}

fn internal_error(context: &str, err: anyhow::Error) -> ApiError {
    error!("{}: {:#}", context, err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(context)),
    )
}

fn not_found(kind: &str, id: Id) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(&format!("{} {} not found", kind, id))),
    )
}

fn bad_request(err: QueryError) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(&err.to_string())),
    )
}

async fn require_snapshot<S: Store>(store: &S, snapshot_id: Id) -> Result<Snapshot, ApiError> {
    store
        .get_snapshot(snapshot_id)
        .await
        .map_err(|e| internal_error("Failed to fetch snapshot", e))?
        .ok_or_else(|| not_found("Snapshot", snapshot_id))
}

/// Load a snapshot's instances with assets and components resolved
async fn load_expanded_instances<S: Store>(
    store: &S,
    snapshot_id: Id,
) -> Result<Vec<AssetInstance>, ApiError> {
    require_snapshot(store, snapshot_id).await?;

    let instances = store
        .list_instances_for_snapshot(snapshot_id)
        .await
        .map_err(|e| internal_error("Failed to list asset instances", e))?;
    let assets = store
        .list_assets()
        .await
        .map_err(|e| internal_error("Failed to list assets", e))?;

    Ok(Expander::expand_instances(instances, &build_catalog(assets)))
}

// Manufacturers

pub async fn list_manufacturers<S: Store>(
    State(store): State<AppState<S>>,
    Extension(limits): Extension<CatalogConfig>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Page<Manufacturer>> {
    let manufacturers = store
        .list_manufacturers()
        .await
        .map_err(|e| internal_error("Failed to list manufacturers", e))?;

    CatalogQuery::paginate(manufacturers, &query, &limits, |_| true)
        .map(Json)
        .map_err(bad_request)
}

pub async fn get_manufacturer<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
) -> ApiResult<Manufacturer> {
    store
        .get_manufacturer(id)
        .await
        .map_err(|e| internal_error("Failed to fetch manufacturer", e))?
        .map(Json)
        .ok_or_else(|| not_found("Manufacturer", id))
}

pub async fn upsert_manufacturer<S: Store>(
    State(store): State<AppState<S>>,
    RequestJson(manufacturer): RequestJson<Manufacturer>,
) -> ApiResult<Manufacturer> {
    store
        .upsert_manufacturer(manufacturer.clone())
        .await
        .map_err(|e| internal_error("Failed to save manufacturer", e))?;
    Ok(Json(manufacturer))
}

// Assets

pub async fn list_assets<S: Store>(
    State(store): State<AppState<S>>,
    Extension(limits): Extension<CatalogConfig>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Page<Asset>> {
    let assets = store
        .list_assets()
        .await
        .map_err(|e| internal_error("Failed to list assets", e))?;

    CatalogQuery::paginate(assets, &query, &limits, |asset: &Asset| {
        query
            .manufacturer
            .map_or(true, |id| asset.manufacturer_id == Some(id))
            && query
                .type_id
                .as_deref()
                .map_or(true, |type_id| asset.type_id == type_id)
    })
    .map(Json)
    .map_err(bad_request)
}

/// Get an asset with its component children resolved one level deep
pub async fn get_asset<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
) -> ApiResult<Asset> {
    let assets = store
        .list_assets()
        .await
        .map_err(|e| internal_error("Failed to list assets", e))?;
    let catalog = build_catalog(assets);

    catalog
        .get(&id)
        .cloned()
        .map(|asset| Json(Expander::expand_asset(asset, &catalog)))
        .ok_or_else(|| not_found("Asset", id))
}

pub async fn upsert_asset<S: Store>(
    State(store): State<AppState<S>>,
    RequestJson(asset): RequestJson<Asset>,
) -> ApiResult<Asset> {
    store
        .upsert_asset(asset.clone())
        .await
        .map_err(|e| internal_error("Failed to save asset", e))?;
    Ok(Json(asset))
}

// Projects

pub async fn list_projects<S: Store>(
    State(store): State<AppState<S>>,
    Extension(limits): Extension<CatalogConfig>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Page<Project>> {
    let projects = store
        .list_projects()
        .await
        .map_err(|e| internal_error("Failed to list projects", e))?;

    CatalogQuery::paginate(projects, &query, &limits, |_| true)
        .map(Json)
        .map_err(bad_request)
}

pub async fn get_project<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
) -> ApiResult<Project> {
    store
        .get_project(id)
        .await
        .map_err(|e| internal_error("Failed to fetch project", e))?
        .map(Json)
        .ok_or_else(|| not_found("Project", id))
}

pub async fn upsert_project<S: Store>(
    State(store): State<AppState<S>>,
    RequestJson(project): RequestJson<Project>,
) -> ApiResult<Project> {
    store
        .upsert_project(project.clone())
        .await
        .map_err(|e| internal_error("Failed to save project", e))?;
    Ok(Json(project))
}

pub async fn list_project_snapshots<S: Store>(
    State(store): State<AppState<S>>,
    Extension(limits): Extension<CatalogConfig>,
    Path(project_id): Path<Id>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Page<Snapshot>> {
    store
        .get_project(project_id)
        .await
        .map_err(|e| internal_error("Failed to fetch project", e))?
        .ok_or_else(|| not_found("Project", project_id))?;

    let snapshots = store
        .list_snapshots(Some(project_id))
        .await
        .map_err(|e| internal_error("Failed to list snapshots", e))?;

    CatalogQuery::paginate(snapshots, &query, &limits, |_| true)
        .map(Json)
        .map_err(bad_request)
}

// Snapshots

pub async fn list_snapshots<S: Store>(
    State(store): State<AppState<S>>,
    Extension(limits): Extension<CatalogConfig>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Page<Snapshot>> {
    let snapshots = store
        .list_snapshots(query.project)
        .await
        .map_err(|e| internal_error("Failed to list snapshots", e))?;

    CatalogQuery::paginate(snapshots, &query, &limits, |_| true)
        .map(Json)
        .map_err(bad_request)
}

pub async fn get_snapshot<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
) -> ApiResult<Snapshot> {
    require_snapshot(&*store, id).await.map(Json)
}

pub async fn upsert_snapshot<S: Store>(
    State(store): State<AppState<S>>,
    RequestJson(snapshot): RequestJson<Snapshot>,
) -> ApiResult<Snapshot> {
    store
        .get_project(snapshot.project_id)
        .await
        .map_err(|e| internal_error("Failed to fetch project", e))?
        .ok_or_else(|| not_found("Project", snapshot.project_id))?;

    store
        .upsert_snapshot(snapshot.clone())
        .await
        .map_err(|e| internal_error("Failed to save snapshot", e))?;
    Ok(Json(snapshot))
}

pub async fn list_snapshot_instances<S: Store>(
    State(store): State<AppState<S>>,
    Extension(limits): Extension<CatalogConfig>,
    Path(snapshot_id): Path<Id>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Page<AssetInstance>> {
    let instances = load_expanded_instances(&*store, snapshot_id).await?;

    CatalogQuery::paginate(instances, &query, &limits, |instance: &AssetInstance| {
        query
            .location
            .as_deref()
            .map_or(true, |location| instance.location == location)
            && query.merch_category.as_deref().map_or(true, |category| {
                instance.merch_categories().contains(&category.trim())
            })
    })
    .map(Json)
    .map_err(bad_request)
}

pub async fn upsert_snapshot_instance<S: Store>(
    State(store): State<AppState<S>>,
    Path(snapshot_id): Path<Id>,
    RequestJson(instance): RequestJson<AssetInstance>,
) -> ApiResult<AssetInstance> {
    require_snapshot(&*store, snapshot_id).await?;

    let mut instance = instance;
    instance.snapshot_id = Some(snapshot_id);
    store
        .upsert_instance(snapshot_id, instance.clone())
        .await
        .map_err(|e| internal_error("Failed to save asset instance", e))?;
    Ok(Json(instance))
}

// Derived views

pub async fn get_snapshot_bom<S: Store>(
    State(store): State<AppState<S>>,
    Path(snapshot_id): Path<Id>,
) -> ApiResult<BomResponse> {
    let instances = load_expanded_instances(&*store, snapshot_id).await?;
    let rows = BomAggregator::aggregate(&instances);
    Ok(Json(BomResponse::new(snapshot_id, rows)))
}

pub async fn get_snapshot_merchandising<S: Store>(
    State(store): State<AppState<S>>,
    Extension(limits): Extension<CatalogConfig>,
    Path(snapshot_id): Path<Id>,
    Query(query): Query<MerchandisingQuery>,
) -> ApiResult<MerchandisingSummary> {
    let top_n = CatalogQuery::top_n(query.top_n, &limits).map_err(bad_request)?;
    let instances = load_expanded_instances(&*store, snapshot_id).await?;

    Ok(Json(
        MerchandisingAllocator::allocate(&instances, top_n).for_snapshot(snapshot_id),
    ))
}
