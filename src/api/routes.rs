use axum::{routing::get, Extension, Router};
use std::sync::Arc;
use tower_http::services::ServeDir;

use crate::api::handlers;
use crate::config::CatalogConfig;
use crate::store::traits::Store;

pub fn create_router<S: Store + 'static>(catalog: CatalogConfig) -> Router<Arc<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Catalog
        .route(
            "/manufacturers",
            get(handlers::list_manufacturers::<S>).post(handlers::upsert_manufacturer::<S>),
        )
        .route("/manufacturers/:id", get(handlers::get_manufacturer::<S>))
        .route(
            "/assets",
            get(handlers::list_assets::<S>).post(handlers::upsert_asset::<S>),
        )
        .route("/assets/:id", get(handlers::get_asset::<S>))
        // Projects and snapshots
        .route(
            "/projects",
            get(handlers::list_projects::<S>).post(handlers::upsert_project::<S>),
        )
        .route("/projects/:id", get(handlers::get_project::<S>))
        .route(
            "/projects/:id/snapshots",
            get(handlers::list_project_snapshots::<S>),
        )
        .route(
            "/snapshots",
            get(handlers::list_snapshots::<S>).post(handlers::upsert_snapshot::<S>),
        )
        .route("/snapshots/:id", get(handlers::get_snapshot::<S>))
        .route(
            "/snapshots/:id/instances",
            get(handlers::list_snapshot_instances::<S>)
                .post(handlers::upsert_snapshot_instance::<S>),
        )
        // Derived views
        .route("/snapshots/:id/bom", get(handlers::get_snapshot_bom::<S>))
        .route(
            "/snapshots/:id/merchandising",
            get(handlers::get_snapshot_merchandising::<S>),
        )
        .layer(Extension(catalog))
}

/// Serve the built client from `static_dir` for every path the API does not handle
pub fn with_static_client<S: Store + 'static>(
    router: Router<Arc<S>>,
    static_dir: Option<&str>,
) -> Router<Arc<S>> {
    match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::{load_seed_data, DEMO_SNAPSHOT_ID, EMPTY_SNAPSHOT_ID};
    use crate::store::InMemoryStore;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn app() -> Router {
        let store = InMemoryStore::new();
        load_seed_data(&store).await.unwrap();
        create_router(CatalogConfig::default()).with_state(Arc::new(store))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn get(path: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        send(app().await, request).await
    }

    fn post(path: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_asset_list_filters_and_search() {
        let (status, body) = get("/assets?manufacturer=1&ordering=-type_id").await;
        assert_eq!(status, StatusCode::OK);
        let types: Vec<&str> = body["results"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["type_id"].as_str().unwrap())
            .collect();
        assert_eq!(types, vec!["WB-48", "SH-48", "BD-48"]);

        let (_, body) = get("/assets?search=trion&page_size=1").await;
        assert_eq!(body["count"], 2);
        assert_eq!(body["total_pages"], 2);
        assert_eq!(body["results"][0]["name"], "Peg Hook");

        let (status, body) = get("/assets?ordering=width").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "cannot order by 'width'");
    }

    #[tokio::test]
    async fn test_get_asset_expands_components() {
        let (status, body) = get("/assets/10").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["manufacturer"]["name"], "Madix");
        assert_eq!(body["components"][0]["child_asset"]["name"], "Shelf");

        let (status, _) = get("/assets/404").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_snapshot_bom_endpoint() {
        let (status, body) = get(&format!("/snapshots/{}/bom", DEMO_SNAPSHOT_ID)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_quantity"], 34);

        let rows = body["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0]["type_id"], "CK-72");
        assert_eq!(rows[0]["manufacturer"], "-");
        assert_eq!(rows[5]["role"], "component");
        assert_eq!(rows[5]["parents"], json!(["Wall Bay"]));

        let (_, body) = get(&format!("/snapshots/{}/bom", EMPTY_SNAPSHOT_ID)).await;
        assert_eq!(body["rows"], json!([]));
        assert_eq!(body["total_quantity"], 0);

        let (status, _) = get("/snapshots/77/bom").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_snapshot_merchandising_endpoint() {
        let (status, body) =
            get(&format!("/snapshots/{}/merchandising?top_n=5", DEMO_SNAPSHOT_ID)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["top_n"], 5);
        assert_eq!(body["rows"].as_array().unwrap().len(), 6);
        assert_eq!(body["rows"][5]["label"], "Other Merchandising");
        assert_eq!(body["total_display"], "22.0");

        // Default cutoff of 10 covers all six categories
        let (_, body) = get(&format!("/snapshots/{}/merchandising", DEMO_SNAPSHOT_ID)).await;
        assert_eq!(body["top_n"], 10);
        assert_eq!(body["rows"].as_array().unwrap().len(), 6);
        assert_eq!(body["rows"][5]["label"], "Seasonal");

        let (status, _) =
            get(&format!("/snapshots/{}/merchandising?top_n=7", DEMO_SNAPSHOT_ID)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = get(&format!("/snapshots/{}/merchandising", EMPTY_SNAPSHOT_ID)).await;
        assert_eq!(body["rows"], json!([]));
        assert_eq!(body["total_display"], "0.0");
    }

    #[tokio::test]
    async fn test_instance_list_filters() {
        let (_, body) = get("/snapshots/1/instances?merch_category=Lighting").await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["results"][0]["id"], 102);
        assert_eq!(body["results"][0]["asset_details"]["type_id"], "WB-48");

        let (_, body) = get("/snapshots/1/instances?location=Aisle%201").await;
        assert_eq!(body["count"], 2);
    }

    #[tokio::test]
    async fn test_posting_an_instance_updates_the_bom() {
        let app = app().await;

        let (status, _) = send(
            app.clone(),
            post(
                &format!("/snapshots/{}/instances", EMPTY_SNAPSHOT_ID),
                json!({
                    "id": 500,
                    "asset": 10,
                    "location": "Aisle 4",
                    "custom_fields": {"merch_category": "Shelving"},
                    "optional_components": [{"component": 102, "quantity": 2}]
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let request = Request::builder()
            .uri(format!("/snapshots/{}/bom", EMPTY_SNAPSHOT_ID))
            .body(Body::empty())
            .unwrap();
        let (_, body) = send(app, request).await;
        let quantities: Vec<(String, u64)> = body["rows"]
            .as_array()
            .unwrap()
            .iter()
            .map(|row| {
                (
                    row["type_id"].as_str().unwrap().to_string(),
                    row["quantity"].as_u64().unwrap(),
                )
            })
            .collect();
        assert_eq!(
            quantities,
            vec![
                ("WB-48".to_string(), 1),
                ("BD-48".to_string(), 1),
                ("PH-6".to_string(), 2),
                ("SH-48".to_string(), 4),
            ]
        );
    }

    #[tokio::test]
    async fn test_snapshot_requires_known_project() {
        let (status, body) = send(
            app().await,
            post(
                "/snapshots",
                json!({"id": 9, "project": 42, "name": "Orphan"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Project 42 not found");
    }

    #[tokio::test]
    async fn test_project_snapshots() {
        let (_, body) = get("/projects/1/snapshots?ordering=-taken_at").await;
        assert_eq!(body["count"], 2);
        assert_eq!(body["results"][0]["name"], "Punch list");

        let (status, _) = get("/projects/5/snapshots").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
