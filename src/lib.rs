pub mod api;
pub mod config;
pub mod logic;
pub mod model;
pub mod seed;
pub mod store;

// Export API types
pub use api::handlers;
pub use api::routes;

// Export logic types
pub use logic::{
    build_catalog, AssetCatalog, BomAggregator, CatalogQuery, Expander, ListQuery,
    MerchandisingAllocator, QueryError,
};

// Export all model types
pub use model::*;

// Export seed module
pub use seed::*;

// Export store types
pub use store::{InMemoryStore, PostgresStore, Store};

use axum::Router;
use log::info;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::AppConfig;

/// Build the full application for `store`, including the static client when configured
pub fn build_app<S: Store + 'static>(store: Arc<S>, config: &AppConfig) -> Router {
    let router = routes::create_router::<S>(config.catalog.clone());
    routes::with_static_client(router, config.server.static_dir.as_deref()).with_state(store)
}

/// Serve the API on an already bound listener until the server stops
pub async fn serve<S: Store + 'static>(
    store: Arc<S>,
    listener: TcpListener,
    config: &AppConfig,
) -> anyhow::Result<()> {
    if let Ok(address) = listener.local_addr() {
        info!("Asset catalog server running on http://{}", address);
    }

    axum::serve(listener, build_app(store, config)).await?;

    Ok(())
}
