use asset_catalog_rust::config::AppConfig;
use asset_catalog_rust::seed;
use asset_catalog_rust::store::{InMemoryStore, PostgresStore, Store};
use log::{info, warn};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    use env_logger::Builder;
    use log::LevelFilter;

    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("sqlx", LevelFilter::Warn)
        .parse_default_env()
        .init();

    let config = AppConfig::load()?;
    info!(
        "Configuration loaded: server={}:{}",
        config.server.host, config.server.port
    );

    match config.database_url() {
        Some(database_url) => {
            info!("Connecting to PostgreSQL...");
            let max_connections = config.database.max_connections.unwrap_or(10);
            let postgres_store = PostgresStore::new(&database_url, max_connections).await?;

            info!("Running database migrations...");
            postgres_store.migrate().await?;

            run_server(Arc::new(postgres_store), &config).await
        }
        None => {
            warn!("No database configured, keeping the catalog in memory");
            run_server(Arc::new(InMemoryStore::new()), &config).await
        }
    }
}

async fn run_server<S: Store + 'static>(store: Arc<S>, config: &AppConfig) -> anyhow::Result<()> {
    // Load seed data for demonstration (optional)
    if std::env::var("LOAD_SEED_DATA").unwrap_or_default() == "true" {
        info!("Loading seed data...");
        seed::load_seed_data(&*store).await?;
    }

    let listener = TcpListener::bind(config.server_address()).await?;
    asset_catalog_rust::serve(store, listener, config).await
}
