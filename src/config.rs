use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding the built single-page client, served for unmatched paths
    pub static_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub connection_string: Option<String>,
    pub max_connections: Option<u32>,
}

/// Limits and choices for list and analytics endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub default_page_size: usize,
    pub max_page_size: usize,
    pub top_n_choices: Vec<usize>,
    pub default_top_n: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            static_dir: None,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            connection_string: None,
            max_connections: Some(20),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_page_size: 25,
            max_page_size: 100,
            top_n_choices: vec![5, 10, 25],
            default_top_n: 10,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, an optional config file and environment variables
    pub fn load() -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        config = config.add_source(config::Config::try_from(&AppConfig::default())?);

        config = config.add_source(config::File::with_name("config").required(false));

        // CATALOG_SERVER__PORT=8080, CATALOG_CATALOG__DEFAULT_TOP_N=25
        config = config.add_source(
            config::Environment::with_prefix("CATALOG")
                .separator("__")
                .prefix_separator("_"),
        );

        let config = config.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        Ok(app_config)
    }

    /// Database URL from config or `DATABASE_URL`; `None` means run in memory
    pub fn database_url(&self) -> Option<String> {
        if let Some(connection_string) = self
            .database
            .connection_string
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
        {
            return Some(connection_string.to_string());
        }

        std::env::var("DATABASE_URL").ok().filter(|url| !url.is_empty())
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
