use serde::{Deserialize, Serialize};

use crate::logic::ViewAllLinkPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub relation_card: RelationCardConfig,
    /// Populate the in-memory store with demo companies and people
    pub load_seed_data: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationCardConfig {
    /// Related records rendered per relation field
    pub max_displayed_records: usize,
    /// Maximum candidates returned by one picker search
    pub search_limit: usize,
    /// Field candidates are ordered by
    pub search_order_by: String,
    pub view_all_link: ViewAllLinkPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            relation_card: RelationCardConfig::default(),
            load_seed_data: true,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

impl Default for RelationCardConfig {
    fn default() -> Self {
        Self {
            max_displayed_records: 5,
            search_limit: 60,
            search_order_by: "createdAt".to_string(),
            view_all_link: ViewAllLinkPolicy::ToOneOnly,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and config file
    pub fn load() -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        // Add default configuration
        config = config.add_source(config::Config::try_from(&AppConfig::default())?);

        // Add config file if it exists
        config = config.add_source(config::File::with_name("config").required(false));

        // Environment variables with prefix "RELCARD_", e.g. RELCARD_SERVER__PORT
        config = config.add_source(
            config::Environment::with_prefix("RELCARD")
                .separator("__")
                .prefix_separator("_"),
        );

        let config = config.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        Ok(app_config)
    }

    /// Get the server bind address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
