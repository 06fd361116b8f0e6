use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::usecases::u501_load_sales_dataset::DataSources;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub data: DataConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    pub sales_path: String,
    pub products_path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Built presentation layer served as fallback, if the directory exists
    #[serde(default)]
    pub static_dir: Option<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DashboardConfig {
    /// Size of the top categories chart
    #[serde(default = "default_top_categories")]
    pub top_categories: usize,
    /// How many categories are pre-selected in the filter panel
    #[serde(default = "default_category_count")]
    pub default_category_count: usize,
    #[serde(default = "default_currency_prefix")]
    pub currency_prefix: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_top_categories() -> usize {
    10
}

fn default_category_count() -> usize {
    3
}

fn default_currency_prefix() -> String {
    "R$".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            top_categories: default_top_categories(),
            default_category_count: default_category_count(),
            currency_prefix: default_currency_prefix(),
        }
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[data]
sales_path = "data/fct_vendas.zip"
products_path = "data/dim_produtos.csv"

[server]
host = "0.0.0.0"
port = 3000
static_dir = "dist"

[dashboard]
top_categories = 10
default_category_count = 3
currency_prefix = "R$"
"#;

/// Environment variable with an explicit config file path
pub const CONFIG_ENV: &str = "DASHBOARD_CONFIG";

/// Load configuration
///
/// Search order:
/// 1. `DASHBOARD_CONFIG` environment variable
/// 2. config.toml next to the executable (for production)
/// 3. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(explicit) = std::env::var(CONFIG_ENV) {
        let config_path = PathBuf::from(explicit);
        tracing::info!("Loading config from {}: {}", CONFIG_ENV, config_path.display());
        let contents = std::fs::read_to_string(&config_path)?;
        return Ok(toml::from_str(&contents)?);
    }

    if let Some(exe_dir) = exe_dir() {
        let config_path = exe_dir.join("config.toml");

        if config_path.exists() {
            tracing::info!("Loading config from: {}", config_path.display());
            let contents = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&contents)?;
            return Ok(config);
        } else {
            tracing::warn!("config.toml not found at: {}", config_path.display());
        }
    }

    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

/// Source file paths from configuration
pub fn get_data_sources(config: &Config) -> DataSources {
    DataSources::new(
        resolve_path(&config.data.sales_path),
        resolve_path(&config.data.products_path),
    )
}

/// Resolve a configured path.
///
/// Absolute paths are used as is. Relative paths are tried next to the
/// executable first, then relative to the current directory.
pub fn resolve_path(path_str: &str) -> PathBuf {
    let path = Path::new(path_str);

    if path.is_absolute() {
        return path.to_path_buf();
    }

    if let Some(exe_dir) = exe_dir() {
        let candidate = exe_dir.join(path);
        if candidate.exists() {
            return candidate;
        }
    }

    PathBuf::from(path_str)
}

fn exe_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
}
