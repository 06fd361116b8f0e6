use once_cell::sync::{Lazy, OnceCell};
use std::sync::Arc;

use super::dataset_cache::DatasetCache;
use crate::shared::config::DashboardConfig;
use crate::usecases::u501_load_sales_dataset::{DataLoadError, DataSources, LoadedDataset};

static DATASET_STORE: Lazy<DatasetStore> = Lazy::new(DatasetStore::new);

#[derive(Debug, thiserror::Error)]
pub enum DatasetAccessError {
    #[error("Dataset is not initialized")]
    NotInitialized,

    #[error(transparent)]
    Load(#[from] DataLoadError),

    #[error("Dataset load task failed: {0}")]
    Task(String),
}

/// Configured sources, dashboard settings and the memoized dataset
#[derive(Debug, Default)]
pub struct DatasetStore {
    cache: Arc<DatasetCache>,
    sources: OnceCell<DataSources>,
    dashboard: OnceCell<DashboardConfig>,
}

impl DatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sources and settings are fixed by the first call; later calls only reload
    pub fn initialize(
        &self,
        sources: DataSources,
        dashboard: DashboardConfig,
    ) -> Result<Arc<LoadedDataset>, DataLoadError> {
        if self.dashboard.set(dashboard).is_err() {
            tracing::warn!("Dashboard config already set, new settings ignored");
        }
        if let Some(current) = self.sources.get().filter(|current| **current != sources) {
            tracing::warn!(
                "Data sources already set to {}, ignoring {}",
                current.sales_path.display(),
                sources.sales_path.display()
            );
        }
        let sources = self.sources.get_or_init(|| sources);
        self.cache.get_or_load(sources)
    }

    pub fn dashboard_config(&self) -> DashboardConfig {
        self.dashboard.get().cloned().unwrap_or_default()
    }

    /// Current dataset; re-reads the files only if they changed on disk
    pub async fn get(&self) -> Result<Arc<LoadedDataset>, DatasetAccessError> {
        let sources = self
            .sources
            .get()
            .cloned()
            .ok_or(DatasetAccessError::NotInitialized)?;
        let cache = Arc::clone(&self.cache);
        tokio::task::spawn_blocking(move || cache.get_or_load(&sources))
            .await
            .map_err(|e| DatasetAccessError::Task(e.to_string()))?
            .map_err(DatasetAccessError::from)
    }

    /// Manual invalidation followed by a fresh load
    pub async fn reload(&self) -> Result<Arc<LoadedDataset>, DatasetAccessError> {
        let sources = self.sources.get().ok_or(DatasetAccessError::NotInitialized)?;
        self.cache.invalidate(sources);
        self.get().await
    }
}

/// Load the dataset once at startup. A `DataLoadError` here is fatal for the caller.
pub fn initialize_dataset(
    sources: DataSources,
    dashboard: DashboardConfig,
) -> Result<Arc<LoadedDataset>, DataLoadError> {
    DATASET_STORE.initialize(sources, dashboard)
}

pub fn dashboard_config() -> DashboardConfig {
    DATASET_STORE.dashboard_config()
}

pub async fn get_dataset() -> Result<Arc<LoadedDataset>, DatasetAccessError> {
    DATASET_STORE.get().await
}

pub async fn reload_dataset() -> Result<Arc<LoadedDataset>, DatasetAccessError> {
    DATASET_STORE.reload().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::u501_load_sales_dataset::test_support::write_sources;

    const SALES: &str = "dt_compra,id_pedido,id_produto,vl_total_item\n\
        2024-01-05 10:00:00,o1,p1,100\n\
        2024-02-10 12:30:00,o2,p2,200\n";

    const PRODUCTS: &str = "id_produto,desc_categoria_pt\np1,beleza_saude\np2,automotivo\n";

    #[tokio::test]
    async fn test_get_before_initialize() {
        let store = DatasetStore::new();
        assert!(matches!(
            store.get().await,
            Err(DatasetAccessError::NotInitialized)
        ));
        assert!(matches!(
            store.reload().await,
            Err(DatasetAccessError::NotInitialized)
        ));
        assert_eq!(store.dashboard_config().top_categories, 10);
    }

    #[tokio::test]
    async fn test_get_and_reload() {
        let store = DatasetStore::new();
        let sources = write_sources(SALES, PRODUCTS);
        let config = DashboardConfig {
            top_categories: 5,
            ..Default::default()
        };

        let loaded = store.initialize(sources.clone(), config).unwrap();
        assert_eq!(loaded.table.len(), 2);

        let cached = store.get().await.unwrap();
        assert!(Arc::ptr_eq(&loaded, &cached));

        let reloaded = store.reload().await.unwrap();
        assert!(!Arc::ptr_eq(&loaded, &reloaded));
        assert_eq!(reloaded.fingerprint, loaded.fingerprint);
    }

    #[tokio::test]
    async fn test_second_initialize_keeps_first_config() {
        let store = DatasetStore::new();
        let sources = write_sources(SALES, PRODUCTS);
        let first = DashboardConfig {
            top_categories: 5,
            ..Default::default()
        };
        let second = DashboardConfig {
            top_categories: 7,
            ..Default::default()
        };

        store.initialize(sources.clone(), first).unwrap();
        store.initialize(sources, second).unwrap();
        assert_eq!(store.dashboard_config().top_categories, 5);
    }
}
