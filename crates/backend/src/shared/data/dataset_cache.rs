use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use crate::usecases::u501_load_sales_dataset::{
    load_sales_dataset, DataLoadError, DataSources, LoadedDataset,
};

/// Identity of a source file on disk: a rewritten file gets a new identity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceIdentity {
    pub path: PathBuf,
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl SourceIdentity {
    pub fn of(path: &Path) -> Result<Self, DataLoadError> {
        let metadata = std::fs::metadata(path).map_err(|source| DataLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf()),
            len: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub sales: SourceIdentity,
    pub products: SourceIdentity,
}

impl CacheKey {
    pub fn for_sources(sources: &DataSources) -> Result<Self, DataLoadError> {
        Ok(Self {
            sales: SourceIdentity::of(&sources.sales_path)?,
            products: SourceIdentity::of(&sources.products_path)?,
        })
    }

    fn same_paths(&self, other: &CacheKey) -> bool {
        self.sales.path == other.sales.path && self.products.path == other.products.path
    }
}

/// Memoized dataset loads keyed by source file identity.
///
/// Entries live until the files change on disk or `invalidate`/`clear` is called.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: RwLock<HashMap<CacheKey, Arc<LoadedDataset>>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(&self, sources: &DataSources) -> Result<Arc<LoadedDataset>, DataLoadError> {
        self.get_or_load_with(sources, load_sales_dataset)
    }

    /// Return the cached dataset for unchanged sources, otherwise run `loader`
    pub fn get_or_load_with<F>(
        &self,
        sources: &DataSources,
        loader: F,
    ) -> Result<Arc<LoadedDataset>, DataLoadError>
    where
        F: FnOnce(&DataSources) -> Result<LoadedDataset, DataLoadError>,
    {
        let key = CacheKey::for_sources(sources)?;

        if let Some(dataset) = self.read_entries().get(&key) {
            tracing::debug!("Dataset cache hit: {}", key.sales.path.display());
            return Ok(Arc::clone(dataset));
        }

        tracing::info!("Dataset cache miss: {}", key.sales.path.display());
        let dataset = Arc::new(loader(sources)?);

        let mut entries = self.write_entries();
        // older versions of the same files are stale now
        entries.retain(|k, _| !k.same_paths(&key));
        entries.insert(key, Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Drop every entry loaded from these source paths. Returns true if something was removed.
    pub fn invalidate(&self, sources: &DataSources) -> bool {
        let canonical = |p: &Path| std::fs::canonicalize(p).unwrap_or_else(|_| p.to_path_buf());
        let sales = canonical(&sources.sales_path);
        let products = canonical(&sources.products_path);

        let mut entries = self.write_entries();
        let before = entries.len();
        entries.retain(|k, _| !(k.sales.path == sales && k.products.path == products));
        let removed = before != entries.len();
        if removed {
            tracing::info!("Dataset cache invalidated: {}", sales.display());
        }
        removed
    }

    pub fn clear(&self) {
        self.write_entries().clear();
    }

    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_entries(
        &self,
    ) -> std::sync::RwLockReadGuard<'_, HashMap<CacheKey, Arc<LoadedDataset>>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_entries(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, HashMap<CacheKey, Arc<LoadedDataset>>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }
}
