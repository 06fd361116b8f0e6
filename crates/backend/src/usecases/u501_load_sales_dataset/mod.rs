pub mod error;
pub mod reader;

use chrono::{DateTime, Utc};
use contracts::dashboards::d400_sales_overview::DatasetInfo;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::projections::p900_enriched_sales::{EnrichedSale, SalesTable};
pub use error::{DataLoadError, SchemaError};
use reader::{ProductSource, SalesSource, COL_PRODUCT_ID, PRODUCTS_TABLE, SALES_TABLE};

/// Пути к исходным файлам
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataSources {
    /// Compressed sales fact table (`.zip` with a CSV inside, or a plain CSV)
    pub sales_path: PathBuf,
    /// Product dimension CSV
    pub products_path: PathBuf,
}

impl DataSources {
    pub fn new(sales_path: impl Into<PathBuf>, products_path: impl Into<PathBuf>) -> Self {
        Self {
            sales_path: sales_path.into(),
            products_path: products_path.into(),
        }
    }
}

/// Sales table joined with categories plus load diagnostics
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub table: SalesTable,
    /// Set when the join was skipped
    pub schema_error: Option<SchemaError>,
    /// SHA-256 over both source files
    pub fingerprint: String,
    pub unmatched_products: usize,
    pub duplicate_products: usize,
    pub loaded_at: DateTime<Utc>,
}

impl LoadedDataset {
    pub fn warnings(&self) -> Vec<String> {
        self.schema_error.iter().map(ToString::to_string).collect()
    }

    pub fn info(&self) -> DatasetInfo {
        DatasetInfo {
            fingerprint: self.fingerprint.clone(),
            row_count: self.table.len(),
            loaded_at: self.loaded_at,
            categories_available: self.table.has_categories(),
            sentiment_available: self.table.has_sentiment(),
            unmatched_products: self.unmatched_products,
            warnings: self.warnings(),
        }
    }
}

/// Load both sources and left-join sales with products on `id_produto`.
///
/// A missing join key is not fatal: the sales rows are returned without
/// categories and the problem is reported in `schema_error`.
pub fn load_sales_dataset(sources: &DataSources) -> Result<LoadedDataset, DataLoadError> {
    let started = std::time::Instant::now();
    tracing::info!(
        "Loading sales dataset: sales={}, products={}",
        sources.sales_path.display(),
        sources.products_path.display()
    );

    let sales_raw = read_file(&sources.sales_path)?;
    let products_raw = read_file(&sources.products_path)?;

    let mut hasher = Sha256::new();
    hasher.update(&sales_raw);
    hasher.update(&products_raw);
    let fingerprint = format!("{:x}", hasher.finalize());

    let sales_csv = reader::read_sales_bytes(&sources.sales_path, &sales_raw)?;
    let sales = reader::parse_sales_csv(&sales_csv)?;
    let products = reader::parse_products_csv(&products_raw)?;

    let dataset = join_sales_with_products(sales, products, fingerprint);

    if let Some(err) = &dataset.schema_error {
        tracing::warn!("{}", err);
    }
    if dataset.duplicate_products > 0 {
        tracing::warn!(
            "Product dimension has {} duplicate ids, first occurrence kept",
            dataset.duplicate_products
        );
    }
    tracing::info!(
        "Sales dataset loaded: {} rows, {} without category match, fingerprint {} ({} ms)",
        dataset.table.len(),
        dataset.unmatched_products,
        &dataset.fingerprint[..12.min(dataset.fingerprint.len())],
        started.elapsed().as_millis()
    );

    Ok(dataset)
}

/// Left join: every sale yields exactly one row
pub fn join_sales_with_products(
    sales: SalesSource,
    products: ProductSource,
    fingerprint: String,
) -> LoadedDataset {
    let schema_error = if !sales.has_product_id {
        Some(SchemaError::MissingJoinKey {
            table: SALES_TABLE,
            column: COL_PRODUCT_ID,
        })
    } else if products.categories.is_none() {
        Some(SchemaError::MissingJoinKey {
            table: PRODUCTS_TABLE,
            column: COL_PRODUCT_ID,
        })
    } else {
        None
    };

    let lookup = products.categories.filter(|_| schema_error.is_none());
    let mut unmatched = 0usize;

    let rows: Vec<EnrichedSale> = sales
        .records
        .into_iter()
        .map(|record| {
            let category_name = match (&lookup, &record.product_id) {
                (Some(lookup), Some(product_id)) => match lookup.get(product_id) {
                    Some(category) => category.clone(),
                    None => {
                        unmatched += 1;
                        None
                    }
                },
                _ => None,
            };
            EnrichedSale {
                purchase_timestamp: record.purchase_timestamp,
                order_id: record.order_id,
                product_id: record.product_id,
                item_value: record.item_value,
                ai_sentiment: record.ai_sentiment,
                category_name,
            }
        })
        .collect();

    LoadedDataset {
        table: SalesTable::new(rows, lookup.is_some(), sales.has_sentiment),
        schema_error,
        fingerprint,
        unmatched_products: unmatched,
        duplicate_products: products.duplicates,
        loaded_at: Utc::now(),
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, DataLoadError> {
    std::fs::read(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}


#[cfg(test)]
mod tests {
    use super::test_support::write_sources;
    use super::*;

    const SALES: &str = "dt_compra,id_pedido,id_produto,vl_total_item,sentimento_ia\n\
        2024-01-05 10:00:00,o1,p1,100,Positivo\n\
        2024-01-05 10:00:00,o1,p2,50,Negativo\n\
        2024-02-10 12:30:00,o2,p3,200,\n\
        2024-02-11 08:00:00,o3,p1,25,Neutro\n";

    const PRODUCTS: &str = "id_produto,desc_categoria_pt\np1,beleza_saude\np2,\n";

    #[test]
    fn test_load_preserves_row_count() {
        let sources = write_sources(SALES, PRODUCTS);
        let dataset = load_sales_dataset(&sources).unwrap();

        assert_eq!(dataset.table.len(), 4);
        assert!(dataset.schema_error.is_none());
        assert!(dataset.table.has_categories());
        assert!(dataset.table.has_sentiment());
        // p3 has no dimension row
        assert_eq!(dataset.unmatched_products, 1);
        assert_eq!(dataset.fingerprint.len(), 64);

        let categories: Vec<Option<&str>> = dataset
            .table
            .rows()
            .iter()
            .map(|r| r.category_name.as_deref())
            .collect();
        assert_eq!(
            categories,
            vec![Some("beleza_saude"), None, None, Some("beleza_saude")]
        );
    }

    #[test]
    fn test_missing_join_key_returns_unjoined_sales() {
        let sales = "dt_compra,id_pedido,vl_total_item\n2024-01-05,o1,100\n2024-01-06,o2,10\n";
        let sources = write_sources(sales, PRODUCTS);
        let dataset = load_sales_dataset(&sources).unwrap();

        assert_eq!(dataset.table.len(), 2);
        assert_eq!(
            dataset.schema_error,
            Some(SchemaError::MissingJoinKey {
                table: "sales",
                column: "id_produto"
            })
        );
        assert!(!dataset.table.has_categories());
        assert!(dataset.table.rows().iter().all(|r| r.category_name.is_none()));
        assert_eq!(dataset.warnings().len(), 1);
        assert_eq!(dataset.info().row_count, 2);
    }

    #[test]
    fn test_products_without_key() {
        let sources = write_sources(SALES, "sku,desc_categoria_pt\np1,beleza_saude\n");
        let dataset = load_sales_dataset(&sources).unwrap();

        assert_eq!(dataset.table.len(), 4);
        assert!(matches!(
            dataset.schema_error,
            Some(SchemaError::MissingJoinKey {
                table: "products",
                ..
            })
        ));
        assert_eq!(dataset.unmatched_products, 0);
    }

    #[test]
    fn test_blank_timestamp_row_is_kept() {
        let sales = "dt_compra,id_pedido,id_produto,vl_total_item\n\
            2024-01-05,o1,p1,100\n\
            ,o2,p1,100\n";
        let sources = write_sources(sales, PRODUCTS);
        let dataset = load_sales_dataset(&sources).unwrap();

        assert_eq!(dataset.table.len(), 2);
        assert_eq!(dataset.table.undated_count(), 1);
        assert_eq!(
            dataset.table.rows()[1].category_name.as_deref(),
            Some("beleza_saude")
        );
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let sources = DataSources::new(
            "/nonexistent/fct_vendas.zip",
            "/nonexistent/dim_produtos.csv",
        );
        let err = load_sales_dataset(&sources).unwrap_err();
        assert!(matches!(err, DataLoadError::Io { .. }));
        assert!(err.to_string().contains("fct_vendas.zip"));
    }

    #[test]
    fn test_duplicate_products_do_not_multiply_rows() {
        let products = "id_produto,desc_categoria_pt\np1,beleza_saude\np1,esporte_lazer\n";
        let sources = write_sources(SALES, products);
        let dataset = load_sales_dataset(&sources).unwrap();

        assert_eq!(dataset.table.len(), 4);
        assert_eq!(dataset.duplicate_products, 1);
        assert_eq!(
            dataset.table.rows()[0].category_name.as_deref(),
            Some("beleza_saude")
        );
    }
}
