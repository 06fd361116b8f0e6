use chrono::{NaiveDate, NaiveDateTime};
use contracts::enums::sentiment::Sentiment;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::Path;

use super::error::DataLoadError;

pub const SALES_TABLE: &str = "sales";
pub const PRODUCTS_TABLE: &str = "products";

pub const COL_PURCHASE_TIMESTAMP: &str = "dt_compra";
pub const COL_ORDER_ID: &str = "id_pedido";
pub const COL_PRODUCT_ID: &str = "id_produto";
pub const COL_ITEM_VALUE: &str = "vl_total_item";
pub const COL_SENTIMENT: &str = "sentimento_ia";
pub const COL_CATEGORY: &str = "desc_categoria_pt";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Строка факта продаж (позиция заказа)
#[derive(Debug, Clone, PartialEq)]
pub struct SaleRecord {
    /// None for a blank cell
    pub purchase_timestamp: Option<NaiveDateTime>,
    pub order_id: String,
    pub product_id: Option<String>,
    pub item_value: f64,
    pub ai_sentiment: Option<Sentiment>,
}

#[derive(Debug, Clone)]
pub struct SalesSource {
    pub records: Vec<SaleRecord>,
    pub has_product_id: bool,
    pub has_sentiment: bool,
}

#[derive(Debug, Clone)]
pub struct ProductSource {
    /// product_id -> category, None when the table has no product column
    pub categories: Option<HashMap<String, Option<String>>>,
    /// Repeated product ids (first row wins)
    pub duplicates: usize,
}

/// Read the sales source. `.zip` files are unpacked, anything else is read as CSV.
pub fn read_sales_bytes(path: &Path, raw: &[u8]) -> Result<Vec<u8>, DataLoadError> {
    let is_zip = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("zip"));

    if is_zip {
        extract_csv(path, raw)
    } else {
        Ok(raw.to_vec())
    }
}

/// First `.csv` entry of the archive (first file entry as a fallback)
pub fn extract_csv(path: &Path, raw: &[u8]) -> Result<Vec<u8>, DataLoadError> {
    let archive_err = |source: zip::result::ZipError| DataLoadError::Archive {
        path: path.to_path_buf(),
        source,
    };

    let mut archive = zip::ZipArchive::new(Cursor::new(raw)).map_err(archive_err)?;

    let mut csv_index = None;
    let mut first_file = None;
    for i in 0..archive.len() {
        let entry = archive.by_index(i).map_err(archive_err)?;
        if entry.is_dir() {
            continue;
        }
        if first_file.is_none() {
            first_file = Some(i);
        }
        if entry.name().to_ascii_lowercase().ends_with(".csv") {
            csv_index = Some(i);
            break;
        }
    }

    let index = csv_index.or(first_file).ok_or_else(|| DataLoadError::NoCsvInArchive {
        path: path.to_path_buf(),
    })?;

    let mut entry = archive.by_index(index).map_err(archive_err)?;
    tracing::info!("Reading '{}' from archive {}", entry.name(), path.display());

    let mut buf = Vec::new();
    entry
        .read_to_end(&mut buf)
        .map_err(|source| DataLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(buf)
}

/// Parse the sales CSV (`dt_compra`, `id_pedido`, `vl_total_item` are required)
pub fn parse_sales_csv(bytes: &[u8]) -> Result<SalesSource, DataLoadError> {
    let mut reader = csv_reader(bytes);
    let columns = ColumnIndex::from_reader(&mut reader, SALES_TABLE)?;

    let ts_idx = columns.require(COL_PURCHASE_TIMESTAMP)?;
    let order_idx = columns.require(COL_ORDER_ID)?;
    let value_idx = columns.require(COL_ITEM_VALUE)?;
    let product_idx = columns.find(COL_PRODUCT_ID);
    let sentiment_idx = columns.find(COL_SENTIMENT);

    let mut records = Vec::new();
    let mut undated = 0usize;
    for result in reader.records() {
        let record = result.map_err(|source| DataLoadError::Csv {
            table: SALES_TABLE,
            source,
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let field = |i: usize| record.get(i).map(str::trim).unwrap_or("");

        // blank timestamp keeps the row, garbage fails the load
        let raw_ts = field(ts_idx);
        let purchase_timestamp = if raw_ts.is_empty() {
            undated += 1;
            None
        } else {
            Some(
                parse_timestamp(raw_ts).ok_or_else(|| DataLoadError::InvalidValue {
                    table: SALES_TABLE,
                    column: COL_PURCHASE_TIMESTAMP,
                    line,
                    value: raw_ts.to_string(),
                })?,
            )
        };

        let raw_value = field(value_idx);
        let item_value = if raw_value.is_empty() {
            0.0
        } else {
            parse_decimal(raw_value).ok_or_else(|| DataLoadError::InvalidValue {
                table: SALES_TABLE,
                column: COL_ITEM_VALUE,
                line,
                value: raw_value.to_string(),
            })?
        };

        records.push(SaleRecord {
            purchase_timestamp,
            order_id: field(order_idx).to_string(),
            product_id: product_idx.map(|i| field(i).to_string()),
            item_value,
            ai_sentiment: sentiment_idx.and_then(|i| Sentiment::from_label(field(i))),
        });
    }

    if undated > 0 {
        tracing::warn!(
            "{} sales rows have no {}, they are kept but excluded from date filters",
            undated,
            COL_PURCHASE_TIMESTAMP
        );
    }

    Ok(SalesSource {
        records,
        has_product_id: product_idx.is_some(),
        has_sentiment: sentiment_idx.is_some(),
    })
}

/// Parse the product dimension CSV (`id_produto`, `desc_categoria_pt`)
pub fn parse_products_csv(bytes: &[u8]) -> Result<ProductSource, DataLoadError> {
    let mut reader = csv_reader(bytes);
    let columns = ColumnIndex::from_reader(&mut reader, PRODUCTS_TABLE)?;

    let Some(product_idx) = columns.find(COL_PRODUCT_ID) else {
        return Ok(ProductSource {
            categories: None,
            duplicates: 0,
        });
    };
    let category_idx = columns.require(COL_CATEGORY)?;

    let mut categories = HashMap::new();
    let mut duplicates = 0usize;
    for result in reader.records() {
        let record = result.map_err(|source| DataLoadError::Csv {
            table: PRODUCTS_TABLE,
            source,
        })?;
        let field = |i: usize| record.get(i).map(str::trim).unwrap_or("");

        let product_id = field(product_idx).to_string();
        let category = Some(field(category_idx))
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        if categories.contains_key(&product_id) {
            duplicates += 1;
            continue;
        }
        categories.insert(product_id, category);
    }

    Ok(ProductSource {
        categories: Some(categories),
        duplicates,
    })
}

fn csv_reader(bytes: &[u8]) -> csv::Reader<&[u8]> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes)
}

/// Header lookup by name (case-insensitive, trimmed)
struct ColumnIndex {
    table: &'static str,
    names: Vec<String>,
}

impl ColumnIndex {
    fn from_reader<R: Read>(
        reader: &mut csv::Reader<R>,
        table: &'static str,
    ) -> Result<Self, DataLoadError> {
        let headers = reader
            .headers()
            .map_err(|source| DataLoadError::Csv { table, source })?;
        let names: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
        tracing::debug!("{} CSV headers: {:?}", table, names);
        Ok(Self { table, names })
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|h| h.eq_ignore_ascii_case(name))
    }

    fn require(&self, name: &'static str) -> Result<usize, DataLoadError> {
        self.find(name).ok_or(DataLoadError::MissingColumn {
            table: self.table,
            column: name,
        })
    }
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 5] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parse decimal number that may use comma as decimal separator
fn parse_decimal(s: &str) -> Option<f64> {
    s.replace(',', ".").parse::<f64>().ok().filter(|v| v.is_finite())
}
