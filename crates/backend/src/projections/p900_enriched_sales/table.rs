use chrono::{NaiveDate, NaiveDateTime};
use contracts::dashboards::d400_sales_overview::SaleRow;
use contracts::enums::sentiment::Sentiment;
use std::collections::{BTreeSet, HashSet};

/// Line-item of an order joined with its product category
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedSale {
    /// None for a blank `dt_compra` cell
    pub purchase_timestamp: Option<NaiveDateTime>,
    pub order_id: String,
    /// None when the sales source has no product column
    pub product_id: Option<String>,
    pub item_value: f64,
    pub ai_sentiment: Option<Sentiment>,
    /// None for products without a dimension row (or without a category)
    pub category_name: Option<String>,
}

impl EnrichedSale {
    pub fn purchase_date(&self) -> Option<NaiveDate> {
        self.purchase_timestamp.map(|ts| ts.date())
    }

    pub fn to_row(&self) -> SaleRow {
        SaleRow {
            purchase_timestamp: self.purchase_timestamp,
            order_id: self.order_id.clone(),
            product_id: self.product_id.clone(),
            item_value: self.item_value,
            ai_sentiment: self.ai_sentiment,
            category_name: self.category_name.clone(),
        }
    }
}

/// Read-only base table built once at load time
#[derive(Debug, Clone)]
pub struct SalesTable {
    rows: Vec<EnrichedSale>,
    has_categories: bool,
    has_sentiment: bool,
}

impl SalesTable {
    pub fn new(rows: Vec<EnrichedSale>, has_categories: bool, has_sentiment: bool) -> Self {
        Self {
            rows,
            has_categories,
            has_sentiment,
        }
    }

    pub fn rows(&self) -> &[EnrichedSale] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// False when the product dimension could not be joined
    pub fn has_categories(&self) -> bool {
        self.has_categories
    }

    /// False when the sales source has no sentiment column
    pub fn has_sentiment(&self) -> bool {
        self.has_sentiment
    }

    /// View over every row, in load order
    pub fn view(&self) -> SalesView<'_> {
        SalesView {
            table: self,
            rows: self.rows.iter().collect(),
        }
    }

    /// Rows without a purchase timestamp
    pub fn undated_count(&self) -> usize {
        self.rows.iter().filter(|r| r.purchase_timestamp.is_none()).count()
    }

    /// (min, max) purchase date over dated rows, None when there are none
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        date_bounds(self.rows.iter())
    }

    /// Distinct non-empty categories in order of first appearance
    pub fn categories_by_appearance(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .filter_map(|r| r.category_name.as_deref())
            .filter(|c| seen.insert(*c))
            .map(str::to_string)
            .collect()
    }

    /// Distinct non-empty categories, sorted
    pub fn categories(&self) -> Vec<String> {
        self.rows
            .iter()
            .filter_map(|r| r.category_name.as_deref())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

/// Filtered subset of a `SalesTable`. Never owns or mutates the rows.
#[derive(Debug, Clone)]
pub struct SalesView<'a> {
    table: &'a SalesTable,
    rows: Vec<&'a EnrichedSale>,
}

impl<'a> SalesView<'a> {
    pub(crate) fn new(table: &'a SalesTable, rows: Vec<&'a EnrichedSale>) -> Self {
        Self { table, rows }
    }

    pub fn rows(&self) -> &[&'a EnrichedSale] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a EnrichedSale> + '_ {
        self.rows.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn table(&self) -> &'a SalesTable {
        self.table
    }

    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        date_bounds(self.iter())
    }
}

fn date_bounds<'a>(rows: impl Iterator<Item = &'a EnrichedSale>) -> Option<(NaiveDate, NaiveDate)> {
    rows.filter_map(EnrichedSale::purchase_date)
        .fold(None, |acc, d| match acc {
            None => Some((d, d)),
            Some((min, max)) => Some((min.min(d), max.max(d))),
        })
}
