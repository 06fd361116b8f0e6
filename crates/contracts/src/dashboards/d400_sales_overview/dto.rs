use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::sentiment::Sentiment;

/// Request for the sales overview dashboard
///
/// Both dates absent means "whole dataset"; exactly one of them is rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SalesOverviewRequest {
    /// Start date in format "YYYY-MM-DD" (inclusive)
    #[serde(default)]
    pub date_from: Option<NaiveDate>,
    /// End date in format "YYYY-MM-DD" (inclusive)
    #[serde(default)]
    pub date_to: Option<NaiveDate>,
    /// Selected categories, empty = all categories
    #[serde(default)]
    pub categories: Vec<String>,
    /// Size of the top categories chart, server default when omitted
    #[serde(default)]
    pub top_n: Option<usize>,
}

/// Response for the sales overview dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesOverviewResponse {
    /// Effective period (None when the dataset is empty)
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    /// Number of line-items after filtering
    pub row_count: usize,
    pub kpis: SalesKpis,
    /// KPI values already formatted for display
    pub kpi_cards: Vec<KpiCard>,
    /// Monthly revenue trend, one point per calendar month, zero-filled
    pub monthly_revenue: Vec<MonthlyRevenuePoint>,
    /// Top categories by revenue, descending
    pub top_categories: Vec<CategoryRevenue>,
    /// Non-fatal load warnings (e.g. join skipped)
    pub warnings: Vec<String>,
}

/// Four summary metrics of the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesKpis {
    pub total_revenue: f64,
    /// Distinct orders
    pub order_count: usize,
    /// total_revenue / order_count, 0 when there are no orders
    pub avg_order_value: f64,
    pub positive_sentiment: SentimentKpi,
}

/// Share of positive AI sentiment among labelled line-items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SentimentKpi {
    Available { positive_pct: f64, sample_size: usize },
    /// Sentiment column exists but no labelled rows in the selection
    NoData,
    /// Source has no sentiment column at all
    NotTracked,
}

impl SentimentKpi {
    pub fn positive_pct(&self) -> Option<f64> {
        match self {
            SentimentKpi::Available { positive_pct, .. } => Some(*positive_pct),
            _ => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, SentimentKpi::Available { .. })
    }
}

/// KPI prepared for a metric card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiCard {
    /// Indicator identifier (e.g., "total_revenue")
    pub id: String,
    pub label: String,
    /// Raw value, None when unavailable
    pub value: Option<f64>,
    /// Display string (e.g., "R$ 1.25 Mi")
    pub display: String,
}

/// One point of the monthly revenue trend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRevenuePoint {
    /// Month key in format "YYYY-MM"
    pub month: String,
    /// First day of the month
    pub month_start: NaiveDate,
    /// Chart label in format "Jan/2024"
    pub label: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRevenue {
    pub category: String,
    pub revenue: f64,
}

/// Values for the dashboard filter panel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterOptions {
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
    /// Distinct non-empty categories, sorted
    pub categories: Vec<String>,
    /// Pre-selected categories
    pub default_categories: Vec<String>,
    pub categories_available: bool,
    pub sentiment_available: bool,
    pub warnings: Vec<String>,
}

/// Paginated drill-down into the filtered line-items
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SalesRowsRequest {
    #[serde(default)]
    pub date_from: Option<NaiveDate>,
    #[serde(default)]
    pub date_to: Option<NaiveDate>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesRowsResponse {
    /// Rows matching the filter before pagination
    pub total: usize,
    pub offset: usize,
    pub rows: Vec<SaleRow>,
}

/// Line-item joined with its product category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRow {
    pub purchase_timestamp: Option<NaiveDateTime>,
    pub order_id: String,
    pub product_id: Option<String>,
    pub item_value: f64,
    pub ai_sentiment: Option<Sentiment>,
    pub category_name: Option<String>,
}

/// Diagnostics of the currently loaded dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetInfo {
    /// SHA-256 of both source files, hex
    pub fingerprint: String,
    pub row_count: usize,
    pub loaded_at: DateTime<Utc>,
    pub categories_available: bool,
    pub sentiment_available: bool,
    /// Product ids of sales rows without a dimension row
    pub unmatched_products: usize,
    pub warnings: Vec<String>,
}
