use contracts::dashboards::d400_sales_overview::{
    DatasetInfo, FilterOptions, KpiCard, SalesKpis, SalesOverviewRequest, SalesOverviewResponse,
    SalesRowsRequest, SalesRowsResponse, SentimentKpi,
};
use thiserror::Error;

use super::{aggregation, repository};
use crate::projections::p900_enriched_sales::FilterError;
use crate::shared::config::DashboardConfig;
use crate::shared::data::dataset::{self, DatasetAccessError};
use crate::shared::format::{format_big_number, format_money, format_number, format_percent};
use crate::usecases::u501_load_sales_dataset::LoadedDataset;

pub const DEFAULT_ROWS_LIMIT: usize = 100;
pub const MAX_ROWS_LIMIT: usize = 1000;

#[derive(Debug, Error)]
pub enum D400Error {
    /// Bad request parameters, the pipeline did not run
    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Dataset(#[from] DatasetAccessError),
}

/// Get the sales overview for the requested period and categories
pub async fn get_sales_overview(
    request: SalesOverviewRequest,
) -> Result<SalesOverviewResponse, D400Error> {
    let dataset = dataset::get_dataset().await?;
    Ok(build_sales_overview(&dataset, &request, &dataset::dashboard_config())?)
}

pub async fn get_filter_options() -> Result<FilterOptions, D400Error> {
    let dataset = dataset::get_dataset().await?;
    Ok(build_filter_options(&dataset, &dataset::dashboard_config()))
}

pub async fn get_sales_rows(request: SalesRowsRequest) -> Result<SalesRowsResponse, D400Error> {
    let dataset = dataset::get_dataset().await?;
    Ok(build_sales_rows(&dataset, &request)?)
}

pub async fn get_dataset_info() -> Result<DatasetInfo, D400Error> {
    Ok(dataset::get_dataset().await?.info())
}

pub async fn reload_dataset() -> Result<DatasetInfo, D400Error> {
    Ok(dataset::reload_dataset().await?.info())
}

pub fn build_sales_overview(
    dataset: &LoadedDataset,
    request: &SalesOverviewRequest,
    config: &DashboardConfig,
) -> Result<SalesOverviewResponse, FilterError> {
    let (range, view) = repository::select_sales(
        dataset,
        request.date_from,
        request.date_to,
        &request.categories,
    )?;

    let kpis = aggregation::compute_kpis(&view);
    let top_n = request.top_n.unwrap_or(config.top_categories);

    Ok(SalesOverviewResponse {
        date_from: range.map(|r| r.start()),
        date_to: range.map(|r| r.end()),
        row_count: view.len(),
        kpi_cards: build_kpi_cards(&kpis, &config.currency_prefix),
        monthly_revenue: aggregation::aggregate_monthly_revenue(&view),
        top_categories: aggregation::aggregate_top_categories(&view, top_n),
        kpis,
        warnings: dataset.warnings(),
    })
}

pub fn build_filter_options(dataset: &LoadedDataset, config: &DashboardConfig) -> FilterOptions {
    let table = &dataset.table;
    let bounds = table.date_bounds();
    let (categories, default_categories) = if table.has_categories() {
        // preselection follows the data order, the option list is sorted
        let mut defaults = table.categories_by_appearance();
        defaults.truncate(config.default_category_count);
        (table.categories(), defaults)
    } else {
        (vec![], vec![])
    };

    FilterOptions {
        min_date: bounds.map(|(min, _)| min),
        max_date: bounds.map(|(_, max)| max),
        categories,
        default_categories,
        categories_available: table.has_categories(),
        sentiment_available: table.has_sentiment(),
        warnings: dataset.warnings(),
    }
}

pub fn build_sales_rows(
    dataset: &LoadedDataset,
    request: &SalesRowsRequest,
) -> Result<SalesRowsResponse, FilterError> {
    let (_, view) = repository::select_sales(
        dataset,
        request.date_from,
        request.date_to,
        &request.categories,
    )?;
    let limit = request
        .limit
        .unwrap_or(DEFAULT_ROWS_LIMIT)
        .min(MAX_ROWS_LIMIT);

    Ok(SalesRowsResponse {
        total: view.len(),
        offset: request.offset,
        rows: view
            .iter()
            .skip(request.offset)
            .take(limit)
            .map(|r| r.to_row())
            .collect(),
    })
}

/// KPI values formatted for the metric cards
pub fn build_kpi_cards(kpis: &SalesKpis, currency_prefix: &str) -> Vec<KpiCard> {
    let sentiment_display = match &kpis.positive_sentiment {
        SentimentKpi::Available { positive_pct, .. } => format_percent(*positive_pct),
        SentimentKpi::NoData => "N/A (no data)".to_string(),
        SentimentKpi::NotTracked => "N/A".to_string(),
    };

    vec![
        KpiCard {
            id: "total_revenue".to_string(),
            label: "Total revenue".to_string(),
            value: Some(kpis.total_revenue),
            display: format_big_number(kpis.total_revenue, currency_prefix),
        },
        KpiCard {
            id: "order_count".to_string(),
            label: "Orders".to_string(),
            value: Some(kpis.order_count as f64),
            display: format_number(kpis.order_count),
        },
        KpiCard {
            id: "avg_order_value".to_string(),
            label: "Average ticket".to_string(),
            value: Some(kpis.avg_order_value),
            display: format_money(kpis.avg_order_value, currency_prefix),
        },
        KpiCard {
            id: "positive_sentiment".to_string(),
            label: "Positive AI sentiment".to_string(),
            value: kpis.positive_sentiment.positive_pct(),
            display: sentiment_display,
        },
    ]
}
