use axum::{http::StatusCode, Json};
use contracts::dashboards::d400_sales_overview::{
    DatasetInfo, FilterOptions, SalesOverviewRequest, SalesOverviewResponse, SalesRowsRequest,
    SalesRowsResponse,
};
use serde_json::{json, Value};

use crate::dashboards::d400_sales_overview::service::{self, D400Error};

type ApiError = (StatusCode, Json<Value>);

fn into_api_error(context: &str, err: D400Error) -> ApiError {
    match err {
        D400Error::Filter(e) => {
            tracing::warn!("D400 Dashboard: {}: {}", context, e);
            (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() })))
        }
        D400Error::Dataset(e) => {
            tracing::error!("D400 Dashboard: {}: {}", context, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
        }
    }
}

/// POST /api/d400/sales_overview
pub async fn get_sales_overview(
    Json(request): Json<SalesOverviewRequest>,
) -> Result<Json<SalesOverviewResponse>, ApiError> {
    tracing::info!(
        "D400 Dashboard: Getting sales overview for {:?}..{:?}, {} categories",
        request.date_from,
        request.date_to,
        request.categories.len()
    );

    match service::get_sales_overview(request).await {
        Ok(response) => {
            tracing::info!(
                "D400 Dashboard: Returning {} rows, {} months, {} categories",
                response.row_count,
                response.monthly_revenue.len(),
                response.top_categories.len()
            );
            Ok(Json(response))
        }
        Err(e) => Err(into_api_error("Failed to get sales overview", e)),
    }
}

/// GET /api/d400/filter_options
pub async fn get_filter_options() -> Result<Json<FilterOptions>, ApiError> {
    match service::get_filter_options().await {
        Ok(options) => {
            tracing::info!(
                "D400 Dashboard: Returning {} categories",
                options.categories.len()
            );
            Ok(Json(options))
        }
        Err(e) => Err(into_api_error("Failed to get filter options", e)),
    }
}

/// POST /api/d400/sales_rows
pub async fn get_sales_rows(
    Json(request): Json<SalesRowsRequest>,
) -> Result<Json<SalesRowsResponse>, ApiError> {
    service::get_sales_rows(request)
        .await
        .map(Json)
        .map_err(|e| into_api_error("Failed to get sales rows", e))
}

/// GET /api/d400/dataset
pub async fn get_dataset_info() -> Result<Json<DatasetInfo>, ApiError> {
    service::get_dataset_info()
        .await
        .map(Json)
        .map_err(|e| into_api_error("Failed to get dataset info", e))
}

/// POST /api/d400/reload
pub async fn reload_dataset() -> Result<Json<DatasetInfo>, ApiError> {
    tracing::info!("D400 Dashboard: Reloading dataset");
    service::reload_dataset()
        .await
        .map(Json)
        .map_err(|e| into_api_error("Failed to reload dataset", e))
}
