use axum::{
    routing::{get, post},
    Router,
};

use crate::api::handlers;

/// Конфигурация всех роутов приложения
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // D400 SALES OVERVIEW DASHBOARD
        // ========================================
        .route(
            "/api/d400/filter_options",
            get(handlers::d400_sales_overview::get_filter_options),
        )
        .route(
            "/api/d400/sales_overview",
            post(handlers::d400_sales_overview::get_sales_overview),
        )
        .route(
            "/api/d400/sales_rows",
            post(handlers::d400_sales_overview::get_sales_rows),
        )
        .route(
            "/api/d400/dataset",
            get(handlers::d400_sales_overview::get_dataset_info),
        )
        .route(
            "/api/d400/reload",
            post(handlers::d400_sales_overview::reload_dataset),
        )
}
