use chrono::{Datelike, Months, NaiveDate};
use contracts::dashboards::d400_sales_overview::{
    CategoryRevenue, MonthlyRevenuePoint, SalesKpis, SentimentKpi,
};
use contracts::enums::sentiment::Sentiment;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::projections::p900_enriched_sales::SalesView;

/// Revenue, distinct orders, average ticket and positive sentiment share
pub fn compute_kpis(view: &SalesView<'_>) -> SalesKpis {
    let total_revenue: f64 = view.iter().map(|r| r.item_value).sum();
    let order_count = view
        .iter()
        .map(|r| r.order_id.as_str())
        .filter(|id| !id.is_empty())
        .collect::<HashSet<_>>()
        .len();
    let avg_order_value = if order_count > 0 {
        total_revenue / order_count as f64
    } else {
        0.0
    };

    SalesKpis {
        total_revenue,
        order_count,
        avg_order_value,
        positive_sentiment: compute_sentiment(view),
    }
}

fn compute_sentiment(view: &SalesView<'_>) -> SentimentKpi {
    if !view.table().has_sentiment() {
        return SentimentKpi::NotTracked;
    }

    let (labelled, positive) = view
        .iter()
        .filter_map(|r| r.ai_sentiment)
        .fold((0usize, 0usize), |(labelled, positive), s| {
            (labelled + 1, positive + usize::from(s == Sentiment::Positive))
        });

    if labelled == 0 {
        return SentimentKpi::NoData;
    }

    SentimentKpi::Available {
        positive_pct: positive as f64 / labelled as f64 * 100.0,
        sample_size: labelled,
    }
}

/// Revenue per calendar month between the first and last purchase, zero-filled
pub fn aggregate_monthly_revenue(view: &SalesView<'_>) -> Vec<MonthlyRevenuePoint> {
    let Some((min, max)) = view.date_bounds() else {
        return vec![];
    };

    let mut by_month: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for row in view.iter() {
        if let Some(date) = row.purchase_date() {
            *by_month.entry(month_start(date)).or_insert(0.0) += row.item_value;
        }
    }

    let last = month_start(max);
    let mut points = Vec::new();
    let mut current = Some(month_start(min));
    while let Some(month) = current.filter(|m| *m <= last) {
        points.push(MonthlyRevenuePoint {
            month: month.format("%Y-%m").to_string(),
            month_start: month,
            label: month.format("%b/%Y").to_string(),
            revenue: by_month.get(&month).copied().unwrap_or(0.0),
        });
        current = month.checked_add_months(Months::new(1));
    }

    points
}

/// Top `n` categories by revenue. Rows without a category are left out.
pub fn aggregate_top_categories(view: &SalesView<'_>, n: usize) -> Vec<CategoryRevenue> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for row in view.iter() {
        if let Some(category) = row.category_name.as_deref() {
            *totals.entry(category).or_insert(0.0) += row.item_value;
        }
    }

    let mut ranked: Vec<CategoryRevenue> = totals
        .into_iter()
        .map(|(category, revenue)| CategoryRevenue {
            category: category.to_string(),
            revenue,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.revenue
            .total_cmp(&a.revenue)
            .then_with(|| a.category.cmp(&b.category))
    });
    ranked.truncate(n);
    ranked
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projections::p900_enriched_sales::{
        filter_by_date_and_category, CategorySelection, DateRange, EnrichedSale, SalesTable,
    };

    fn sale(order: &str, value: f64, date: (i32, u32, u32), category: Option<&str>) -> EnrichedSale {
        EnrichedSale {
            purchase_timestamp: NaiveDate::from_ymd_opt(date.0, date.1, date.2)
                .unwrap()
                .and_hms_opt(12, 0, 0),
            order_id: order.to_string(),
            product_id: None,
            item_value: value,
            ai_sentiment: None,
            category_name: category.map(str::to_string),
        }
    }

    fn with_sentiment(mut row: EnrichedSale, sentiment: Option<Sentiment>) -> EnrichedSale {
        row.ai_sentiment = sentiment;
        row
    }

    #[test]
    fn test_kpis_example() {
        let table = SalesTable::new(
            vec![
                sale("1", 100.0, (2024, 1, 5), None),
                sale("1", 50.0, (2024, 1, 5), None),
                sale("2", 200.0, (2024, 2, 10), None),
            ],
            true,
            true,
        );
        let kpis = compute_kpis(&table.view());

        assert_eq!(kpis.total_revenue, 350.0);
        assert_eq!(kpis.order_count, 2);
        assert_eq!(kpis.avg_order_value, 175.0);
        assert_eq!(kpis.positive_sentiment, SentimentKpi::NoData);
    }

    #[test]
    fn test_blank_order_id_is_not_an_order() {
        let table = SalesTable::new(
            vec![
                sale("o1", 100.0, (2024, 1, 5), None),
                sale("", 100.0, (2024, 1, 6), None),
            ],
            true,
            false,
        );
        let kpis = compute_kpis(&table.view());

        assert_eq!(kpis.total_revenue, 200.0);
        assert_eq!(kpis.order_count, 1);
        assert_eq!(kpis.avg_order_value, 200.0);
    }

    #[test]
    fn test_undated_rows_skip_monthly_buckets() {
        let mut undated = sale("2", 999.0, (2024, 1, 1), None);
        undated.purchase_timestamp = None;
        let table = SalesTable::new(
            vec![
                sale("1", 100.0, (2024, 1, 5), None),
                undated,
                sale("3", 50.0, (2024, 2, 5), None),
            ],
            true,
            false,
        );
        let view = table.view();

        assert_eq!(compute_kpis(&view).total_revenue, 1149.0);
        let revenue: Vec<f64> = aggregate_monthly_revenue(&view)
            .iter()
            .map(|p| p.revenue)
            .collect();
        assert_eq!(revenue, vec![100.0, 50.0]);
    }

    #[test]
    fn test_kpis_empty_table() {
        let table = SalesTable::new(vec![], true, true);
        let kpis = compute_kpis(&table.view());

        assert_eq!(kpis.total_revenue, 0.0);
        assert_eq!(kpis.order_count, 0);
        assert_eq!(kpis.avg_order_value, 0.0);
        assert!(!kpis.positive_sentiment.is_available());
    }

    #[test]
    fn test_sentiment_share() {
        let table = SalesTable::new(
            vec![
                with_sentiment(sale("1", 10.0, (2024, 1, 1), None), Some(Sentiment::Positive)),
                with_sentiment(sale("2", 10.0, (2024, 1, 1), None), Some(Sentiment::Positive)),
                with_sentiment(sale("3", 10.0, (2024, 1, 1), None), Some(Sentiment::Positive)),
                with_sentiment(sale("4", 10.0, (2024, 1, 1), None), Some(Sentiment::Negative)),
                with_sentiment(sale("5", 10.0, (2024, 1, 1), None), None),
            ],
            true,
            true,
        );
        assert_eq!(
            compute_kpis(&table.view()).positive_sentiment,
            SentimentKpi::Available {
                positive_pct: 75.0,
                sample_size: 4
            }
        );

        let untracked = SalesTable::new(table.rows().to_vec(), true, false);
        assert_eq!(
            compute_kpis(&untracked.view()).positive_sentiment,
            SentimentKpi::NotTracked
        );
    }

    #[test]
    fn test_monthly_revenue_zero_fills_gaps() {
        let table = SalesTable::new(
            vec![
                sale("1", 100.0, (2023, 11, 30), None),
                sale("2", 50.0, (2023, 11, 1), None),
                sale("3", 200.0, (2024, 2, 10), None),
            ],
            true,
            false,
        );
        let points = aggregate_monthly_revenue(&table.view());

        let months: Vec<&str> = points.iter().map(|p| p.month.as_str()).collect();
        assert_eq!(months, vec!["2023-11", "2023-12", "2024-01", "2024-02"]);
        let revenue: Vec<f64> = points.iter().map(|p| p.revenue).collect();
        assert_eq!(revenue, vec![150.0, 0.0, 0.0, 200.0]);
        assert_eq!(points[0].label, "Nov/2023");
        assert_eq!(points[3].month_start, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    }

    #[test]
    fn test_monthly_revenue_follows_filtered_span() {
        let table = SalesTable::new(
            vec![
                sale("1", 100.0, (2024, 1, 15), None),
                sale("2", 50.0, (2024, 6, 1), None),
            ],
            true,
            false,
        );
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        )
        .unwrap();
        let view = filter_by_date_and_category(&table, &range, &CategorySelection::all());

        let points = aggregate_monthly_revenue(&view);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].revenue, 100.0);

        assert!(aggregate_monthly_revenue(&SalesTable::new(vec![], true, false).view()).is_empty());
    }

    #[test]
    fn test_top_categories() {
        let mut rows = Vec::new();
        for i in 0..12 {
            let name = format!("cat_{:02}", i);
            rows.push(sale(&i.to_string(), (i + 1) as f64 * 10.0, (2024, 1, 1), Some(name.as_str())));
        }
        rows.push(sale("x", 1_000.0, (2024, 1, 1), None));
        rows.push(sale("y", 5.0, (2024, 1, 2), Some("cat_00")));
        let table = SalesTable::new(rows, true, false);

        let top = aggregate_top_categories(&table.view(), 10);

        assert_eq!(top.len(), 10);
        assert!(top.windows(2).all(|w| w[0].revenue >= w[1].revenue));
        assert_eq!(top[0].category, "cat_11");
        assert_eq!(top[0].revenue, 120.0);
        assert!(top.iter().all(|c| !c.category.is_empty()));
    }

    #[test]
    fn test_top_categories_ties_and_small_n() {
        let table = SalesTable::new(
            vec![
                sale("1", 50.0, (2024, 1, 1), Some("moveis_decoracao")),
                sale("2", 50.0, (2024, 1, 1), Some("beleza_saude")),
                sale("3", 10.0, (2024, 1, 1), Some("automotivo")),
            ],
            true,
            false,
        );
        let top = aggregate_top_categories(&table.view(), 2);
        let names: Vec<&str> = top.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, vec!["beleza_saude", "moveis_decoracao"]);

        assert!(aggregate_top_categories(&table.view(), 0).is_empty());
    }
}
