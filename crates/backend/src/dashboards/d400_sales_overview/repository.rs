use chrono::NaiveDate;

use crate::projections::p900_enriched_sales::{
    filter_by_date_and_category, CategorySelection, DateRange, FilterError, SalesView,
};
use crate::usecases::u501_load_sales_dataset::LoadedDataset;

/// Turn optional request dates into a validated range.
///
/// No dates at all selects the whole data period; a single date is rejected.
/// Returns `None` only for an empty dataset queried without dates.
pub fn resolve_date_range(
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
    bounds: Option<(NaiveDate, NaiveDate)>,
) -> Result<Option<DateRange>, FilterError> {
    match (date_from, date_to, bounds) {
        (None, None, None) => Ok(None),
        (None, None, Some((min, max))) => DateRange::new(min, max).map(Some),
        (Some(start), Some(end), bounds) => {
            let range = DateRange::new(start, end)?;
            if let Some((min, max)) = bounds {
                range.ensure_within(min, max)?;
            }
            Ok(Some(range))
        }
        _ => Err(FilterError::IncompleteRange),
    }
}

/// Filtered view of the dataset for a dashboard request
pub fn select_sales<'a>(
    dataset: &'a LoadedDataset,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
    categories: &[String],
) -> Result<(Option<DateRange>, SalesView<'a>), FilterError> {
    let table = &dataset.table;
    let Some(range) = resolve_date_range(date_from, date_to, table.date_bounds())? else {
        return Ok((None, table.view()));
    };

    let selection = CategorySelection::new(categories.iter().cloned());
    let view = filter_by_date_and_category(table, &range, &selection);

    tracing::debug!(
        "D400: {}..{} with {} categories -> {} of {} rows",
        range.start(),
        range.end(),
        selection.len(),
        view.len(),
        table.len()
    );

    Ok((Some(range), view))
}
