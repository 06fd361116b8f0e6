use chrono::NaiveDate;
use std::collections::HashSet;
use thiserror::Error;

use super::table::{SalesTable, SalesView};

/// Ошибки параметров фильтра
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("Invalid date range: start {start} is after end {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },

    #[error("Incomplete date range: both start and end dates are required")]
    IncompleteRange,

    #[error("Date range {start}..{end} is outside of the data period {min}..{max}")]
    OutOfBounds {
        start: NaiveDate,
        end: NaiveDate,
        min: NaiveDate,
        max: NaiveDate,
    },
}

/// Inclusive range of purchase dates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, FilterError> {
        if start > end {
            return Err(FilterError::InvertedRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Checks that the range lies within the loaded data period
    pub fn ensure_within(&self, min: NaiveDate, max: NaiveDate) -> Result<(), FilterError> {
        if self.start < min || self.end > max {
            return Err(FilterError::OutOfBounds {
                start: self.start,
                end: self.end,
                min,
                max,
            });
        }
        Ok(())
    }
}

/// Selected category names. Empty selection means no category filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorySelection {
    names: HashSet<String>,
}

impl CategorySelection {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Rows without a category never match a non-empty selection
    pub fn matches(&self, category: Option<&str>) -> bool {
        if self.names.is_empty() {
            return true;
        }
        category.is_some_and(|c| self.names.contains(c))
    }
}

/// Rows whose purchase date lies in `range` and whose category is selected.
/// Undated rows never match a date range.
///
/// The selection is ignored when the table has no category dimension.
pub fn filter_by_date_and_category<'a>(
    table: &'a SalesTable,
    range: &DateRange,
    categories: &CategorySelection,
) -> SalesView<'a> {
    let use_categories = table.has_categories() && !categories.is_empty();
    if !categories.is_empty() && !table.has_categories() {
        tracing::warn!(
            "Category filter ignored: dataset has no category dimension ({} selected)",
            categories.len()
        );
    }

    let rows = table
        .rows()
        .iter()
        .filter(|r| r.purchase_date().is_some_and(|d| range.contains(d)))
        .filter(|r| !use_categories || categories.matches(r.category_name.as_deref()))
        .collect();

    SalesView::new(table, rows)
}
