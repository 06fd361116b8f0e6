pub mod filter;
pub mod table;

pub use filter::{filter_by_date_and_category, CategorySelection, DateRange, FilterError};
pub use table::{EnrichedSale, SalesTable, SalesView};
