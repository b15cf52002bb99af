//! Search module.
//!
//! List queries, filters and paged results for the collection endpoints.

mod filter;
mod query;
mod results;

pub use filter::Filter;
pub use query::{ListQuery, SortOption, DEFAULT_PER_PAGE, MAX_PER_PAGE};
pub use results::{Page, Pagination};
