//! Loan list filter/sort/paginate engine

mod filter;
mod page;
mod sort;
mod source;

pub use filter::{FilterCriteria, Range, StatusFilter, MIN_SEARCH_CHARS};
pub use page::{page_info, paginate, PageSpec};
pub use sort::{SortDirection, SortField, SortSpec};
pub use source::{
    apply, InMemorySource, LoanQuerySource, LoanView, QueryMode, ServerSource, EMPTY_MESSAGE,
};
