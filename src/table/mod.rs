//! State of the paginated, sorted and searchable user table.

mod controller;
mod debounce;
mod pagination;

pub use controller::TableController;
pub use pagination::PageSummary;
