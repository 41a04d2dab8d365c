//! Reports domain - visibility policy over citizen-submitted reports.
//!
//! Report CRUD lives in the reporting services; this domain decides what a
//! principal is entitled to see and applies the list-screen filters.

pub mod criteria;
pub mod models;
pub mod visibility;

pub use criteria::{DateWindow, ReportFilter};
pub use models::{Report, ReportStatus};
pub use visibility::{filter_reports, visible_to, FilteredReports};
