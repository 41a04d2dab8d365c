//! Caller-supplied report filter criteria.

use chrono::{DateTime, Duration, Months, NaiveDate, Utc};

use super::models::ReportStatus;

/// Free-form filter criteria, AND-combined after the visibility rule.
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    /// Restrict to the principal's own reports before anything else.
    pub show_only_mine: bool,
    /// Case-insensitive substring match on the title; empty matches all.
    pub query: Option<String>,
    /// Empty set matches all statuses.
    pub statuses: Vec<ReportStatus>,
    /// Empty set matches all categories (exact names).
    pub categories: Vec<String>,
    /// Restrict by creation time.
    pub created_within: Option<DateWindow>,
}

/// Date-range buckets offered by the report list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateWindow {
    /// Same calendar day as now (UTC).
    Today,
    /// Created within the last seven days.
    LastWeek,
    /// Created within the last calendar month.
    ThisMonth,
    /// Explicit range. `from` is truncated to start of day; `to` extends
    /// through end of day and may be omitted for an open upper bound.
    Between {
        from: NaiveDate,
        to: Option<NaiveDate>,
    },
}

impl DateWindow {
    /// Whether `created_at` falls inside this window as of `now`.
    pub fn contains(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            DateWindow::Today => created_at.date_naive() == now.date_naive(),
            DateWindow::LastWeek => created_at > now - Duration::days(7),
            DateWindow::ThisMonth => match now.checked_sub_months(Months::new(1)) {
                Some(cutoff) => created_at > cutoff,
                None => true,
            },
            DateWindow::Between { from, to } => {
                let Some(start) = from.and_hms_opt(0, 0, 0) else {
                    return false;
                };
                if created_at < start.and_utc() {
                    return false;
                }
                match to {
                    // Inclusive through the end of the day: strictly before
                    // the next day's start.
                    Some(to) => match to.succ_opt().and_then(|d| d.and_hms_opt(0, 0, 0)) {
                        Some(end) => created_at < end.and_utc(),
                        None => true,
                    },
                    None => true,
                }
            }
        }
    }
}
