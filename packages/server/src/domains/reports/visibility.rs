//! Role- and ownership-based report visibility.
//!
//! Entitlement first, then caller-supplied criteria. The filter assumes a
//! resolved principal: guests see nothing and must be turned away by the
//! boundary before this module is reached.

use chrono::{DateTime, Utc};

use crate::common::auth::Principal;

use super::criteria::ReportFilter;
use super::models::{Report, ReportStatus};

/// A filtered report listing plus the entitlement-level total, so the list
/// screen can render "N of M".
#[derive(Debug, Clone)]
pub struct FilteredReports {
    pub reports: Vec<Report>,
    /// Count after the visibility rule, before filter criteria.
    pub total: usize,
}

/// Whether a single report is visible to `principal` at all.
///
/// Citizens never see pending reports, and see rejected reports only when
/// they own them. Every other role - municipal officers, admin, external
/// maintainers - sees the full set. The pr_officer screen hides the status
/// facet, but that is a form concern, not a visibility rule: unfiltered,
/// a pr_officer still sees every status.
pub fn visible_to(report: &Report, principal: &Principal) -> bool {
    if !principal.role.is_citizen() {
        return true;
    }
    match report.status {
        ReportStatus::Pending => false,
        ReportStatus::Rejected => report.user_id == principal.id,
        _ => true,
    }
}

/// Narrow `reports` to what `principal` is entitled to see, then apply
/// `filter`.
///
/// Exclusions run in order (ownership first, then role/status), criteria are
/// AND-combined. Input order is preserved and the result fully materialized;
/// downstream consumers need counts and pagination metadata, not a lazy
/// stream.
pub fn filter_reports(
    principal: &Principal,
    reports: Vec<Report>,
    filter: &ReportFilter,
    now: DateTime<Utc>,
) -> FilteredReports {
    let visible: Vec<Report> = reports
        .into_iter()
        .filter(|report| !filter.show_only_mine || report.user_id == principal.id)
        .filter(|report| visible_to(report, principal))
        .collect();

    let total = visible.len();

    let reports = visible
        .into_iter()
        .filter(|report| matches_criteria(report, filter, now))
        .collect();

    FilteredReports { reports, total }
}

fn matches_criteria(report: &Report, filter: &ReportFilter, now: DateTime<Utc>) -> bool {
    if let Some(query) = &filter.query {
        if !query.is_empty() && !report.title.to_lowercase().contains(&query.to_lowercase()) {
            return false;
        }
    }

    if !filter.statuses.is_empty() && !filter.statuses.contains(&report.status) {
        return false;
    }

    if !filter.categories.is_empty()
        && !filter.categories.iter().any(|c| c == &report.category_name)
    {
        return false;
    }

    if let Some(window) = &filter.created_within {
        if !window.contains(report.created_at, now) {
            return false;
        }
    }

    true
}
