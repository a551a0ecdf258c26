//! Reporting engine — aggregate statistics over a date-filtered complaint
//! set. Read-only and idempotent: repeated calls with the same range return
//! the same answer modulo concurrent writes.
//!
//! Rounding happens here, when the result structs are built, never inside
//! the SQL aggregation.

use crate::{
    error::ApiResult,
    store::{DateRange, Store},
    types::{Category, ComplaintStatus},
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct GeneralStatistics {
    pub total: i64,
    pub pending: i64,
    pub in_progress: i64,
    pub resolved: i64,
    /// Mean resolution time in days over resolved complaints only; 0 when
    /// nothing is resolved.
    pub avg_resolution_days: f64,
    /// `resolved / total * 100`; 0 on an empty set.
    pub resolution_rate: f64,
    /// `total / max(1, span_days)` where the span runs from the earliest to
    /// the latest creation date in the filtered set.
    pub avg_complaints_per_day: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryCount {
    pub category: Category,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationCount {
    pub location: String,
    pub total: i64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct DailyCount {
    pub day: NaiveDate,
    pub total: i64,
}

/// Flat projection for export; serialization formatting is the caller's
/// concern.
#[derive(Debug, Clone, Serialize)]
pub struct ExportRow {
    pub id: i64,
    pub category: Category,
    pub description: String,
    pub location_address: String,
    pub status: ComplaintStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

pub struct ReportEngine {
    store: Rc<Store>,
}

impl ReportEngine {
    pub fn new(store: Rc<Store>) -> Self {
        Self { store }
    }

    pub fn general_statistics(&self, range: DateRange) -> ApiResult<GeneralStatistics> {
        let totals = self.store.general_totals(range)?;
        if totals.total == 0 {
            return Ok(GeneralStatistics::default());
        }

        let span_days = self.store.creation_span_days(range)?.unwrap_or(0).max(1);
        let resolution_rate = totals.resolved as f64 / totals.total as f64 * 100.0;
        let avg_per_day = totals.total as f64 / span_days as f64;

        log::debug!(
            "general statistics: total={} resolved={} span_days={span_days}",
            totals.total,
            totals.resolved,
        );
        Ok(GeneralStatistics {
            total: totals.total,
            pending: totals.pending,
            in_progress: totals.in_progress,
            resolved: totals.resolved,
            avg_resolution_days: round2(totals.avg_resolution_days.unwrap_or(0.0)),
            resolution_rate: round2(resolution_rate),
            avg_complaints_per_day: round2(avg_per_day),
        })
    }

    /// Status -> count for every status present in the filtered set.
    pub fn status_distribution(
        &self,
        range: DateRange,
    ) -> ApiResult<BTreeMap<ComplaintStatus, i64>> {
        Ok(self.store.status_distribution(range)?.into_iter().collect())
    }

    /// At most `n` categories, count descending, ties broken by name.
    pub fn top_categories(&self, n: u32, range: DateRange) -> ApiResult<Vec<CategoryCount>> {
        self.store.top_categories(n, range)
    }

    /// At most `n` exact addresses, count descending. This groups on the
    /// full address string, not the fuzzy zone used by list filters.
    pub fn top_locations(&self, n: u32, range: DateRange) -> ApiResult<Vec<LocationCount>> {
        self.store.top_locations(n, range)
    }

    /// Daily complaint counts, ascending by day. Days without complaints are
    /// absent rather than zero-filled.
    pub fn time_series(&self, range: DateRange) -> ApiResult<Vec<DailyCount>> {
        self.store.time_series(range)
    }

    /// Full tabular projection for flat export, newest first.
    pub fn export_rows(&self, range: DateRange) -> ApiResult<Vec<ExportRow>> {
        self.store.export_rows(range)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::round2;

    #[test]
    fn round2_is_two_decimals() {
        assert_eq!(round2(33.333333), 33.33);
        assert_eq!(round2(66.666666), 66.67);
        assert_eq!(round2(0.0), 0.0);
    }
}
