//! Shared predicate builder for optional WHERE clauses.
//!
//! Every reporting query filters on the same optional inclusive date range,
//! and the list/statistics queries add zone/category/status on top. Building
//! the clause list once here avoids the per-query string assembly the older
//! implementations duplicated.

use crate::types::{Category, ComplaintStatus};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Value;

/// Inclusive `[start, end]` range applied to `date(fecha_creacion)`.
/// Callers hand in already-parsed dates; `None` on either side leaves that
/// side unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }
}

/// Accumulates `AND`-joined clauses with positional parameters.
#[derive(Default)]
pub(crate) struct Predicate {
    clauses: Vec<String>,
    params: Vec<Value>,
}

impl Predicate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn date_range(mut self, range: DateRange) -> Self {
        if let Some(start) = range.start {
            self.clauses.push("date(fecha_creacion) >= ?".into());
            self.params.push(Value::Text(start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = range.end {
            self.clauses.push("date(fecha_creacion) <= ?".into());
            self.params.push(Value::Text(end.format("%Y-%m-%d").to_string()));
        }
        self
    }

    /// Substring match against the free-text address.
    pub fn zone(mut self, zone: Option<&str>) -> Self {
        if let Some(zone) = zone.map(str::trim).filter(|z| !z.is_empty()) {
            self.clauses.push("ubicacion_direccion LIKE ?".into());
            self.params.push(Value::Text(format!("%{zone}%")));
        }
        self
    }

    pub fn category(mut self, category: Option<Category>) -> Self {
        if let Some(category) = category {
            self.clauses.push("categoria = ?".into());
            self.params.push(Value::Text(category.as_str().to_string()));
        }
        self
    }

    pub fn status(mut self, status: Option<ComplaintStatus>) -> Self {
        if let Some(status) = status {
            self.clauses.push("estado = ?".into());
            self.params.push(Value::Text(status.as_str().to_string()));
        }
        self
    }

    pub fn created_since(mut self, cutoff: Option<NaiveDateTime>) -> Self {
        if let Some(cutoff) = cutoff {
            self.clauses.push("fecha_creacion >= ?".into());
            self.params.push(Value::Text(super::fmt_datetime(cutoff)));
        }
        self
    }

    /// Render as a `WHERE ...` fragment, or an empty string when no clause
    /// was added.
    pub fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.clauses.join(" AND "))
        }
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_predicate_renders_no_where() {
        let p = Predicate::new().date_range(DateRange::default()).zone(None);
        assert_eq!(p.where_sql(), "");
        assert!(p.params().is_empty());
    }

    #[test]
    fn clauses_join_with_and() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2025, 1, 1),
            NaiveDate::from_ymd_opt(2025, 1, 31),
        );
        let p = Predicate::new()
            .date_range(range)
            .category(Some(Category::WaterPollution));
        assert_eq!(
            p.where_sql(),
            "WHERE date(fecha_creacion) >= ? AND date(fecha_creacion) <= ? AND categoria = ?"
        );
        assert_eq!(p.params().len(), 3);
    }

    #[test]
    fn blank_zone_is_ignored() {
        let p = Predicate::new().zone(Some("   "));
        assert_eq!(p.where_sql(), "");
    }
}
