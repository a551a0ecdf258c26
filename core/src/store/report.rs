//! Aggregation queries for the reporting engine.
//!
//! Every query here shares the same optional date-range predicate; all
//! numeric results come back raw and get rounded (if at all) at the
//! presentation boundary in `report_engine`.

use super::{filter::Predicate, read_date, read_datetime, DateRange, Store};
use crate::{
    error::ApiResult,
    report_engine::{CategoryCount, DailyCount, ExportRow, LocationCount},
    types::ComplaintStatus,
};
use rusqlite::params_from_iter;

/// Raw per-status totals plus the mean resolution time of resolved rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawGeneralTotals {
    pub total: i64,
    pub pending: i64,
    pub in_progress: i64,
    pub resolved: i64,
    /// Mean of `fecha_actualizacion - fecha_creacion` in days over resolved
    /// rows only; `None` when nothing is resolved.
    pub avg_resolution_days: Option<f64>,
}

impl Store {
    // ── Reporting ──────────────────────────────────────────────────

    pub fn general_totals(&self, range: DateRange) -> ApiResult<RawGeneralTotals> {
        let predicate = Predicate::new().date_range(range);
        let sql = format!(
            "SELECT
                COUNT(*),
                SUM(CASE WHEN estado = 'pendiente' THEN 1 ELSE 0 END),
                SUM(CASE WHEN estado = 'en_proceso' THEN 1 ELSE 0 END),
                SUM(CASE WHEN estado = 'resuelta' THEN 1 ELSE 0 END),
                AVG(CASE WHEN estado = 'resuelta'
                    THEN julianday(fecha_actualizacion) - julianday(fecha_creacion)
                    END)
             FROM denuncias {}",
            predicate.where_sql(),
        );
        let mut stmt = self.conn.prepare(&sql)?;
        stmt.query_row(params_from_iter(predicate.params()), |row| {
            Ok(RawGeneralTotals {
                total: row.get(0)?,
                pending: row.get::<_, Option<i64>>(1)?.unwrap_or(0),
                in_progress: row.get::<_, Option<i64>>(2)?.unwrap_or(0),
                resolved: row.get::<_, Option<i64>>(3)?.unwrap_or(0),
                avg_resolution_days: row.get(4)?,
            })
        })
        .map_err(Into::into)
    }

    /// Days between the earliest and latest `fecha_creacion` in the filtered
    /// set; `None` when the set is empty.
    pub fn creation_span_days(&self, range: DateRange) -> ApiResult<Option<i64>> {
        let predicate = Predicate::new().date_range(range);
        let sql = format!(
            "SELECT CAST(julianday(date(MAX(fecha_creacion)))
                       - julianday(date(MIN(fecha_creacion))) AS INTEGER)
             FROM denuncias {}",
            predicate.where_sql(),
        );
        let mut stmt = self.conn.prepare(&sql)?;
        stmt.query_row(params_from_iter(predicate.params()), |row| row.get(0))
            .map_err(Into::into)
    }

    pub fn status_distribution(
        &self,
        range: DateRange,
    ) -> ApiResult<Vec<(ComplaintStatus, i64)>> {
        let predicate = Predicate::new().date_range(range);
        let sql = format!(
            "SELECT estado, COUNT(*) FROM denuncias {}
             GROUP BY estado ORDER BY estado",
            predicate.where_sql(),
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(predicate.params()), |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Top categories by count; ties break on category name so the output
    /// is deterministic.
    pub fn top_categories(&self, n: u32, range: DateRange) -> ApiResult<Vec<CategoryCount>> {
        let predicate = Predicate::new().date_range(range);
        let sql = format!(
            "SELECT categoria, COUNT(*) AS total FROM denuncias {}
             GROUP BY categoria
             ORDER BY total DESC, categoria ASC
             LIMIT {n}",
            predicate.where_sql(),
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(predicate.params()), |row| {
            Ok(CategoryCount {
                category: row.get(0)?,
                total: row.get(1)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Exact-address grouping, not the fuzzy zone match used by list filters.
    pub fn top_locations(&self, n: u32, range: DateRange) -> ApiResult<Vec<LocationCount>> {
        let predicate = Predicate::new().date_range(range);
        let sql = format!(
            "SELECT ubicacion_direccion, COUNT(*) AS total FROM denuncias {}
             GROUP BY ubicacion_direccion
             ORDER BY total DESC, ubicacion_direccion ASC
             LIMIT {n}",
            predicate.where_sql(),
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(predicate.params()), |row| {
            Ok(LocationCount {
                location: row.get(0)?,
                total: row.get(1)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// One row per calendar day that has complaints, ascending. Days with
    /// no complaints produce no row (no zero-fill).
    pub fn time_series(&self, range: DateRange) -> ApiResult<Vec<DailyCount>> {
        let predicate = Predicate::new().date_range(range);
        let sql = format!(
            "SELECT date(fecha_creacion) AS periodo, COUNT(*) FROM denuncias {}
             GROUP BY periodo ORDER BY periodo ASC",
            predicate.where_sql(),
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(predicate.params()), |row| {
            Ok(DailyCount {
                day: read_date(0, &row.get::<_, String>(0)?)?,
                total: row.get(1)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn export_rows(&self, range: DateRange) -> ApiResult<Vec<ExportRow>> {
        let predicate = Predicate::new().date_range(range);
        let sql = format!(
            "SELECT id, categoria, descripcion, ubicacion_direccion, estado,
                    fecha_creacion, fecha_actualizacion
             FROM denuncias {}
             ORDER BY fecha_creacion DESC",
            predicate.where_sql(),
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(predicate.params()), |row| {
            Ok(ExportRow {
                id: row.get(0)?,
                category: row.get(1)?,
                description: row.get(2)?,
                location_address: row.get(3)?,
                status: row.get(4)?,
                created_at: read_datetime(5, &row.get::<_, String>(5)?)?,
                updated_at: read_datetime(6, &row.get::<_, String>(6)?)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
