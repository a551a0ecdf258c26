use super::{filter::Predicate, fmt_datetime, read_datetime, Store};
use crate::{
    complaint_repository::{Complaint, FilteredStatistics, NewComplaint, StatusTransition},
    error::{ApiError, ApiResult},
    types::{Category, ComplaintId, ComplaintStatus, Priority},
};
use chrono::NaiveDateTime;
use rusqlite::{params, params_from_iter, OptionalExtension, TransactionBehavior};

const COMPLAINT_COLUMNS: &str = "id, categoria, descripcion, ubicacion_direccion, latitud, \
     longitud, imagen_url, nombre_reportante, email_reportante, telefono_reportante, \
     estado, prioridad, fecha_creacion, fecha_actualizacion";

fn complaint_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<Complaint> {
    Ok(Complaint {
        id: row.get(0)?,
        category: row.get(1)?,
        description: row.get(2)?,
        location_address: row.get(3)?,
        latitude: row.get(4)?,
        longitude: row.get(5)?,
        image_url: row.get(6)?,
        reporter_name: row.get(7)?,
        reporter_email: row.get(8)?,
        reporter_phone: row.get(9)?,
        status: row.get(10)?,
        priority: row.get(11)?,
        created_at: read_datetime(12, &row.get::<_, String>(12)?)?,
        updated_at: read_datetime(13, &row.get::<_, String>(13)?)?,
    })
}

impl Store {
    // ── Complaint ──────────────────────────────────────────────────

    pub fn insert_complaint(
        &self,
        c: &NewComplaint,
        priority: Priority,
        now: NaiveDateTime,
    ) -> ApiResult<ComplaintId> {
        let now_text = fmt_datetime(now);
        self.conn.execute(
            "INSERT INTO denuncias (
                categoria, descripcion, ubicacion_direccion, latitud, longitud,
                imagen_url, nombre_reportante, email_reportante, telefono_reportante,
                estado, prioridad, fecha_creacion, fecha_actualizacion
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                c.category,
                &c.description,
                &c.location_address,
                c.latitude,
                c.longitude,
                c.image_url.as_deref(),
                c.reporter_name.as_deref(),
                c.reporter_email.as_deref(),
                c.reporter_phone.as_deref(),
                ComplaintStatus::Pending,
                priority,
                &now_text,
                &now_text,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_complaint(&self, id: ComplaintId) -> ApiResult<Option<Complaint>> {
        self.conn
            .query_row(
                &format!("SELECT {COMPLAINT_COLUMNS} FROM denuncias WHERE id = ?1"),
                params![id],
                complaint_row_mapper,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Complaint plus its comment and history-change counts in one query.
    pub fn get_complaint_with_counts(
        &self,
        id: ComplaintId,
    ) -> ApiResult<Option<(Complaint, i64, i64)>> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {COMPLAINT_COLUMNS},
                        (SELECT COUNT(*) FROM comentarios c WHERE c.denuncia_id = d.id),
                        (SELECT COUNT(*) FROM historial_estados h WHERE h.denuncia_id = d.id)
                     FROM denuncias d WHERE d.id = ?1"
                ),
                params![id],
                |row| {
                    let complaint = complaint_row_mapper(row)?;
                    Ok((complaint, row.get(14)?, row.get(15)?))
                },
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn complaint_exists(&self, id: ComplaintId) -> ApiResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM denuncias WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn list_complaints(
        &self,
        zone: Option<&str>,
        category: Option<Category>,
        status: Option<ComplaintStatus>,
        cutoff: NaiveDateTime,
        limit: u32,
    ) -> ApiResult<Vec<Complaint>> {
        let predicate = Predicate::new()
            .zone(zone)
            .category(category)
            .status(status)
            .created_since(Some(cutoff));
        let sql = format!(
            "SELECT {COMPLAINT_COLUMNS} FROM denuncias {}
             ORDER BY fecha_creacion DESC LIMIT {limit}",
            predicate.where_sql(),
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(predicate.params()), complaint_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Atomic status transition: the row update and its history entry commit
    /// together or not at all. An IMMEDIATE transaction takes the write lock
    /// up front so two racing transitions on the same id serialize instead of
    /// both reading the stale status.
    pub fn transition_status(
        &self,
        id: ComplaintId,
        new_status: ComplaintStatus,
        notes: Option<&str>,
        actor: &str,
        now: NaiveDateTime,
    ) -> ApiResult<StatusTransition> {
        let tx = rusqlite::Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;

        let current: Option<ComplaintStatus> = tx
            .query_row(
                "SELECT estado FROM denuncias WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        let from = current.ok_or(ApiError::NotFound(id))?;

        if from == new_status {
            return Err(ApiError::SameStatus { id, current: from });
        }
        if !from.can_transition_to(new_status) {
            return Err(ApiError::InvalidTransition {
                id,
                from,
                to: new_status,
            });
        }

        let now_text = fmt_datetime(now);
        tx.execute(
            "UPDATE denuncias SET estado = ?1, fecha_actualizacion = ?2 WHERE id = ?3",
            params![new_status, &now_text, id],
        )?;
        tx.execute(
            "INSERT INTO historial_estados
                (denuncia_id, estado_anterior, estado_nuevo, fecha_cambio,
                 usuario_responsable, notas)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![id, from, new_status, &now_text, actor, notes],
        )?;
        tx.commit()?;

        Ok(StatusTransition {
            complaint_id: id,
            previous_status: from,
            new_status,
            changed_at: now,
            responsible_actor: actor.to_string(),
            notes: notes.map(String::from),
        })
    }

    // ── Filtered statistics & dropdown helpers ─────────────────────

    pub fn filtered_statistics(
        &self,
        zone: Option<&str>,
        category: Option<Category>,
        cutoff: NaiveDateTime,
        now: NaiveDateTime,
    ) -> ApiResult<FilteredStatistics> {
        let predicate = Predicate::new()
            .zone(zone)
            .category(category)
            .created_since(Some(cutoff));
        let sql = format!(
            "SELECT
                COUNT(*),
                SUM(CASE WHEN estado = 'pendiente' THEN 1 ELSE 0 END),
                SUM(CASE WHEN estado = 'en_proceso' THEN 1 ELSE 0 END),
                SUM(CASE WHEN estado = 'resuelta' THEN 1 ELSE 0 END),
                SUM(CASE WHEN prioridad = 'critica' THEN 1 ELSE 0 END),
                SUM(CASE WHEN prioridad = 'alta' THEN 1 ELSE 0 END),
                AVG(julianday(?) - julianday(fecha_creacion))
             FROM denuncias {}",
            predicate.where_sql(),
        );
        // Positional '?' binds in SQL text order: the julianday(now) argument
        // comes before the predicate parameters.
        let now_param = rusqlite::types::Value::Text(fmt_datetime(now));
        let params = std::iter::once(now_param).chain(predicate.params().iter().cloned());
        let mut stmt = self.conn.prepare(&sql)?;
        stmt.query_row(params_from_iter(params), |row| {
            Ok(FilteredStatistics {
                total: row.get(0)?,
                pending: row.get::<_, Option<i64>>(1)?.unwrap_or(0),
                in_progress: row.get::<_, Option<i64>>(2)?.unwrap_or(0),
                resolved: row.get::<_, Option<i64>>(3)?.unwrap_or(0),
                critical: row.get::<_, Option<i64>>(4)?.unwrap_or(0),
                high: row.get::<_, Option<i64>>(5)?.unwrap_or(0),
                avg_age_days: row.get::<_, Option<f64>>(6)?.unwrap_or(0.0),
            })
        })
        .map_err(Into::into)
    }

    /// Categories that actually occur in the table, for filter dropdowns.
    pub fn distinct_categories(&self) -> ApiResult<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT categoria FROM denuncias ORDER BY categoria")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Distinct raw addresses; zone extraction happens in the repository.
    pub fn distinct_locations(&self) -> ApiResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT ubicacion_direccion FROM denuncias
             ORDER BY ubicacion_direccion",
        )?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
