use super::{read_datetime, Store};
use crate::{
    complaint_repository::StatusHistoryEntry,
    error::ApiResult,
    types::ComplaintId,
};
use rusqlite::params;

fn history_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<StatusHistoryEntry> {
    Ok(StatusHistoryEntry {
        id: row.get(0)?,
        complaint_id: row.get(1)?,
        previous_status: row.get(2)?,
        new_status: row.get(3)?,
        changed_at: read_datetime(4, &row.get::<_, String>(4)?)?,
        responsible_actor: row.get(5)?,
        notes: row.get(6)?,
    })
}

impl Store {
    // ── Status history ─────────────────────────────────────────────

    /// Full audit trail for one complaint, newest change first.
    pub fn history_for_complaint(
        &self,
        id: ComplaintId,
    ) -> ApiResult<Vec<StatusHistoryEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, denuncia_id, estado_anterior, estado_nuevo, fecha_cambio,
                    usuario_responsable, notas
             FROM historial_estados
             WHERE denuncia_id = ?1
             ORDER BY fecha_cambio DESC, id DESC",
        )?;
        let rows = stmt.query_map(params![id], history_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
