use super::{fmt_datetime, read_datetime, Store};
use crate::{
    comment_repository::{Comment, CommentStats, RecentComment},
    error::ApiResult,
    types::ComplaintId,
};
use chrono::NaiveDateTime;
use rusqlite::params;

fn comment_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        complaint_id: row.get(1)?,
        author_name: row.get(2)?,
        body: row.get(3)?,
        created_at: read_datetime(4, &row.get::<_, String>(4)?)?,
    })
}

impl Store {
    // ── Comment ────────────────────────────────────────────────────

    pub fn insert_comment(
        &self,
        complaint_id: ComplaintId,
        author_name: &str,
        body: &str,
        now: NaiveDateTime,
    ) -> ApiResult<i64> {
        self.conn.execute(
            "INSERT INTO comentarios (denuncia_id, nombre_usuario, comentario, fecha_creacion)
             VALUES (?1, ?2, ?3, ?4)",
            params![complaint_id, author_name, body, fmt_datetime(now)],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// One page of comments in chronological (oldest-first) order.
    pub fn comments_page(
        &self,
        complaint_id: ComplaintId,
        limit: u32,
        offset: i64,
    ) -> ApiResult<Vec<Comment>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, denuncia_id, nombre_usuario, comentario, fecha_creacion
             FROM comentarios
             WHERE denuncia_id = ?1
             ORDER BY fecha_creacion ASC, id ASC
             LIMIT ?2 OFFSET ?3",
        )?;
        let rows = stmt.query_map(params![complaint_id, limit, offset], comment_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn comment_count(&self, complaint_id: ComplaintId) -> ApiResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM comentarios WHERE denuncia_id = ?1",
                params![complaint_id],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }

    /// Latest comments across every complaint, each joined to the category
    /// and the first 50 characters of its complaint's description.
    pub fn recent_comments(&self, limit: u32) -> ApiResult<Vec<RecentComment>> {
        let mut stmt = self.conn.prepare(
            "SELECT c.id, c.denuncia_id, c.nombre_usuario, c.comentario, c.fecha_creacion,
                    d.categoria, substr(d.descripcion, 1, 50)
             FROM comentarios c
             JOIN denuncias d ON d.id = c.denuncia_id
             ORDER BY c.fecha_creacion DESC, c.id DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok(RecentComment {
                comment: comment_row_mapper(row)?,
                complaint_category: row.get(5)?,
                complaint_summary: row.get(6)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Total plus first/last comment timestamps for one complaint. Both
    /// timestamps are NULL when the complaint has no comments.
    pub fn comment_stats(&self, complaint_id: ComplaintId) -> ApiResult<CommentStats> {
        self.conn
            .query_row(
                "SELECT COUNT(*), MIN(fecha_creacion), MAX(fecha_creacion)
                 FROM comentarios WHERE denuncia_id = ?1",
                params![complaint_id],
                |row| {
                    let first: Option<String> = row.get(1)?;
                    let last: Option<String> = row.get(2)?;
                    Ok(CommentStats {
                        total: row.get(0)?,
                        first_comment_at: first
                            .as_deref()
                            .map(|t| read_datetime(1, t))
                            .transpose()?,
                        last_comment_at: last
                            .as_deref()
                            .map(|t| read_datetime(2, t))
                            .transpose()?,
                    })
                },
            )
            .map_err(Into::into)
    }
}
