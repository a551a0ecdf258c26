//! Append-only comments on a complaint, read back in chronological order.

use crate::{
    clock::Clock,
    config::RepoConfig,
    error::{ApiError, ApiResult},
    store::Store,
    types::{Category, ComplaintId},
    validation,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub complaint_id: ComplaintId,
    pub author_name: String,
    pub body: String,
    pub created_at: NaiveDateTime,
}

/// One page of comments plus the totals the caller needs for pagination.
#[derive(Debug, Clone, Serialize)]
pub struct CommentPage {
    pub comments: Vec<Comment>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

/// A comment in the cross-complaint activity feed, carrying just enough of
/// its complaint to render a line.
#[derive(Debug, Clone, Serialize)]
pub struct RecentComment {
    pub comment: Comment,
    pub complaint_category: Category,
    /// First 50 characters of the complaint description.
    pub complaint_summary: String,
}

/// Comment activity summary for one complaint.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CommentStats {
    pub total: i64,
    pub first_comment_at: Option<NaiveDateTime>,
    pub last_comment_at: Option<NaiveDateTime>,
}

pub struct CommentRepository {
    store: Rc<Store>,
    config: RepoConfig,
    clock: Clock,
}

impl CommentRepository {
    pub fn new(store: Rc<Store>, config: RepoConfig, clock: Clock) -> Self {
        Self {
            store,
            config,
            clock,
        }
    }

    /// Append a comment. The complaint must exist (checked before the
    /// insert; the foreign key backs it up against races).
    pub fn create(
        &self,
        complaint_id: ComplaintId,
        author_name: &str,
        body: &str,
    ) -> ApiResult<i64> {
        validation::validate_comment(author_name, body)?;
        if !self.store.complaint_exists(complaint_id)? {
            return Err(ApiError::NotFound(complaint_id));
        }
        let id = self.store.insert_comment(
            complaint_id,
            author_name.trim(),
            body.trim(),
            self.clock.now(),
        )?;
        log::debug!("comment {id} added to complaint {complaint_id}");
        Ok(id)
    }

    /// One page in chronological (oldest-first) reading order. `page` is
    /// 1-based; the page size is clamped to the configured maximum.
    pub fn list_by_complaint(
        &self,
        complaint_id: ComplaintId,
        page: u32,
        page_size: Option<u32>,
    ) -> ApiResult<CommentPage> {
        let page = page.max(1);
        let page_size = page_size
            .unwrap_or(self.config.default_page_size)
            .clamp(1, self.config.max_page_size);
        // Widened before multiplying: an absurd page number must yield an
        // empty page, not overflow u32.
        let offset = (i64::from(page) - 1) * i64::from(page_size);

        let comments = self.store.comments_page(complaint_id, page_size, offset)?;
        let total = self.store.comment_count(complaint_id)?;
        let total_pages = ((total as u64).div_ceil(page_size as u64)) as u32;

        Ok(CommentPage {
            comments,
            total,
            page,
            page_size,
            total_pages,
        })
    }

    /// Newest comments across every complaint, for the activity feed. The
    /// limit is clamped like the complaint list's.
    pub fn recent(&self, limit: Option<u32>) -> ApiResult<Vec<RecentComment>> {
        let limit = limit
            .unwrap_or(self.config.default_list_limit)
            .min(self.config.max_list_limit);
        self.store.recent_comments(limit)
    }

    /// Total plus first/last comment timestamps; zero totals and `None`
    /// timestamps for a complaint nobody has commented on.
    pub fn stats_for_complaint(&self, complaint_id: ComplaintId) -> ApiResult<CommentStats> {
        if !self.store.complaint_exists(complaint_id)? {
            return Err(ApiError::NotFound(complaint_id));
        }
        self.store.comment_stats(complaint_id)
    }
}
