//! Complaint repository — CRUD, filtered retrieval, and the status state
//! machine with its audit history.

use crate::{
    clock::Clock,
    config::RepoConfig,
    error::{ApiError, ApiResult},
    store::Store,
    types::{folio, Category, ComplaintId, ComplaintStatus, Priority},
    validation,
};
use chrono::{Datelike, Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Fields accepted at creation. The image path, when present, is already
/// validated and stored by the upload handler; only the relative path lands
/// here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComplaint {
    pub category: Category,
    pub description: String,
    pub location_address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image_url: Option<String>,
    pub reporter_name: Option<String>,
    pub reporter_email: Option<String>,
    pub reporter_phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Complaint {
    pub id: ComplaintId,
    pub category: Category,
    pub description: String,
    pub location_address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image_url: Option<String>,
    pub reporter_name: Option<String>,
    pub reporter_email: Option<String>,
    pub reporter_phone: Option<String>,
    pub status: ComplaintStatus,
    pub priority: Priority,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Complaint {
    /// Display tracking code, derived from the id and the creation year.
    pub fn folio(&self) -> String {
        folio(self.id, self.created_at.year())
    }
}

/// A complaint plus the derived presentation fields.
#[derive(Debug, Clone, Serialize)]
pub struct ComplaintDetail {
    pub complaint: Complaint,
    pub days_elapsed: i64,
    pub folio: String,
}

/// Detail plus aggregate child counts (`getFull`).
#[derive(Debug, Clone, Serialize)]
pub struct ComplaintFull {
    pub complaint: Complaint,
    pub days_elapsed: i64,
    pub folio: String,
    pub comment_count: i64,
    pub history_count: i64,
}

/// One audit record per status change. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub id: i64,
    pub complaint_id: ComplaintId,
    pub previous_status: ComplaintStatus,
    pub new_status: ComplaintStatus,
    pub changed_at: NaiveDateTime,
    pub responsible_actor: String,
    pub notes: Option<String>,
}

/// Result of a successful transition.
#[derive(Debug, Clone, Serialize)]
pub struct StatusTransition {
    pub complaint_id: ComplaintId,
    pub previous_status: ComplaintStatus,
    pub new_status: ComplaintStatus,
    pub changed_at: NaiveDateTime,
    pub responsible_actor: String,
    pub notes: Option<String>,
}

/// Optional list filters, already parsed and bounded by the request layer.
#[derive(Debug, Clone, Default)]
pub struct ComplaintFilters {
    /// Substring match against the location address.
    pub zone: Option<String>,
    pub category: Option<Category>,
    pub status: Option<ComplaintStatus>,
    /// Window in days; defaults to the configured 7-day weekly summary.
    pub since_days: Option<i64>,
    pub limit: Option<u32>,
}

/// Per-status and per-priority totals over a filtered window.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct FilteredStatistics {
    pub total: i64,
    pub pending: i64,
    pub in_progress: i64,
    pub resolved: i64,
    pub critical: i64,
    pub high: i64,
    pub avg_age_days: f64,
}

pub struct ComplaintRepository {
    store: Rc<Store>,
    config: RepoConfig,
    clock: Clock,
}

impl ComplaintRepository {
    pub fn new(store: Rc<Store>, config: RepoConfig, clock: Clock) -> Self {
        Self {
            store,
            config,
            clock,
        }
    }

    /// Create a complaint. Input is validated again here even though the
    /// request layer already did (defense in depth), the priority is
    /// classified from description and category, and the row starts as
    /// `pendiente` with both timestamps at now.
    pub fn create(&self, new: &NewComplaint) -> ApiResult<ComplaintId> {
        validation::validate_new_complaint(new)?;
        let priority = validation::classify_priority(new.category, &new.description);
        let id = self.store.insert_complaint(new, priority, self.clock.now())?;
        log::info!(
            "complaint {id} created: categoria={} prioridad={}",
            new.category,
            priority,
        );
        Ok(id)
    }

    pub fn get_by_id(&self, id: ComplaintId) -> ApiResult<ComplaintDetail> {
        let complaint = self
            .store
            .get_complaint(id)?
            .ok_or(ApiError::NotFound(id))?;
        Ok(ComplaintDetail {
            days_elapsed: self.days_elapsed(&complaint),
            folio: complaint.folio(),
            complaint,
        })
    }

    /// Complaint plus comment and history-change counts.
    pub fn get_full(&self, id: ComplaintId) -> ApiResult<ComplaintFull> {
        let (complaint, comment_count, history_count) = self
            .store
            .get_complaint_with_counts(id)?
            .ok_or(ApiError::NotFound(id))?;
        Ok(ComplaintFull {
            days_elapsed: self.days_elapsed(&complaint),
            folio: complaint.folio(),
            complaint,
            comment_count,
            history_count,
        })
    }

    /// Filtered list, newest first. Absent `since_days` falls back to the
    /// weekly window; the limit is clamped to the configured maximum.
    pub fn list_filtered(&self, filters: &ComplaintFilters) -> ApiResult<Vec<Complaint>> {
        let cutoff = self.window_cutoff(filters.since_days);
        let limit = filters
            .limit
            .unwrap_or(self.config.default_list_limit)
            .min(self.config.max_list_limit);
        self.store.list_complaints(
            filters.zone.as_deref(),
            filters.category,
            filters.status,
            cutoff,
            limit,
        )
    }

    /// Move a complaint to `new_status`, recording exactly one history row.
    /// Update and history commit atomically; concurrent transitions on the
    /// same id serialize inside the store.
    pub fn transition_status(
        &self,
        id: ComplaintId,
        new_status: ComplaintStatus,
        notes: Option<&str>,
        actor: Option<&str>,
    ) -> ApiResult<StatusTransition> {
        let actor = actor
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or(&self.config.default_actor);
        let result =
            self.store
                .transition_status(id, new_status, notes, actor, self.clock.now());
        match &result {
            Ok(t) => log::info!(
                "complaint {id}: {} -> {} by {actor}",
                t.previous_status,
                t.new_status,
            ),
            Err(ApiError::SameStatus { current, .. }) => {
                log::warn!("complaint {id}: rejected self-transition to {current}");
            }
            Err(_) => {}
        }
        result
    }

    /// Audit trail, newest change first. Empty for a complaint that never
    /// left `pendiente`.
    pub fn history(&self, id: ComplaintId) -> ApiResult<Vec<StatusHistoryEntry>> {
        if !self.store.complaint_exists(id)? {
            return Err(ApiError::NotFound(id));
        }
        self.store.history_for_complaint(id)
    }

    /// Per-status and per-priority totals over a zone/category window, for
    /// the weekly-summary view.
    pub fn filtered_statistics(
        &self,
        zone: Option<&str>,
        category: Option<Category>,
        since_days: Option<i64>,
    ) -> ApiResult<FilteredStatistics> {
        let cutoff = self.window_cutoff(since_days);
        self.store
            .filtered_statistics(zone, category, cutoff, self.clock.now())
    }

    /// Categories present in the table, for filter dropdowns.
    pub fn distinct_categories(&self) -> ApiResult<Vec<Category>> {
        self.store.distinct_categories()
    }

    /// Zones for filter dropdowns: the trimmed last comma-segment of each
    /// distinct address, deduplicated and sorted.
    pub fn distinct_zones(&self) -> ApiResult<Vec<String>> {
        let mut zones: Vec<String> = self
            .store
            .distinct_locations()?
            .iter()
            .filter_map(|address| {
                let zone = address.rsplit(',').next().unwrap_or(address).trim();
                (!zone.is_empty()).then(|| zone.to_string())
            })
            .collect();
        zones.sort();
        zones.dedup();
        Ok(zones)
    }

    fn days_elapsed(&self, complaint: &Complaint) -> i64 {
        (self.clock.now() - complaint.created_at).num_days()
    }

    fn window_cutoff(&self, since_days: Option<i64>) -> NaiveDateTime {
        let days = since_days.unwrap_or(self.config.default_window_days);
        self.clock.now() - Duration::days(days)
    }
}
