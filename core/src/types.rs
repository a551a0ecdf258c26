//! Shared domain types: identifiers and the canonical enums.
//!
//! All three enums travel as their Spanish wire names (the values the
//! public API and the database share), so each one carries `as_str`/`parse`
//! plus `ToSql`/`FromSql` so rows read straight into typed fields.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Surrogate key of a complaint row.
pub type ComplaintId = i64;

// ── Category ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "contaminacion_agua")]
    WaterPollution,
    #[serde(rename = "contaminacion_aire")]
    AirPollution,
    #[serde(rename = "residuos_solidos")]
    SolidWaste,
    #[serde(rename = "contaminacion_sonora")]
    NoisePollution,
    #[serde(rename = "deforestacion")]
    Deforestation,
    #[serde(rename = "vertido_industrial")]
    IndustrialDumping,
    #[serde(rename = "contaminacion_suelo")]
    SoilPollution,
    #[serde(rename = "otro")]
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::WaterPollution,
        Category::AirPollution,
        Category::SolidWaste,
        Category::NoisePollution,
        Category::Deforestation,
        Category::IndustrialDumping,
        Category::SoilPollution,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::WaterPollution => "contaminacion_agua",
            Category::AirPollution => "contaminacion_aire",
            Category::SolidWaste => "residuos_solidos",
            Category::NoisePollution => "contaminacion_sonora",
            Category::Deforestation => "deforestacion",
            Category::IndustrialDumping => "vertido_industrial",
            Category::SoilPollution => "contaminacion_suelo",
            Category::Other => "otro",
        }
    }

    pub fn parse(s: &str) -> Option<Category> {
        Category::ALL.iter().copied().find(|c| c.as_str() == s)
    }

    /// Fallback priority when the description carries no severity keyword.
    pub fn default_priority(&self) -> Priority {
        match self {
            Category::WaterPollution | Category::SoilPollution => Priority::High,
            Category::AirPollution | Category::Deforestation | Category::SolidWaste => {
                Priority::Medium
            }
            Category::NoisePollution => Priority::Low,
            Category::IndustrialDumping | Category::Other => Priority::Medium,
        }
    }
}

// ── Status ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComplaintStatus {
    #[serde(rename = "pendiente")]
    Pending,
    #[serde(rename = "en_proceso")]
    InProgress,
    #[serde(rename = "resuelta")]
    Resolved,
}

impl ComplaintStatus {
    pub const ALL: [ComplaintStatus; 3] = [
        ComplaintStatus::Pending,
        ComplaintStatus::InProgress,
        ComplaintStatus::Resolved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "pendiente",
            ComplaintStatus::InProgress => "en_proceso",
            ComplaintStatus::Resolved => "resuelta",
        }
    }

    pub fn parse(s: &str) -> Option<ComplaintStatus> {
        ComplaintStatus::ALL.iter().copied().find(|e| e.as_str() == s)
    }

    /// Explicit adjacency table of the state machine. Every state reaches
    /// every other state; a self-transition is never allowed.
    pub fn allowed_transitions(&self) -> &'static [ComplaintStatus] {
        match self {
            ComplaintStatus::Pending => {
                &[ComplaintStatus::InProgress, ComplaintStatus::Resolved]
            }
            ComplaintStatus::InProgress => {
                &[ComplaintStatus::Pending, ComplaintStatus::Resolved]
            }
            ComplaintStatus::Resolved => {
                &[ComplaintStatus::Pending, ComplaintStatus::InProgress]
            }
        }
    }

    pub fn can_transition_to(&self, to: ComplaintStatus) -> bool {
        self.allowed_transitions().contains(&to)
    }
}

// ── Priority ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    #[serde(rename = "critica")]
    Critical,
    #[serde(rename = "alta")]
    High,
    #[serde(rename = "media")]
    Medium,
    #[serde(rename = "baja")]
    Low,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Critical,
        Priority::High,
        Priority::Medium,
        Priority::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "critica",
            Priority::High => "alta",
            Priority::Medium => "media",
            Priority::Low => "baja",
        }
    }

    pub fn parse(s: &str) -> Option<Priority> {
        Priority::ALL.iter().copied().find(|p| p.as_str() == s)
    }
}

// ── Folio ──────────────────────────────────────────────────────────

/// Human-readable tracking code, derived, never stored.
pub fn folio(id: ComplaintId, creation_year: i32) -> String {
    format!("ECO-{creation_year}-{id:06}")
}

// ── Trait plumbing ─────────────────────────────────────────────────

macro_rules! impl_text_enum {
    ($ty:ty, $label:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let text = value.as_str()?;
                Self::parse(text).ok_or_else(|| {
                    FromSqlError::Other(
                        format!("unknown {} value: {text}", $label).into(),
                    )
                })
            }
        }
    };
}

impl_text_enum!(Category, "categoria");
impl_text_enum!(ComplaintStatus, "estado");
impl_text_enum!(Priority, "prioridad");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_wire_names() {
        for status in ComplaintStatus::ALL {
            assert_eq!(ComplaintStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ComplaintStatus::parse("resuelto"), None);
    }

    #[test]
    fn every_status_reaches_every_other_but_not_itself() {
        for from in ComplaintStatus::ALL {
            assert_eq!(from.allowed_transitions().len(), 2);
            assert!(!from.can_transition_to(from));
            for to in ComplaintStatus::ALL {
                if from != to {
                    assert!(from.can_transition_to(to), "{from} -> {to}");
                }
            }
        }
    }

    #[test]
    fn folio_is_zero_padded() {
        assert_eq!(folio(42, 2025), "ECO-2025-000042");
        assert_eq!(folio(1234567, 2025), "ECO-2025-1234567");
    }
}
