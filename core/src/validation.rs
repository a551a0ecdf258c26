//! Field validation and the creation-time priority classifier.
//!
//! Both are pure: no clock, no storage. The request layer validates first;
//! the repository runs the same checks again before writing.

use crate::{
    complaint_repository::NewComplaint,
    error::{ApiError, ApiResult},
    types::{Category, Priority},
};

/// Any of these in the description forces `critica`, whatever the category.
const CRITICAL_KEYWORDS: [&str; 7] = [
    "urgente",
    "crítico",
    "peligroso",
    "tóxico",
    "muerte",
    "hospital",
    "emergencia",
];

const HIGH_KEYWORDS: [&str; 6] = [
    "grave",
    "severo",
    "importante",
    "preocupante",
    "riesgo",
    "salud",
];

/// Keyword scan first (critical, then high), category table as fallback.
/// Priority is assigned once at creation and never changes.
pub fn classify_priority(category: Category, description: &str) -> Priority {
    let text = description.to_lowercase();
    if CRITICAL_KEYWORDS.iter().any(|kw| text.contains(kw)) {
        return Priority::Critical;
    }
    if HIGH_KEYWORDS.iter().any(|kw| text.contains(kw)) {
        return Priority::High;
    }
    category.default_priority()
}

/// Field-level checks for a new complaint. Collects every violation so the
/// caller can re-prompt once.
pub fn validate_new_complaint(c: &NewComplaint) -> ApiResult<()> {
    let mut errors: Vec<String> = Vec::new();

    let description = c.description.trim();
    if description.chars().count() < 10 {
        errors.push("description must be at least 10 characters".into());
    } else if description.chars().count() > 2000 {
        errors.push("description must not exceed 2000 characters".into());
    }

    let location = c.location_address.trim();
    if location.chars().count() < 5 {
        errors.push("location must be at least 5 characters".into());
    } else if location.chars().count() > 255 {
        errors.push("location must not exceed 255 characters".into());
    }

    match (c.latitude, c.longitude) {
        (None, None) => {}
        (Some(lat), Some(lng)) => {
            if !(-90.0..=90.0).contains(&lat) {
                errors.push("latitude must be between -90 and 90".into());
            }
            if !(-180.0..=180.0).contains(&lng) {
                errors.push("longitude must be between -180 and 180".into());
            }
        }
        _ => errors.push("coordinates require both latitude and longitude".into()),
    }

    if let Some(email) = c.reporter_email.as_deref() {
        if !is_valid_email(email) {
            errors.push("reporter email is not valid".into());
        } else if email.chars().count() > 100 {
            errors.push("reporter email must not exceed 100 characters".into());
        }
    }

    if let Some(name) = c.reporter_name.as_deref().map(str::trim) {
        let len = name.chars().count();
        if !(2..=100).contains(&len) {
            errors.push("reporter name must be between 2 and 100 characters".into());
        }
    }

    if let Some(phone) = c.reporter_phone.as_deref() {
        let stripped: String = phone
            .chars()
            .filter(|ch| ch.is_ascii_digit() || matches!(ch, '+' | '-' | ' '))
            .collect();
        let len = stripped.chars().count();
        if !(7..=20).contains(&len) {
            errors.push("reporter phone must be between 7 and 20 digits".into());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors.join("; ")))
    }
}

/// Author/body bounds for a new comment.
pub fn validate_comment(author_name: &str, body: &str) -> ApiResult<()> {
    let author_len = author_name.trim().chars().count();
    if !(2..=100).contains(&author_len) {
        return Err(ApiError::Validation(
            "author name must be between 2 and 100 characters".into(),
        ));
    }
    let body_len = body.trim().chars().count();
    if !(5..=1000).contains(&body_len) {
        return Err(ApiError::Validation(
            "comment must be between 5 and 1000 characters".into(),
        ));
    }
    Ok(())
}

/// RFC-shaped check: one '@', non-empty local part, dotted domain with no
/// whitespace. Deliverability is the mailer's problem, not ours.
fn is_valid_email(email: &str) -> bool {
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }
    let mut labels = domain.split('.');
    domain.contains('.') && labels.all(|label| !label.is_empty())
}
