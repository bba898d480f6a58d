use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::domain::{CategoryCatalog, RatedResponse};
use super::intake::SubmissionForm;

/// One coaching event, fully rated. Built once, persisted once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionRecord {
    pub timestamp: NaiveDateTime,
    pub employee_name: String,
    pub supervisor_name: String,
    pub department: String,
    pub review_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub rated_responses: Vec<RatedResponse>,
    pub overall_score: f64,
    pub overall_summary: String,
}

impl SubmissionRecord {
    pub fn fallback_categories(&self) -> Vec<&str> {
        self.rated_responses
            .iter()
            .filter(|rating| rating.fallback)
            .map(|rating| rating.category.as_str())
            .collect()
    }
}

/// Combines form input with derived ratings.
///
/// # Panics
///
/// Panics when `rated` does not line up one-to-one, in order, with `catalog`.
/// Report rows and sheet columns are positional, so a mismatch is a bug in the
/// caller rather than bad input.
pub fn assemble(
    catalog: &CategoryCatalog,
    form: &SubmissionForm,
    rated: Vec<RatedResponse>,
    overall_summary: String,
    overall_score: f64,
    timestamp: NaiveDateTime,
) -> SubmissionRecord {
    assert_eq!(
        rated.len(),
        catalog.len(),
        "rated responses must cover every catalog category"
    );
    for (index, (prompt, rating)) in catalog.prompts().iter().zip(&rated).enumerate() {
        assert_eq!(
            prompt.category, rating.category,
            "rated response {index} is out of catalog order"
        );
    }

    SubmissionRecord {
        timestamp,
        employee_name: form.employee_name.trim().to_string(),
        supervisor_name: form.supervisor_name.trim().to_string(),
        department: form.department.trim().to_string(),
        review_date: form.review_date,
        email: form
            .email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .map(str::to_string),
        rated_responses: rated,
        overall_score,
        overall_summary,
    }
}
