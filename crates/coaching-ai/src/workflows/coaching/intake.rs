use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{CategoryCatalog, RawResponse};

/// Form payload as submitted by a supervisor.
///
/// `responses` are positional: entry `i` answers the catalog's `i`-th category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionForm {
    pub employee_name: String,
    pub supervisor_name: String,
    pub department: String,
    pub review_date: NaiveDate,
    #[serde(default)]
    pub email: Option<String>,
    pub responses: Vec<String>,
}

/// Per-deployment intake rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormRules {
    pub require_email: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("{0} must not contain line breaks or control characters")]
    ControlCharacters(&'static str),
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
    #[error("expected {expected} category responses, received {actual}")]
    ResponseCount { expected: usize, actual: usize },
    #[error("a response for '{category}' is required")]
    EmptyResponse { category: String },
}

/// Checks every required field and pairs responses with their categories.
///
/// Runs before any external call; a failure here means nothing is rated or stored.
pub fn validate(
    form: &SubmissionForm,
    catalog: &CategoryCatalog,
    rules: FormRules,
) -> Result<Vec<RawResponse>, ValidationError> {
    require(&form.employee_name, "employee name")?;
    require(&form.supervisor_name, "supervisor name")?;
    require(&form.department, "department")?;
    single_line(&form.employee_name, "employee name")?;
    single_line(&form.supervisor_name, "supervisor name")?;
    single_line(&form.department, "department")?;
    if let Some(email) = &form.email {
        single_line(email, "email")?;
    }

    match form.email.as_deref().map(str::trim) {
        Some(email) if !email.is_empty() => {
            if !looks_like_email(email) {
                return Err(ValidationError::InvalidEmail(email.to_string()));
            }
        }
        _ if rules.require_email => return Err(ValidationError::MissingField("email")),
        _ => {}
    }

    if form.responses.len() != catalog.len() {
        return Err(ValidationError::ResponseCount {
            expected: catalog.len(),
            actual: form.responses.len(),
        });
    }

    catalog
        .prompts()
        .iter()
        .zip(&form.responses)
        .map(|(prompt, text)| {
            let text = text.trim();
            if text.is_empty() {
                Err(ValidationError::EmptyResponse {
                    category: prompt.category.clone(),
                })
            } else {
                Ok(RawResponse {
                    category: prompt.category.clone(),
                    text: text.to_string(),
                })
            }
        })
        .collect()
}

fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

/// Identity fields end up in report headers and mail headers, so they must stay on one line.
fn single_line(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.chars().any(char::is_control) {
        Err(ValidationError::ControlCharacters(field))
    } else {
        Ok(())
    }
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.contains(char::is_whitespace)
        }
        None => false,
    }
}
