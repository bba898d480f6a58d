use serde::{Deserialize, Serialize};

use super::super::record::SubmissionRecord;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Document template shared by every deployment variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportLayout {
    pub title: String,
    pub include_responses: bool,
    pub sign_off_roles: Vec<String>,
}

impl ReportLayout {
    /// Coaching form with the supervisor's answers and signature lines.
    pub fn coaching() -> Self {
        Self {
            title: "Employee Coaching Assessment".to_string(),
            include_responses: true,
            sign_off_roles: vec!["Supervisor".to_string(), "Employee".to_string()],
        }
    }

    /// Appraisal summary: ratings only, no signature block.
    pub fn appraisal() -> Self {
        Self {
            title: "Employee Performance Appraisal".to_string(),
            include_responses: false,
            sign_off_roles: Vec::new(),
        }
    }
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self::coaching()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSection {
    pub title: String,
    pub body: SectionBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionBody {
    Text {
        text: String,
    },
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    SignOff {
        roles: Vec<String>,
    },
}

/// Lays a record out as ordered document sections. Pure and deterministic.
pub fn build_sections(record: &SubmissionRecord, layout: &ReportLayout) -> Vec<ReportSection> {
    let mut sections = vec![header_section(record), ratings_section(record, layout)];

    sections.push(ReportSection {
        title: "Overall Assessment".to_string(),
        body: SectionBody::Text {
            text: format!(
                "Overall score: {:.2}/5\n\n{}",
                record.overall_score,
                record.overall_summary.trim()
            ),
        },
    });

    if !layout.sign_off_roles.is_empty() {
        sections.push(ReportSection {
            title: "Sign-Off".to_string(),
            body: SectionBody::SignOff {
                roles: layout.sign_off_roles.clone(),
            },
        });
    }

    sections
}

fn header_section(record: &SubmissionRecord) -> ReportSection {
    let mut rows = vec![
        field("Employee", &record.employee_name),
        field("Supervisor", &record.supervisor_name),
        field("Department", &record.department),
        field("Review Date", &record.review_date.format("%Y-%m-%d").to_string()),
    ];
    if let Some(email) = &record.email {
        rows.push(field("Email", email));
    }
    rows.push(field(
        "Submitted",
        &record.timestamp.format(TIMESTAMP_FORMAT).to_string(),
    ));

    ReportSection {
        title: "Employee Information".to_string(),
        body: SectionBody::Table {
            headers: vec!["Field".to_string(), "Value".to_string()],
            rows,
        },
    }
}

fn ratings_section(record: &SubmissionRecord, layout: &ReportLayout) -> ReportSection {
    let mut headers = vec![
        "Category".to_string(),
        "Score".to_string(),
        "Explanation".to_string(),
    ];
    if layout.include_responses {
        headers.push("Supervisor Response".to_string());
    }

    let rows = record
        .rated_responses
        .iter()
        .map(|rating| {
            let mut row = vec![
                rating.category.clone(),
                format!("{}/5", rating.score),
                rating.explanation.clone(),
            ];
            if layout.include_responses {
                row.push(rating.response.clone());
            }
            row
        })
        .collect();

    ReportSection {
        title: "Category Ratings".to_string(),
        body: SectionBody::Table { headers, rows },
    }
}

fn field(label: &str, value: &str) -> Vec<String> {
    vec![label.to_string(), value.to_string()]
}
