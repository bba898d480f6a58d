use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::super::record::SubmissionRecord;
use super::schema::{Column, RowSchema, DATE_FORMAT};
use super::{SheetStore, StoreError};

/// Legacy sheets were filled in by hand with US-style dates.
const LEGACY_DATE_FORMAT: &str = "%m/%d/%Y";

/// Append-only submissions sheet addressed through a `RowSchema`.
pub struct SubmissionLedger<S: ?Sized> {
    store: Arc<S>,
    schema: RowSchema,
}

impl<S> SubmissionLedger<S>
where
    S: SheetStore + ?Sized,
{
    pub fn new(store: Arc<S>, schema: RowSchema) -> Self {
        Self { store, schema }
    }

    pub fn schema(&self) -> &RowSchema {
        &self.schema
    }

    /// Writes exactly one row for the record.
    pub fn append(&self, record: &SubmissionRecord) -> Result<(), StoreError> {
        self.store.append_row(self.schema.flatten(record))
    }

    pub fn list(&self, filter: &RecordFilter) -> Result<Vec<StoredSubmission>, StoreError> {
        let rows = self.store.read_all_rows()?;
        Ok(rows
            .iter()
            .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
            .map(|row| StoredSubmission::from_row(&self.schema, row))
            .filter(|submission| filter.matches(submission))
            .collect())
    }
}

/// One category pair as read back from the sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredCategory {
    pub category: String,
    pub response: String,
    pub score: Option<u8>,
}

/// A persisted row decoded through the schema. Cells are kept as text so rows
/// written by hand or by older versions still load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredSubmission {
    pub timestamp: String,
    pub email: String,
    pub employee_name: String,
    pub supervisor_name: String,
    pub review_date: String,
    pub department: String,
    pub categories: Vec<StoredCategory>,
    pub overall_score: Option<f64>,
    pub overall_summary: String,
    pub status: String,
    #[serde(skip)]
    pub cells: Vec<String>,
}

impl StoredSubmission {
    pub fn from_row(schema: &RowSchema, row: &[String]) -> Self {
        let cell = |column| schema.cell(row, column).to_string();

        let categories = schema
            .categories()
            .iter()
            .enumerate()
            .map(|(index, category)| StoredCategory {
                category: category.clone(),
                response: cell(Column::Response(index)),
                score: schema
                    .cell(row, Column::Score(index))
                    .trim()
                    .parse::<u8>()
                    .ok(),
            })
            .collect();

        Self {
            timestamp: cell(Column::Timestamp),
            email: cell(Column::Email),
            employee_name: cell(Column::EmployeeName),
            supervisor_name: cell(Column::SupervisorName),
            review_date: cell(Column::ReviewDate),
            department: cell(Column::Department),
            categories,
            overall_score: schema
                .cell(row, Column::OverallScore)
                .trim()
                .parse::<f64>()
                .ok(),
            overall_summary: cell(Column::OverallSummary),
            status: cell(Column::Status),
            cells: schema.pad(row),
        }
    }

    pub fn review_date_parsed(&self) -> Option<NaiveDate> {
        parse_review_date(&self.review_date)
    }

    /// Scores that were actually recorded, in catalog order.
    pub fn scores(&self) -> impl Iterator<Item = (&str, u8)> {
        self.categories
            .iter()
            .filter_map(|entry| entry.score.map(|score| (entry.category.as_str(), score)))
    }
}

pub(crate) fn parse_review_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(raw, LEGACY_DATE_FORMAT))
        .ok()
}

/// History query. Blank values mean "no constraint"; a date bound excludes rows
/// whose review date cannot be read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RecordFilter {
    #[serde(default)]
    pub employee: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub to: Option<NaiveDate>,
}

impl RecordFilter {
    pub fn matches(&self, submission: &StoredSubmission) -> bool {
        if !text_matches(self.employee.as_deref(), &submission.employee_name) {
            return false;
        }
        if !text_matches(self.department.as_deref(), &submission.department) {
            return false;
        }
        if self.from.is_none() && self.to.is_none() {
            return true;
        }

        match submission.review_date_parsed() {
            Some(date) => {
                self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
            }
            None => false,
        }
    }
}

fn text_matches(wanted: Option<&str>, actual: &str) -> bool {
    match wanted.map(str::trim) {
        Some(wanted) if !wanted.is_empty() => wanted.eq_ignore_ascii_case(actual.trim()),
        _ => true,
    }
}

fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_review_date(value).map(Some).ok_or_else(|| {
            serde::de::Error::custom(format!("failed to parse '{value}' as YYYY-MM-DD"))
        }),
    }
}
