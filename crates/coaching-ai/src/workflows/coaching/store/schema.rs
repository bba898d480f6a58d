use super::super::domain::CategoryCatalog;
use super::super::record::SubmissionRecord;

/// Bump whenever the column layout changes; existing sheets keep the old layout.
pub const SCHEMA_VERSION: u32 = 1;

/// Marker written in the last column of every appended row.
pub const SUBMITTED_STATUS: &str = "Submitted";

pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

const LEADING_COLUMNS: usize = 6;
const TRAILING_COLUMNS: usize = 3;

/// Named columns of the submissions sheet.
///
/// `Response(i)` and `Score(i)` address the `i`-th catalog category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Timestamp,
    Email,
    EmployeeName,
    SupervisorName,
    ReviewDate,
    Department,
    Response(usize),
    Score(usize),
    OverallScore,
    OverallSummary,
    Status,
}

/// Column layout for one catalog: six identity columns, a (response, score)
/// pair per category, then overall score, summary and status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSchema {
    version: u32,
    categories: Vec<String>,
}

impl RowSchema {
    pub fn for_catalog(catalog: &CategoryCatalog) -> Self {
        Self {
            version: SCHEMA_VERSION,
            categories: catalog.labels().map(str::to_string).collect(),
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn width(&self) -> usize {
        LEADING_COLUMNS + 2 * self.categories.len() + TRAILING_COLUMNS
    }

    pub fn index_of(&self, column: Column) -> Option<usize> {
        let pairs_end = LEADING_COLUMNS + 2 * self.categories.len();
        let index = match column {
            Column::Timestamp => 0,
            Column::Email => 1,
            Column::EmployeeName => 2,
            Column::SupervisorName => 3,
            Column::ReviewDate => 4,
            Column::Department => 5,
            Column::Response(i) if i < self.categories.len() => LEADING_COLUMNS + 2 * i,
            Column::Score(i) if i < self.categories.len() => LEADING_COLUMNS + 2 * i + 1,
            Column::Response(_) | Column::Score(_) => return None,
            Column::OverallScore => pairs_end,
            Column::OverallSummary => pairs_end + 1,
            Column::Status => pairs_end + 2,
        };
        Some(index)
    }

    pub fn headers(&self) -> Vec<String> {
        let mut headers: Vec<String> = [
            "Timestamp",
            "Email",
            "Employee Name",
            "Supervisor Name",
            "Review Date",
            "Department",
        ]
        .iter()
        .map(|header| header.to_string())
        .collect();

        for category in &self.categories {
            headers.push(format!("{category} Response"));
            headers.push(format!("{category} Score"));
        }

        headers.extend(
            ["Overall Score", "Overall Summary", "Status"]
                .iter()
                .map(|header| header.to_string()),
        );
        headers
    }

    pub fn flatten(&self, record: &SubmissionRecord) -> Vec<String> {
        let mut row = Vec::with_capacity(self.width());
        row.push(record.timestamp.format(TIMESTAMP_FORMAT).to_string());
        row.push(record.email.clone().unwrap_or_default());
        row.push(record.employee_name.clone());
        row.push(record.supervisor_name.clone());
        row.push(record.review_date.format(DATE_FORMAT).to_string());
        row.push(record.department.clone());

        for rating in &record.rated_responses {
            row.push(rating.response.clone());
            row.push(rating.score.to_string());
        }

        row.push(format!("{:.2}", record.overall_score));
        row.push(record.overall_summary.clone());
        row.push(SUBMITTED_STATUS.to_string());
        row
    }

    /// Reads a cell, treating columns missing from short legacy rows as empty.
    pub fn cell<'a>(&self, row: &'a [String], column: Column) -> &'a str {
        self.index_of(column)
            .and_then(|index| row.get(index))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Copies a row and pads it out to the full schema width.
    pub fn pad(&self, row: &[String]) -> Vec<String> {
        let mut padded = row.to_vec();
        if padded.len() < self.width() {
            padded.resize(self.width(), String::new());
        }
        padded
    }
}
