//! Per-employee trend dashboard regenerated from the submissions sheet.

mod trends;

pub use trends::{
    group_histories, history_digest, weakest_category, DashboardRow, EmployeeHistory, Sentiment,
};

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::workflows::coaching::oracle::{
    generate_within, PromptPurpose, PromptRequest, TextOracle,
};
use crate::workflows::coaching::store::{
    RecordFilter, RowSchema, SheetStore, StoreError, SubmissionLedger,
};

pub const DASHBOARD_HEADERS: [&str; 8] = [
    "Employee",
    "Supervisor",
    "Department",
    "Total Coachings",
    "Last Review Date",
    "Weakest Category",
    "Trend Summary",
    "Sentiment",
];

const TREND_TEMPERATURE: f32 = 0.3;
const SENTIMENT_TEMPERATURE: f32 = 0.0;

pub fn dashboard_headers() -> Vec<String> {
    DASHBOARD_HEADERS.iter().map(|header| header.to_string()).collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub rows: Vec<DashboardRow>,
    pub skipped_rows: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("could not read coaching history: {0}")]
    History(#[source] StoreError),
    #[error("could not write dashboard sheet: {0}")]
    Publish(#[source] StoreError),
}

/// Reads every submission, builds one trend row per employee and replaces the
/// dashboard sheet with the result.
pub struct TrendDashboardService<O: ?Sized, S: ?Sized, D: ?Sized> {
    oracle: Arc<O>,
    ledger: SubmissionLedger<S>,
    dashboard: Arc<D>,
    timeout: Duration,
}

impl<O, S, D> TrendDashboardService<O, S, D>
where
    O: TextOracle + ?Sized,
    S: SheetStore + ?Sized,
    D: SheetStore + ?Sized,
{
    pub fn new(
        oracle: Arc<O>,
        submissions: Arc<S>,
        dashboard: Arc<D>,
        schema: RowSchema,
        timeout: Duration,
    ) -> Self {
        Self {
            oracle,
            ledger: SubmissionLedger::new(submissions, schema),
            dashboard,
            timeout,
        }
    }

    pub async fn regenerate(&self) -> Result<DashboardReport, DashboardError> {
        let submissions = self
            .ledger
            .list(&RecordFilter::default())
            .map_err(DashboardError::History)?;
        let (histories, skipped_rows) = group_histories(submissions);
        if skipped_rows > 0 {
            warn!(skipped_rows, "skipped submissions without a readable review date");
        }

        let mut rows = Vec::with_capacity(histories.len());
        for history in &histories {
            if let Some(row) = self.build_row(history).await {
                rows.push(row);
            }
        }

        self.dashboard
            .replace_rows(rows.iter().map(DashboardRow::to_cells).collect())
            .map_err(DashboardError::Publish)?;
        info!(employees = rows.len(), "trend dashboard regenerated");

        Ok(DashboardReport { rows, skipped_rows })
    }

    async fn build_row(&self, history: &EmployeeHistory) -> Option<DashboardRow> {
        let (last_review_date, latest) = history.latest()?;
        let digest = history_digest(history);

        let trend_summary = self
            .ask(
                PromptPurpose::TrendSummary,
                trends::TREND_SYSTEM_PROMPT,
                trends::trend_prompt(&digest),
                TREND_TEMPERATURE,
            )
            .await
            .unwrap_or_else(|| "Trend summary unavailable.".to_string());

        let sentiment = self
            .ask(
                PromptPurpose::Sentiment,
                trends::SENTIMENT_SYSTEM_PROMPT,
                trends::sentiment_prompt(&digest),
                SENTIMENT_TEMPERATURE,
            )
            .await
            .map(|answer| Sentiment::parse(&answer))
            .unwrap_or(Sentiment::Unknown);

        Some(DashboardRow {
            employee: history.employee.clone(),
            supervisor: latest.supervisor_name.trim().to_string(),
            department: latest.department.trim().to_string(),
            total_coachings: history.total(),
            last_review_date: *last_review_date,
            weakest_category: weakest_category(history),
            trend_summary,
            sentiment,
        })
    }

    async fn ask(
        &self,
        purpose: PromptPurpose,
        system_prompt: &str,
        user_prompt: String,
        temperature: f32,
    ) -> Option<String> {
        let request = PromptRequest {
            purpose,
            system_prompt: Some(system_prompt.to_string()),
            user_prompt,
            temperature,
        };
        match generate_within(self.oracle.as_ref(), request, self.timeout).await {
            Ok(answer) => Some(answer.trim().to_string()),
            Err(err) => {
                warn!(purpose = purpose.label(), error = %err, "dashboard oracle call failed");
                None
            }
        }
    }
}
