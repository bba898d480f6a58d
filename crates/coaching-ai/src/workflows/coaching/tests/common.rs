use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::coaching::mailer::{MailError, MailMessage, Mailer};
use crate::workflows::coaching::oracle::{OracleError, PromptPurpose, PromptRequest, TextOracle};
use crate::workflows::coaching::store::{MemorySheetStore, SheetStore, StoreError};
use crate::workflows::coaching::{
    CategoryCatalog, CoachingSubmissionService, PipelineSettings, SubmissionForm,
};

pub(super) const SUMMARY_ANSWER: &str =
    "Jane is dependable and safety minded; she could share knowledge more often.\nOverall performance score: 4.00/5";

/// Oracle that answers every rating with a fixed score and can be told to fail
/// for one category.
pub(super) struct FakeOracle {
    score: u8,
    fail_on: Option<String>,
    calls: AtomicUsize,
    requests: Mutex<Vec<PromptRequest>>,
}

impl FakeOracle {
    pub(super) fn scoring(score: u8) -> Self {
        Self {
            score,
            fail_on: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn failing_on(score: u8, category: &str) -> Self {
        Self {
            fail_on: Some(category.to_string()),
            ..Self::scoring(score)
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(super) fn purposes(&self) -> Vec<PromptPurpose> {
        self.requests
            .lock()
            .expect("oracle mutex poisoned")
            .iter()
            .map(|request| request.purpose)
            .collect()
    }
}

#[async_trait]
impl TextOracle for FakeOracle {
    async fn generate(&self, request: PromptRequest) -> Result<String, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let purpose = request.purpose;
        let failing = self
            .fail_on
            .as_ref()
            .is_some_and(|category| request.user_prompt.contains(&format!("\"{category}\"")));
        self.requests
            .lock()
            .expect("oracle mutex poisoned")
            .push(request);

        match purpose {
            PromptPurpose::Rating if failing => {
                Err(OracleError::Unavailable("upstream returned 503".to_string()))
            }
            PromptPurpose::Rating => Ok(format!(
                "Rating: {}/5\nSummary: Consistent effort in this area.",
                self.score
            )),
            PromptPurpose::Summary => Ok(SUMMARY_ANSWER.to_string()),
            PromptPurpose::TrendSummary => Ok("Steady improvement across reviews.".to_string()),
            PromptPurpose::Sentiment => Ok("positive".to_string()),
        }
    }
}

#[derive(Default)]
pub(super) struct MemoryMailer {
    sent: Mutex<Vec<MailMessage>>,
}

impl MemoryMailer {
    pub(super) fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().expect("mailer mutex poisoned").clone()
    }
}

impl Mailer for MemoryMailer {
    fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        self.sent
            .lock()
            .expect("mailer mutex poisoned")
            .push(message.clone());
        Ok(())
    }
}

pub(super) struct BouncingMailer;

impl Mailer for BouncingMailer {
    fn send(&self, _message: &MailMessage) -> Result<(), MailError> {
        Err(MailError::Rejected("mailbox full".to_string()))
    }
}

pub(super) struct UnavailableStore;

impl SheetStore for UnavailableStore {
    fn append_row(&self, _row: Vec<String>) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("sheet offline".to_string()))
    }

    fn read_all_rows(&self) -> Result<Vec<Vec<String>>, StoreError> {
        Err(StoreError::Unavailable("sheet offline".to_string()))
    }

    fn replace_rows(&self, _rows: Vec<Vec<String>>) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("sheet offline".to_string()))
    }
}

pub(super) type TestService = CoachingSubmissionService<FakeOracle, MemorySheetStore, MemoryMailer>;

pub(super) fn memory_store() -> Arc<MemorySheetStore> {
    let schema = PipelineSettings::standard().schema();
    Arc::new(MemorySheetStore::new(schema.headers()))
}

pub(super) fn build_service(
    oracle: FakeOracle,
) -> (
    TestService,
    Arc<FakeOracle>,
    Arc<MemorySheetStore>,
    Arc<MemoryMailer>,
) {
    let oracle = Arc::new(oracle);
    let store = memory_store();
    let mailer = Arc::new(MemoryMailer::default());
    let service = CoachingSubmissionService::new(
        oracle.clone(),
        store.clone(),
        mailer.clone(),
        PipelineSettings::standard(),
    );
    (service, oracle, store, mailer)
}

pub(super) fn review_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date")
}

pub(super) fn form() -> SubmissionForm {
    SubmissionForm {
        employee_name: "Jane Doe".to_string(),
        supervisor_name: "Sam Ortiz".to_string(),
        department: "Operations".to_string(),
        review_date: review_date(),
        email: Some("jane.doe@example.com".to_string()),
        responses: CategoryCatalog::standard()
            .labels()
            .map(|label| format!("Jane did well on {label} this quarter."))
            .collect(),
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
