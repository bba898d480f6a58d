//! End-to-end scenarios for the coaching pipeline through its public facade:
//! a live-protocol oracle served by mockito, a CSV-backed sheet and the
//! outbox mailer.

mod common {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::NaiveDate;

    use coaching_ai::workflows::coaching::{
        CategoryCatalog, CoachingSubmissionService, CsvSheetStore, OpenAiOracle, OutboxMailer,
        PipelineSettings, SubmissionForm,
    };

    pub(super) type FileService =
        CoachingSubmissionService<OpenAiOracle, CsvSheetStore, OutboxMailer>;

    pub(super) fn form(employee: &str) -> SubmissionForm {
        SubmissionForm {
            employee_name: employee.to_string(),
            supervisor_name: "Sam Ortiz".to_string(),
            department: "Operations".to_string(),
            review_date: NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date"),
            email: Some("jane.doe@example.com".to_string()),
            responses: CategoryCatalog::standard()
                .labels()
                .map(|label| format!("Solid work on {label}."))
                .collect(),
        }
    }

    pub(super) fn completion(content: &str) -> String {
        serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        })
        .to_string()
    }

    pub(super) fn build_service(
        server_url: &str,
        dir: &std::path::Path,
    ) -> (FileService, Arc<CsvSheetStore>) {
        let settings = PipelineSettings::standard();
        let oracle = OpenAiOracle::new("test-key", "gpt-3.5-turbo", Duration::from_secs(5))
            .expect("oracle configured")
            .with_base_url(server_url);
        let store = Arc::new(
            CsvSheetStore::open(dir.join("submissions.csv"), settings.schema().headers())
                .expect("sheet opens"),
        );
        let mailer = OutboxMailer::new(dir.join("outbox"), "coaching@example.com");
        let service = CoachingSubmissionService::new(
            Arc::new(oracle),
            store.clone(),
            Arc::new(mailer),
            settings,
        );
        (service, store)
    }
}

use common::*;
use coaching_ai::workflows::coaching::{
    Column, DeliveryStatus, RecordFilter, SheetStore, FALLBACK_SCORE,
};
use mockito::Matcher;

#[tokio::test]
async fn submission_is_rated_persisted_and_spooled() {
    let mut server = mockito::Server::new_async().await;
    let ratings = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::PartialJsonString(r#"{"temperature":0.3}"#.to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion("Rating: 4/5\nSummary: Reliable and careful."))
        .expect(6)
        .create_async()
        .await;
    let summary = server
        .mock("POST", "/v1/chat/completions")
        .match_body(Matcher::PartialJsonString(r#"{"temperature":0.5}"#.to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion(
            "Jane is a steady performer.\nOverall performance score: 4.00/5",
        ))
        .expect(1)
        .create_async()
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let (service, store) = build_service(&server.url(), dir.path());

    let receipt = service.submit(form("Jane Doe")).await.expect("submitted");

    ratings.assert_async().await;
    summary.assert_async().await;
    assert_eq!(receipt.record.overall_score, 4.0);
    assert!(receipt.record.fallback_categories().is_empty());
    assert_eq!(
        receipt.delivery,
        DeliveryStatus::Sent {
            to: "jane.doe@example.com".to_string()
        }
    );

    let rows = store.read_all_rows().expect("rows");
    assert_eq!(rows.len(), 1);
    let schema = service.settings().schema();
    assert_eq!(rows[0].len(), schema.width());
    assert_eq!(schema.cell(&rows[0], Column::EmployeeName), "Jane Doe");
    assert_eq!(schema.cell(&rows[0], Column::Score(5)), "4");
    assert_eq!(schema.cell(&rows[0], Column::OverallScore), "4.00");

    let spooled = std::fs::read_dir(dir.path().join("outbox"))
        .expect("outbox created")
        .count();
    assert_eq!(spooled, 2);
}

#[tokio::test]
async fn rate_limited_oracle_degrades_to_fallback_scores() {
    let mut server = mockito::Server::new_async().await;
    let _limited = server
        .mock("POST", "/v1/chat/completions")
        .with_status(429)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":{"message":"Rate limit reached"}}"#)
        .create_async()
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let (service, _) = build_service(&server.url(), dir.path());

    let receipt = service.submit(form("Jane Doe")).await.expect("still persisted");

    assert!(receipt
        .record
        .rated_responses
        .iter()
        .all(|rating| rating.score == FALLBACK_SCORE && rating.explanation.contains("429")));
    assert_eq!(receipt.record.overall_score, 3.0);
    assert!(receipt
        .record
        .overall_summary
        .starts_with("Overall summary unavailable"));

    let history = service
        .history(&RecordFilter::default())
        .expect("history readable");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].overall_score, Some(3.0));
}
