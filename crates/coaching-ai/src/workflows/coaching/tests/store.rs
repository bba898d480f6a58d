use super::common::*;
use crate::workflows::coaching::store::{
    Column, CsvSheetStore, RecordFilter, RowSchema, SheetStore, StoreError, SubmissionLedger,
};
use crate::workflows::coaching::{assemble, CategoryCatalog, RatedResponse};
use chrono::NaiveDate;
use std::fs;
use std::sync::Arc;

fn record() -> crate::workflows::coaching::SubmissionRecord {
    let catalog = CategoryCatalog::standard();
    let rated = catalog
        .labels()
        .enumerate()
        .map(|(index, label)| {
            RatedResponse::rated(
                label,
                format!("Response, with \"quotes\" for {label}"),
                (index % 5) as u8 + 1,
                "ok",
                "",
            )
        })
        .collect();
    let timestamp = NaiveDate::from_ymd_opt(2025, 3, 14)
        .and_then(|date| date.and_hms_opt(16, 5, 0))
        .expect("valid timestamp");
    assemble(
        &catalog,
        &form(),
        rated,
        "Solid quarter.\nKeep mentoring.".to_string(),
        2.83,
        timestamp,
    )
}

#[test]
fn csv_store_writes_header_once_and_appends_rows() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("submissions.csv");
    let schema = RowSchema::for_catalog(&CategoryCatalog::standard());

    let store = CsvSheetStore::open(&path, schema.headers()).expect("open");
    store.append_row(schema.flatten(&record())).expect("append");
    drop(store);

    let reopened = CsvSheetStore::open(&path, schema.headers()).expect("reopen");
    reopened.append_row(schema.flatten(&record())).expect("append");

    let text = fs::read_to_string(&path).expect("readable");
    assert_eq!(text.matches("Timestamp,Email,Employee Name").count(), 1);
    assert_eq!(reopened.read_all_rows().expect("rows").len(), 2);
}

#[test]
fn ledger_round_trips_flattened_values_positionally() {
    let dir = tempfile::tempdir().expect("tempdir");
    let schema = RowSchema::for_catalog(&CategoryCatalog::standard());
    let store = Arc::new(
        CsvSheetStore::open(dir.path().join("submissions.csv"), schema.headers()).expect("open"),
    );
    let ledger = SubmissionLedger::new(store, schema.clone());
    let record = record();

    ledger.append(&record).expect("append");
    let stored = ledger.list(&RecordFilter::default()).expect("list");

    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].cells, schema.flatten(&record));
    assert_eq!(stored[0].timestamp, "2025-03-14 16:05:00");
    assert_eq!(stored[0].email, "jane.doe@example.com");
    assert_eq!(stored[0].overall_summary, "Solid quarter.\nKeep mentoring.");
    assert_eq!(stored[0].overall_score, Some(2.83));
    let scores: Vec<u8> = stored[0].scores().map(|(_, score)| score).collect();
    assert_eq!(scores, [1, 2, 3, 4, 5, 1]);
    assert!(stored[0].categories[0].response.contains("\"quotes\""));
    assert_eq!(stored[0].status, "Submitted");
}

#[test]
fn legacy_short_rows_load_with_empty_trailing_columns() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("submissions.csv");
    let schema = RowSchema::for_catalog(&CategoryCatalog::standard());
    let mut text = schema.headers().join(",");
    text.push_str("\n1/5/2024 9:00,,Ana Diaz,Sam Ortiz,01/05/2024,Operations,Good,4\n");
    fs::write(&path, text).expect("seed legacy sheet");

    let store = Arc::new(CsvSheetStore::open(&path, schema.headers()).expect("open"));
    let ledger = SubmissionLedger::new(store, schema.clone());
    let stored = ledger.list(&RecordFilter::default()).expect("list");

    assert_eq!(stored.len(), 1);
    let legacy = &stored[0];
    assert_eq!(legacy.employee_name, "Ana Diaz");
    assert_eq!(
        legacy.review_date_parsed(),
        NaiveDate::from_ymd_opt(2024, 1, 5)
    );
    assert_eq!(legacy.categories[0].score, Some(4));
    assert_eq!(legacy.categories[1].score, None);
    assert_eq!(legacy.overall_score, None);
    assert_eq!(legacy.status, "");
    assert_eq!(legacy.cells.len(), schema.width());
    assert_eq!(schema.cell(&legacy.cells, Column::OverallSummary), "");
}

#[test]
fn replace_rows_keeps_header_and_drops_previous_rows() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("dashboard.csv");
    let headers = vec!["Employee".to_string(), "Sentiment".to_string()];
    let store = CsvSheetStore::open(&path, headers).expect("open");

    store
        .append_row(vec!["Stale".to_string(), "NEGATIVE".to_string()])
        .expect("append");
    store
        .replace_rows(vec![vec!["Jane Doe".to_string(), "POSITIVE".to_string()]])
        .expect("replace");

    assert_eq!(
        store.read_all_rows().expect("rows"),
        vec![vec!["Jane Doe".to_string(), "POSITIVE".to_string()]]
    );
    let text = fs::read_to_string(&path).expect("readable");
    assert!(text.starts_with("Employee,Sentiment\n"));
    assert!(!dir.path().join("dashboard.csv.tmp").exists());
}

#[test]
fn sheet_with_a_different_layout_is_refused() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("submissions.csv");
    let two_categories = CategoryCatalog::new(
        CategoryCatalog::standard().prompts()[..2].to_vec(),
    );
    let narrow = RowSchema::for_catalog(&two_categories);
    let mut text = narrow.headers().join(",");
    text.push_str("\n2025-01-10 09:00:00,,Ana Diaz,Sam Ortiz,2025-01-10,Operations,ok,4,ok,5,4.50,Fine.,Submitted\n");
    fs::write(&path, &text).expect("seed narrow sheet");

    let schema = RowSchema::for_catalog(&CategoryCatalog::standard());
    match CsvSheetStore::open(&path, schema.headers()) {
        Err(StoreError::SchemaMismatch { expected, found }) => {
            assert_eq!(expected.len(), schema.width());
            assert_eq!(found.len(), narrow.width());
        }
        other => panic!("expected schema mismatch, got {other:?}"),
    }
    assert!(matches!(
        CsvSheetStore::open_existing(&path, schema.headers()),
        Err(StoreError::SchemaMismatch { .. })
    ));
    assert_eq!(fs::read_to_string(&path).expect("readable"), text);
}

#[test]
fn open_existing_leaves_missing_sheets_alone() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("data").join("submissions.csv");
    let schema = RowSchema::for_catalog(&CategoryCatalog::standard());

    let store = CsvSheetStore::open_existing(&path, schema.headers()).expect("no io error");
    assert!(store.is_none());
    assert!(!dir.path().join("data").exists());

    CsvSheetStore::open(&path, schema.headers()).expect("created");
    let store = CsvSheetStore::open_existing(&path, schema.headers())
        .expect("opens")
        .expect("sheet exists");
    assert!(store.read_all_rows().expect("rows").is_empty());
}
