use crate::infra::{build_pipeline, live_oracle};
use chrono::NaiveDate;
use clap::Args;
use coaching_ai::config::AppConfig;
use coaching_ai::error::AppError;
use coaching_ai::telemetry;
use coaching_ai::workflows::coaching::{
    CsvSheetStore, DeliveryStatus, PipelineSettings, RecordFilter, StoredSubmission,
    SubmissionForm, SubmissionLedger, SubmissionReceipt,
};
use coaching_ai::workflows::dashboard::DashboardReport;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct SubmitArgs {
    /// JSON file holding the submission form
    #[arg(long)]
    pub(crate) form: PathBuf,
    /// Directory to write the rendered report into
    #[arg(long)]
    pub(crate) output_dir: Option<PathBuf>,
    /// Print the receipt as JSON instead of the rendered report
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct RecordsArgs {
    /// Only show submissions for this employee
    #[arg(long)]
    pub(crate) employee: Option<String>,
    /// Only show submissions for this department
    #[arg(long)]
    pub(crate) department: Option<String>,
    /// Earliest review date (YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) from: Option<NaiveDate>,
    /// Latest review date (YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) to: Option<NaiveDate>,
}

impl From<RecordsArgs> for RecordFilter {
    fn from(args: RecordsArgs) -> Self {
        RecordFilter {
            employee: args.employee,
            department: args.department,
            from: args.from,
            to: args.to,
        }
    }
}

pub(crate) async fn run_submit(args: SubmitArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let form: SubmissionForm = serde_json::from_str(&fs::read_to_string(&args.form)?)?;
    let pipeline = build_pipeline(&config, live_oracle(&config)?)?;
    let receipt = pipeline.submissions.submit(form).await?;

    if let (Some(dir), Some(document)) = (&args.output_dir, &receipt.document) {
        fs::create_dir_all(dir)?;
        let path = dir.join(&document.filename);
        fs::write(&path, &document.bytes)?;
        println!("Report written to {}", path.display());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&receipt.view())?);
    } else {
        print_receipt(&receipt);
    }
    Ok(())
}

pub(crate) fn run_records(args: RecordsArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let schema = PipelineSettings::from_config(&config).schema();
    let Some(store) =
        CsvSheetStore::open_existing(&config.storage.submissions_path, schema.headers())?
    else {
        print_records(&[]);
        return Ok(());
    };

    let ledger = SubmissionLedger::new(Arc::new(store), schema);
    let submissions = ledger.list(&RecordFilter::from(args))?;
    print_records(&submissions);
    Ok(())
}

pub(crate) async fn run_dashboard() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let pipeline = build_pipeline(&config, live_oracle(&config)?)?;
    let report = pipeline.dashboard.regenerate().await?;
    print_dashboard(&report);
    println!(
        "Dashboard sheet replaced at {}",
        config.storage.dashboard_path.display()
    );
    Ok(())
}

pub(crate) fn print_receipt(receipt: &SubmissionReceipt) {
    match &receipt.document {
        Some(document) => println!("{}", String::from_utf8_lossy(&document.bytes)),
        None => println!("(report document could not be rendered)"),
    }

    let fallbacks = receipt.record.fallback_categories();
    if !fallbacks.is_empty() {
        println!(
            "Fallback scores used for: {}",
            fallbacks.join(", ")
        );
    }

    match &receipt.delivery {
        DeliveryStatus::Sent { to } => println!("Report mailed to {to}"),
        DeliveryStatus::Skipped { reason } => println!("Mail skipped: {reason}"),
        DeliveryStatus::Failed { reason } => println!("Mail failed: {reason}"),
    }
}

pub(crate) fn print_records(submissions: &[StoredSubmission]) {
    if submissions.is_empty() {
        println!("No submissions found");
        return;
    }

    println!("{} submission(s)", submissions.len());
    for submission in submissions {
        let overall = submission
            .overall_score
            .map(|score| format!("{score:.2}/5"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "- {} | {} | {} | reviewed {} by {} | overall {}",
            submission.timestamp,
            submission.employee_name,
            submission.department,
            submission.review_date,
            submission.supervisor_name,
            overall
        );
    }
}

pub(crate) fn print_dashboard(report: &DashboardReport) {
    println!("Trend dashboard ({} employees)", report.rows.len());
    for row in &report.rows {
        println!(
            "- {} | {} coaching(s), last {} | weakest: {} | {}",
            row.employee,
            row.total_coachings,
            row.last_review_date,
            row.weakest_category,
            row.sentiment.label()
        );
        println!("  {}", row.trend_summary);
    }
    if report.skipped_rows > 0 {
        println!(
            "Skipped {} row(s) without a readable review date",
            report.skipped_rows
        );
    }
}
