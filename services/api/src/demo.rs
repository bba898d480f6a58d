use crate::commands::{print_dashboard, print_receipt, print_records};
use crate::infra::ScriptedOracle;
use chrono::{Local, NaiveDate};
use clap::Args;
use coaching_ai::error::AppError;
use coaching_ai::workflows::coaching::{
    CategoryCatalog, CoachingSubmissionService, DisabledMailer, MemorySheetStore,
    PipelineSettings, RecordFilter, SubmissionForm,
};
use coaching_ai::workflows::dashboard::{dashboard_headers, TrendDashboardService};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Review date for the sample submissions (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) review_date: Option<NaiveDate>,
    /// Rate the categories concurrently instead of one at a time.
    #[arg(long)]
    pub(crate) concurrent: bool,
    /// Skip the trend dashboard portion of the demo.
    #[arg(long)]
    pub(crate) skip_dashboard: bool,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        review_date,
        concurrent,
        skip_dashboard,
    } = args;
    let review_date = review_date.unwrap_or_else(|| Local::now().date_naive());

    let mut settings = PipelineSettings::standard();
    settings.rating.concurrent = concurrent;
    let schema = settings.schema();

    let oracle = Arc::new(ScriptedOracle);
    let submissions_store = Arc::new(MemorySheetStore::new(schema.headers()));
    let service = CoachingSubmissionService::new(
        oracle.clone(),
        submissions_store.clone(),
        Arc::new(DisabledMailer),
        settings,
    );

    println!("Coaching feedback demo");
    let mut first = true;
    for form in sample_forms(service.catalog(), review_date) {
        let receipt = service.submit(form).await?;
        if first {
            print_receipt(&receipt);
            first = false;
        } else {
            println!(
                "Recorded {} ({:.2}/5)",
                receipt.record.employee_name, receipt.record.overall_score
            );
        }
    }

    println!();
    print_records(&service.history(&RecordFilter::default())?);

    if skip_dashboard {
        return Ok(());
    }

    let dashboard = TrendDashboardService::new(
        oracle,
        submissions_store,
        Arc::new(MemorySheetStore::new(dashboard_headers())),
        schema,
        service.settings().rating.timeout,
    );
    println!();
    print_dashboard(&dashboard.regenerate().await?);
    Ok(())
}

fn sample_forms(catalog: &CategoryCatalog, review_date: NaiveDate) -> Vec<SubmissionForm> {
    let earlier = review_date - chrono::Duration::days(90);
    let jane = [
        "Always wears PPE and reminds others to do the same.",
        "Knows the line changeover steps without checking the binder.",
        "Rework dropped to almost nothing this quarter.",
        "Explains handoffs clearly at shift change.",
        "Mentors the two new hires on nights.",
        "Was late three times in March.",
    ];
    let luis = [
        "Follows lockout procedures.",
        "Still learning the new scanner workflow.",
        "Missed two quality checks on the outbound dock.",
        "Communicates well with drivers.",
        "Helps teammates when the dock is busy.",
        "Perfect attendance.",
    ];

    let form = |employee: &str, department: &str, date: NaiveDate, answers: &[&str; 6]| {
        SubmissionForm {
            employee_name: employee.to_string(),
            supervisor_name: "Sam Ortiz".to_string(),
            department: department.to_string(),
            review_date: date,
            email: None,
            responses: answers
                .iter()
                .take(catalog.len())
                .map(|answer| answer.to_string())
                .collect(),
        }
    };

    vec![
        form("Jane Doe", "Operations", review_date, &jane),
        form("Luis Ortega", "Warehouse", earlier, &luis),
        form("Luis Ortega", "Warehouse", review_date, &luis),
    ]
}
