use async_trait::async_trait;
use chrono::NaiveDate;
use coaching_ai::config::AppConfig;
use coaching_ai::error::AppError;
use coaching_ai::workflows::coaching::{
    CoachingSubmissionService, CsvSheetStore, DisabledMailer, Mailer, OpenAiOracle, OracleError,
    OutboxMailer, PipelineSettings, PromptPurpose, PromptRequest, TextOracle,
};
use coaching_ai::workflows::dashboard::{dashboard_headers, TrendDashboardService};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type LiveSubmissionService =
    CoachingSubmissionService<dyn TextOracle, CsvSheetStore, dyn Mailer>;
pub(crate) type LiveDashboardService =
    TrendDashboardService<dyn TextOracle, CsvSheetStore, CsvSheetStore>;

/// File-backed services sharing one oracle.
pub(crate) struct Pipeline {
    pub(crate) submissions: Arc<LiveSubmissionService>,
    pub(crate) dashboard: Arc<LiveDashboardService>,
}

pub(crate) fn live_oracle(config: &AppConfig) -> Result<Arc<dyn TextOracle>, AppError> {
    let oracle = OpenAiOracle::from_config(&config.oracle)?;
    Ok(Arc::new(oracle))
}

pub(crate) fn mailer(config: &AppConfig) -> Arc<dyn Mailer> {
    match OutboxMailer::from_config(&config.mail) {
        Some(outbox) => Arc::new(outbox),
        None => Arc::new(DisabledMailer),
    }
}

fn open_submissions_store(
    config: &AppConfig,
    settings: &PipelineSettings,
) -> Result<Arc<CsvSheetStore>, AppError> {
    let schema = settings.schema();
    let store = CsvSheetStore::open(config.storage.submissions_path.clone(), schema.headers())?;
    info!(
        path = %store.path().display(),
        schema_version = schema.version(),
        categories = schema.categories().len(),
        "submissions sheet opened"
    );
    Ok(Arc::new(store))
}

pub(crate) fn build_pipeline(
    config: &AppConfig,
    oracle: Arc<dyn TextOracle>,
) -> Result<Pipeline, AppError> {
    let settings = PipelineSettings::from_config(config);
    let submissions_store = open_submissions_store(config, &settings)?;
    let dashboard_store = Arc::new(CsvSheetStore::open(
        config.storage.dashboard_path.clone(),
        dashboard_headers(),
    )?);

    let dashboard = TrendDashboardService::new(
        oracle.clone(),
        submissions_store.clone(),
        dashboard_store,
        settings.schema(),
        config.oracle.timeout,
    );
    let submissions =
        CoachingSubmissionService::new(oracle, submissions_store, mailer(config), settings);

    Ok(Pipeline {
        submissions: Arc::new(submissions),
        dashboard: Arc::new(dashboard),
    })
}

/// Offline stand-in for the language model used by the demo command.
///
/// Scores follow simple keywords in the supervisor's text so the output is
/// repeatable.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct ScriptedOracle;

impl ScriptedOracle {
    fn score_feedback(feedback: &str) -> u8 {
        let feedback = feedback.to_ascii_lowercase();
        if ["late", "missed", "incident", "reminder"]
            .iter()
            .any(|word| feedback.contains(word))
        {
            2
        } else if ["always", "excellent", "mentor", "leads"]
            .iter()
            .any(|word| feedback.contains(word))
        {
            5
        } else {
            4
        }
    }
}

#[async_trait]
impl TextOracle for ScriptedOracle {
    async fn generate(&self, request: PromptRequest) -> Result<String, OracleError> {
        let answer = match request.purpose {
            PromptPurpose::Rating => {
                let feedback = request
                    .user_prompt
                    .rsplit_once("Feedback:\n")
                    .map(|(_, feedback)| feedback)
                    .unwrap_or_default();
                let score = Self::score_feedback(feedback);
                let explanation = match score {
                    5 => "Consistently exceeds expectations in this area.",
                    2 => "Recurring gaps that need a follow-up plan.",
                    _ => "Meets expectations with steady effort.",
                };
                format!("Rating: {score}/5\nSummary: {explanation}")
            }
            PromptPurpose::Summary => "Reliable contributor whose strongest areas carry the team; \
                 the lowest-rated categories deserve a short coaching plan before the next review."
                .to_string(),
            PromptPurpose::TrendSummary => {
                "Scores are stable across recorded reviews with one recurring weak area.".to_string()
            }
            PromptPurpose::Sentiment => "POSITIVE".to_string(),
        };
        Ok(answer)
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
