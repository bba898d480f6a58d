use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::{error, info, warn};

use super::domain::{CategoryCatalog, RatedResponse};
use super::intake::{validate, FormRules, SubmissionForm, ValidationError};
use super::mailer::{Attachment, DeliveryStatus, MailMessage, Mailer};
use super::oracle::TextOracle;
use super::rating::{RatingSettings, TextRater};
use super::record::{assemble, SubmissionRecord};
use super::report::{
    build_sections, document_stem, DocumentRenderer, MarkdownRenderer, RenderedDocument,
    ReportLayout, ReportSection,
};
use super::store::{
    RecordFilter, RowSchema, SheetStore, StoreError, StoredSubmission, SubmissionLedger,
};
use super::summary::{AggregateSummarizer, OverallAssessment};
use crate::config::AppConfig;

/// Everything that distinguishes one deployment of the pipeline from another.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub catalog: CategoryCatalog,
    pub layout: ReportLayout,
    pub rules: FormRules,
    pub rating: RatingSettings,
}

impl PipelineSettings {
    pub fn standard() -> Self {
        Self {
            catalog: CategoryCatalog::standard(),
            layout: ReportLayout::coaching(),
            rules: FormRules::default(),
            rating: RatingSettings::default(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            rules: FormRules {
                require_email: config.form.require_email,
            },
            rating: RatingSettings {
                timeout: config.oracle.timeout,
                concurrent: config.oracle.concurrent_ratings,
                ..RatingSettings::default()
            },
            ..Self::standard()
        }
    }

    pub fn schema(&self) -> RowSchema {
        RowSchema::for_catalog(&self.catalog)
    }
}

/// Result of a successful submission. The row is already persisted; `delivery`
/// says what happened to the e-mail afterwards.
#[derive(Debug, Clone)]
pub struct SubmissionReceipt {
    pub record: SubmissionRecord,
    pub assessment: OverallAssessment,
    pub sections: Vec<ReportSection>,
    pub document: Option<RenderedDocument>,
    pub delivery: DeliveryStatus,
}

impl SubmissionReceipt {
    pub fn view(&self) -> SubmissionView {
        SubmissionView {
            employee_name: self.record.employee_name.clone(),
            review_date: self.record.review_date,
            overall_score: self.record.overall_score,
            narrative_score: self.assessment.narrative_score,
            overall_summary: self.record.overall_summary.clone(),
            ratings: self.record.rated_responses.clone(),
            fallback_categories: self
                .record
                .fallback_categories()
                .into_iter()
                .map(str::to_string)
                .collect(),
            document: self.document.clone(),
            delivery: self.delivery.clone(),
        }
    }
}

/// JSON shape returned to API callers.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionView {
    pub employee_name: String,
    pub review_date: NaiveDate,
    pub overall_score: f64,
    /// Score restated in the narrative, when the model included one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative_score: Option<f64>,
    pub overall_summary: String,
    pub ratings: Vec<RatedResponse>,
    pub fallback_categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<RenderedDocument>,
    pub delivery: DeliveryStatus,
}

/// Runs the coaching pipeline end to end:
/// validate, rate, summarize, assemble, render, persist, notify.
pub struct CoachingSubmissionService<O: ?Sized, S: ?Sized, M: ?Sized> {
    settings: PipelineSettings,
    rater: TextRater<O>,
    summarizer: AggregateSummarizer<O>,
    ledger: SubmissionLedger<S>,
    renderer: Box<dyn DocumentRenderer>,
    mailer: Arc<M>,
}

impl<O, S, M> CoachingSubmissionService<O, S, M>
where
    O: TextOracle + ?Sized + 'static,
    S: SheetStore + ?Sized + 'static,
    M: Mailer + ?Sized + 'static,
{
    pub fn new(oracle: Arc<O>, store: Arc<S>, mailer: Arc<M>, settings: PipelineSettings) -> Self {
        let ledger = SubmissionLedger::new(store, settings.schema());
        Self {
            rater: TextRater::new(oracle.clone(), settings.rating),
            summarizer: AggregateSummarizer::new(oracle, settings.rating),
            ledger,
            renderer: Box::new(MarkdownRenderer),
            mailer,
            settings,
        }
    }

    pub fn with_renderer(mut self, renderer: impl DocumentRenderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    pub fn catalog(&self) -> &CategoryCatalog {
        &self.settings.catalog
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Process one form. Validation failures happen before any oracle call;
    /// persistence failures are returned and nothing is mailed.
    pub async fn submit(
        &self,
        form: SubmissionForm,
    ) -> Result<SubmissionReceipt, SubmissionServiceError> {
        let catalog = &self.settings.catalog;
        let responses = validate(&form, catalog, self.settings.rules)?;
        let employee = form.employee_name.trim();
        info!(%employee, categories = responses.len(), "coaching submission accepted");

        let rated = self.rater.rate_all(&responses).await;
        let assessment = self.summarizer.summarize(employee, &rated).await;

        let record = assemble(
            catalog,
            &form,
            rated,
            assessment.summary.clone(),
            assessment.score,
            Local::now().naive_local(),
        );

        let sections = build_sections(&record, &self.settings.layout);
        let stem = document_stem(&record.employee_name, record.review_date);
        let document = match self
            .renderer
            .render(&self.settings.layout.title, &stem, &sections)
        {
            Ok(document) => Some(document),
            Err(err) => {
                warn!(%employee, error = %err, "report rendering failed; continuing without document");
                None
            }
        };

        if let Err(err) = self.ledger.append(&record) {
            error!(%employee, error = %err, "failed to persist coaching submission");
            return Err(err.into());
        }
        info!(
            %employee,
            overall_score = record.overall_score,
            fallbacks = record.fallback_categories().len(),
            "coaching submission persisted"
        );

        let delivery = self.deliver(&record, document.as_ref());

        Ok(SubmissionReceipt {
            record,
            assessment,
            sections,
            document,
            delivery,
        })
    }

    /// Read back persisted submissions matching `filter`.
    pub fn history(
        &self,
        filter: &RecordFilter,
    ) -> Result<Vec<StoredSubmission>, SubmissionServiceError> {
        Ok(self.ledger.list(filter)?)
    }

    fn deliver(
        &self,
        record: &SubmissionRecord,
        document: Option<&RenderedDocument>,
    ) -> DeliveryStatus {
        if !self.mailer.enabled() {
            return DeliveryStatus::Skipped {
                reason: "mail delivery is disabled".to_string(),
            };
        }
        let Some(to) = record.email.clone() else {
            return DeliveryStatus::Skipped {
                reason: "submission has no email address".to_string(),
            };
        };
        let Some(document) = document else {
            return DeliveryStatus::Failed {
                reason: "report document was not rendered".to_string(),
            };
        };

        let message = MailMessage {
            to: to.clone(),
            subject: format!(
                "{} for {}",
                self.settings.layout.title, record.employee_name
            ),
            body: format!(
                "Hello,\n\nAttached is the coaching assessment for {} reviewed on {}.\nOverall score: {:.2}/5\n",
                record.employee_name,
                record.review_date.format("%Y-%m-%d"),
                record.overall_score
            ),
            attachment: Some(Attachment {
                filename: document.filename.clone(),
                content_type: document.content_type.clone(),
                bytes: document.bytes.clone(),
            }),
        };

        match self.mailer.send(&message) {
            Ok(()) => {
                info!(employee = %record.employee_name, %to, "coaching report mailed");
                DeliveryStatus::Sent { to }
            }
            Err(err) => {
                warn!(employee = %record.employee_name, error = %err, "coaching report mail failed");
                DeliveryStatus::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Persistence(#[from] StoreError),
}
