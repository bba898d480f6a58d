//! Coaching feedback evaluation: supervisor responses are rated by a language
//! model, summarized, rendered into a report, appended to the submissions sheet
//! and optionally mailed to the employee.

pub mod domain;
pub mod intake;
pub mod mailer;
pub mod oracle;
pub mod rating;
pub mod record;
pub mod report;
pub mod router;
pub mod service;
pub mod store;
pub mod summary;

#[cfg(test)]
mod tests;

pub use domain::{
    CategoryCatalog, CategoryPrompt, RatedResponse, RawResponse, FALLBACK_SCORE, MAX_SCORE,
    MIN_SCORE,
};
pub use intake::{validate, FormRules, SubmissionForm, ValidationError};
pub use mailer::{
    Attachment, DeliveryStatus, DisabledMailer, MailError, MailMessage, Mailer, OutboxMailer,
};
pub use oracle::{OpenAiOracle, OracleError, PromptPurpose, PromptRequest, TextOracle};
pub use rating::{
    parse_rating, rated_from_answer, ParsedRating, RatingParseError, RatingSettings, TextRater,
};
pub use record::{assemble, SubmissionRecord};
pub use report::{
    build_sections, document_stem, DocumentRenderer, MarkdownRenderer, RenderError,
    RenderedDocument, ReportLayout, ReportSection, SectionBody,
};
pub use router::coaching_router;
pub use service::{
    CoachingSubmissionService, PipelineSettings, SubmissionReceipt, SubmissionServiceError,
    SubmissionView,
};
pub use store::{
    Column, CsvSheetStore, MemorySheetStore, RecordFilter, RowSchema, SheetStore, StoreError,
    StoredSubmission, SubmissionLedger,
};
pub use summary::{mean_score, AggregateSummarizer, OverallAssessment};
