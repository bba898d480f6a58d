//! Text-generation collaborator used to rate, summarize and classify free text.

mod openai;

pub use openai::OpenAiOracle;

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

/// What a prompt is for, so adapters and logs can tell calls apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptPurpose {
    Rating,
    Summary,
    TrendSummary,
    Sentiment,
}

impl PromptPurpose {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Rating => "rating",
            Self::Summary => "summary",
            Self::TrendSummary => "trend summary",
            Self::Sentiment => "sentiment",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PromptRequest {
    pub purpose: PromptPurpose,
    pub system_prompt: Option<String>,
    pub user_prompt: String,
    pub temperature: f32,
}

/// Opaque, potentially slow and potentially failing text oracle.
#[async_trait]
pub trait TextOracle: Send + Sync {
    async fn generate(&self, request: PromptRequest) -> Result<String, OracleError>;
}

#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("oracle is not configured: {0} is missing")]
    NotConfigured(&'static str),
    #[error("oracle request failed: {source}")]
    Network {
        #[from]
        source: reqwest::Error,
    },
    #[error("oracle returned status {status}: {message}")]
    Api { status: u16, message: String },
    #[error("oracle did not answer within {0:?}")]
    Timeout(Duration),
    #[error("oracle returned an empty answer")]
    EmptyResponse,
    #[error("oracle unavailable: {0}")]
    Unavailable(String),
}

/// Runs one oracle call under a deadline; an elapsed deadline is an ordinary `OracleError`.
pub async fn generate_within<O>(
    oracle: &O,
    request: PromptRequest,
    limit: Duration,
) -> Result<String, OracleError>
where
    O: TextOracle + ?Sized,
{
    match tokio::time::timeout(limit, oracle.generate(request)).await {
        Ok(result) => result,
        Err(_) => Err(OracleError::Timeout(limit)),
    }
}
