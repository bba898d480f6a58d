mod parser;
pub(crate) mod prompts;

pub use parser::{parse_rating, ParsedRating, RatingParseError};

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use super::domain::{RatedResponse, RawResponse};
use super::oracle::{generate_within, PromptPurpose, PromptRequest, TextOracle};

/// Oracle call settings shared by the rater and summarizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingSettings {
    pub timeout: Duration,
    pub temperature: f32,
    pub concurrent: bool,
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            temperature: 0.3,
            concurrent: false,
        }
    }
}

/// Scores one free-text response per call.
///
/// Never fails: oracle errors, timeouts and unparseable answers all become a
/// fallback `RatedResponse` so one bad reply cannot block a submission.
pub struct TextRater<O: ?Sized> {
    oracle: Arc<O>,
    settings: RatingSettings,
}

impl<O> TextRater<O>
where
    O: TextOracle + ?Sized,
{
    pub fn new(oracle: Arc<O>, settings: RatingSettings) -> Self {
        Self { oracle, settings }
    }

    pub async fn rate(&self, category: &str, response_text: &str) -> RatedResponse {
        let request = PromptRequest {
            purpose: PromptPurpose::Rating,
            system_prompt: Some(prompts::RATING_SYSTEM_PROMPT.to_string()),
            user_prompt: prompts::rating_prompt(category, response_text),
            temperature: self.settings.temperature,
        };

        let raw = match generate_within(self.oracle.as_ref(), request, self.settings.timeout).await
        {
            Ok(raw) => raw,
            Err(err) => {
                warn!(%category, error = %err, "rating oracle failed; using fallback score");
                return RatedResponse::fallback(
                    category,
                    response_text,
                    format!("Automatic rating unavailable: {err}."),
                    "",
                );
            }
        };

        rated_from_answer(category, response_text, raw)
    }

    /// Rates every response; the result always follows the input order.
    pub async fn rate_all(&self, responses: &[RawResponse]) -> Vec<RatedResponse> {
        if self.settings.concurrent {
            futures::future::join_all(
                responses
                    .iter()
                    .map(|response| self.rate(&response.category, &response.text)),
            )
            .await
        } else {
            let mut rated = Vec::with_capacity(responses.len());
            for response in responses {
                rated.push(self.rate(&response.category, &response.text).await);
            }
            rated
        }
    }
}

/// Turns an oracle answer into a rating, falling back when the grammar does not match.
pub fn rated_from_answer(category: &str, response_text: &str, raw: String) -> RatedResponse {
    match parse_rating(&raw) {
        Ok(parsed) => {
            RatedResponse::rated(category, response_text, parsed.score, parsed.explanation, raw)
        }
        Err(err) => {
            warn!(%category, error = %err, "could not parse rating answer; using fallback score");
            RatedResponse::fallback(
                category,
                response_text,
                format!("Rating could not be read from the model answer ({err})."),
                raw,
            )
        }
    }
}
