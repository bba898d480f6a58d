use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use super::domain::RatedResponse;
use super::oracle::{generate_within, PromptPurpose, PromptRequest, TextOracle};
use super::rating::prompts::{summary_prompt, SUMMARY_SYSTEM_PROMPT};
use super::rating::RatingSettings;

const SUMMARY_TEMPERATURE: f32 = 0.5;
const NARRATIVE_SCORE_LABEL: &str = "overall performance score";

/// Overall narrative and score for one submission.
///
/// `score` is the rounded mean of the category ratings and is authoritative;
/// `narrative_score` is whatever the narrative restated. It is reported next to
/// the mean but never persisted or used in place of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallAssessment {
    pub summary: String,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative_score: Option<f64>,
    pub rated_count: usize,
}

pub struct AggregateSummarizer<O: ?Sized> {
    oracle: Arc<O>,
    settings: RatingSettings,
}

impl<O> AggregateSummarizer<O>
where
    O: TextOracle + ?Sized,
{
    pub fn new(oracle: Arc<O>, settings: RatingSettings) -> Self {
        Self { oracle, settings }
    }

    pub async fn summarize(&self, employee_name: &str, rated: &[RatedResponse]) -> OverallAssessment {
        let score = mean_score(rated);

        if rated.is_empty() {
            return OverallAssessment {
                summary: "No category ratings were available to summarize.".to_string(),
                score,
                narrative_score: None,
                rated_count: 0,
            };
        }

        let request = PromptRequest {
            purpose: PromptPurpose::Summary,
            system_prompt: Some(SUMMARY_SYSTEM_PROMPT.to_string()),
            user_prompt: summary_prompt(employee_name, rated),
            temperature: SUMMARY_TEMPERATURE,
        };

        let (summary, narrative_score) =
            match generate_within(self.oracle.as_ref(), request, self.settings.timeout).await {
                Ok(text) => {
                    let narrative_score = parse_narrative_score(&text);
                    (text, narrative_score)
                }
                Err(err) => {
                    warn!(employee = %employee_name, error = %err, "summary oracle failed; using placeholder");
                    (format!("Overall summary unavailable ({err})."), None)
                }
            };

        OverallAssessment {
            summary,
            score,
            narrative_score,
            rated_count: rated.len(),
        }
    }
}

/// Mean of the category scores rounded to two decimals; `0.0` when empty.
pub fn mean_score(rated: &[RatedResponse]) -> f64 {
    if rated.is_empty() {
        return 0.0;
    }
    let total: u32 = rated.iter().map(|rating| u32::from(rating.score)).sum();
    round_to_hundredths(f64::from(total) / rated.len() as f64)
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Reads `Overall performance score: X.XX/5` out of a narrative, if present and in range.
pub fn parse_narrative_score(text: &str) -> Option<f64> {
    let line = text
        .lines()
        .find(|line| line.to_ascii_lowercase().contains(NARRATIVE_SCORE_LABEL))?;
    let (_, remainder) = line.split_once(':')?;
    let token = remainder
        .split('/')
        .next()?
        .trim_matches(|c: char| c.is_whitespace() || c == '*');
    let value: f64 = token.parse().ok()?;
    (0.0..=5.0).contains(&value).then_some(value)
}
