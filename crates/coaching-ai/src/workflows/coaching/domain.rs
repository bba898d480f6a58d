use serde::{Deserialize, Serialize};

/// Score assigned whenever the oracle's rating cannot be used.
pub const FALLBACK_SCORE: u8 = 3;

pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 5;

/// A performance dimension and the question put to the supervisor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPrompt {
    pub category: String,
    pub prompt_text: String,
}

impl CategoryPrompt {
    pub fn new(category: impl Into<String>, prompt_text: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            prompt_text: prompt_text.into(),
        }
    }
}

/// Fixed, ordered list of categories evaluated on every submission.
///
/// Insertion order is the display order in reports and the column order in the
/// submissions sheet, so it must never be reshuffled for an existing store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCatalog {
    prompts: Vec<CategoryPrompt>,
}

impl CategoryCatalog {
    pub fn new(prompts: Vec<CategoryPrompt>) -> Self {
        Self { prompts }
    }

    /// The six-category coaching assessment used by the field supervisors.
    pub fn standard() -> Self {
        Self::new(vec![
            CategoryPrompt::new(
                "Safety Commitment",
                "How does the employee follow safety procedures and encourage others to work safely?",
            ),
            CategoryPrompt::new(
                "Job Knowledge",
                "How well does the employee understand the tools, processes and standards of the role?",
            ),
            CategoryPrompt::new(
                "Quality of Work",
                "Describe the accuracy and thoroughness of the employee's recent work.",
            ),
            CategoryPrompt::new(
                "Communication",
                "How clearly and respectfully does the employee communicate with the team and customers?",
            ),
            CategoryPrompt::new(
                "Teamwork",
                "How does the employee support coworkers and contribute to shared goals?",
            ),
            CategoryPrompt::new(
                "Attendance & Reliability",
                "Describe the employee's punctuality, attendance and follow-through on commitments.",
            ),
        ])
    }

    pub fn prompts(&self) -> &[CategoryPrompt] {
        &self.prompts
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.prompts.iter().map(|prompt| prompt.category.as_str())
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    pub fn position(&self, category: &str) -> Option<usize> {
        self.prompts
            .iter()
            .position(|prompt| prompt.category == category)
    }
}

/// Supervisor's free-text answer for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawResponse {
    pub category: String,
    pub text: String,
}

/// A response after it has been scored.
///
/// `score` is always within `MIN_SCORE..=MAX_SCORE`; `raw` keeps the unparsed
/// oracle text (empty when the oracle was never reached).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatedResponse {
    pub category: String,
    pub response: String,
    pub score: u8,
    pub explanation: String,
    pub raw: String,
    #[serde(default)]
    pub fallback: bool,
}

impl RatedResponse {
    pub fn rated(
        category: impl Into<String>,
        response: impl Into<String>,
        score: u8,
        explanation: impl Into<String>,
        raw: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            response: response.into(),
            score: score.clamp(MIN_SCORE, MAX_SCORE),
            explanation: explanation.into(),
            raw: raw.into(),
            fallback: false,
        }
    }

    pub fn fallback(
        category: impl Into<String>,
        response: impl Into<String>,
        explanation: impl Into<String>,
        raw: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            response: response.into(),
            score: FALLBACK_SCORE,
            explanation: explanation.into(),
            raw: raw.into(),
            fallback: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_keeps_insertion_order() {
        let catalog = CategoryCatalog::standard();
        let labels: Vec<&str> = catalog.labels().collect();
        assert_eq!(labels.len(), 6);
        assert_eq!(labels[0], "Safety Commitment");
        assert_eq!(labels[5], "Attendance & Reliability");
        assert_eq!(catalog.position("Communication"), Some(3));
        assert_eq!(catalog.position("Unknown"), None);
    }

    #[test]
    fn rated_scores_are_clamped_into_range() {
        assert_eq!(RatedResponse::rated("A", "t", 9, "e", "r").score, MAX_SCORE);
        assert_eq!(RatedResponse::rated("A", "t", 0, "e", "r").score, MIN_SCORE);
        let fallback = RatedResponse::fallback("A", "t", "oracle offline", "");
        assert_eq!(fallback.score, FALLBACK_SCORE);
        assert!(fallback.fallback);
    }
}
