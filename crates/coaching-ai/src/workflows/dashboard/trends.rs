use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::NaiveDate;
use serde::Serialize;

use crate::workflows::coaching::StoredSubmission;

pub(crate) const TREND_SYSTEM_PROMPT: &str = "You write concise summaries for HR coaching.";
pub(crate) const SENTIMENT_SYSTEM_PROMPT: &str = "You classify employee coaching sentiment.";

const NO_CATEGORY: &str = "N/A";

/// All readable reviews for one employee, oldest first.
#[derive(Debug, Clone)]
pub struct EmployeeHistory {
    pub employee: String,
    pub entries: Vec<(NaiveDate, StoredSubmission)>,
}

impl EmployeeHistory {
    pub fn latest(&self) -> Option<&(NaiveDate, StoredSubmission)> {
        self.entries.last()
    }

    pub fn total(&self) -> usize {
        self.entries.len()
    }
}

/// Groups submissions by employee name, sorted by name.
///
/// Rows whose review date cannot be read, or with no employee name, are
/// dropped and counted in the second element.
pub fn group_histories(submissions: Vec<StoredSubmission>) -> (Vec<EmployeeHistory>, usize) {
    let mut grouped: BTreeMap<String, Vec<(NaiveDate, StoredSubmission)>> = BTreeMap::new();
    let mut skipped = 0;

    for submission in submissions {
        let employee = submission.employee_name.trim().to_string();
        match submission.review_date_parsed() {
            Some(date) if !employee.is_empty() => {
                grouped.entry(employee).or_default().push((date, submission));
            }
            _ => skipped += 1,
        }
    }

    let histories = grouped
        .into_iter()
        .map(|(employee, mut entries)| {
            entries.sort_by_key(|(date, _)| *date);
            EmployeeHistory { employee, entries }
        })
        .collect();

    (histories, skipped)
}

/// Category that most often held the lowest score of a review.
///
/// Ties inside a review and across reviews go to the earlier catalog category.
pub fn weakest_category(history: &EmployeeHistory) -> String {
    let mut counts: Vec<(String, usize)> = Vec::new();

    for (_, submission) in &history.entries {
        let Some(lowest) = submission.scores().map(|(_, score)| score).min() else {
            continue;
        };
        let Some((category, _)) = submission.scores().find(|(_, score)| *score == lowest) else {
            continue;
        };
        match counts.iter_mut().find(|(name, _)| name == category) {
            Some((_, count)) => *count += 1,
            None => counts.push((category.to_string(), 1)),
        }
    }

    let order = |name: &str| {
        history
            .entries
            .first()
            .and_then(|(_, submission)| {
                submission
                    .categories
                    .iter()
                    .position(|entry| entry.category == name)
            })
            .unwrap_or(usize::MAX)
    };

    counts
        .iter()
        .max_by(|(a_name, a_count), (b_name, b_count)| {
            a_count
                .cmp(b_count)
                .then_with(|| order(b_name).cmp(&order(a_name)))
        })
        .map(|(name, _)| name.clone())
        .unwrap_or_else(|| NO_CATEGORY.to_string())
}

/// One line per review: date, overall score, lowest category and the first
/// line of the stored summary.
pub fn history_digest(history: &EmployeeHistory) -> String {
    let mut digest = String::new();
    for (date, submission) in &history.entries {
        let overall = submission
            .overall_score
            .map(|score| format!("{score:.2}/5"))
            .unwrap_or_else(|| "unscored".to_string());
        let _ = write!(digest, "{}: overall {overall}", date.format("%Y-%m-%d"));

        if let Some((category, score)) = submission.scores().min_by_key(|(_, score)| *score) {
            let _ = write!(digest, "; lowest {category} {score}/5");
        }
        let note = submission.overall_summary.lines().next().unwrap_or("").trim();
        if !note.is_empty() {
            let _ = write!(digest, ". {note}");
        }
        digest.push('\n');
    }
    digest.trim_end().to_string()
}

pub(crate) fn trend_prompt(digest: &str) -> String {
    format!(
        "You are a concise workplace coaching analyst.\n\
         Given this coaching history, write a 1-2 sentence summary highlighting key trends, \
         improvements or recurring weak areas.\n\n\
         Coaching History:\n{digest}"
    )
}

pub(crate) fn sentiment_prompt(digest: &str) -> String {
    format!(
        "Based on the following coaching history, classify the overall tone as either POSITIVE or NEGATIVE.\n\
         Coaching History:\n{digest}\n\n\
         Respond with only one word: POSITIVE or NEGATIVE."
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sentiment {
    Positive,
    Negative,
    Unknown,
}

impl Sentiment {
    pub fn parse(raw: &str) -> Self {
        let word = raw
            .trim()
            .trim_matches(|c: char| !c.is_ascii_alphabetic())
            .to_ascii_uppercase();
        match word.as_str() {
            "POSITIVE" => Self::Positive,
            "NEGATIVE" => Self::Negative,
            _ => Self::Unknown,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Positive => "POSITIVE",
            Self::Negative => "NEGATIVE",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// One employee line of the dashboard sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardRow {
    pub employee: String,
    pub supervisor: String,
    pub department: String,
    pub total_coachings: usize,
    pub last_review_date: NaiveDate,
    pub weakest_category: String,
    pub trend_summary: String,
    pub sentiment: Sentiment,
}

impl DashboardRow {
    pub fn to_cells(&self) -> Vec<String> {
        vec![
            self.employee.clone(),
            self.supervisor.clone(),
            self.department.clone(),
            self.total_coachings.to_string(),
            self.last_review_date.format("%Y-%m-%d").to_string(),
            self.weakest_category.clone(),
            self.trend_summary.clone(),
            self.sentiment.label().to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::coaching::{CategoryCatalog, RowSchema};

    fn stored(employee: &str, date: &str, scores: &[&str]) -> StoredSubmission {
        let schema = RowSchema::for_catalog(&CategoryCatalog::standard());
        let mut row = vec![
            "2025-01-01 08:00:00".to_string(),
            String::new(),
            employee.to_string(),
            "Sam Ortiz".to_string(),
            date.to_string(),
            "Operations".to_string(),
        ];
        for score in scores {
            row.push("response".to_string());
            row.push(score.to_string());
        }
        StoredSubmission::from_row(&schema, &row)
    }

    #[test]
    fn groups_by_employee_and_skips_unreadable_dates() {
        let (histories, skipped) = group_histories(vec![
            stored("Zoe Park", "2025-02-01", &["4"]),
            stored("Ana Diaz", "03/01/2025", &["3"]),
            stored("Ana Diaz", "2025-01-15", &["2"]),
            stored("Ana Diaz", "sometime", &["5"]),
            stored("  ", "2025-01-15", &["5"]),
        ]);

        assert_eq!(skipped, 2);
        let names: Vec<&str> = histories.iter().map(|h| h.employee.as_str()).collect();
        assert_eq!(names, ["Ana Diaz", "Zoe Park"]);
        assert_eq!(histories[0].total(), 2);
        assert_eq!(
            histories[0].latest().map(|(date, _)| *date),
            NaiveDate::from_ymd_opt(2025, 3, 1)
        );
    }

    #[test]
    fn weakest_category_counts_lowest_per_review() {
        let (histories, _) = group_histories(vec![
            stored("Ana Diaz", "2025-01-01", &["4", "2", "5", "2", "4", "4"]),
            stored("Ana Diaz", "2025-02-01", &["3", "4", "5", "1", "4", "4"]),
            stored("Ana Diaz", "2025-03-01", &["4", "4", "5", "2", "4", "4"]),
        ]);
        assert_eq!(weakest_category(&histories[0]), "Communication");
    }

    #[test]
    fn weakest_category_ties_go_to_catalog_order() {
        let (histories, _) = group_histories(vec![
            stored("Ana Diaz", "2025-01-01", &["4", "4", "4", "4", "2", "4"]),
            stored("Ana Diaz", "2025-02-01", &["4", "1", "4", "4", "4", "4"]),
        ]);
        assert_eq!(weakest_category(&histories[0]), "Job Knowledge");
    }

    #[test]
    fn weakest_category_is_na_without_scores() {
        let (histories, _) = group_histories(vec![stored("Ana Diaz", "2025-01-01", &[])]);
        assert_eq!(weakest_category(&histories[0]), "N/A");
    }

    #[test]
    fn digest_lists_reviews_oldest_first() {
        let (histories, _) = group_histories(vec![
            stored("Ana Diaz", "2025-02-01", &["4", "3"]),
            stored("Ana Diaz", "2025-01-01", &["2", "5"]),
        ]);
        let digest = history_digest(&histories[0]);
        let lines: Vec<&str> = digest.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("2025-01-01: overall unscored; lowest Safety Commitment 2/5"));
        assert!(lines[1].contains("lowest Job Knowledge 3/5"));
    }

    #[test]
    fn sentiment_parsing_is_forgiving_but_strict_on_words() {
        assert_eq!(Sentiment::parse(" positive.\n"), Sentiment::Positive);
        assert_eq!(Sentiment::parse("**NEGATIVE**"), Sentiment::Negative);
        assert_eq!(Sentiment::parse("Mostly positive"), Sentiment::Unknown);
        assert_eq!(Sentiment::parse(""), Sentiment::Unknown);
    }
}
