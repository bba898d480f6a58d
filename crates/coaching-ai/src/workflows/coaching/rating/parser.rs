//! Grammar for the oracle's two-line rating answer.
//!
//! ```text
//! Rating: <1-5>/5
//! Summary: <free text>        (or "Explanation: <free text>")
//! ```
//!
//! Labels are matched case-insensitively and may carry markdown emphasis
//! (`**Rating:** 4/5`). The explanation may continue on the following lines
//! when the label line itself is empty.

use super::super::domain::{MAX_SCORE, MIN_SCORE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRating {
    pub score: u8,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RatingParseError {
    #[error("no rating line in model output")]
    MissingRatingLine,
    #[error("rating '{0}' is not a whole number")]
    NonNumericScore(String),
    #[error("rating {0} is outside 1-5")]
    OutOfRange(i64),
    #[error("no summary or explanation line in model output")]
    MissingExplanation,
}

pub fn parse_rating(raw: &str) -> Result<ParsedRating, RatingParseError> {
    let lines: Vec<&str> = raw.lines().collect();

    let rating_index = lines
        .iter()
        .position(|line| line.to_ascii_lowercase().contains("rating"))
        .ok_or(RatingParseError::MissingRatingLine)?;
    let score = parse_score(lines[rating_index])?;

    let explanation_index = lines
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != rating_index)
        .position(|(_, line)| {
            let lowered = line.to_ascii_lowercase();
            lowered.contains("summary") || lowered.contains("explanation")
        })
        .map(|offset| if offset >= rating_index { offset + 1 } else { offset })
        .ok_or(RatingParseError::MissingExplanation)?;

    let inline = clean(after_label(lines[explanation_index]));
    let explanation = if inline.is_empty() {
        lines
            .iter()
            .enumerate()
            .skip(explanation_index + 1)
            .filter(|(index, _)| *index != rating_index)
            .map(|(_, line)| clean(line))
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        inline.to_string()
    };

    if explanation.is_empty() {
        return Err(RatingParseError::MissingExplanation);
    }

    Ok(ParsedRating { score, explanation })
}

fn parse_score(line: &str) -> Result<u8, RatingParseError> {
    let remainder = after_label(line);
    let token = clean(remainder.split('/').next().unwrap_or_default());

    let value: i64 = token
        .parse()
        .map_err(|_| RatingParseError::NonNumericScore(token.to_string()))?;

    if value < i64::from(MIN_SCORE) || value > i64::from(MAX_SCORE) {
        return Err(RatingParseError::OutOfRange(value));
    }

    Ok(value as u8)
}

/// Text after the first colon, or the whole line when there is none.
fn after_label(line: &str) -> &str {
    match line.split_once(':') {
        Some((_, rest)) => rest,
        None => line,
    }
}

fn clean(value: &str) -> &str {
    value.trim_matches(|c: char| c.is_whitespace() || c == '*' || c == '_' || c == '"')
}
