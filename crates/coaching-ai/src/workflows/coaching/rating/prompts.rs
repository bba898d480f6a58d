use std::fmt::Write as _;

use super::super::domain::RatedResponse;

pub(crate) const RATING_SYSTEM_PROMPT: &str =
    "You are an HR coaching assistant who scores supervisor feedback fairly and concisely.";

pub(crate) const SUMMARY_SYSTEM_PROMPT: &str =
    "You write short, balanced performance summaries for HR coaching records.";

pub(crate) fn rating_prompt(category: &str, response_text: &str) -> String {
    format!(
        "Evaluate the following supervisor feedback for the category \"{category}\".\n\
         Rate the employee's performance from 1 (needs significant improvement) to 5 (exceptional) \
         and give a one-sentence explanation.\n\
         Answer in exactly this format:\n\
         Rating: X/5\n\
         Summary: <one sentence>\n\n\
         Feedback:\n{response_text}"
    )
}

pub(crate) fn summary_prompt(employee_name: &str, rated: &[RatedResponse]) -> String {
    let mut prompt = format!(
        "Write a short overall performance summary for {employee_name} based on these category \
         ratings. Mention key strengths and areas for improvement in 3-4 sentences, then end with \
         the line \"Overall performance score: X.XX/5\".\n\n"
    );
    for rating in rated {
        let _ = writeln!(
            prompt,
            "- {}: {}/5. {}",
            rating.category, rating.score, rating.explanation
        );
    }
    prompt
}
