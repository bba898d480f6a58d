mod render;
mod sections;

pub use render::{document_stem, DocumentRenderer, MarkdownRenderer, RenderError, RenderedDocument};
pub use sections::{build_sections, ReportLayout, ReportSection, SectionBody};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::coaching::domain::{CategoryCatalog, RatedResponse};
    use crate::workflows::coaching::record::SubmissionRecord;
    use chrono::NaiveDate;

    fn record() -> SubmissionRecord {
        let catalog = CategoryCatalog::standard();
        SubmissionRecord {
            timestamp: NaiveDate::from_ymd_opt(2025, 3, 14)
                .and_then(|date| date.and_hms_opt(9, 30, 0))
                .expect("valid timestamp"),
            employee_name: "Jane Doe".to_string(),
            supervisor_name: "Sam Ortiz".to_string(),
            department: "Operations".to_string(),
            review_date: NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date"),
            email: Some("jane.doe@example.com".to_string()),
            rated_responses: catalog
                .labels()
                .map(|label| RatedResponse::rated(label, "Keeps | work area tidy", 4, "Steady.", ""))
                .collect(),
            overall_score: 4.0,
            overall_summary: "A dependable contributor.".to_string(),
        }
    }

    fn table_rows(section: &ReportSection) -> &[Vec<String>] {
        match &section.body {
            SectionBody::Table { rows, .. } => rows,
            other => panic!("expected table, got {other:?}"),
        }
    }

    #[test]
    fn ratings_table_has_one_row_per_category_in_order() {
        let record = record();
        let sections = build_sections(&record, &ReportLayout::coaching());

        let titles: Vec<&str> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            [
                "Employee Information",
                "Category Ratings",
                "Overall Assessment",
                "Sign-Off"
            ]
        );

        let rows = table_rows(&sections[1]);
        assert_eq!(rows.len(), 6);
        let categories: Vec<&str> = rows.iter().map(|row| row[0].as_str()).collect();
        let catalog = CategoryCatalog::standard();
        let expected: Vec<&str> = catalog.labels().collect();
        assert_eq!(categories, expected);
        assert_eq!(rows[0][1], "4/5");
        assert_eq!(rows[0].len(), 4);
    }

    #[test]
    fn building_twice_yields_identical_sections() {
        let record = record();
        let layout = ReportLayout::coaching();
        assert_eq!(build_sections(&record, &layout), build_sections(&record, &layout));
    }

    #[test]
    fn appraisal_layout_drops_responses_and_sign_off() {
        let sections = build_sections(&record(), &ReportLayout::appraisal());
        assert_eq!(sections.len(), 3);
        assert_eq!(table_rows(&sections[1])[0].len(), 3);
        match &sections[2].body {
            SectionBody::Text { text } => {
                assert!(text.starts_with("Overall score: 4.00/5"));
                assert!(text.contains("dependable contributor"));
            }
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn markdown_renderer_escapes_cells_and_names_file() {
        let record = record();
        let sections = build_sections(&record, &ReportLayout::coaching());
        let stem = document_stem(&record.employee_name, record.review_date);
        let document = MarkdownRenderer
            .render("Employee Coaching Assessment", &stem, &sections)
            .expect("renders");

        assert_eq!(document.filename, "jane_doe_coaching_2025-03-14.md");
        assert_eq!(document.content_type, "text/markdown");
        let text = String::from_utf8(document.bytes).expect("utf8");
        assert!(text.starts_with("# Employee Coaching Assessment"));
        assert!(text.contains("| Safety Commitment | 4/5 | Steady. | Keeps \\| work area tidy |"));
        assert!(text.contains("Employee signature:"));
    }

    #[test]
    fn document_stem_handles_punctuation() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 2).expect("valid date");
        assert_eq!(document_stem("  O'Brien, Pat ", date), "o_brien_pat_coaching_2025-01-02");
        assert_eq!(document_stem("***", date), "employee_coaching_2025-01-02");
    }
}
