use std::fmt::Write as _;

use serde::Serialize;

use super::sections::{ReportSection, SectionBody};

/// Bytes produced by a renderer, ready to download or attach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedDocument {
    pub filename: String,
    pub content_type: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("document formatting failed: {0}")]
    Format(#[from] std::fmt::Error),
    #[error("document renderer failed: {0}")]
    Backend(String),
}

/// Turns report sections into a downloadable artifact.
pub trait DocumentRenderer: Send + Sync {
    fn render(
        &self,
        title: &str,
        file_stem: &str,
        sections: &[ReportSection],
    ) -> Result<RenderedDocument, RenderError>;
}

/// Markdown output: headings per section, pipe tables, signature lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownRenderer;

impl DocumentRenderer for MarkdownRenderer {
    fn render(
        &self,
        title: &str,
        file_stem: &str,
        sections: &[ReportSection],
    ) -> Result<RenderedDocument, RenderError> {
        let mut out = String::new();
        writeln!(out, "# {title}")?;

        for section in sections {
            writeln!(out, "\n## {}\n", section.title)?;
            match &section.body {
                SectionBody::Text { text } => writeln!(out, "{text}")?,
                SectionBody::Table { headers, rows } => {
                    write_row(&mut out, headers)?;
                    let divider: Vec<String> = headers.iter().map(|_| "---".to_string()).collect();
                    write_row(&mut out, &divider)?;
                    for row in rows {
                        write_row(&mut out, row)?;
                    }
                }
                SectionBody::SignOff { roles } => {
                    for role in roles {
                        writeln!(out, "{role} signature: ______________________  Date: __________\n")?;
                    }
                }
            }
        }

        Ok(RenderedDocument {
            filename: format!("{file_stem}.md"),
            content_type: "text/markdown".to_string(),
            bytes: out.into_bytes(),
        })
    }
}

fn write_row(out: &mut String, cells: &[String]) -> std::fmt::Result {
    out.push('|');
    for cell in cells {
        write!(out, " {} |", escape_cell(cell))?;
    }
    out.push('\n');
    Ok(())
}

fn escape_cell(cell: &str) -> String {
    cell.replace('|', "\\|")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("<br>")
}

/// File name stem such as `jane_doe_coaching_2025-03-14`.
pub fn document_stem(employee_name: &str, review_date: chrono::NaiveDate) -> String {
    let mut slug = String::with_capacity(employee_name.len());
    for c in employee_name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('_') && !slug.is_empty() {
            slug.push('_');
        }
    }
    let slug = slug.trim_end_matches('_');
    let slug = if slug.is_empty() { "employee" } else { slug };
    format!("{slug}_coaching_{}", review_date.format("%Y-%m-%d"))
}
