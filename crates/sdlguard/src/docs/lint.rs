//! Document shape lint.
//!
//! Markdown is reduced to an outline of headings and table headers, which
//! is all the checks need. Table contents are never inspected.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use serde::Serialize;

use super::DocumentKind;
use crate::stride::StrideCategory;

/// Columns every STRIDE category table must have.
pub const STRIDE_COLUMNS: [&str; 4] = ["Threat", "Likelihood", "Impact", "Mitigation"];

/// Columns the roadmap metrics table must have.
pub const METRICS_COLUMNS: [&str; 3] = ["Metric", "Target", "Current"];

/// Heading that opens the STRIDE section of a threat model.
pub const STRIDE_SECTION: &str = "STRIDE Analysis";

/// A single problem found in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintIssue {
    /// 1-based line the issue refers to, if it refers to one.
    pub line: Option<usize>,
    /// What is wrong.
    pub message: String,
}

impl LintIssue {
    fn at(line: usize, message: impl Into<String>) -> Self {
        Self {
            line: Some(line),
            message: message.into(),
        }
    }

    fn document(message: impl Into<String>) -> Self {
        Self {
            line: None,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for LintIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {line}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Result of linting one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintReport {
    /// Which document shape was checked.
    pub document: DocumentKind,
    /// Problems found, in document order where possible.
    pub issues: Vec<LintIssue>,
}

impl LintReport {
    /// Whether no issues were found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Block {
    Heading {
        level: usize,
        text: String,
        line: usize,
    },
    Table {
        header: Vec<String>,
        line: usize,
    },
}

fn heading_level_to_usize(level: HeadingLevel) -> usize {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn line_of(markdown: &str, offset: usize) -> usize {
    markdown
        .get(..offset)
        .map_or(0, |prefix| prefix.matches('\n').count())
        + 1
}

/// Reduce a document to its headings and table headers.
fn outline(markdown: &str) -> Vec<Block> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut blocks = Vec::new();
    let mut heading: Option<(usize, usize, String)> = None;
    let mut table: Option<(usize, Vec<String>)> = None;
    let mut in_head = false;
    let mut cell: Option<String> = None;

    for (event, range) in Parser::new_ext(markdown, options).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                heading = Some((
                    heading_level_to_usize(level),
                    line_of(markdown, range.start),
                    String::new(),
                ));
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, line, text)) = heading.take() {
                    blocks.push(Block::Heading {
                        level,
                        text: text.trim().to_string(),
                        line,
                    });
                }
            }
            Event::Start(Tag::Table(_)) => {
                table = Some((line_of(markdown, range.start), Vec::new()));
            }
            Event::End(TagEnd::Table) => {
                if let Some((line, header)) = table.take() {
                    blocks.push(Block::Table { header, line });
                }
            }
            Event::Start(Tag::TableHead) => in_head = true,
            Event::End(TagEnd::TableHead) => in_head = false,
            Event::Start(Tag::TableCell) if in_head => cell = Some(String::new()),
            Event::End(TagEnd::TableCell) => {
                if let (Some(text), Some((_, header))) = (cell.take(), table.as_mut()) {
                    header.push(text.trim().to_string());
                }
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, _, buf)) = heading.as_mut() {
                    buf.push_str(&text);
                } else if let Some(buf) = cell.as_mut() {
                    buf.push_str(&text);
                }
            }
            _ => {}
        }
    }

    blocks
}

fn header_matches(header: &[String], expected: &[&str]) -> bool {
    header.len() == expected.len()
        && header
            .iter()
            .zip(expected)
            .all(|(got, want)| got.eq_ignore_ascii_case(want))
}

/// Check a threat model document.
///
/// The `STRIDE Analysis` section must contain exactly one heading per STRIDE
/// category and nothing else, and each category heading must be followed by
/// a table with the [`STRIDE_COLUMNS`] header.
#[must_use]
pub fn lint_threat_model(markdown: &str) -> LintReport {
    let blocks = outline(markdown);
    let mut issues = Vec::new();

    let section_start = blocks.iter().enumerate().find_map(|(index, b)| match b {
        Block::Heading { level, text, .. } if text.eq_ignore_ascii_case(STRIDE_SECTION) => {
            Some((index, *level))
        }
        _ => None,
    });

    let section: &[Block] = match section_start {
        Some((start, top)) => {
            let rest = &blocks[start + 1..];
            let end = rest
                .iter()
                .position(|b| matches!(b, Block::Heading { level, .. } if *level <= top))
                .unwrap_or(rest.len());
            &rest[..end]
        }
        None => {
            issues.push(LintIssue::document(format!(
                "missing '{STRIDE_SECTION}' heading"
            )));
            &blocks
        }
    };

    let mut seen = [0usize; 6];
    for (index, block) in section.iter().enumerate() {
        let Block::Heading { text, line, .. } = block else {
            continue;
        };

        let Some(slot) = StrideCategory::ALL
            .iter()
            .position(|c| c.name().eq_ignore_ascii_case(text))
        else {
            if section_start.is_some() {
                issues.push(LintIssue::at(
                    *line,
                    format!("unexpected heading '{text}' in {STRIDE_SECTION}"),
                ));
            }
            continue;
        };

        seen[slot] += 1;
        if seen[slot] > 1 {
            issues.push(LintIssue::at(*line, format!("duplicate STRIDE heading '{text}'")));
        }

        let table = section[index + 1..]
            .iter()
            .take_while(|b| !matches!(b, Block::Heading { .. }))
            .find_map(|b| match b {
                Block::Table { header, line } => Some((header, *line)),
                Block::Heading { .. } => None,
            });
        match table {
            Some((header, table_line)) if !header_matches(header, &STRIDE_COLUMNS) => {
                issues.push(LintIssue::at(
                    table_line,
                    format!(
                        "table under '{text}' has columns ({}), expected ({})",
                        header.join(", "),
                        STRIDE_COLUMNS.join(", ")
                    ),
                ));
            }
            Some(_) => {}
            None => issues.push(LintIssue::at(*line, format!("no table under '{text}'"))),
        }
    }

    for (category, count) in StrideCategory::ALL.iter().zip(seen) {
        if count == 0 {
            issues.push(LintIssue::document(format!(
                "missing STRIDE heading '{}'",
                category.name()
            )));
        }
    }

    LintReport {
        document: DocumentKind::ThreatModel,
        issues,
    }
}

/// Check a roadmap document: it must contain a metrics table with the
/// [`METRICS_COLUMNS`] header.
#[must_use]
pub fn lint_roadmap(markdown: &str) -> LintReport {
    let has_metrics = outline(markdown).iter().any(|b| match b {
        Block::Table { header, .. } => header_matches(header, &METRICS_COLUMNS),
        Block::Heading { .. } => false,
    });

    let issues = if has_metrics {
        Vec::new()
    } else {
        vec![LintIssue::document(format!(
            "no metrics table with columns ({})",
            METRICS_COLUMNS.join(", ")
        ))]
    };

    LintReport {
        document: DocumentKind::Roadmap,
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::{ROADMAP_TEMPLATE, THREAT_MODEL_TEMPLATE};

    const STRIDE_TABLE: &str =
        "| Threat | Likelihood | Impact | Mitigation |\n|---|---|---|---|\n| a | b | c | d |\n";

    fn stride_doc(categories: &[&str]) -> String {
        let mut doc = String::from("# Model\n\n## STRIDE Analysis\n\n");
        for category in categories {
            doc.push_str(&format!("### {category}\n\n{STRIDE_TABLE}\n"));
        }
        doc.push_str("## Risk Summary\n\nNone.\n");
        doc
    }

    fn all_categories() -> Vec<&'static str> {
        StrideCategory::ALL.iter().map(StrideCategory::name).collect()
    }

    #[test]
    fn test_outline_collects_headings_and_tables() {
        let blocks = outline("# Title\n\ntext\n\n| Metric | Target | Current |\n|---|---|---|\n");
        assert_eq!(
            blocks,
            vec![
                Block::Heading {
                    level: 1,
                    text: "Title".to_string(),
                    line: 1
                },
                Block::Table {
                    header: vec!["Metric".into(), "Target".into(), "Current".into()],
                    line: 5
                },
            ]
        );
    }

    #[test]
    fn test_template_has_six_stride_headings() {
        let report = lint_threat_model(THREAT_MODEL_TEMPLATE);
        assert!(report.is_clean(), "{:?}", report.issues);

        let blocks = outline(THREAT_MODEL_TEMPLATE);
        let stride_headings = blocks
            .iter()
            .filter(|b| {
                matches!(b, Block::Heading { text, .. }
                    if all_categories().contains(&text.as_str()))
            })
            .count();
        assert_eq!(stride_headings, 6);
    }

    #[test]
    fn test_roadmap_template_has_metrics_table() {
        assert!(lint_roadmap(ROADMAP_TEMPLATE).is_clean());
    }

    #[test]
    fn test_complete_document_is_clean() {
        assert!(lint_threat_model(&stride_doc(&all_categories())).is_clean());
    }

    #[test]
    fn test_missing_category_reported() {
        let mut categories = all_categories();
        categories.retain(|c| *c != "Repudiation");

        let report = lint_threat_model(&stride_doc(&categories));
        assert_eq!(report.issues.len(), 1);
        assert!(report.issues[0].message.contains("'Repudiation'"));
        assert_eq!(report.issues[0].line, None);
    }

    #[test]
    fn test_duplicate_and_unexpected_headings_reported() {
        let mut categories = all_categories();
        categories.push("Tampering");
        categories.push("Phishing");

        let report = lint_threat_model(&stride_doc(&categories));
        let messages: Vec<_> = report.issues.iter().map(|i| i.message.as_str()).collect();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("duplicate STRIDE heading 'Tampering'"));
        assert!(messages[1].contains("unexpected heading 'Phishing'"));
    }

    #[test]
    fn test_wrong_columns_reported_with_line() {
        let doc = stride_doc(&all_categories()).replacen("| Impact |", "| Severity |", 1);
        let report = lint_threat_model(&doc);

        assert_eq!(report.issues.len(), 1);
        let issue = &report.issues[0];
        assert!(issue.message.contains("Severity"));
        assert_eq!(issue.line, Some(7));
        assert!(issue.to_string().starts_with("line 7: "));
    }

    #[test]
    fn test_heading_without_table_reported() {
        let doc = "## STRIDE Analysis\n\n### Spoofing\n\nNothing yet.\n";
        let report = lint_threat_model(doc);
        assert!(report
            .issues
            .iter()
            .any(|i| i.message == "no table under 'Spoofing'"));
    }

    #[test]
    fn test_missing_section_reported() {
        let doc = stride_doc(&all_categories()).replace("## STRIDE Analysis", "## Threats");
        let report = lint_threat_model(&doc);
        assert_eq!(report.issues.len(), 1);
        assert!(report.issues[0].message.contains("missing 'STRIDE Analysis'"));
    }

    #[test]
    fn test_header_match_ignores_case() {
        let header = vec!["metric".to_string(), "TARGET".to_string(), "Current".to_string()];
        assert!(header_matches(&header, &METRICS_COLUMNS));
        assert!(!header_matches(&header[..2], &METRICS_COLUMNS));
    }

    #[test]
    fn test_roadmap_without_metrics_table() {
        let report = lint_roadmap("# Roadmap\n\n| Metric | Goal |\n|---|---|\n| a | b |\n");
        assert!(!report.is_clean());
        assert_eq!(report.document, DocumentKind::Roadmap);
    }
}
