//! Markdown section parsing

use regex::Regex;
use std::sync::OnceLock;

/// One markdown section: a heading plus the raw lines below it, up to the
/// next heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Heading level, 1 through 6
    pub level: u8,

    /// Heading text with the `#` markers stripped
    pub title: String,

    /// Raw body lines, blank lines included
    pub body: Vec<String>,
}

impl Section {
    /// The section's heading rendered back as a markdown line.
    pub fn heading(&self) -> String {
        format!("{} {}", "#".repeat(self.level as usize), self.title)
    }
}

fn heading_pattern() -> &'static Regex {
    static HEADING: OnceLock<Regex> = OnceLock::new();
    HEADING.get_or_init(|| Regex::new(r"^(#{1,6})\s+(.+)$").expect("heading pattern is valid"))
}

/// Parse a markdown heading line into (level, title).
pub(crate) fn parse_heading(line: &str) -> Option<(u8, String)> {
    let caps = heading_pattern().captures(line.trim())?;
    Some((caps[1].len() as u8, caps[2].trim().to_string()))
}

/// Split a markdown document into sections at its headings.
///
/// Lines before the first heading have no section to attach to and are
/// dropped. A document with no headings yields no sections.
pub fn parse_sections(content: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current: Option<Section> = None;

    for line in content.trim().lines() {
        if let Some((level, title)) = parse_heading(line) {
            if let Some(section) = current.take() {
                sections.push(section);
            }
            current = Some(Section {
                level,
                title,
                body: Vec::new(),
            });
        } else if let Some(section) = current.as_mut() {
            section.body.push(line.to_string());
        }
    }

    if let Some(section) = current {
        sections.push(section);
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sections_counts_headings() {
        let content = "# One\n\nbody\n\n## Two\n\nmore\n\n### Three\n";
        let sections = parse_sections(content);

        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].level, 1);
        assert_eq!(sections[0].title, "One");
        assert_eq!(sections[1].level, 2);
        assert_eq!(sections[2].level, 3);
        assert!(sections[2].body.is_empty());
    }

    #[test]
    fn test_bodies_contain_no_headings() {
        let content = "# A\nline\n## B\nline\nline\n# C";
        let sections = parse_sections(content);

        assert_eq!(sections.len(), 3);
        for section in &sections {
            assert!(section.body.iter().all(|l| parse_heading(l).is_none()));
        }
    }

    #[test]
    fn test_content_before_first_heading_is_dropped() {
        let content = "preamble line\nanother\n\n# Start\nbody";
        let sections = parse_sections(content);

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Start");
        assert_eq!(sections[0].body, vec!["body"]);
    }

    #[test]
    fn test_no_headings_yields_no_sections() {
        assert!(parse_sections("just some\n\nplain text").is_empty());
        assert!(parse_sections("").is_empty());
    }

    #[test]
    fn test_heading_requires_space_and_max_six_markers() {
        assert!(parse_heading("#NoSpace").is_none());
        assert!(parse_heading("####### Seven").is_none());
        assert_eq!(parse_heading("###### Six"), Some((6, "Six".to_string())));
    }

    #[test]
    fn test_heading_roundtrip() {
        let sections = parse_sections("## Hello World\n");
        assert_eq!(sections[0].heading(), "## Hello World");
    }
}
