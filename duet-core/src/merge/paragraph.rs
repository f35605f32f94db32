//! Paragraph splitting and positional alignment of two paragraph streams

/// Split body lines into paragraphs. Consecutive non-blank lines form one
/// paragraph; a blank line always closes the current paragraph, and runs of
/// blank lines produce no empty paragraphs.
pub fn split_paragraphs(lines: &[String]) -> Vec<Vec<String>> {
    let mut paragraphs = Vec::new();
    let mut current = Vec::new();

    for line in lines {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line.clone());
        }
    }

    if !current.is_empty() {
        paragraphs.push(current);
    }

    paragraphs
}

/// Whether a paragraph contains a markdown image reference.
pub fn contains_image(paragraph: &[String]) -> bool {
    paragraph
        .iter()
        .any(|line| line.contains("![") && line.contains("]("))
}

/// Whether a paragraph reads as a bullet list: at least half of its
/// non-blank lines start with a `-`, `*` or `+` marker followed by a space.
pub fn is_bullet_list(paragraph: &[String]) -> bool {
    let mut bullets = 0;
    let mut non_blank = 0;

    for line in paragraph {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        non_blank += 1;
        if is_bullet_item(trimmed) {
            bullets += 1;
        }
    }

    non_blank > 0 && bullets * 2 >= non_blank
}

fn is_bullet_item(trimmed: &str) -> bool {
    trimmed.starts_with("- ") || trimmed.starts_with("* ") || trimmed.starts_with("+ ")
}

fn bullet_items(paragraph: &[String]) -> Vec<String> {
    paragraph
        .iter()
        .map(|line| line.trim())
        .filter(|line| is_bullet_item(line))
        .map(str::to_string)
        .collect()
}

fn strip_bullet_marker(item: &str) -> &str {
    item.trim_start_matches(['-', '*', '+'])
        .trim_start()
        .trim_end()
}

/// Pair two bullet lists item by item, joining each pair into a single
/// `- <a> / <b>` line. Unmatched trailing items from the longer list are
/// appended unmodified.
pub fn combine_bullet_lists(original: &[String], translated: &[String]) -> Vec<String> {
    let orig_items = bullet_items(original);
    let trans_items = bullet_items(translated);
    let paired = orig_items.len().min(trans_items.len());

    let mut combined = Vec::new();
    for (orig, trans) in orig_items.iter().zip(trans_items.iter()) {
        combined.push(format!(
            "- {} / {}",
            strip_bullet_marker(orig),
            strip_bullet_marker(trans)
        ));
    }
    for item in orig_items
        .iter()
        .skip(paired)
        .chain(trans_items.iter().skip(paired))
    {
        combined.push(item.clone());
    }

    combined
}

fn emphasize(line: &str) -> String {
    if line.trim().is_empty() {
        line.to_string()
    } else {
        format!("*{line}*")
    }
}

/// Align two paragraph sequences by index. Each slot is handled with these
/// rules, checked in order:
///
/// 1. an image paragraph is emitted exactly once (original side preferred),
///    so the image reference is never duplicated;
/// 2. two bullet lists are combined item by item;
/// 3. otherwise the original paragraph is emitted, then the translated one,
///    each followed by a blank separator line.
///
/// With `style_translated` set, the translated side of plain-text slots is
/// wrapped in emphasis markers line by line. Images and bullets are never
/// emphasis-wrapped.
pub fn align_paragraphs(
    original: &[String],
    translated: &[String],
    style_translated: bool,
) -> Vec<String> {
    let orig_paragraphs = split_paragraphs(original);
    let trans_paragraphs = split_paragraphs(translated);
    let slots = orig_paragraphs.len().max(trans_paragraphs.len());

    let mut combined: Vec<String> = Vec::new();
    for i in 0..slots {
        let orig = orig_paragraphs.get(i).map(Vec::as_slice).unwrap_or(&[]);
        let trans = trans_paragraphs.get(i).map(Vec::as_slice).unwrap_or(&[]);

        if contains_image(orig) || contains_image(trans) {
            let para = if !orig.is_empty() { orig } else { trans };
            combined.extend(para.iter().cloned());
            combined.push(String::new());
        } else if !orig.is_empty()
            && !trans.is_empty()
            && is_bullet_list(orig)
            && is_bullet_list(trans)
        {
            combined.extend(combine_bullet_lists(orig, trans));
            combined.push(String::new());
        } else {
            if !orig.is_empty() {
                combined.extend(orig.iter().cloned());
                combined.push(String::new());
            }
            if !trans.is_empty() {
                if style_translated {
                    combined.extend(trans.iter().map(|l| emphasize(l)));
                } else {
                    combined.extend(trans.iter().cloned());
                }
                combined.push(String::new());
            }
        }
    }

    if combined.last().is_some_and(|l| l.is_empty()) {
        combined.pop();
    }

    combined
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_split_collapses_blank_runs() {
        let body = lines("one\n\n\n\ntwo\nstill two\n\nthree");
        let paragraphs = split_paragraphs(&body);

        assert_eq!(paragraphs.len(), 3);
        assert_eq!(paragraphs[1], vec!["two", "still two"]);
    }

    #[test]
    fn test_split_then_rejoin_preserves_non_blank_content() {
        let body = lines("a\nb\n\n\nc\n\nd\n");
        let rejoined: Vec<String> = split_paragraphs(&body)
            .into_iter()
            .collect::<Vec<_>>()
            .join(&String::new());
        let original_non_blank: Vec<&String> =
            body.iter().filter(|l| !l.trim().is_empty()).collect();
        let rejoined_non_blank: Vec<&String> =
            rejoined.iter().filter(|l| !l.trim().is_empty()).collect();

        assert_eq!(original_non_blank, rejoined_non_blank);
    }

    #[test]
    fn test_bullet_detection_threshold() {
        assert!(is_bullet_list(&lines("- a\n- b")));
        assert!(is_bullet_list(&lines("- a\ncontinuation")));
        assert!(!is_bullet_list(&lines("text\ntext\n- a")));
        assert!(!is_bullet_list(&lines("")));
    }

    #[test]
    fn test_all_markers_accepted() {
        assert!(is_bullet_list(&lines("* a")));
        assert!(is_bullet_list(&lines("+ a")));
        // Marker without a trailing space is plain text
        assert!(!is_bullet_list(&lines("-a")));
    }

    #[test]
    fn test_combine_equal_bullet_lists() {
        let combined = combine_bullet_lists(
            &lines("- one\n- two\n- three"),
            &lines("- một\n- hai\n- ba"),
        );

        assert_eq!(combined, vec!["- one / một", "- two / hai", "- three / ba"]);
    }

    #[test]
    fn test_combine_uneven_bullet_lists_appends_remainder() {
        let combined = combine_bullet_lists(&lines("- one\n- two"), &lines("* một"));

        assert_eq!(combined, vec!["- one / một", "- two"]);
    }

    #[test]
    fn test_image_paragraph_emitted_once() {
        let orig = lines("![cover](cover.png)");
        let trans = lines("![cover](cover.png)");
        let combined = align_paragraphs(&orig, &trans, false);

        let image_lines = combined.iter().filter(|l| l.contains("![")).count();
        assert_eq!(image_lines, 1);
    }

    #[test]
    fn test_image_preferred_from_original_side() {
        let orig = lines("![a](img.png)");
        let trans = lines("caption text");
        let combined = align_paragraphs(&orig, &trans, true);

        assert_eq!(combined, vec!["![a](img.png)"]);
    }

    #[test]
    fn test_translated_only_image_slot_still_emitted() {
        let combined = align_paragraphs(&[], &lines("![b](other.png)"), true);
        assert_eq!(combined, vec!["![b](other.png)"]);
    }

    #[test]
    fn test_plain_slots_interleave_original_first() {
        let combined = align_paragraphs(&lines("Hello"), &lines("Xin chào"), false);
        assert_eq!(combined, vec!["Hello", "", "Xin chào"]);
    }

    #[test]
    fn test_styled_translated_paragraphs() {
        let combined = align_paragraphs(&lines("Hello"), &lines("Xin chào"), true);
        assert_eq!(combined, vec!["Hello", "", "*Xin chào*"]);
    }

    #[test]
    fn test_exhausted_side_leaves_only_other() {
        let combined = align_paragraphs(&lines("a\n\nb"), &lines("x"), false);
        assert_eq!(combined, vec!["a", "", "x", "", "b"]);
    }
}
