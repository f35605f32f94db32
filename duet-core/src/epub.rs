//! EPUB packaging of a (possibly merged) markdown manuscript
//!
//! Chapters are cut at headings H1 through H5. Content before the first
//! heading becomes an "Introduction" chapter, and a document with no
//! headings at all becomes a single chapter holding the whole body. Chapter
//! titles keep only the primary-language half of a `titleA / titleB`
//! dual-language heading, so the table of contents stays readable.

use crate::error::{ComposeError, Result};
use crate::merge::parse_heading;
use crate::render::render_html;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::OnceLock;

/// Headings at this level or above each start a new chapter.
const CHAPTER_SPLIT_LEVEL: u8 = 5;

/// Book-level metadata for the generated EPUB.
#[derive(Debug, Clone)]
pub struct BookMeta {
    /// Used when the manuscript has no H1 to take a title from
    pub fallback_title: String,
    pub author: String,
    pub language: String,
}

struct ChapterSource {
    title: String,
    markdown: String,
}

struct Asset {
    name: String,
    mime: String,
    data: Vec<u8>,
}

/// Package a markdown manuscript as an EPUB at `output`.
///
/// Image references are resolved relative to `asset_dir`, bundled under
/// `images/` inside the book, and rewritten in the markdown; missing images
/// are skipped with a warning. The EPUB is assembled fully in memory and
/// written in one shot, so a packaging failure leaves no partial output.
pub async fn package_epub(
    markdown: &str,
    asset_dir: &Path,
    meta: &BookMeta,
    output: &Path,
) -> Result<()> {
    let (markdown, assets) = collect_assets(markdown, asset_dir).await;
    let bytes = build_epub(&markdown, &assets, meta)?;
    tokio::fs::write(output, bytes).await?;
    Ok(())
}

/// Captures: alt text, target, then an optional quoted title segment
/// (leading whitespace included).
fn image_pattern() -> &'static Regex {
    static IMAGE: OnceLock<Regex> = OnceLock::new();
    IMAGE.get_or_init(|| {
        Regex::new(r#"!\[([^\]]*)\]\(([^)\s]+)(\s+"[^"]*")?\)"#).expect("image pattern is valid")
    })
}

/// Load every local image the manuscript references and rewrite the
/// references to the bundled `images/` names.
async fn collect_assets(markdown: &str, asset_dir: &Path) -> (String, Vec<Asset>) {
    let mut assets = Vec::new();
    let mut seen = HashSet::new();
    let mut bundled: HashMap<String, String> = HashMap::new();

    for caps in image_pattern().captures_iter(markdown) {
        let target = caps[2].trim().to_string();
        if target.starts_with("http://")
            || target.starts_with("https://")
            || target.starts_with("images/")
        {
            continue;
        }
        if !seen.insert(target.clone()) {
            continue;
        }

        let path = asset_dir.join(&target);
        let Some(name) = path.file_name().and_then(|n| n.to_str()).map(String::from) else {
            continue;
        };

        match tokio::fs::read(&path).await {
            Ok(data) => {
                let mime = mime_guess::from_path(&path)
                    .first_or_octet_stream()
                    .to_string();
                bundled.insert(target, format!("images/{name}"));
                assets.push(Asset { name, mime, data });
            }
            Err(_) => {
                tracing::warn!(image = %target, "image not found, skipping");
            }
        }
    }

    let rewritten = image_pattern()
        .replace_all(markdown, |caps: &regex::Captures| {
            match bundled.get(caps[2].trim()) {
                Some(new_target) => format!(
                    "![{}]({}{})",
                    &caps[1],
                    new_target,
                    caps.get(3).map_or("", |m| m.as_str())
                ),
                None => caps[0].to_string(),
            }
        })
        .to_string();

    (rewritten, assets)
}

fn build_epub(markdown: &str, assets: &[Asset], meta: &BookMeta) -> Result<Vec<u8>> {
    use epub_builder::{EpubBuilder, EpubContent, ReferenceType, ZipLibrary};

    let zip = ZipLibrary::new()
        .map_err(|e| ComposeError::Package(format!("Failed to create zip: {e}")))?;
    let mut builder = EpubBuilder::new(zip)
        .map_err(|e| ComposeError::Package(format!("Failed to create EPUB builder: {e}")))?;

    let title = extract_title(markdown).unwrap_or_else(|| meta.fallback_title.clone());
    builder
        .metadata("title", &title)
        .map_err(|e| ComposeError::Package(e.to_string()))?;
    builder
        .metadata("author", &meta.author)
        .map_err(|e| ComposeError::Package(e.to_string()))?;
    builder
        .metadata("lang", &meta.language)
        .map_err(|e| ComposeError::Package(e.to_string()))?;

    for asset in assets {
        builder
            .add_resource(
                format!("images/{}", asset.name),
                asset.data.as_slice(),
                &asset.mime,
            )
            .map_err(|e| ComposeError::Package(e.to_string()))?;
    }

    for (i, chapter) in split_chapters(markdown).iter().enumerate() {
        let xhtml = chapter_xhtml(&chapter.title, &render_html(&chapter.markdown));
        let filename = format!("chap_{:02}.xhtml", i + 1);
        builder
            .add_content(
                EpubContent::new(&filename, xhtml.as_bytes())
                    .title(&chapter.title)
                    .reftype(ReferenceType::Text),
            )
            .map_err(|e| ComposeError::Package(e.to_string()))?;
    }

    let mut out = Vec::new();
    builder
        .generate(&mut out)
        .map_err(|e| ComposeError::Package(e.to_string()))?;

    Ok(out)
}

/// Book title from the first H1, primary-language half only.
fn extract_title(markdown: &str) -> Option<String> {
    markdown.lines().find_map(|line| match parse_heading(line) {
        Some((1, title)) => Some(clean_chapter_title(&title)),
        _ => None,
    })
}

/// Keep only the primary-language half of a dual-language heading and drop
/// emphasis markers around translated titles.
fn clean_chapter_title(title: &str) -> String {
    let primary = title.split(" / ").next().unwrap_or(title);
    primary.trim().trim_matches('*').to_string()
}

fn split_chapters(markdown: &str) -> Vec<ChapterSource> {
    let mut chapters = Vec::new();
    let mut title = String::from("Introduction");
    let mut body: Vec<&str> = Vec::new();
    let mut saw_heading = false;

    for line in markdown.lines() {
        match parse_heading(line) {
            Some((level, heading_title)) if level <= CHAPTER_SPLIT_LEVEL => {
                saw_heading = true;
                if body.iter().any(|l| !l.trim().is_empty()) {
                    chapters.push(ChapterSource {
                        title: std::mem::take(&mut title),
                        markdown: body.join("\n"),
                    });
                }
                body.clear();
                title = clean_chapter_title(&heading_title);
                body.push(line);
            }
            _ => body.push(line),
        }
    }

    if !saw_heading {
        return vec![ChapterSource {
            title: "Chapter 1".to_string(),
            markdown: markdown.to_string(),
        }];
    }

    if body.iter().any(|l| !l.trim().is_empty()) {
        chapters.push(ChapterSource {
            title,
            markdown: body.join("\n"),
        });
    }

    chapters
}

fn chapter_xhtml(title: &str, body_html: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">
<head>
    <title>{}</title>
    <meta charset="UTF-8"/>
</head>
<body>
{}
</body>
</html>"#,
        escape_html(title),
        body_html
    )
}

/// Escape HTML special characters
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
