//! Merge command implementation

use anyhow::{Context, Result};
use duet_core::merge::merge_documents;
use duet_core::MergeStrategy;

/// Merge two markdown files into one dual-language document
pub fn merge(original: &str, translated: &str, output: &str, position: bool) -> Result<()> {
    let original_content = std::fs::read_to_string(original)
        .with_context(|| format!("Failed to read original file: {}", original))?;
    let translated_content = std::fs::read_to_string(translated)
        .with_context(|| format!("Failed to read translated file: {}", translated))?;

    let strategy = if position {
        MergeStrategy::PositionMatched
    } else {
        MergeStrategy::TitleMatched
    };

    let combined = merge_documents(&original_content, &translated_content, strategy);
    let dual_markers = combined.matches(" / ").count();

    std::fs::write(output, &combined)
        .with_context(|| format!("Failed to write output file: {}", output))?;

    println!(
        "Merged {} + {} -> {} ({} dual-language lines)",
        original, translated, output, dual_markers
    );
    Ok(())
}
