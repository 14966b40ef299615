//! Loading review records from disk for `analyze --reviews-file`.

use std::path::Path;

use anyhow::Context;

/// Reads review records from a JSON array file or a JSONL file such as a
/// `--save-raw` snapshot. Blank lines in JSONL are skipped.
///
/// # Errors
///
/// Returns an error if the file cannot be read or a record is not valid JSON.
pub(crate) fn read_reviews_file(path: &Path) -> anyhow::Result<Vec<serde_json::Value>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_reviews(&content).with_context(|| format!("failed to parse {}", path.display()))
}

fn parse_reviews(content: &str) -> anyhow::Result<Vec<serde_json::Value>> {
    if content.trim_start().starts_with('[') {
        return Ok(serde_json::from_str(content)?);
    }
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).with_context(|| format!("invalid JSON on line {}", i + 1))
        })
        .collect()
}
