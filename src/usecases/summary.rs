//! Summary text construction: one bounded-length message per region.
//!
//! Pure formatting, no I/O. Glyphs come from an externally supplied
//! `StyleMap` so alternate stylings need no code change.

use crate::domain::{BotError, Partition, StyleMap};

/// Build the summary message for one region.
///
/// Returns `Ok(None)` for an empty partition — nothing to publish for
/// this region, which the caller must not treat as an error. Each
/// category present gets a `"{glyph} {category}: {sites}."` line in the
/// partition's iteration order; lines are joined by a blank line and
/// wrapped in the region template. Output longer than `max_len`
/// characters is hard-cut to `max_len - 1` characters plus one ellipsis.
///
/// Fails with a config error when a bucket's category has no entry in
/// `styles`.
pub fn summary(
    region_name: &str,
    data: &Partition,
    max_len: usize,
    styles: &StyleMap,
) -> Result<Option<String>, BotError> {
    if data.is_empty() {
        return Ok(None);
    }

    let mut lines = Vec::with_capacity(data.len());
    for (category, records) in data.iter() {
        let style = styles.get(category).ok_or_else(|| {
            BotError::Config(format!("no glyph mapping for forecast category {category}"))
        })?;
        let sites = records
            .iter()
            .map(|r| r.site_name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("{} {}: {}.", style.glyph, category, sites));
    }

    let text = format!(
        "Pollution forecast for {}:\n{}\n",
        region_name,
        lines.join("\n\n")
    );
    Ok(Some(truncate(text, max_len)))
}

/// Hard character-count cut, not a semantic summarizer: may split
/// mid-word or mid-line. Counts characters, not bytes.
fn truncate(text: String, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text;
    }
    let mut cut: String = text.chars().take(max_len.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
