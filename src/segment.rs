//! Recommendation-text segmentation.
//!
//! The recommendation service returns one opaque, loosely structured
//! text blob: numbered items, sometimes wrapped in markdown emphasis or
//! `### N.` headings, sometimes neither. A line scanner recognizes the
//! marker grammar (`[emphasis]* N. content`) and produces an ordered
//! list of tool blocks plus a parallel list of short tool names.
//!
//! The scanner deliberately keeps the quirks of loosely structured
//! input: names and blocks are not guaranteed to stay in sync when the
//! heading pattern only matches some items, and names that were selected
//! before a text update are never pruned downstream.

/// Maximum number of tool blocks / names retained.
pub const MAX_TOOLS: usize = 5;

/// Result of segmenting one recommendation text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segmentation {
    /// Contiguous chunks of the source text, one per enumerated item.
    pub blocks: Vec<String>,
    /// Short labels extracted from item headings, deduplicated.
    pub names: Vec<String>,
}

impl Segmentation {
    /// True when the source text produced nothing.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty() && self.names.is_empty()
    }
}

/// Split a recommendation text into tool blocks and tool names.
///
/// Empty or whitespace-only input yields an empty segmentation; the
/// caller distinguishes "not ready" from "ready but zero items".
pub fn segment(text: &str) -> Segmentation {
    if text.trim().is_empty() {
        return Segmentation::default();
    }

    let blocks = split_blocks(text);
    let mut names = extract_names(text);

    if names.is_empty() && !blocks.is_empty() {
        // Heading pattern matched nothing; fall back to first lines so
        // names and blocks stay in sync.
        for block in &blocks {
            let first_line = block.lines().next().unwrap_or("");
            names.push(strip_numeric_marker(first_line).trim().to_string());
        }
    }

    names.truncate(MAX_TOOLS);
    Segmentation { blocks, names }
}

/// Split at every line that opens a new enumerated item, keeping the
/// marker line with the block that follows it. Content before the first
/// marker forms a leading block of its own.
fn split_blocks(text: &str) -> Vec<String> {
    let mut blocks: Vec<Vec<&str>> = Vec::new();
    for line in text.split('\n') {
        if blocks.is_empty() || starts_block(line) {
            blocks.push(vec![line]);
        } else if let Some(last) = blocks.last_mut() {
            last.push(line);
        }
    }

    blocks
        .into_iter()
        .map(|lines| lines.join("\n"))
        .filter(|b| !b.trim().is_empty())
        .take(MAX_TOOLS)
        .collect()
}

/// A block opens at `<digits>.<whitespace>` or `### <digits>.`.
fn starts_block(line: &str) -> bool {
    if let Some(rest) = eat_digits_dot(line) {
        return rest.is_empty() || rest.starts_with(char::is_whitespace);
    }
    if let Some(rest) = line.strip_prefix("###") {
        // Heading markers do not require trailing whitespace.
        return eat_digits_dot(rest.trim_start()).is_some();
    }
    false
}

/// Scan every line for a heading candidate: up to 3 leading emphasis or
/// heading characters, optional whitespace, `<digits>.`, then the rest
/// of the line as the name. Duplicates are dropped, first-seen wins.
fn extract_names(text: &str) -> Vec<String> {
    let mut names = Vec::new();
    for line in text.lines() {
        let Some(candidate) = heading_candidate(line) else {
            continue;
        };
        let name = clean_name(candidate);
        if !name.is_empty() && !names.iter().any(|n| n == &name) {
            names.push(name);
        }
    }
    names
}

/// Match the marker grammar against one line, returning the raw name.
fn heading_candidate(line: &str) -> Option<&str> {
    let mut rest = line;
    let mut markers = 0usize;
    while let Some(stripped) = rest
        .strip_prefix('*')
        .or_else(|| rest.strip_prefix('#'))
    {
        markers += 1;
        if markers > 3 {
            return None;
        }
        rest = stripped;
    }
    let rest = eat_digits_dot(rest.trim_start())?;
    let candidate = rest.trim_start();
    if candidate.is_empty() {
        None
    } else {
        Some(candidate)
    }
}

/// Strip emphasis characters, cut the name off at the first separator,
/// and trim. `"**Acme CRM** - great"` becomes `"Acme CRM"`.
fn clean_name(candidate: &str) -> String {
    let without_emphasis: String = candidate.chars().filter(|c| *c != '*').collect();
    let cut = without_emphasis
        .find(['-', ':'])
        .map(|i| &without_emphasis[..i])
        .unwrap_or(&without_emphasis);
    cut.trim().to_string()
}

/// Consume `<digits>.` from the start of `s`, returning the remainder.
fn eat_digits_dot(s: &str) -> Option<&str> {
    let digits = s.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    s[digits..].strip_prefix('.')
}

/// Remove a leading `<digits>.` marker and following whitespace.
fn strip_numeric_marker(line: &str) -> &str {
    match eat_digits_dot(line) {
        Some(rest) => rest.trim_start(),
        None => line,
    }
}
