//! Line classification and fragment tokenization for the markdown-like
//! dialect found inside text leaves.
//!
//! This is deliberately not a markdown parser. It recognizes the narrow set
//! of conventions that show up in engine output: `#` headings, `|`-delimited
//! table rows, `**bold**` / `*italic*` spans, emoji, and list-numbering
//! prefixes. Classification precedence is heading, then table row, then
//! paragraph; first match wins.

use once_cell::sync::Lazy;
use regex::Regex;

/// Paragraph lines longer than this many characters are forced to full
/// container width.
pub const FULL_WIDTH_LENGTH: usize = 34;

static HEADING_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#+)\s+(.*)$").unwrap());

// Punctuation-pair lines like "):" or "**" are artifacts of math extraction
static PUNCT_PAIR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[\p{P}\p{S}]\s*[\p{P}\p{S}]\s*$").unwrap());
static STANDALONE_BOLD_DOT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\*\*\.?\s*$").unwrap());

static FRAGMENT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*\*(.+?)\*\*|\*([^*\s][^*]*)\*|\p{Emoji_Presentation}|\p{Emoji}\x{FE0F}")
        .unwrap()
});

static LIST_NUMBERING_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[0-9]+\.|[a-zA-Z]\)|[IVXLCDM]+\.)\s").unwrap());

// A line ending a clause (",", ":", ")" before whitespace or end-of-line) or
// opening with an enumerator gets the full container width.
static FULL_WIDTH_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z]+[):,]|[IVXLCDM]+[.:,]|[0-9]+[):,])|.+[,:)](?:\s|$)").unwrap()
});

static SEPARATOR_CELL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^:?-+:?$").unwrap());

// Whitespace-bounded stray tokens ("**", lone "*", bare ":") left behind
// when math regions are cut out of the surrounding prose
static STRAY_TOKEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|\s)(?:\*\*\s*\*\*|\*\*|[*:]+)(\s|$)").unwrap());
// "| a)" prefixes degrade to the bare enumerator
static PIPE_ENUMERATOR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\|\s*([a-zA-Z0-9]+\))").unwrap());
static HYPHEN_RUN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"-{2,}").unwrap());

/// One classified source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    /// A `#`-prefixed heading. `level` is the raw leading-hash count.
    Heading { level: usize, content: &'a str },
    /// A `|`-delimited row. Cells are trimmed and empties dropped.
    TableRow { cells: Vec<&'a str> },
    /// A header/data separator row (`|---|:--:|`). Consumed, emits nothing.
    TableSeparator,
    Paragraph(&'a str),
}

/// A typed run of paragraph text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment<'a> {
    Plain(&'a str),
    Bold(&'a str),
    Italic(&'a str),
    Emoji(&'a str),
    /// A plain run opening with a list-numbering prefix ("1.", "a)",
    /// "IV."). Rendered bold, matching the observed convention.
    ListMarker(&'a str),
}

/// Normalize a decoded text leaf: strip the engine's stray leading-dot
/// artifact and leftover backslashes, scrub per-line extraction debris
/// ([`clean_line`]), drop blank lines, and rejoin with single newlines.
pub fn normalize(text: &str) -> String {
    let text = match text.strip_prefix('.') {
        Some(rest) if !rest.trim().is_empty() => rest.trim(),
        _ => text,
    };
    let text = text.replace('\\', "");

    text.split(['\n', '\r'])
        .map(clean_line)
        .filter(|line| !line.trim().is_empty())
        .filter(|line| !PUNCT_PAIR_REGEX.is_match(line))
        .filter(|line| !STANDALONE_BOLD_DOT_REGEX.is_match(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Scrub one line of extraction debris: rewrite `| a)` enumerator prefixes,
/// remove whitespace-bounded stray tokens, and collapse hyphen runs.
/// Table rows keep their hyphens so separator lines still classify.
fn clean_line(line: &str) -> String {
    let line = PIPE_ENUMERATOR_REGEX.replace_all(line, "$1");
    let line = STRAY_TOKEN_REGEX.replace_all(&line, "${1}${2}");

    let trimmed = line.trim();
    let is_table_row = trimmed.len() >= 2 && trimmed.starts_with('|') && trimmed.ends_with('|');
    if is_table_row {
        line.into_owned()
    } else {
        HYPHEN_RUN_REGEX.replace_all(&line, "").into_owned()
    }
}

/// Classify one normalized line. Never fails; anything unrecognized is a
/// paragraph.
pub fn classify(line: &str) -> Line<'_> {
    if let Some(caps) = HEADING_REGEX.captures(line) {
        return Line::Heading {
            level: caps[1].len(),
            content: caps.get(2).map(|m| m.as_str().trim()).unwrap_or(""),
        };
    }

    let trimmed = line.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('|') && trimmed.ends_with('|') {
        let cells: Vec<&str> = trimmed
            .split('|')
            .map(str::trim)
            .filter(|cell| !cell.is_empty())
            .collect();

        if !cells.is_empty() && cells.iter().all(|cell| SEPARATOR_CELL_REGEX.is_match(cell)) {
            return Line::TableSeparator;
        }
        return Line::TableRow { cells };
    }

    Line::Paragraph(line)
}

/// Split a paragraph (or heading body) into ordered typed fragments in a
/// single pass, preserving source order.
pub fn fragments(line: &str) -> Vec<Fragment<'_>> {
    let mut out = Vec::new();
    let mut last = 0;

    for caps in FRAGMENT_REGEX.captures_iter(line) {
        let whole = caps.get(0).unwrap();
        if whole.start() > last {
            push_plain(&mut out, &line[last..whole.start()]);
        }

        if let Some(inner) = caps.get(1) {
            out.push(Fragment::Bold(inner.as_str()));
        } else if let Some(inner) = caps.get(2) {
            out.push(Fragment::Italic(inner.as_str()));
        } else {
            out.push(Fragment::Emoji(whole.as_str()));
        }
        last = whole.end();
    }

    if last < line.len() {
        push_plain(&mut out, &line[last..]);
    }
    out
}

fn push_plain<'a>(out: &mut Vec<Fragment<'a>>, text: &'a str) {
    if text.is_empty() {
        return;
    }
    if LIST_NUMBERING_REGEX.is_match(text.trim_start()) {
        out.push(Fragment::ListMarker(text));
    } else {
        out.push(Fragment::Plain(text));
    }
}

/// Whether a paragraph line must take the full container width.
///
/// The trigger set is load-bearing for layout: trailing clause punctuation
/// or a leading enumerator, a length above [`FULL_WIDTH_LENGTH`], or being a
/// heading/list line at all.
pub fn force_full_width(line: &str) -> bool {
    if line.chars().count() > FULL_WIDTH_LENGTH {
        return true;
    }
    if FULL_WIDTH_REGEX.is_match(line) {
        return true;
    }
    match classify(line) {
        Line::Heading { .. } => true,
        _ => LIST_NUMBERING_REGEX.is_match(line.trim_start()),
    }
}
