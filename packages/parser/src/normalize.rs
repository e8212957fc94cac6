//! Line normalization for text extracted from dictamen PDFs.
//!
//! Drops page furniture (bare page numbers, "Página N"), collapses runs of
//! horizontal whitespace and rejoins words hyphenated across a line break.
//! The output order is the only timeline the state machine trusts.

use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\u{a0}]+").expect("valid regex"));

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static PAGE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("valid regex"));

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static PAGE_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^p[áa]gina\s+\d+(?:\s+de\s+\d+)?$").expect("valid regex")
});

/// Normalize raw extracted lines.
///
/// Blank lines are kept (as empty strings) because the state machine uses
/// them to collapse paragraph breaks in captured text.
///
/// # Examples
/// ```
/// use cotejo_parser::normalize::normalize_lines;
///
/// let lines = normalize_lines(["ARTÍCULO 3-  Sustitúyese  el", "12", "artícu-", "lo 4"]);
/// assert_eq!(lines, vec!["ARTÍCULO 3- Sustitúyese el", "artículo 4"]);
/// ```
pub fn normalize_lines<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for raw in lines {
        let line = WHITESPACE_RUN.replace_all(raw.as_ref(), " ").trim().to_string();
        if is_page_furniture(&line) {
            continue;
        }
        if let Some(previous) = out.last_mut() {
            if ends_with_word_break(previous) && starts_lowercase(&line) {
                previous.pop();
                previous.push_str(&line);
                continue;
            }
        }
        out.push(line);
    }
    out
}

/// Split raw text into lines and normalize them.
pub fn normalize_text(text: &str) -> Vec<String> {
    normalize_lines(text.lines())
}

fn is_page_furniture(line: &str) -> bool {
    PAGE_NUMBER.is_match(line) || PAGE_LABEL.is_match(line)
}

/// A trailing hyphen directly after a letter, as in "artícu-".
fn ends_with_word_break(line: &str) -> bool {
    let mut chars = line.chars().rev();
    chars.next() == Some('-') && chars.next().is_some_and(char::is_alphabetic)
}

fn starts_lowercase(line: &str) -> bool {
    line.chars().next().is_some_and(char::is_lowercase)
}

/// Lowercase and strip diacritics, for accent-insensitive pattern matching.
///
/// Spanish drafting is inconsistent with accents ("Sustitúyese" vs
/// "Sustituyese"), so every matcher works on folded text. Folding keeps
/// `°`/`º` so law numbers like "N° 20.744" still match.
pub fn fold(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Render lines as a numbered listing (`00001|text`) for inspecting
/// pattern drift against a new document.
pub fn numbered_listing(lines: &[String]) -> String {
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        let _ = writeln!(out, "{:05}|{}", i + 1, line);
    }
    out
}
