//! Line-level lexer.
//!
//! Classifies each normalized line on its own, without any knowledge of the
//! parse state: blank, structural heading, `ARTÍCULO N-` marker, or text.
//! Whether a marker opens an operation is decided by the header classifier.

use std::sync::LazyLock;

use cotejo_shared::numbering::{roman_value, SUFFIX_PATTERN};
use regex::Regex;

use crate::normalize::fold;

/// Structural heading level of the dictamen itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingKind {
    Title,
    Chapter,
    Section,
    Annex,
}

/// Classification of a single normalized line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Heading {
        kind: HeadingKind,
        number: Option<String>,
    },
    /// `ARTÍCULO <num>[ordinal][°º] - <tail>`, the shape of a dictamen header.
    ArticleMarker { number: String, tail: String },
    /// Anything else. `article_like` marks lines that start like a statute
    /// article (`ARTÍCULO 30.- ...`).
    Text { article_like: bool },
}

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ARTICLE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^\s*ART[ÍI]CULO\s+(\d+(?:\s*(?:{SUFFIX_PATTERN})\b)?)\s*[°º]?\s*[-–—]\s*(.*?)\s*$"
    ))
    .expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ARTICLE_LIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^\s*["“«]?\s*ART[ÍI]CULO\s+\d+"#).expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(T[ÍI]TULO|CAP[ÍI]TULO|SECCI[ÓO]N|ANEXO)\b(.*)$").expect("valid regex")
});

const HEADING_SEPARATORS: [char; 5] = ['-', '–', '—', '.', ':'];

/// Classify one normalized line.
///
/// # Examples
/// ```
/// use cotejo_parser::lexer::{classify_line, HeadingKind, LineKind};
///
/// assert_eq!(
///     classify_line("TÍTULO II"),
///     LineKind::Heading { kind: HeadingKind::Title, number: Some("II".to_string()) }
/// );
/// assert_eq!(
///     classify_line("Capítulo VIII del Título III de la Ley"),
///     LineKind::Text { article_like: false }
/// );
/// ```
pub fn classify_line(line: &str) -> LineKind {
    if line.trim().is_empty() {
        return LineKind::Blank;
    }
    if let Some(caps) = ARTICLE_MARKER.captures(line) {
        return LineKind::ArticleMarker {
            number: caps[1].split_whitespace().collect::<Vec<_>>().join(" "),
            tail: caps[2].to_string(),
        };
    }
    if let Some(heading) = classify_heading(line) {
        return heading;
    }
    LineKind::Text {
        article_like: is_article_like(line),
    }
}

/// Whether a line starts like a statute article.
pub fn is_article_like(line: &str) -> bool {
    ARTICLE_LIKE.is_match(line)
}

/// Recognise standalone headings only, so wrapped prose such as
/// "Capítulo VIII del Título III" stays text.
fn classify_heading(line: &str) -> Option<LineKind> {
    let caps = HEADING.captures(line)?;
    let kind = match fold(&caps[1]).as_str() {
        "titulo" => HeadingKind::Title,
        "capitulo" => HeadingKind::Chapter,
        "seccion" => HeadingKind::Section,
        _ => HeadingKind::Annex,
    };
    let rest = caps[2].trim();

    let first = rest.split_whitespace().next().unwrap_or("");
    let token = first.trim_end_matches(HEADING_SEPARATORS);
    let (number, remainder) = if is_division_number(token) {
        (Some(token.to_string()), rest[first.len()..].trim())
    } else {
        (None, rest)
    };
    let punctuated = first.len() > token.len();

    let standalone = remainder.is_empty()
        || punctuated
        || remainder.starts_with(HEADING_SEPARATORS)
        || remainder.chars().next().is_some_and(char::is_uppercase);
    standalone.then_some(LineKind::Heading { kind, number })
}

fn is_division_number(token: &str) -> bool {
    if token.is_empty() {
        return false;
    }
    let all_digits = token.chars().all(|c| c.is_ascii_digit());
    let upper_roman = token.chars().all(|c| c.is_ascii_uppercase()) && roman_value(token).is_some();
    all_digits || upper_roman || fold(token) == "unico"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heading(kind: HeadingKind, number: Option<&str>) -> LineKind {
        LineKind::Heading {
            kind,
            number: number.map(String::from),
        }
    }

    #[test]
    fn test_article_marker() {
        assert_eq!(
            classify_line("ARTÍCULO 5°- Sustitúyese el artículo 30"),
            LineKind::ArticleMarker {
                number: "5".to_string(),
                tail: "Sustitúyese el artículo 30".to_string()
            }
        );
        assert_eq!(
            classify_line("Artículo 12 bis – "),
            LineKind::ArticleMarker {
                number: "12 bis".to_string(),
                tail: String::new()
            }
        );
    }

    #[test]
    fn test_statute_article_is_text() {
        assert_eq!(
            classify_line("ARTÍCULO 30.- Texto nuevo."),
            LineKind::Text { article_like: true }
        );
        assert_eq!(
            classify_line("\"ARTÍCULO 92 quater.- Habilitación"),
            LineKind::Text { article_like: true }
        );
        assert_eq!(
            classify_line("el artículo 30 de la ley"),
            LineKind::Text { article_like: false }
        );
    }

    #[test]
    fn test_headings() {
        assert_eq!(classify_line("TÍTULO I"), heading(HeadingKind::Title, Some("I")));
        assert_eq!(classify_line("Titulo 2"), heading(HeadingKind::Title, Some("2")));
        assert_eq!(
            classify_line("CAPÍTULO II - DISPOSICIONES GENERALES"),
            heading(HeadingKind::Chapter, Some("II"))
        );
        assert_eq!(
            classify_line("TÍTULO III. De los derechos"),
            heading(HeadingKind::Title, Some("III"))
        );
        assert_eq!(classify_line("CAPÍTULO ÚNICO"), heading(HeadingKind::Chapter, Some("ÚNICO")));
        assert_eq!(classify_line("ANEXO"), heading(HeadingKind::Annex, None));
        assert_eq!(
            classify_line("SECCIÓN Modernización"),
            heading(HeadingKind::Section, None)
        );
    }

    #[test]
    fn test_wrapped_prose_is_not_a_heading() {
        assert_eq!(
            classify_line("Capítulo VIII del Título III de la Ley N° 20.744."),
            LineKind::Text { article_like: false }
        );
        assert_eq!(
            classify_line("título de la presente ley"),
            LineKind::Text { article_like: false }
        );
    }

    #[test]
    fn test_blank() {
        assert_eq!(classify_line("   "), LineKind::Blank);
    }
}
