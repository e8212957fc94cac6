//! Parsing of replacement article text.
//!
//! A captured replacement usually reads
//! `ARTÍCULO 2°- Ámbito de aplicación. La vigencia de esta ley...` followed
//! by lettered incisos. [`parse_article_text`] splits it into the heading,
//! the body and the incisos, the way the law tree stores articles.

use std::sync::LazyLock;

use cotejo_shared::numbering::{ArticleRef, SUFFIX_PATTERN};
use cotejo_shared::Inciso;
use regex::Regex;

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ARTICLE_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"(?i)^\s*["“]?\s*ART[ÍI]CULO\s+(\d+(?:\s*(?:{SUFFIX_PATTERN})\b)?)\s*[°º]?\s*(?:\.?\s*[-–—]|\.)\s*"#
    ))
    .expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ARTICLE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"(?im)^[ \t]*["“]?[ \t]*ART[ÍI]CULO\s+(\d+(?:\s*(?:{SUFFIX_PATTERN})\b)?)\s*[°º]?\s*(?:\.?\s*[-–—]|\.)"#
    ))
    .expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static LEADING_INCISO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([a-zA-Z])\)\s*(.*)$").expect("valid regex"));

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static INCISO_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z]\)\s*").expect("valid regex"));

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static HEADING_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.\s+|\n").expect("valid regex"));

/// An article split into the parts the law tree stores.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedArticle {
    pub titulo: String,
    pub texto: String,
    pub incisos: Vec<Inciso>,
}

/// Split a replacement article into heading, body and incisos.
///
/// # Examples
/// ```
/// use cotejo_engine::article_text::parse_article_text;
///
/// let parsed = parse_article_text(
///     "ARTÍCULO 2°- Ámbito de aplicación. La vigencia de esta ley quedará condicionada:\na) a su aplicación;\nb) a su compatibilidad.",
/// );
/// assert_eq!(parsed.titulo, "Ámbito de aplicación.");
/// assert_eq!(parsed.texto, "La vigencia de esta ley quedará condicionada:");
/// assert_eq!(parsed.incisos.len(), 2);
/// assert_eq!(parsed.incisos[1].letter, "b");
/// ```
pub fn parse_article_text(text: &str) -> ParsedArticle {
    let (titulo, rest) = match ARTICLE_HEAD.find(text) {
        Some(head) => split_heading(&text[head.end()..]),
        None => (String::new(), text.trim().to_string()),
    };
    let (texto, incisos) = extract_incisos(&rest);
    ParsedArticle {
        titulo,
        texto,
        incisos,
    }
}

/// Article number at the head of `text`, if it starts with an article marker.
pub fn head_reference(text: &str) -> Option<ArticleRef> {
    ARTICLE_HEAD
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| ArticleRef::parse(m.as_str()))
}

/// Split a replacement that carries several articles into one block per
/// line-leading `ARTÍCULO N` marker. Text before the first marker is dropped.
pub fn split_articles(text: &str) -> Vec<(ArticleRef, String)> {
    let starts: Vec<(usize, Option<ArticleRef>)> = ARTICLE_BLOCK
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let number = caps.get(1).and_then(|m| ArticleRef::parse(m.as_str()));
            Some((whole.start(), number))
        })
        .collect();

    starts
        .iter()
        .enumerate()
        .filter_map(|(i, (start, number))| {
            let end = starts.get(i + 1).map_or(text.len(), |(next, _)| *next);
            let block = text[*start..end].trim();
            number.map(|n| (n, block.to_string()))
        })
        .collect()
}

/// Render body and incisos back into a single text.
pub fn render_article(body: &str, incisos: &[Inciso]) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(incisos.len() + 1);
    if !body.trim().is_empty() {
        lines.push(body.trim().to_string());
    }
    lines.extend(incisos.iter().map(|i| format!("{}) {}", i.letter, i.text)));
    lines.join("\n")
}

/// Text of an inciso replacement without its leading `x)` marker.
pub fn strip_inciso_marker(text: &str) -> String {
    let trimmed = text.trim();
    INCISO_MARKER
        .find(trimmed)
        .map_or(trimmed, |m| &trimmed[m.end()..])
        .trim()
        .to_string()
}

/// Heading runs up to the first sentence end or line break. A single
/// sentence with nothing after it is body, not heading.
fn split_heading(rest: &str) -> (String, String) {
    let rest = rest.trim();
    match HEADING_END.find(rest) {
        Some(end) => {
            let heading = rest[..end.start()].trim();
            let heading = if rest[end.start()..].starts_with('.') {
                format!("{heading}.")
            } else {
                heading.to_string()
            };
            (heading, rest[end.end()..].trim().to_string())
        }
        None => (String::new(), rest.to_string()),
    }
}

fn extract_incisos(text: &str) -> (String, Vec<Inciso>) {
    let (body, incisos) = leading_incisos(text);
    if !incisos.is_empty() {
        return (body, incisos);
    }
    inline_incisos(text)
}

/// Incisos written one per line (`a) ...`). Lower-case continuation lines
/// belong to the preceding inciso; anything else stays in the body.
fn leading_incisos(text: &str) -> (String, Vec<Inciso>) {
    let mut body: Vec<&str> = Vec::new();
    let mut incisos: Vec<Inciso> = Vec::new();

    for line in text.lines() {
        if let Some(caps) = LEADING_INCISO.captures(line) {
            let letter = caps.get(1).map_or("", |m| m.as_str()).to_lowercase();
            let content = caps.get(2).map_or("", |m| m.as_str()).trim().to_string();
            incisos.push(Inciso {
                letter,
                text: content,
            });
            continue;
        }
        let starts_lower = line.trim_start().chars().next().is_some_and(char::is_lowercase);
        match incisos.last_mut() {
            Some(last) if starts_lower => {
                last.text.push(' ');
                last.text.push_str(line.trim());
            }
            _ if line.trim().is_empty() => {}
            _ => body.push(line.trim()),
        }
    }

    incisos.retain(|i| !i.text.is_empty());
    (body.join("\n"), incisos)
}

/// Incisos run together in one paragraph: `... a) uno; b) dos; c) tres.`
/// Markers must follow the alphabet starting at `a`.
fn inline_incisos(text: &str) -> (String, Vec<Inciso>) {
    let mut markers: Vec<(usize, usize, char)> = Vec::new();
    let mut from = 0;
    for letter in 'a'..='z' {
        let Some((start, end)) = find_inline_marker(text, from, letter) else {
            break;
        };
        markers.push((start, end, letter));
        from = end;
    }
    if markers.is_empty() {
        return (text.trim().to_string(), Vec::new());
    }

    let body = text[..markers[0].0].trim().to_string();
    let incisos = markers
        .iter()
        .enumerate()
        .map(|(i, (_, end, letter))| {
            let stop = markers.get(i + 1).map_or(text.len(), |(next, _, _)| *next);
            Inciso {
                letter: letter.to_string(),
                text: text[*end..stop].trim().to_string(),
            }
        })
        .filter(|i| !i.text.is_empty())
        .collect();
    (body, incisos)
}

/// Position of `x) ` at or after `from`, preceded by whitespace or the start
/// of the text.
fn find_inline_marker(text: &str, from: usize, letter: char) -> Option<(usize, usize)> {
    let needle = format!("{letter})");
    let mut offset = from;
    while let Some(pos) = text[offset..].find(&needle) {
        let start = offset + pos;
        let end = start + needle.len();
        let preceded = text[..start].chars().next_back().is_none_or(char::is_whitespace);
        let followed = text[end..].chars().next().is_some_and(char::is_whitespace);
        if preceded && followed {
            return Some((start, end));
        }
        offset = end;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn inciso(letter: &str, text: &str) -> Inciso {
        Inciso {
            letter: letter.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_heading_and_body() {
        let parsed = parse_article_text("ARTÍCULO 2°- Ámbito de aplicación. La vigencia de esta ley.");
        assert_eq!(parsed.titulo, "Ámbito de aplicación.");
        assert_eq!(parsed.texto, "La vigencia de esta ley.");
        assert!(parsed.incisos.is_empty());
    }

    #[test]
    fn test_single_sentence_is_body() {
        let parsed = parse_article_text("ARTÍCULO 30.- Texto nuevo.");
        assert_eq!(parsed.titulo, "");
        assert_eq!(parsed.texto, "Texto nuevo.");
    }

    #[test]
    fn test_heading_ends_at_line_break() {
        let parsed = parse_article_text("ARTÍCULO 92 quater- Plazo\nEl contrato se extenderá.");
        assert_eq!(parsed.titulo, "Plazo");
        assert_eq!(parsed.texto, "El contrato se extenderá.");
    }

    #[test]
    fn test_without_marker() {
        let parsed = parse_article_text("  El fondo se integrará con aportes.  ");
        assert_eq!(parsed.titulo, "");
        assert_eq!(parsed.texto, "El fondo se integrará con aportes.");
    }

    #[test]
    fn test_leading_incisos_with_continuation() {
        let text = "ARTÍCULO 245.- Indemnización. Se computará:\na) la mejor remuneración\nmensual devengada;\nb) la antigüedad.\nEn ningún caso será inferior a un mes.";
        let parsed = parse_article_text(text);
        assert_eq!(parsed.titulo, "Indemnización.");
        assert_eq!(parsed.texto, "Se computará:\nEn ningún caso será inferior a un mes.");
        assert_eq!(
            parsed.incisos,
            vec![
                inciso("a", "la mejor remuneración mensual devengada;"),
                inciso("b", "la antigüedad."),
            ]
        );
    }

    #[test]
    fn test_inline_incisos() {
        let parsed = parse_article_text("Serán causas: a) el despido; b) la renuncia; c) la muerte.");
        assert_eq!(parsed.texto, "Serán causas:");
        assert_eq!(
            parsed.incisos,
            vec![
                inciso("a", "el despido;"),
                inciso("b", "la renuncia;"),
                inciso("c", "la muerte."),
            ]
        );
    }

    #[test]
    fn test_inline_markers_need_whitespace() {
        let parsed = parse_article_text("Según el apartado(a) ya citado.");
        assert!(parsed.incisos.is_empty());
    }

    #[test]
    fn test_head_reference() {
        assert_eq!(
            head_reference("\"ARTÍCULO 29 bis.- Texto."),
            ArticleRef::parse("29 bis")
        );
        assert_eq!(head_reference("Texto suelto"), None);
    }

    #[test]
    fn test_split_articles() {
        let text = "ARTÍCULO 10.- Primero.\nSigue.\nARTÍCULO 11°- Segundo.\n\"ARTÍCULO 15.- Tercero.";
        let blocks = split_articles(text);
        let numbers: Vec<String> = blocks.iter().map(|(n, _)| n.to_string()).collect();
        assert_eq!(numbers, vec!["10", "11", "15"]);
        assert_eq!(blocks[0].1, "ARTÍCULO 10.- Primero.\nSigue.");
        assert_eq!(blocks[2].1, "\"ARTÍCULO 15.- Tercero.");
    }

    #[test]
    fn test_render_article() {
        let rendered = render_article("Se computará:", &[inciso("a", "uno;"), inciso("b", "dos.")]);
        assert_eq!(rendered, "Se computará:\na) uno;\nb) dos.");
        assert_eq!(render_article("", &[inciso("c", "tres.")]), "c) tres.");
    }

    #[test]
    fn test_strip_inciso_marker() {
        assert_eq!(strip_inciso_marker("c) Cuando el trabajador."), "Cuando el trabajador.");
        assert_eq!(strip_inciso_marker("Cuando el trabajador."), "Cuando el trabajador.");
    }
}
