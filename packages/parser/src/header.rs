//! Header classifier and token stream.
//!
//! Turns normalized lines into the typed tokens the operation state machine
//! consumes. An `ARTÍCULO N-` marker opens an operation only when its tail
//! (or, when the tail is empty, the next non-blank line) carries one of the
//! operative verbs. A marker whose tail is a closing formula ("Comuníquese
//! al Poder Ejecutivo", "De forma.") ends the amendment part. Other markers
//! without a verb are statute text quoted inside the dictamen and stay
//! ordinary text.

use std::sync::LazyLock;

use cotejo_shared::Action;
use regex::Regex;

use crate::config::MAX_HEADER_LOOKAHEAD;
use crate::lexer::{classify_line, HeadingKind, LineKind};
use crate::normalize::fold;

/// A token of the dictamen stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A dictamen article that opens an amendment operation.
    HeaderOpen {
        dictamen_article: String,
        action: Action,
        header: String,
    },
    /// A line holding a trigger phrase such as "por el siguiente:".
    /// `before` ends with the phrase; `after` is the text following it.
    Trigger {
        line: String,
        before: String,
        after: Option<String>,
    },
    Heading {
        kind: HeadingKind,
        number: Option<String>,
        line: String,
    },
    Text {
        line: String,
        article_like: bool,
    },
    /// A dictamen article holding only a closing formula.
    Closing { line: String },
    Blank,
}

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static OPERATIVE_VERB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:sustituye|incorpora|deroga|modifica|suprime|reemplaza|crea)n?se\b")
        .expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static TRIGGER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:por\s+)?(?:el|la|los|las)\s+siguientes?(?:\s+textos?)?\s*:|de\s+la\s+siguiente\s+manera\s*:|como\s+sigue\s*:",
    )
    .expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static CLOSING_FORMULA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:comuniquese|de\s+forma\b|registrese|publiquese|dese\s+a\s+la\s+direccion)")
        .expect("valid regex")
});

/// Whether the tail of a dictamen article is a closing formula.
///
/// # Examples
/// ```
/// use cotejo_parser::header::is_closing_formula;
///
/// assert!(is_closing_formula("Comuníquese al Poder Ejecutivo Nacional."));
/// assert!(is_closing_formula("De forma."));
/// assert!(!is_closing_formula("Ámbito de aplicación."));
/// ```
pub fn is_closing_formula(tail: &str) -> bool {
    CLOSING_FORMULA.is_match(&fold(tail))
}

/// Find the first operative verb in a piece of text.
///
/// # Examples
/// ```
/// use cotejo_parser::header::find_operative_verb;
/// use cotejo_shared::Action;
///
/// assert_eq!(find_operative_verb("Sustitúyese el artículo 30"), Some(Action::Substitutes));
/// assert_eq!(find_operative_verb("DERÓGANSE los artículos 10 y 11"), Some(Action::Derogates));
/// assert_eq!(find_operative_verb("Comuníquese al Poder Ejecutivo"), None);
/// ```
pub fn find_operative_verb(text: &str) -> Option<Action> {
    let folded = fold(text);
    OPERATIVE_VERB
        .find(&folded)
        .and_then(|m| Action::from_folded_verb(m.as_str()))
}

/// Split a line at its trigger phrase.
///
/// Returns the text up to and including the phrase, and the trimmed text
/// after it when there is any.
pub fn split_trigger(line: &str) -> Option<(String, Option<String>)> {
    let m = TRIGGER.find(line)?;
    let before = line[..m.end()].trim().to_string();
    let after = line[m.end()..].trim();
    Some((before, (!after.is_empty()).then(|| after.to_string())))
}

/// Tokenize normalized lines.
pub fn tokenize(lines: &[String]) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(lines.len());
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i].trim();
        i += 1;
        match classify_line(line) {
            LineKind::Blank => tokens.push(Token::Blank),
            LineKind::Heading { kind, number } => tokens.push(Token::Heading {
                kind,
                number,
                line: line.to_string(),
            }),
            LineKind::ArticleMarker { number, tail } => {
                if let Some(action) = find_operative_verb(&tail) {
                    push_header(&mut tokens, number, action, line.to_string());
                } else if let Some((j, action)) = deferred_verb(lines, i, &tail) {
                    let header = format!("{} {}", line, lines[j].trim());
                    push_header(&mut tokens, number, action, header);
                    i = j + 1;
                } else if is_closing_formula(&tail) {
                    tokens.push(Token::Closing {
                        line: line.to_string(),
                    });
                } else {
                    tokens.push(Token::Text {
                        line: line.to_string(),
                        article_like: true,
                    });
                }
            }
            LineKind::Text { article_like } => match split_trigger(line) {
                Some((before, after)) => tokens.push(Token::Trigger {
                    line: line.to_string(),
                    before,
                    after,
                }),
                None => tokens.push(Token::Text {
                    line: line.to_string(),
                    article_like,
                }),
            },
        }
    }
    tokens
}

/// For a marker with an empty tail, look at the next non-blank line within
/// the lookahead cap for the operative verb.
fn deferred_verb(lines: &[String], start: usize, tail: &str) -> Option<(usize, Action)> {
    if !tail.is_empty() {
        return None;
    }
    let (j, next) = lines
        .iter()
        .enumerate()
        .skip(start)
        .take(MAX_HEADER_LOOKAHEAD)
        .find(|(_, l)| !l.trim().is_empty())?;
    if !matches!(classify_line(next), LineKind::Text { .. }) {
        return None;
    }
    find_operative_verb(next).map(|action| (j, action))
}

/// Emit a header, splitting off a trigger phrase contained in it.
fn push_header(tokens: &mut Vec<Token>, dictamen_article: String, action: Action, header: String) {
    match split_trigger(&header) {
        Some((before, after)) => {
            tokens.push(Token::HeaderOpen {
                dictamen_article,
                action,
                header: before,
            });
            tokens.push(Token::Trigger {
                line: header,
                before: String::new(),
                after,
            });
        }
        None => tokens.push(Token::HeaderOpen {
            dictamen_article,
            action,
            header,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_header_with_inline_trigger() {
        let tokens = tokenize(&lines(&[
            "ARTÍCULO 5- Sustitúyese el artículo 30 de la Ley N° 20.744 por el siguiente: ARTÍCULO 30.- Texto nuevo.",
        ]));
        assert_eq!(
            tokens,
            vec![
                Token::HeaderOpen {
                    dictamen_article: "5".to_string(),
                    action: Action::Substitutes,
                    header: "ARTÍCULO 5- Sustitúyese el artículo 30 de la Ley N° 20.744 por el siguiente:"
                        .to_string(),
                },
                Token::Trigger {
                    line: "ARTÍCULO 5- Sustitúyese el artículo 30 de la Ley N° 20.744 por el siguiente: ARTÍCULO 30.- Texto nuevo."
                        .to_string(),
                    before: String::new(),
                    after: Some("ARTÍCULO 30.- Texto nuevo.".to_string()),
                },
            ]
        );
    }

    #[test]
    fn test_marker_without_verb_is_text() {
        let tokens = tokenize(&lines(&["ARTÍCULO 2- Ámbito de aplicación."]));
        assert_eq!(
            tokens,
            vec![Token::Text {
                line: "ARTÍCULO 2- Ámbito de aplicación.".to_string(),
                article_like: true
            }]
        );
    }

    #[test]
    fn test_closing_formula_marker() {
        let tokens = tokenize(&lines(&[
            "ARTÍCULO 91- Comuníquese al Poder Ejecutivo Nacional.",
            "ARTÍCULO 41- De forma.",
            "ARTÍCULO 42- Deforestación.",
        ]));
        assert_eq!(
            tokens,
            vec![
                Token::Closing {
                    line: "ARTÍCULO 91- Comuníquese al Poder Ejecutivo Nacional.".to_string()
                },
                Token::Closing {
                    line: "ARTÍCULO 41- De forma.".to_string()
                },
                Token::Text {
                    line: "ARTÍCULO 42- Deforestación.".to_string(),
                    article_like: true
                },
            ]
        );
    }

    #[test]
    fn test_verb_on_next_line_is_merged() {
        let tokens = tokenize(&lines(&["ARTÍCULO 7-", "", "Derógase el artículo 9 de la Ley N° 25.323.", "Fin"]));
        assert_eq!(
            tokens[0],
            Token::HeaderOpen {
                dictamen_article: "7".to_string(),
                action: Action::Derogates,
                header: "ARTÍCULO 7- Derógase el artículo 9 de la Ley N° 25.323.".to_string(),
            }
        );
        assert_eq!(
            tokens[1],
            Token::Text {
                line: "Fin".to_string(),
                article_like: false
            }
        );
    }

    #[test]
    fn test_deferred_verb_respects_lookahead() {
        let tokens = tokenize(&lines(&["ARTÍCULO 7-", "", "", "Derógase el artículo 9."]));
        assert!(matches!(tokens[0], Token::Text { article_like: true, .. }));
    }

    #[test]
    fn test_trigger_variants() {
        for line in [
            "por el siguiente:",
            "con el siguiente texto:",
            "por los siguientes: a) uno",
            "quedará redactado de la siguiente manera:",
            "queda redactado como sigue:",
        ] {
            assert!(split_trigger(line).is_some(), "no trigger in {line:?}");
        }
        assert_eq!(
            split_trigger("por los siguientes: a) uno"),
            Some(("por los siguientes:".to_string(), Some("a) uno".to_string())))
        );
        assert_eq!(split_trigger("lo siguiente"), None);
    }

    #[test]
    fn test_headings_and_blanks() {
        let tokens = tokenize(&lines(&["TÍTULO II", ""]));
        assert_eq!(
            tokens,
            vec![
                Token::Heading {
                    kind: HeadingKind::Title,
                    number: Some("II".to_string()),
                    line: "TÍTULO II".to_string()
                },
                Token::Blank
            ]
        );
    }
}
